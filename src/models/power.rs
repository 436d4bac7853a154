use chrono::{DateTime, FixedOffset};

use crate::services::irradiance::PoaIrradiance;
use crate::services::solar_position::SolarPosition;

// ─── DC model output ─────────────────────────────────────────────────────────

/// Characteristic points of one I-V curve.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IvCurvePoints {
    pub i_sc: f64,
    pub v_oc: f64,
    pub i_mp: f64,
    pub v_mp: f64,
    pub p_mp: f64,
}

/// DC output of the model chain. Its available keys depend on the DC model.
#[derive(Debug, Clone, PartialEq)]
pub enum DcOutput {
    SingleDiode(Vec<IvCurvePoints>),
    Pvwatts(Vec<f64>),
}

impl DcOutput {
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            DcOutput::SingleDiode(_) => &["i_sc", "v_oc", "i_mp", "v_mp", "p_mp"],
            DcOutput::Pvwatts(_) => &["p_dc"],
        }
    }

    /// Maximum power point series, only present for the single diode model.
    pub fn p_mp(&self) -> Option<Vec<f64>> {
        match self {
            DcOutput::SingleDiode(points) => Some(points.iter().map(|p| p.p_mp).collect()),
            DcOutput::Pvwatts(_) => None,
        }
    }

    /// DC power fed to the inverter.
    pub fn power(&self) -> Vec<f64> {
        match self {
            DcOutput::SingleDiode(points) => points.iter().map(|p| p.p_mp).collect(),
            DcOutput::Pvwatts(p_dc) => p_dc.clone(),
        }
    }
}

// ─── Model chain results ─────────────────────────────────────────────────────

/// Everything one model chain run produced, row-aligned with `times`.
#[derive(Debug, Clone)]
pub struct ModelResults {
    pub times: Vec<DateTime<FixedOffset>>,
    pub solar_position: Vec<SolarPosition>,
    pub irradiance: Vec<PoaIrradiance>,
    pub aoi: Vec<f64>,
    pub aoi_modifier: Vec<f64>,
    pub effective_irradiance: Vec<f64>,
    pub cell_temperature: Vec<f64>,
    pub dc: DcOutput,
    /// `None` when the system has no inverter parameters
    pub ac: Option<Vec<f64>>,
}

/// DC and AC power over a time index, in Watts.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerSeries {
    pub times: Vec<DateTime<FixedOffset>>,
    pub dc_power: Vec<f64>,
    pub ac_power: Vec<f64>,
}
