//! Weather → power model chain for one fixed-tilt array.
//!
//! Stages, per weather row:
//!  1. solar position
//!  2. plane of array transposition
//!  3. angle of incidence loss on the beam component (spectral loss is ignored)
//!  4. SAPM cell temperature
//!  5. DC model (single diode or PVWatts)
//!  6. PVWatts inverter, when inverter parameters are configured

use tracing::debug;

use crate::config::{ArrayConfig, ModelOptions, ModuleParameters, SapmParameters, Site};
use crate::errors::ModelError;
use crate::models::power::{DcOutput, ModelResults};
use crate::models::weather::WeatherSample;
use crate::services::{dc_model, inverter, irradiance, temperature};
use crate::services::solar_position::{extraterrestrial_irradiance, solar_position};

/// Something that turns a weather table into power.
pub trait PowerModel {
    fn run_model(&self, weather: &[WeatherSample]) -> Result<ModelResults, ModelError>;
}

#[derive(Debug, Clone)]
pub struct ModelChain {
    site: Site,
    array: ArrayConfig,
    options: ModelOptions,
    sapm: SapmParameters,
}

impl ModelChain {
    /// Returns a new model chain after checking the array parameters
    ///
    /// # Arguments
    ///
    /// * 'site' - location the weather belongs to
    /// * 'array' - array orientation, module, inverter and thermal parameters
    /// * 'options' - AOI and transposition models
    pub fn new(site: Site, array: ArrayConfig, options: ModelOptions) -> Result<Self, ModelError> {
        let sapm = array.sapm_parameters()?;
        validate_module(&array.module_parameters)?;
        if let Some(inv) = &array.inverter_parameters {
            if inv.pdc0 <= 0.0 || inv.eta_inv_nom <= 0.0 || inv.eta_inv_ref <= 0.0 {
                return Err(ModelError::InvalidParameter("inverter pdc0, eta_inv_nom and eta_inv_ref must be > 0".into()));
            }
        }

        if let ModuleParameters::Pvwatts(p) = &array.module_parameters {
            debug!(material = p.material.as_deref().unwrap_or("unspecified"), "spectral losses ignored");
        }
        debug!(
            site = %site.name,
            tilt = array.surface_tilt,
            azimuth = array.surface_azimuth,
            aoi_model = ?options.aoi_model,
            transposition = ?options.transposition,
            "model chain ready"
        );

        Ok(Self { site, array, options, sapm })
    }

    pub fn site(&self) -> &Site {
        &self.site
    }
}

fn validate_module(params: &ModuleParameters) -> Result<(), ModelError> {
    match params {
        ModuleParameters::Pvwatts(p) if p.pdc0 <= 0.0 => {
            Err(ModelError::InvalidParameter(format!("pdc0 must be > 0, got {}", p.pdc0)))
        }
        ModuleParameters::SingleDiode(p) if p.i_o_ref <= 0.0 || p.a_ref <= 0.0 || p.r_sh_ref <= 0.0 || p.r_s < 0.0 => {
            Err(ModelError::InvalidParameter(
                "I_o_ref, a_ref and R_sh_ref must be > 0 and R_s >= 0".into(),
            ))
        }
        _ => Ok(()),
    }
}

impl PowerModel for ModelChain {
    fn run_model(&self, weather: &[WeatherSample]) -> Result<ModelResults, ModelError> {
        let n = weather.len();
        let mut results = ModelResults {
            times: Vec::with_capacity(n),
            solar_position: Vec::with_capacity(n),
            irradiance: Vec::with_capacity(n),
            aoi: Vec::with_capacity(n),
            aoi_modifier: Vec::with_capacity(n),
            effective_irradiance: Vec::with_capacity(n),
            cell_temperature: Vec::with_capacity(n),
            dc: DcOutput::Pvwatts(Vec::new()),
            ac: None,
        };
        let mut curves = Vec::with_capacity(n);
        let mut p_dc = Vec::with_capacity(n);

        for w in weather {
            let sun = solar_position(&w.time, self.site.latitude, self.site.longitude);
            let poa = irradiance::get_total_irradiance(
                self.array.surface_tilt,
                self.array.surface_azimuth,
                sun.zenith,
                sun.azimuth,
                w.ghi,
                w.dni,
                w.dhi,
                extraterrestrial_irradiance(&w.time),
                self.array.albedo,
                self.options.transposition,
            );
            let aoi = irradiance::aoi(self.array.surface_tilt, self.array.surface_azimuth, sun.zenith, sun.azimuth);
            let iam = irradiance::aoi_modifier(self.options.aoi_model, aoi);
            let effective = (poa.poa_direct * iam + poa.poa_diffuse).max(0.0);
            let temp_cell = temperature::sapm_cell(poa.poa_global, w.temp_air(), w.wind_speed(), &self.sapm);

            match &self.array.module_parameters {
                ModuleParameters::SingleDiode(p) => {
                    curves.push(dc_model::singlediode(&dc_model::calcparams_desoto(effective, temp_cell, p)));
                }
                ModuleParameters::Pvwatts(p) => {
                    p_dc.push(dc_model::pvwatts_dc(effective, temp_cell, p.pdc0, p.gamma_pdc));
                }
            }

            results.times.push(w.time);
            results.solar_position.push(sun);
            results.irradiance.push(poa);
            results.aoi.push(aoi);
            results.aoi_modifier.push(iam);
            results.effective_irradiance.push(effective);
            results.cell_temperature.push(temp_cell);
        }

        results.dc = match self.array.module_parameters {
            ModuleParameters::SingleDiode(_) => DcOutput::SingleDiode(curves),
            ModuleParameters::Pvwatts(_) => DcOutput::Pvwatts(p_dc),
        };
        results.ac = self
            .array
            .inverter_parameters
            .map(|inv| results.dc.power().into_iter().map(|pdc| inverter::pvwatts_ac(pdc, &inv)).collect());

        debug!(rows = n, "model run complete");
        Ok(results)
    }
}
