use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::info;

use crate::errors::ConfigError;

fn default_altitude() -> f64 { 0.0 }
fn default_albedo() -> f64 { 0.25 }
fn default_eg_ref() -> f64 { 1.121 }
fn default_d_eg_dt() -> f64 { -0.0002677 }
fn default_eta_inv_ref() -> f64 { 0.9637 }
fn default_timeout_s() -> u64 { 30 }

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationConfig,
    pub live: LiveConfig,
    pub monthly: MonthlyConfig,
}

impl Config {
    /// Loads the configuration from a JSON file.
    ///
    /// A missing file is not an error: the built-in sites and arrays are used instead.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!(path = %path.display(), "config file not found, using built-in defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.periods == 0 {
            return Err(ConfigError::Invalid("simulation.periods must be > 0".into()));
        }
        if self.live.poll_interval_s == 0 {
            return Err(ConfigError::Invalid("live.poll_interval_s must be > 0".into()));
        }
        self.simulation.site.validate()?;
        self.live.site.validate()?;
        // Surfaces the racking/module lookup error at startup rather than on the first tick.
        self.simulation.array.sapm_parameters()?;
        self.live.array.sapm_parameters()?;
        Ok(())
    }
}

/// Geographic site the model runs for.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Site {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: Tz,
    #[serde(default = "default_altitude")]
    pub altitude: f64,
}

impl Site {
    pub fn sofia() -> Self {
        Self {
            name: "Sofia".to_string(),
            latitude: 42.676,
            longitude: 23.368,
            timezone: chrono_tz::Europe::Sofia,
            altitude: 10.0,
        }
    }

    pub fn lisbon() -> Self {
        Self {
            name: "Lisbon".to_string(),
            latitude: 38.736946,
            longitude: -9.142685,
            timezone: chrono_tz::Europe::Lisbon,
            altitude: 10.0,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ConfigError::Invalid(format!("{}: latitude {} out of range", self.name, self.latitude)));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ConfigError::Invalid(format!("{}: longitude {} out of range", self.name, self.longitude)));
        }
        Ok(())
    }
}

/// Fixed-tilt PV array with its module, inverter and thermal parameters.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ArrayConfig {
    pub surface_tilt: f64,
    /// Degrees clockwise from north, 180 = south.
    pub surface_azimuth: f64,
    #[serde(default = "default_albedo")]
    pub albedo: f64,
    pub module_parameters: ModuleParameters,
    #[serde(default)]
    pub inverter_parameters: Option<InverterParameters>,
    #[serde(default)]
    pub temperature_model_parameters: Option<SapmParameters>,
    #[serde(default)]
    pub racking_model: Option<RackingModel>,
    #[serde(default)]
    pub module_type: Option<ModuleType>,
}

impl ArrayConfig {
    /// Resolves the SAPM cell temperature coefficients.
    ///
    /// Explicit coefficients win; otherwise the racking model and module type select a row
    /// of the SAPM table.
    pub fn sapm_parameters(&self) -> Result<SapmParameters, ConfigError> {
        if let Some(params) = self.temperature_model_parameters {
            return Ok(params);
        }

        let racking = self.racking_model.unwrap_or(RackingModel::OpenRack);
        let module = self.module_type.unwrap_or(ModuleType::GlassPolymer);
        let (a, b, delta_t) = match (racking, module) {
            (RackingModel::OpenRack, ModuleType::GlassGlass) => (-3.47, -0.0594, 3.0),
            (RackingModel::CloseMount, ModuleType::GlassGlass) => (-2.98, -0.0471, 1.0),
            (RackingModel::OpenRack, ModuleType::GlassPolymer) => (-3.56, -0.0750, 3.0),
            (RackingModel::InsulatedBack, ModuleType::GlassPolymer) => (-2.81, -0.0455, 0.0),
            _ => {
                return Err(ConfigError::TemperatureModel {
                    racking: racking.to_string(),
                    module: module.to_string(),
                });
            }
        };

        Ok(SapmParameters { a, b, delta_t })
    }

    fn sofia_single_diode() -> Self {
        Self {
            surface_tilt: 30.0,
            surface_azimuth: 180.0,
            albedo: default_albedo(),
            module_parameters: ModuleParameters::SingleDiode(SingleDiodeParameters {
                i_l_ref: 8.0,
                i_o_ref: 1e-10,
                r_s: 0.5,
                r_sh_ref: 100.0,
                a_ref: 1.5,
                eg_ref: 1.121,
                d_eg_dt: default_d_eg_dt(),
                alpha_sc: 0.004,
            }),
            inverter_parameters: Some(InverterParameters {
                pdc0: 3000.0,
                eta_inv_nom: 0.96,
                eta_inv_ref: default_eta_inv_ref(),
            }),
            temperature_model_parameters: Some(SapmParameters { a: -3.56, b: -0.075, delta_t: 3.0 }),
            racking_model: None,
            module_type: None,
        }
    }

    fn lisbon_pvwatts() -> Self {
        Self {
            surface_tilt: 60.0,
            surface_azimuth: 90.0,
            albedo: default_albedo(),
            module_parameters: ModuleParameters::Pvwatts(PvwattsParameters {
                pdc0: 3000.0,
                gamma_pdc: -0.004,
                material: Some("monosi".to_string()),
            }),
            inverter_parameters: Some(InverterParameters {
                pdc0: 3000.0,
                eta_inv_nom: 0.96,
                eta_inv_ref: default_eta_inv_ref(),
            }),
            temperature_model_parameters: None,
            racking_model: Some(RackingModel::OpenRack),
            module_type: Some(ModuleType::GlassPolymer),
        }
    }
}

/// Module electrical parameters; the key set depends on the DC model.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "dc_model", rename_all = "snake_case")]
pub enum ModuleParameters {
    SingleDiode(SingleDiodeParameters),
    Pvwatts(PvwattsParameters),
}

/// De Soto single diode reference parameters.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SingleDiodeParameters {
    #[serde(rename = "I_L_ref")]
    pub i_l_ref: f64,
    #[serde(rename = "I_o_ref")]
    pub i_o_ref: f64,
    #[serde(rename = "R_s")]
    pub r_s: f64,
    #[serde(rename = "R_sh_ref")]
    pub r_sh_ref: f64,
    pub a_ref: f64,
    #[serde(rename = "EgRef", default = "default_eg_ref")]
    pub eg_ref: f64,
    #[serde(rename = "dEgdT", default = "default_d_eg_dt")]
    pub d_eg_dt: f64,
    /// Short-circuit current temperature coefficient, A/°C.
    pub alpha_sc: f64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PvwattsParameters {
    pub pdc0: f64,
    pub gamma_pdc: f64,
    #[serde(default)]
    pub material: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct InverterParameters {
    pub pdc0: f64,
    pub eta_inv_nom: f64,
    #[serde(default = "default_eta_inv_ref")]
    pub eta_inv_ref: f64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct SapmParameters {
    pub a: f64,
    pub b: f64,
    #[serde(rename = "deltaT")]
    pub delta_t: f64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RackingModel {
    OpenRack,
    CloseMount,
    InsulatedBack,
}

impl fmt::Display for RackingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RackingModel::OpenRack => "open_rack",
            RackingModel::CloseMount => "close_mount",
            RackingModel::InsulatedBack => "insulated_back",
        })
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModuleType {
    GlassGlass,
    GlassPolymer,
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModuleType::GlassGlass => "glass_glass",
            ModuleType::GlassPolymer => "glass_polymer",
        })
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AoiModel {
    #[default]
    Physical,
    Ashrae,
    NoLoss,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TranspositionModel {
    #[default]
    Isotropic,
    Haydavies,
}

/// Model chain options; spectral losses are always ignored.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ModelOptions {
    pub aoi_model: AoiModel,
    pub transposition: TranspositionModel,
    pub linke_turbidity: f64,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            aoi_model: AoiModel::Physical,
            transposition: TranspositionModel::Isotropic,
            linke_turbidity: 3.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimulationConfig {
    pub site: Site,
    pub array: ArrayConfig,
    pub model: ModelOptions,
    pub date: NaiveDate,
    pub periods: usize,
    pub output: PathBuf,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            site: Site::sofia(),
            array: ArrayConfig::sofia_single_diode(),
            model: ModelOptions::default(),
            date: NaiveDate::from_ymd_opt(2024, 1, 23).unwrap_or_default(),
            periods: 24,
            output: PathBuf::from("inverter_output_simulated.svg"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LiveConfig {
    pub site: Site,
    pub array: ArrayConfig,
    pub model: ModelOptions,
    pub base_url: String,
    pub poll_interval_s: u64,
    #[serde(default = "default_timeout_s")]
    pub timeout_s: u64,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            site: Site::lisbon(),
            array: ArrayConfig::lisbon_pvwatts(),
            model: ModelOptions::default(),
            base_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            poll_interval_s: 60,
            timeout_s: default_timeout_s(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MonthlyConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub peak_power_kw: f64,
    pub loss_percent: f64,
    pub surface_tilt: f64,
    /// Degrees clockwise from north, 180 = south.
    pub surface_azimuth: f64,
    pub base_url: String,
    pub timeout_s: u64,
    pub output: PathBuf,
}

impl MonthlyConfig {
    /// PVGIS measures orientation from south: 0 = south, -90 = east, 90 = west.
    pub fn pvgis_aspect(&self) -> f64 {
        self.surface_azimuth - 180.0
    }
}

impl Default for MonthlyConfig {
    fn default() -> Self {
        Self {
            latitude: 42.676,
            longitude: 23.368,
            peak_power_kw: 3.0,
            loss_percent: 14.0,
            surface_tilt: 30.0,
            surface_azimuth: 180.0,
            base_url: "https://re.jrc.ec.europa.eu/api/v5_2/PVcalc".to_string(),
            timeout_s: default_timeout_s(),
            output: PathBuf::from("monthly_expectations.svg"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_three_sites() {
        let cfg = Config::default();
        assert_eq!(cfg.simulation.site.name, "Sofia");
        assert_eq!(cfg.simulation.periods, 24);
        assert_eq!(cfg.simulation.date, NaiveDate::from_ymd_opt(2024, 1, 23).unwrap());
        assert_eq!(cfg.live.site.timezone, chrono_tz::Europe::Lisbon);
        assert_eq!(cfg.live.poll_interval_s, 60);
        assert_eq!(cfg.monthly.peak_power_kw, 3.0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(cfg.monthly.surface_tilt, 30.0);
    }

    #[test]
    fn parses_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                "simulation": {
                    "site": { "name": "Madrid", "latitude": 40.4, "longitude": -3.7, "timezone": "Europe/Madrid", "altitude": 650 },
                    "array": {
                        "surface_tilt": 35,
                        "surface_azimuth": 180,
                        "module_parameters": { "dc_model": "pvwatts", "pdc0": 4000, "gamma_pdc": -0.0035 }
                    },
                    "periods": 48
                },
                "monthly": { "loss_percent": 10 }
            }"#,
        )
        .unwrap();

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.simulation.site.timezone, chrono_tz::Europe::Madrid);
        assert_eq!(cfg.simulation.periods, 48);
        assert!(cfg.simulation.array.inverter_parameters.is_none());
        assert!(matches!(cfg.simulation.array.module_parameters, ModuleParameters::Pvwatts(_)));
        assert_eq!(cfg.monthly.loss_percent, 10.0);
        assert_eq!(cfg.monthly.peak_power_kw, 3.0);
        assert_eq!(cfg.live.site.name, "Lisbon");
    }

    #[test]
    fn single_diode_keys_use_reference_names() {
        let params: ModuleParameters = serde_json::from_str(
            r#"{ "dc_model": "single_diode", "pdc0": 3000, "I_L_ref": 8.0, "I_o_ref": 1e-10,
                 "R_s": 0.5, "R_sh_ref": 100, "a_ref": 1.5, "cells_in_series": 60, "alpha_sc": 0.004 }"#,
        )
        .unwrap();
        match params {
            ModuleParameters::SingleDiode(p) => {
                assert_eq!(p.i_l_ref, 8.0);
                assert_eq!(p.eg_ref, 1.121);
                assert_eq!(p.d_eg_dt, -0.0002677);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn sapm_lookup_from_racking() {
        let array = ArrayConfig::lisbon_pvwatts();
        let p = array.sapm_parameters().unwrap();
        assert_eq!((p.a, p.b, p.delta_t), (-3.56, -0.075, 3.0));

        let mut close = array.clone();
        close.racking_model = Some(RackingModel::CloseMount);
        close.module_type = Some(ModuleType::GlassPolymer);
        let err = close.sapm_parameters().unwrap_err();
        assert!(err.to_string().contains("close_mount"));
    }

    #[test]
    fn invalid_periods_rejected() {
        let mut cfg = Config::default();
        cfg.simulation.periods = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn pvgis_aspect_counts_from_south() {
        let mut cfg = MonthlyConfig::default();
        assert_eq!(cfg.pvgis_aspect(), 0.0);
        cfg.surface_azimuth = 90.0;
        assert_eq!(cfg.pvgis_aspect(), -90.0);
    }
}
