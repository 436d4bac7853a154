use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use serde::Deserialize;

use crate::errors::WeatherError;

/// Air temperature assumed when a weather table carries none (°C).
pub const DEFAULT_TEMP_AIR: f64 = 20.0;
/// Wind speed assumed when a weather table carries none (m/s).
pub const DEFAULT_WIND_SPEED: f64 = 0.0;

/// One row of model input weather.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSample {
    pub time: DateTime<FixedOffset>,
    /// Global horizontal irradiance (W/m²)
    pub ghi: f64,
    /// Direct normal irradiance (W/m²)
    pub dni: f64,
    /// Diffuse horizontal irradiance (W/m²)
    pub dhi: f64,
    pub temp_air: Option<f64>,
    pub wind_speed: Option<f64>,
}

impl WeatherSample {
    pub fn temp_air(&self) -> f64 {
        self.temp_air.unwrap_or(DEFAULT_TEMP_AIR)
    }

    pub fn wind_speed(&self) -> f64 {
        self.wind_speed.unwrap_or(DEFAULT_WIND_SPEED)
    }
}

// ─── Open-Meteo current weather ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CurrentWeatherResponse {
    #[serde(default)]
    pub utc_offset_seconds: i32,
    pub current: CurrentData,
}

#[derive(Debug, Deserialize)]
pub struct CurrentData {
    /// Local time of the site, "2025-01-23T10:45"
    pub time: String,
    pub temperature_2m: f64,
    pub shortwave_radiation: f64,
    pub direct_radiation: f64,
    pub diffuse_radiation: f64,
}

impl CurrentWeatherResponse {
    /// Maps the four requested current fields onto a model input row.
    pub fn into_sample(self) -> Result<WeatherSample, WeatherError> {
        let offset = FixedOffset::east_opt(self.utc_offset_seconds)
            .ok_or_else(|| WeatherError::Timestamp(format!("offset {}", self.utc_offset_seconds)))?;
        let naive = NaiveDateTime::parse_from_str(&self.current.time, "%Y-%m-%dT%H:%M")
            .map_err(|_| WeatherError::Timestamp(self.current.time.clone()))?;
        let time = offset
            .from_local_datetime(&naive)
            .single()
            .ok_or_else(|| WeatherError::Timestamp(self.current.time.clone()))?;

        Ok(WeatherSample {
            time,
            ghi: self.current.shortwave_radiation,
            dni: self.current.direct_radiation,
            dhi: self.current.diffuse_radiation,
            temp_air: Some(self.current.temperature_2m),
            wind_speed: None,
        })
    }
}
