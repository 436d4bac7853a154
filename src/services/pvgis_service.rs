use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::MonthlyConfig;
use crate::errors::PvgisError;

/// PVGIS `PVcalc` client for grid-connected fixed systems
pub struct PvgisClient {
    client: Client,
    base_url: String,
}

impl PvgisClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, PvgisError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url: base_url.to_string() })
    }

    /// Query parameters for one PVcalc request.
    pub fn query(cfg: &MonthlyConfig) -> Vec<(&'static str, String)> {
        vec![
            ("lat", cfg.latitude.to_string()),
            ("lon", cfg.longitude.to_string()),
            ("peakpower", cfg.peak_power_kw.to_string()),
            ("loss", cfg.loss_percent.to_string()),
            ("angle", cfg.surface_tilt.to_string()),
            ("aspect", cfg.pvgis_aspect().to_string()),
            ("outputformat", "json".to_string()),
        ]
    }

    /// Fetches the raw PVcalc body, leaving shape validation to the caller.
    pub async fn calculate(&self, cfg: &MonthlyConfig) -> Result<Value, PvgisError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&Self::query(cfg))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PvgisError::Status(status));
        }

        let body: Value = resp.json().await?;
        debug!(lat = cfg.latitude, lon = cfg.longitude, "PVGIS response received");
        Ok(body)
    }
}
