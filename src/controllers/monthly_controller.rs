use std::io::Write;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::MonthlyConfig;
use crate::models::pvgis::{self, MonthlyEnergy};
use crate::services::chart::{BarChart, ChartSink};
use crate::services::pvgis_service::PvgisClient;

pub const MISSING_DATA_MESSAGE: &str = "Error: API response does not contain expected monthly energy data.";

/// Fetches the PVGIS estimate once and plots it.
pub async fn run(
    client: &PvgisClient,
    cfg: &MonthlyConfig,
    chart: &mut impl ChartSink,
    out: &mut impl Write,
) -> Result<Option<Vec<MonthlyEnergy>>> {
    info!(lat = cfg.latitude, lon = cfg.longitude, peak_kw = cfg.peak_power_kw, "requesting PVGIS monthly estimate");
    let body = client.calculate(cfg).await.context("PVGIS request failed")?;
    present(&body, cfg, chart, out)
}

/// Validates the body, prints the monthly table and renders the bar chart.
///
/// A body without `outputs.monthly.fixed` prints an error line and draws nothing.
pub fn present(
    body: &Value,
    cfg: &MonthlyConfig,
    chart: &mut impl ChartSink,
    out: &mut impl Write,
) -> Result<Option<Vec<MonthlyEnergy>>> {
    let Some(records) = pvgis::extract_monthly(body)? else {
        writeln!(out, "{MISSING_DATA_MESSAGE}")?;
        warn!("PVGIS response has no outputs.monthly.fixed");
        return Ok(None);
    };

    writeln!(out, "{:>5} {:>13}", "Month", "Energy (kWh)")?;
    for r in &records {
        writeln!(out, "{:>5} {:>13.2}", r.month, r.e_m)?;
    }
    if let Some(total) = pvgis::yearly_total(body) {
        writeln!(out, "{:>5} {:>13.2}", "Year", total)?;
    }

    let categories: Vec<String> = records.iter().map(|r| r.month.to_string()).collect();
    let values: Vec<f64> = records.iter().map(|r| r.e_m).collect();
    let title = format!("PV Energy Production for ({}, {})", cfg.latitude, cfg.longitude);
    chart
        .bar_chart(&BarChart {
            title: &title,
            x_label: "Month",
            y_label: "Energy (kWh)",
            categories: &categories,
            values: &values,
        })
        .context("failed to save the monthly chart")?;

    Ok(Some(records))
}
