use std::future::Future;
use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{debug, info};

use crate::errors::ModelError;
use crate::models::weather::WeatherSample;
use crate::services::model_chain::PowerModel;
use crate::services::weather_service::WeatherSource;

/// AC power (W) for one weather observation.
pub fn calculate_power<M: PowerModel>(model: &M, weather: &WeatherSample) -> Result<f64, ModelError> {
    let results = model.run_model(std::slice::from_ref(weather))?;
    results
        .ac
        .and_then(|ac| ac.first().copied())
        .ok_or(ModelError::NoAcOutput)
}

/// Polls `source` every `interval` and prints the AC power until `shutdown` resolves.
///
/// Shutdown wins over a pending fetch or sleep, so no model run starts after it fires.
/// Returns the number of completed iterations.
pub async fn run<S, M, W, F>(source: &S, model: &M, out: &mut W, interval: Duration, shutdown: F) -> Result<u64>
where
    S: WeatherSource,
    M: PowerModel,
    W: Write,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut ticks = 0u64;

    info!(interval_s = interval.as_secs(), "live polling started");
    loop {
        let weather = tokio::select! {
            biased;
            _ = &mut shutdown => break,
            weather = source.fetch_current() => weather.context("failed to fetch current weather")?,
        };

        let power = calculate_power(model, &weather).context("failed to compute AC power")?;
        writeln!(out, "{} | AC Power: {:.2} W", Local::now().format("%Y-%m-%d %H:%M:%S"), power)?;
        out.flush()?;
        ticks += 1;
        debug!(tick = ticks, weather_time = %weather.time, ghi = weather.ghi, ac = power, "live tick");

        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    writeln!(out, "\nStopped.")?;
    info!(ticks, "live polling stopped");
    Ok(ticks)
}
