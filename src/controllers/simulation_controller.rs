use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, TimeDelta, TimeZone};
use chrono_tz::Tz;
use tracing::{info, warn};

use crate::config::SimulationConfig;
use crate::errors::ConfigError;
use crate::models::power::{DcOutput, ModelResults, PowerSeries};
use crate::models::weather::WeatherSample;
use crate::services::chart::{ChartSink, Line, LineChart};
use crate::services::clearsky;
use crate::services::model_chain::{ModelChain, PowerModel};

/// Runs the clear-sky day simulation and saves its chart.
pub fn run(cfg: &SimulationConfig, chart: &mut impl ChartSink, out: &mut impl Write) -> Result<PowerSeries> {
    let times = hourly_times(cfg.date, cfg.periods, cfg.site.timezone)?;
    let weather = clearsky::get_clearsky(&cfg.site, &times, cfg.model.linke_turbidity);
    let chain = ModelChain::new(cfg.site.clone(), cfg.array.clone(), cfg.model)
        .context("failed to build the model chain")?;

    info!(site = %cfg.site.name, date = %cfg.date, periods = cfg.periods, "running clear-sky simulation");
    simulate(&chain, &weather, chart, out)
}

/// `periods` hourly timestamps from local midnight of `date`.
pub fn hourly_times(date: NaiveDate, periods: usize, tz: Tz) -> Result<Vec<DateTime<FixedOffset>>, ConfigError> {
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| ConfigError::Invalid(format!("invalid date {date}")))?;
    let start = tz
        .from_local_datetime(&midnight)
        .earliest()
        .ok_or_else(|| ConfigError::Invalid(format!("{date} has no local midnight in {tz}")))?;

    Ok((0..periods as i64)
        .map(|h| (start.clone() + TimeDelta::hours(h)).fixed_offset())
        .collect())
}

pub fn simulate<M: PowerModel>(
    model: &M,
    weather: &[WeatherSample],
    chart: &mut impl ChartSink,
    out: &mut impl Write,
) -> Result<PowerSeries> {
    let results = model.run_model(weather).context("model run failed")?;

    dump_results(&results, out)?;
    let power = extract_power(&results, out)?;

    let ticks: Vec<String> = power.times.iter().map(|t| t.format("%H:%M").to_string()).collect();
    chart
        .line_chart(&LineChart {
            title: "Simulated Inverter Output",
            x_label: "Time",
            y_label: "Power (W)",
            x_ticks: &ticks,
            lines: vec![
                Line { name: "dc_power", values: &power.dc_power, dashed: true },
                Line { name: "ac_power", values: &power.ac_power, dashed: false },
            ],
        })
        .context("failed to save the simulation chart")?;

    Ok(power)
}

/// DC (`p_mp`) and AC power of a model run, zero-filled where the run produced none.
pub fn extract_power(results: &ModelResults, out: &mut impl Write) -> io::Result<PowerSeries> {
    let n = results.times.len();

    let dc_power = match results.dc.p_mp() {
        Some(p_mp) => p_mp,
        None => {
            writeln!(out, "Warning: 'p_mp' not found in model results. Using zeros instead.")?;
            warn!(keys = ?results.dc.keys(), "DC output has no p_mp, substituting a zero series");
            vec![0.0; n]
        }
    };

    let ac_power = match &results.ac {
        Some(ac) => ac.clone(),
        None => {
            warn!("model produced no AC result, substituting a zero series");
            vec![0.0; n]
        }
    };

    Ok(PowerSeries { times: results.times.clone(), dc_power, ac_power })
}

/// Prints the intermediate model tables.
fn dump_results(results: &ModelResults, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Solar Position:")?;
    writeln!(
        out,
        "{:<26} {:>9} {:>10} {:>9} {:>12} {:>16}",
        "time", "zenith", "elevation", "azimuth", "declination", "equation_of_time"
    )?;
    for (t, p) in results.times.iter().zip(&results.solar_position) {
        writeln!(
            out,
            "{:<26} {:>9.3} {:>10.3} {:>9.3} {:>12.3} {:>16.3}",
            t.to_rfc3339(), p.zenith, p.elevation, p.azimuth, p.declination, p.equation_of_time
        )?;
    }

    writeln!(out, "Irradiance:")?;
    writeln!(
        out,
        "{:<26} {:>10} {:>10} {:>11} {:>15} {:>18} {:>8} {:>12} {:>9}",
        "time", "poa_global", "poa_direct", "poa_diffuse", "poa_sky_diffuse", "poa_ground_diffuse", "aoi",
        "aoi_modifier", "effective"
    )?;
    for (row, t) in results.times.iter().enumerate() {
        let i = &results.irradiance[row];
        writeln!(
            out,
            "{:<26} {:>10.3} {:>10.3} {:>11.3} {:>15.3} {:>18.3} {:>8.3} {:>12.4} {:>9.3}",
            t.to_rfc3339(),
            i.poa_global,
            i.poa_direct,
            i.poa_diffuse,
            i.poa_sky_diffuse,
            i.poa_ground_diffuse,
            results.aoi[row],
            results.aoi_modifier[row],
            results.effective_irradiance[row]
        )?;
    }

    writeln!(out, "Cell Temperature:")?;
    for (t, c) in results.times.iter().zip(&results.cell_temperature) {
        writeln!(out, "{:<26} {:>8.3}", t.to_rfc3339(), c)?;
    }

    writeln!(out, "Available DC keys: {:?}", results.dc.keys())?;
    if let DcOutput::SingleDiode(curves) = &results.dc {
        writeln!(out, "{:<26} {:>8} {:>8} {:>8} {:>8} {:>9}", "time", "i_sc", "v_oc", "i_mp", "v_mp", "p_mp")?;
        for (t, c) in results.times.iter().zip(curves) {
            writeln!(
                out,
                "{:<26} {:>8.3} {:>8.3} {:>8.3} {:>8.3} {:>9.3}",
                t.to_rfc3339(), c.i_sc, c.v_oc, c.i_mp, c.v_mp, c.p_mp
            )?;
        }
    }
    Ok(())
}
