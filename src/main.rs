mod config;
mod controllers;
mod errors;
mod models;
mod services;
mod telemetry;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::Config;
use crate::controllers::{live_controller, monthly_controller, simulation_controller};
use crate::services::chart::SvgChart;
use crate::services::model_chain::ModelChain;
use crate::services::pvgis_service::PvgisClient;
use crate::services::weather_service::OpenMeteoClient;
use crate::telemetry::{init_tracing, shutdown_signal};

#[derive(Parser)]
#[command(name = "pv-yield", version, about = "Photovoltaic production estimates for a fixed site")]
struct Cli {
    /// JSON configuration file; built-in defaults are used when it does not exist
    #[arg(long, short, default_value = "config.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Clear-sky DC/AC simulation over one day, saved as a chart
    Simulate,
    /// Poll current weather and print instantaneous AC power until interrupted
    Live,
    /// Fetch PVGIS monthly expectations and plot them
    Monthly,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    // 1. Load configuration
    let config = Config::load(&cli.config).with_context(|| format!("failed to load {}", cli.config.display()))?;
    let mut stdout = std::io::stdout();

    // 2. Run the selected pipeline
    match cli.command {
        Command::Simulate => {
            let cfg = &config.simulation;
            let mut chart = SvgChart::new(&cfg.output);
            simulation_controller::run(cfg, &mut chart, &mut stdout)?;
            println!("Chart saved to {}", cfg.output.display());
        }
        Command::Live => {
            let cfg = &config.live;
            let source = OpenMeteoClient::new(&cfg.base_url, &cfg.site, Duration::from_secs(cfg.timeout_s))?;
            let chain = ModelChain::new(cfg.site.clone(), cfg.array.clone(), cfg.model)?;
            info!(site = %chain.site().name, "live mode");
            live_controller::run(
                &source,
                &chain,
                &mut stdout,
                Duration::from_secs(cfg.poll_interval_s),
                shutdown_signal(),
            )
            .await?;
        }
        Command::Monthly => {
            let cfg = &config.monthly;
            let client = PvgisClient::new(&cfg.base_url, Duration::from_secs(cfg.timeout_s))?;
            let mut chart = SvgChart::new(&cfg.output);
            if monthly_controller::run(&client, cfg, &mut chart, &mut stdout).await?.is_some() {
                println!("Chart saved to {}", cfg.output.display());
            }
        }
    }

    Ok(())
}
