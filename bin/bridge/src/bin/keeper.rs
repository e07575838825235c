//! Keeper loop: periodically finalizes every withdrawal whose challenge
//! period elapsed and persists the resulting state.

use bridge::{
    config::Config,
    load_state,
    metrics::{install_prometheus_exporter, Metrics},
    run_cycle, save_state,
};
use clap::Parser;
use std::time::Duration;
use tokio::time;
use tracing::{error, info};
use withdrawal::SystemClock;

#[derive(Parser)]
#[command(name = "keeper")]
#[command(about = "Finalize matured withdrawals on an interval")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Dry-run mode: log finalizations without executing them
    #[arg(long)]
    dry_run: bool,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_file(&cli.config)?;

    // Override dry_run from CLI flag
    if cli.dry_run {
        config.dry_run = true;
    }

    info!("Starting keeper");
    info!("  Network: {:?}", config.network);
    info!("  State: {}", config.state_path.display());
    info!("  Interval: {}s", config.keeper_interval_secs);
    if config.dry_run {
        info!("  Mode: DRY-RUN (no finalizations will be executed)");
    }

    if let Some(port) = config.metrics_port {
        install_prometheus_exporter(port)?;
        info!(port, "Prometheus exporter listening");
    }
    let metrics = Metrics::new();

    let bridge = load_state(&config, SystemClock::new())?;
    let mut interval = time::interval(Duration::from_secs(config.keeper_interval_secs.max(1)));

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }

        let report = run_cycle(&bridge, config.dry_run, &metrics);

        if !report.finalized.is_empty() {
            if let Err(e) = save_state(&bridge, &config.state_path) {
                error!("Failed to save bridge state: {}", e);
            }
        }

        if cli.once {
            break;
        }
    }

    Ok(())
}
