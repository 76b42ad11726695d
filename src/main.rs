//! ReFlow - Wastewater Treatment Digital Twin
//!
//! Runs the plant engine and serves its operator API.
//!
//! # Usage
//!
//! ```bash
//! # Run with defaults (listens on 0.0.0.0:8080)
//! cargo run --release
//!
//! # Reproducible run with a fixed seed, simulation auto-started
//! cargo run --release -- --seed 42 --autostart
//!
//! # Jump straight into a scenario
//! cargo run --release -- --autostart --scenario tutorial
//! ```
//!
//! # Environment Variables
//!
//! - `REFLOW_CONFIG`: Path to a plant_config.toml overriding defaults
//! - `REFLOW_CORS_ORIGINS`: Comma-separated CORS origins for development
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use reflow::api::{create_app, ApiState};
use reflow::config::{self, PlantConfig};
use reflow::engine::{PlantEngine, SimOptions};
use reflow::scenario::FileProgress;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "reflow")]
#[command(about = "ReFlow Wastewater Treatment Digital Twin")]
#[command(version)]
struct CliArgs {
    /// Override the server address (default from config, "0.0.0.0:8080")
    #[arg(short, long)]
    addr: Option<String>,

    /// Override the tick period in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Fixed RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Start the process simulation immediately
    #[arg(long)]
    autostart: bool,

    /// Start this scenario immediately (implies the simulation is useful)
    #[arg(long)]
    scenario: Option<String>,
}

// ============================================================================
// Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = CliArgs::parse();

    let mut cfg = PlantConfig::load();
    if let Some(tick_ms) = args.tick_ms {
        cfg.simulation.tick_ms = tick_ms;
    }
    if let Some(seed) = args.seed {
        cfg.simulation.seed = Some(seed);
    }
    if let Some(addr) = args.addr.clone() {
        cfg.server.listen_addr = addr;
    }
    config::init(cfg);
    let cfg = config::get();

    info!(plant = %cfg.plant.name, "ReFlow starting");

    // Engine task
    let cancel = CancellationToken::new();
    let store = Box::new(FileProgress::new(cfg.progress.path.clone()));
    let (engine, handle) = PlantEngine::new(
        SimOptions::from_config(cfg),
        store,
        std::time::Duration::from_millis(cfg.simulation.tick_ms),
        cancel.clone(),
    );
    let engine_task = tokio::spawn(engine.run());

    if args.autostart {
        handle.start_simulation().await?;
    }
    if let Some(id) = &args.scenario {
        match handle.start_scenario(id).await? {
            Ok(()) => info!(scenario = %id, "Scenario auto-started"),
            Err(e) => warn!(error = %e, "Could not auto-start scenario"),
        }
    }

    // API server
    let state = ApiState {
        engine: handle.clone(),
        plant_name: cfg.plant.name.clone(),
    };
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&cfg.server.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", cfg.server.listen_addr))?;
    info!(addr = %cfg.server.listen_addr, "API server listening");

    let shutdown_cancel = cancel.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Ctrl-C received — shutting down");
                    shutdown_cancel.cancel();
                }
                _ = shutdown_cancel.cancelled() => {}
            }
        })
        .await
        .context("API server error")?;

    cancel.cancel();
    engine_task.await.context("Engine task panicked")?;
    info!("ReFlow stopped");
    Ok(())
}
