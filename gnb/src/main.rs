//! Albor Strict Frequency Reuse Cell
//!
//! Runs one LTE cell with the frequency reuse algorithm between a minimal RRC
//! and a round-robin MAC scheduler, driven TTI by TTI from scripted and
//! synthetic UE events.

mod cell;
mod config;
mod mobility;
mod rrc;
mod scheduler;

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use common::types::Direction;
use ffr::{FrAlgorithm, FrAlgorithmKind};
use interfaces::MeasId;

use cell::{Cell, CellEvent};
use config::{CellRuntimeConfig, ScheduledEvent, SimulationConfig};
use mobility::SyntheticUes;
use rrc::CellRrc;

/// Albor strict frequency reuse cell
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML or TOML)
    #[arg(short, long, default_value = "ffr_cell.yml")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Number of TTIs to run, overrides the configuration file
    #[arg(long)]
    ttis: Option<u32>,

    /// Reuse flavour (none, strict), overrides the configuration file
    #[arg(long)]
    algorithm: Option<String>,

    /// Pace TTIs on the wall clock
    #[arg(long)]
    realtime: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .init();

    info!("Starting Albor strict frequency reuse cell");
    info!("Configuration file: {}", args.config);

    let mut config = CellRuntimeConfig::from_file(&args.config)?;
    if let Some(ttis) = args.ttis {
        config.simulation.ttis = ttis;
    }
    if let Some(algorithm) = &args.algorithm {
        config.algorithm = match algorithm.as_str() {
            "none" => FrAlgorithmKind::None,
            "strict" => FrAlgorithmKind::Strict,
            other => return Err(anyhow::anyhow!("Invalid algorithm: {}", other)),
        };
    }
    config.simulation.realtime |= args.realtime;

    info!("Cell configuration:");
    info!("  Cell ID: {}", config.cell.cell_id);
    info!("  Algorithm: {:?}", config.algorithm);
    for direction in Direction::ALL {
        info!("  {} bandwidth: {} RBs", direction, config.cell.bandwidth_rbs(direction));
    }
    info!("  FR cell type: {}", config.cell.fr_cell_type);
    info!("  Edge subband threshold: {}", config.cell.edge_subband_threshold);

    // Build the algorithm and hook it to the RRC
    let rrc = Arc::new(CellRrc::new());
    let mut algorithm = FrAlgorithm::new(config.algorithm, config.cell.clone())?;
    algorithm.set_rrc_interface(rrc.clone());
    algorithm.initialize()?;
    let meas_id = rrc.ffr_meas_id().unwrap_or(MeasId(0));
    if let Some(report_config) = rrc.report_config(meas_id) {
        info!("  FFR measurement: {:?}", report_config);
    }

    let (tx, rx) = mpsc::channel(1024);
    let cell = Cell::new(algorithm, config.simulation.summary_interval_ttis);
    let cell_handle = tokio::spawn(cell.run(rx));

    let synthetic = config.synthetic_ues.as_ref().map(SyntheticUes::new);
    if let Some(ues) = &synthetic {
        info!("Synthetic UEs: {:?}", ues.rntis());
    }

    let driver = drive_cell(tx, config.ordered_events(), synthetic, config.simulation.clone(), meas_id);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
        result = driver => {
            result?;
        }
    }

    // The driver owns the only sender; the cell drains what was queued and stops
    let report = cell_handle.await??;
    info!(
        "Cell stopped after {} TTIs, {} PDSCH reconfigurations",
        report.ttis,
        rrc.pdsch_updates()
    );

    for rnti in &report.edge_ues {
        if let Some(pdsch) = rrc.pdsch_config(*rnti) {
            info!("  Edge UE {} PDSCH pa {} dB", rnti, pdsch.pa.as_db());
        }
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Feed scripted events, synthetic reports and TTI ticks to the cell
async fn drive_cell(
    tx: mpsc::Sender<CellEvent>,
    events: Vec<ScheduledEvent>,
    mut synthetic: Option<SyntheticUes>,
    simulation: SimulationConfig,
    meas_id: MeasId,
) -> Result<()> {
    let mut events = events.into_iter().peekable();
    let mut interval = simulation
        .realtime
        .then(|| tokio::time::interval(tokio::time::Duration::from_micros(simulation.tti_us.max(1))));

    for tti in 0..simulation.ttis {
        if let Some(interval) = interval.as_mut() {
            interval.tick().await;
        }

        let mut batch = Vec::new();
        while let Some(scheduled) = events.next_if(|e| e.at_tti <= tti) {
            batch.push(scheduled.event.to_cell_event(meas_id));
        }
        if let Some(ues) = synthetic.as_mut() {
            batch.extend(ues.reports_at(tti, meas_id));
        }
        batch.push(CellEvent::Tti(tti));

        for event in batch {
            if tx.send(event).await.is_err() {
                warn!("Cell stopped at TTI {}", tti);
                return Ok(());
            }
        }
    }

    let remaining = events.count();
    if remaining > 0 {
        warn!("{} scripted events scheduled after the last TTI were not delivered", remaining);
    }
    Ok(())
}
