#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the vaccination coverage map.
//!
//! Loads both datasets, then prints render instructions, series or a whole
//! playback run as JSON for a renderer (or a human) to consume.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use vaxmap_metrics::aggregate_all;
use vaxmap_metrics_models::{RegionId, SelectedMetrics, Year};
use vaxmap_session::{AppConfig, LoadState, Session, UiCommand, initialize, run_event_loop};
use vaxmap_view::Pin;

#[derive(Parser)]
#[command(name = "vaxmap", about = "Vaccination coverage and incidence world map")]
struct Cli {
    /// Config file (overrides `VAXMAP_CONFIG`, defaults to `vaxmap.toml`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the render instructions for one year
    Frame {
        /// Year to render
        #[arg(long)]
        year: Year,
        /// Comma-separated metrics to colour by (e.g. "coverage,incidents")
        #[arg(long)]
        metrics: Option<SelectedMetrics>,
        /// Region id to include detail for
        #[arg(long)]
        pin: Option<RegionId>,
    },
    /// Print the global trend series
    Series,
    /// Print one region's per-year series
    Region {
        /// Region id (ISO 3166-1 numeric)
        id: RegionId,
    },
    /// Play through the years, printing one JSON frame per line
    Play {
        /// Year to start from
        #[arg(long)]
        from: Option<Year>,
    },
}

async fn load(config: &AppConfig) -> Result<Session, Box<dyn std::error::Error>> {
    match initialize(config).await {
        LoadState::Ready(session) => Ok(*session),
        LoadState::Failed(message) => Err(message.into()),
        LoadState::Loading => Err("datasets did not finish loading".into()),
    }
}

async fn play(session: Session, from: Option<Year>) -> Result<(), Box<dyn std::error::Error>> {
    let (commands, command_rx) = mpsc::channel(4);
    let (frame_tx, mut frames) = mpsc::channel(16);

    if let Some(year) = from {
        commands.send(UiCommand::slider(year.to_string())).await?;
    }
    commands.send(UiCommand::Play).await?;
    drop(commands);

    let print = async move {
        while let Some(frame) = frames.recv().await {
            println!("{}", serde_json::to_string(&frame)?);
        }
        Ok::<_, serde_json::Error>(())
    };

    let (session, printed) = tokio::join!(run_event_loop(session, command_rx, frame_tx), print);
    printed?;

    log::info!(
        "Playback ended at {} ({})",
        session.state().current_year,
        session.state().status
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = AppConfig::load(&AppConfig::resolve_path(cli.config))?;
    let session = load(&config).await?;

    match cli.command {
        Commands::Frame { year, metrics, pin } => {
            let metrics = metrics.unwrap_or_else(|| session.selected().clone());
            let frame = session.view().sync(year, &metrics, pin.map(Pin::from));
            println!("{}", serde_json::to_string_pretty(&frame)?);
        }
        Commands::Series => {
            let series = aggregate_all(session.view().index().records());
            println!("{}", serde_json::to_string_pretty(&series)?);
        }
        Commands::Region { id } => {
            let series = session.view().index().region_series(id);
            if series.is_empty() {
                log::warn!("No records for region {id}");
            }
            println!("{}", serde_json::to_string_pretty(&series)?);
        }
        Commands::Play { from } => play(session, from).await?,
    }

    Ok(())
}
