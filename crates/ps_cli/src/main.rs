//! Scoreboard CLI
//!
//! Replays recorded sensor event scripts through a scoring session and
//! prints every broadcast update, which makes match flows reproducible off
//! the court.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ps_core::{
    process_command_json, BroadcastUpdate, ChannelBroadcaster, CommandError, SensorEvent, Session,
};

#[derive(Parser)]
#[command(name = "ps_cli")]
#[command(version = ps_core::VERSION)]
#[command(about = "Replay sensor scripts against the padel scoring engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON array of sensor events through a fresh session
    Replay {
        /// Input script path (JSON array of sensor events)
        #[arg(long)]
        script: PathBuf,

        /// Print every broadcast update, not just the final snapshot
        #[arg(long, default_value = "false")]
        verbose: bool,
    },

    /// Run JSON commands from stdin against a fresh session, one per line
    Exec,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay { script, verbose } => replay(&script, verbose),
        Commands::Exec => run_commands(),
    }
}

fn replay(script: &PathBuf, verbose: bool) -> Result<()> {
    let raw = fs::read_to_string(script)
        .with_context(|| format!("failed to read script {}", script.display()))?;
    let events: Vec<SensorEvent> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse sensor events from {}", script.display()))?;

    let mut broadcaster = ChannelBroadcaster::new();
    let rx = broadcaster.subscribe();
    let mut session = Session::new(Box::new(broadcaster));

    println!("▶ Replaying {} events from {}", events.len(), script.display());

    let mut debounced = 0usize;
    for event in events {
        match session.handle_sensor_event(event) {
            Ok(()) => {}
            Err(CommandError::Debounced) => debounced += 1,
            Err(error) => eprintln!("   event rejected: {error}"),
        }
        if verbose {
            while let Ok(update) = rx.try_recv() {
                print_update(&update)?;
            }
        }
    }
    drop(rx);

    println!("   Debounced: {debounced}");
    println!("   Phase:     {:?}", session.phase());
    println!("Final state:");
    println!("{}", serde_json::to_string_pretty(&session.state().snapshot())?);

    if let Some(summary) = session.match_data() {
        println!("Match result:");
        println!("{}", serde_json::to_string_pretty(summary)?);
    }
    Ok(())
}

fn print_update(update: &BroadcastUpdate) -> Result<()> {
    println!("   {}", serde_json::to_string(update)?);
    Ok(())
}

fn run_commands() -> Result<()> {
    let mut session = Session::headless();
    for line in std::io::stdin().lines() {
        let line = line.context("failed to read command line")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        println!("{}", process_command_json(&mut session, line));
    }
    Ok(())
}
