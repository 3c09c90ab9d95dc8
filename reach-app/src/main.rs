mod app;
mod panel;
mod participant;
mod scene;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

pub use app::{App, SessionConfig};

/// Runs reach-and-point sessions with a simulated participant.
#[derive(Debug, Parser)]
#[command(name = "reach-app", version)]
struct Cli {
    /// Session config (JSON). Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides the configured seed.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Directory for trial logs, preferences and the session summary.
    #[arg(short, long, default_value = "reach-output")]
    output: PathBuf,

    /// Pace frames in real time instead of simulating them.
    #[arg(long)]
    realtime: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let mut config = match &cli.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("loading session config {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.experiment.seed = Some(seed);
    }
    config.realtime |= cli.realtime;

    let mut app = App::new(config, cli.output)?;
    let summary = app.run()?;
    log::info!(
        "session finished: {} trials over {} frames",
        summary.trials,
        summary.frames
    );

    Ok(())
}
