use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use allocsim_config::AllocsimConfig;
use allocsim_engine::{run_generate_mode, run_watch_mode};
use allocsim_telemetry::metrics::MetricsRecorder;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Emit a synthetic allocator event stream on stdout
    Generate(GenerateArgs),
    /// Consume an event stream on stdin and report anomalies
    Watch,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Configuration file overriding the built-in defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Seed for a fully reproducible stream
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of iterations to run (0 = run until interrupted)
    #[arg(long, default_value_t = 0)]
    pub iterations: u64,

    /// Pause after each allocate/free emission, in milliseconds
    #[arg(long)]
    pub cadence_ms: Option<u64>,

    /// Expected BLAKE3 digest of the emitted bytes (bounded runs only)
    #[arg(long)]
    pub expect_digest: Option<String>,
}

fn load_config(path: Option<&PathBuf>) -> Result<AllocsimConfig, allocsim_config::ConfigError> {
    match path {
        Some(path) => AllocsimConfig::load_from_path(path),
        None => AllocsimConfig::load(),
    }
}

pub async fn run_generate(
    args: GenerateArgs,
    metrics: MetricsRecorder,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut config = load_config(args.config.as_ref())?;
    if args.seed.is_some() {
        config.generator.seed = args.seed;
    }
    if let Some(cadence_ms) = args.cadence_ms {
        config.generator.cadence_ms = cadence_ms;
    }
    config.ensure_valid()?;

    run_generate_mode(
        config.generator,
        std::io::stdout(),
        args.iterations,
        args.expect_digest.as_deref(),
        metrics,
    )
    .await?;
    Ok(())
}

pub async fn run_watch(
    metrics: MetricsRecorder,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let summary = run_watch_mode(stdin, metrics).await?;
    info!(
        events = summary.events,
        collisions = summary.collisions,
        anomalies = summary.anomalies,
        skipped = summary.skipped_lines,
        live_chunks = summary.live_chunks,
        "watch summary"
    );
    Ok(())
}
