//! ## allocsim-cli
//! **Command-line entrypoint**
//!
//! `allocsim generate` emits the synthetic allocator event stream on stdout;
//! `allocsim watch` consumes a stream on stdin and reports anomalies.

use clap::Parser;

use allocsim_telemetry::logging::EventLogger;
use allocsim_telemetry::metrics::MetricsRecorder;

mod commands;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    EventLogger::init();
    let metrics = MetricsRecorder::new();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => commands::run_generate(args, metrics).await,
        Commands::Watch => commands::run_watch(metrics).await,
    }
}
