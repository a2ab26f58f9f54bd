//! Run-mode entry points tying configuration, generator, tracker, and
//! telemetry together.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::signal;
use tracing::{debug, info, instrument, warn};

use allocsim_config::GeneratorConfig;
use allocsim_core::AllocEvent;
use allocsim_telemetry::MetricsRecorder;
use allocsim_wire::{parse_line, Line};

use crate::error::EngineError;
use crate::generator::Generator;
use crate::pacing::FixedPacer;
use crate::tracker::StreamTracker;

/// Runs the generator against `out` until the iteration budget is exhausted
/// (0 = until ctrl-c). For bounded runs the BLAKE3 digest of the emitted
/// bytes is logged and, when `expect_digest` is given, verified.
#[instrument(skip_all, fields(iterations = iterations, seed = ?config.seed))]
pub async fn run_generate_mode<W>(
    config: GeneratorConfig,
    out: W,
    iterations: u64,
    expect_digest: Option<&str>,
    metrics: MetricsRecorder,
) -> Result<(), EngineError>
where
    W: Write + Send,
{
    let pacer = FixedPacer::from_millis(config.cadence_ms);
    let mut generator = Generator::new(config, out, Box::new(pacer), metrics.clone());

    let digest = tokio::select! {
        result = generator.run(iterations) => result?,
        _ = signal::ctrl_c() => {
            info!("interrupted, stopping stream");
            return Ok(());
        }
    };

    info!(digest = %digest, "stream complete");
    if let Some(expected) = expect_digest {
        if digest != expected {
            return Err(EngineError::DigestMismatch {
                expected: expected.to_string(),
                actual: digest,
            });
        }
        info!("digest verified");
    }
    if let Ok(report) = metrics.gather_metrics() {
        debug!(metrics = %report, "final metrics");
    }
    Ok(())
}

/// What watch mode observed over a whole stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WatchSummary {
    pub events: u64,
    pub collisions: u64,
    pub anomalies: u64,
    pub skipped_lines: u64,
    pub live_chunks: usize,
}

/// Feeds lines from `input` through the parser into a [`StreamTracker`],
/// logging every anomaly, until the stream ends.
#[instrument(skip_all)]
pub async fn run_watch_mode<R>(
    input: R,
    metrics: MetricsRecorder,
) -> Result<WatchSummary, EngineError>
where
    R: AsyncBufRead + Unpin,
{
    let mut tracker = StreamTracker::new();
    let mut summary = WatchSummary::default();
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Ok(Line::Collision) => {
                summary.collisions += 1;
                metrics.inc_collisions();
            }
            Ok(Line::Event(event)) => {
                summary.events += 1;
                match &event {
                    AllocEvent::Malloc { .. } => metrics.inc_mallocs(),
                    AllocEvent::Free { .. } => metrics.inc_frees(),
                    AllocEvent::Corrupt { .. } => metrics.inc_corruptions(),
                }
                if let Some(anomaly) = tracker.apply(&event) {
                    summary.anomalies += 1;
                    metrics.inc_anomalies();
                    warn!(line = %event, kind = %anomaly, "stream anomaly");
                }
            }
            Err(err) => {
                summary.skipped_lines += 1;
                debug!(%err, line = %line, "skipping unparseable line");
            }
        }
    }

    summary.live_chunks = tracker.live_len();
    info!(
        events = summary.events,
        anomalies = summary.anomalies,
        live_chunks = summary.live_chunks,
        "stream ended"
    );
    Ok(summary)
}
