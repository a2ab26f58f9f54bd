//! # allocsim telemetry
//!
//! Logging and metrics for the generator and watch modes.

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
