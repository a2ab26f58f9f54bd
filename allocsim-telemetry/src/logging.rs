//! ## allocsim-telemetry::logging
//! **Structured logging with `tracing`**
//!
//! Logs go to stderr: stdout carries the event stream and must stay
//! machine-parseable. Filtering follows `RUST_LOG`, defaulting to `info`.

use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    pub fn init() {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(std::io::stderr)
            .init()
    }
}
