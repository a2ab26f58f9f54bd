//! Emission pacing models.
//!
//! The generator pauses once after every allocate or free line; collision
//! retries and corruption markers are not paced. Pacing is a trait so tests
//! and replay-speed runs can drop the delay entirely.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

/// Trait for pacing models controlling the delay after an emission.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self);
}

/// Fixed wall-clock pacing.
#[derive(Debug, Clone, Copy)]
pub struct FixedPacer {
    delay: Duration,
}

impl FixedPacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }
}

#[async_trait]
impl Pacer for FixedPacer {
    async fn pause(&self) {
        sleep(self.delay).await;
    }
}

/// No-op pacing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPacer;

#[async_trait]
impl Pacer for NoopPacer {
    async fn pause(&self) {}
}
