//! # allocsim-engine
//!
//! The generator loop that produces the allocator event stream, the pacing
//! models that throttle it, and the tracker that rebuilds allocator state on
//! the consuming side.

pub mod error;
pub mod generator;
pub mod pacing;
pub mod runtime;
pub mod tracker;

pub use error::EngineError;
pub use generator::Generator;
pub use pacing::{FixedPacer, NoopPacer, Pacer};
pub use runtime::{run_generate_mode, run_watch_mode, WatchSummary};
pub use tracker::{Anomaly, Chunk, ChunkState, StreamTracker};
