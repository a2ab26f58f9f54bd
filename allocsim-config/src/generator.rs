//! Generator configuration parameters.
//!
//! The defaults reproduce the reference stream exactly: 200 000-address
//! space, sizes 16..=1024, free threshold 24, corruption modulus 24, 100 ms
//! cadence. Overriding any of them changes the stream, not the line format.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Event generator parameters.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq, Eq)]
#[validate(schema(function = validation::validate_generator))]
pub struct GeneratorConfig {
    /// RNG seed. `None` seeds from OS entropy; `Some` makes the full output
    /// byte-for-byte reproducible.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Pause after each allocate/free emission, in milliseconds.
    #[serde(default = "default_cadence_ms")]
    #[validate(range(min = 1, max = 60000))]
    pub cadence_ms: u64,

    /// Address candidates are drawn uniformly from `[0, address_space)`.
    #[serde(default = "default_address_space")]
    #[validate(range(min = 1))]
    pub address_space: u64,

    /// Inclusive lower bound for allocation sizes.
    #[serde(default = "default_size_min")]
    #[validate(range(min = 1))]
    pub size_min: u64,

    /// Inclusive upper bound for allocation sizes.
    #[serde(default = "default_size_max")]
    pub size_max: u64,

    /// A free is emitted once this many addresses are live.
    #[serde(default = "default_live_threshold")]
    #[validate(range(min = 1))]
    pub live_threshold: usize,

    /// A corruption marker follows a free with probability `1/corrupt_modulus`.
    #[serde(default = "default_corrupt_modulus")]
    #[validate(range(min = 2))]
    pub corrupt_modulus: u32,
}

fn default_cadence_ms() -> u64 {
    100
}

fn default_address_space() -> u64 {
    200_000
}

fn default_size_min() -> u64 {
    16
}

fn default_size_max() -> u64 {
    1024
}

fn default_live_threshold() -> usize {
    24
}

fn default_corrupt_modulus() -> u32 {
    24
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            cadence_ms: default_cadence_ms(),
            address_space: default_address_space(),
            size_min: default_size_min(),
            size_max: default_size_max(),
            live_threshold: default_live_threshold(),
            corrupt_modulus: default_corrupt_modulus(),
        }
    }
}
