//! ## allocsim-engine::generator
//! **The event generator loop**
//!
//! Produces an endless, paced sequence of allocator events. Per iteration:
//! draw an address candidate; on collision with a live allocation emit the
//! `used` diagnostic and redraw (no pause, no threshold check); otherwise
//! emit an allocate, pause, and once the live set has reached its threshold
//! free the first live address, pause, and with probability
//! `1/corrupt_modulus` emit a corruption marker (no pause).
//!
//! Every line is flushed as soon as it is written, and folded into a running
//! BLAKE3 digest so bounded seeded runs can be verified byte-for-byte.

use std::io::Write;

use blake3::Hasher;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use allocsim_config::GeneratorConfig;
use allocsim_core::events::COLLISION_LINE;
use allocsim_core::{AllocEvent, LiveSet};
use allocsim_telemetry::MetricsRecorder;

use crate::error::EngineError;
use crate::pacing::Pacer;

/// The corruption draw fires when `random_range(0..corrupt_modulus)` lands
/// on this value.
const CORRUPT_DRAW: u32 = 1;

/// Owns the live-address set, the RNG, and the output stream, and emits the
/// event lines.
pub struct Generator<W: Write + Send> {
    config: GeneratorConfig,
    live: LiveSet,
    rng: SmallRng,
    out: W,
    pacer: Box<dyn Pacer>,
    digest: Hasher,
    metrics: MetricsRecorder,
}

impl<W: Write + Send> Generator<W> {
    pub fn new(
        config: GeneratorConfig,
        out: W,
        pacer: Box<dyn Pacer>,
        metrics: MetricsRecorder,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_rng(&mut rand::rng()),
        };
        Self {
            config,
            live: LiveSet::new(),
            rng,
            out,
            pacer,
            digest: Hasher::new(),
            metrics,
        }
    }

    /// Writes one line, flushes it, and folds it into the digest. A failed
    /// write (closed pipe) aborts the run.
    fn emit_line(&mut self, line: &str) -> Result<(), EngineError> {
        self.out.write_all(line.as_bytes())?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        self.digest.update(line.as_bytes());
        self.digest.update(b"\n");
        Ok(())
    }

    /// One full generator iteration.
    pub async fn step(&mut self) -> Result<(), EngineError> {
        let addr = loop {
            let candidate = self.rng.random_range(0..self.config.address_space);
            if self.live.contains(candidate) {
                self.emit_line(COLLISION_LINE)?;
                self.metrics.inc_collisions();
                continue;
            }
            break candidate;
        };

        let size = self
            .rng
            .random_range(self.config.size_min..=self.config.size_max);
        self.emit_line(&AllocEvent::malloc(addr, size).to_string())?;
        self.live.insert(addr);
        self.metrics.inc_mallocs();
        self.pacer.pause().await;

        if self.live.len() < self.config.live_threshold {
            return Ok(());
        }

        if let Some(freed) = self.live.take_first() {
            self.emit_line(&AllocEvent::free(freed).to_string())?;
            self.metrics.inc_frees();
            self.pacer.pause().await;

            if self.rng.random_range(0..self.config.corrupt_modulus) == CORRUPT_DRAW {
                let marker = self.rng.random_range(0..self.config.address_space);
                self.emit_line(&AllocEvent::Corrupt { addr: marker }.to_string())?;
                self.metrics.inc_corruptions();
            }
        }

        Ok(())
    }

    /// Runs for `iterations` steps (0 = until cancelled or the output pipe
    /// closes) and returns the hex digest of everything emitted.
    pub async fn run(&mut self, iterations: u64) -> Result<String, EngineError> {
        if iterations == 0 {
            loop {
                self.step().await?;
            }
        }
        for _ in 0..iterations {
            self.step().await?;
        }
        Ok(self.digest_hex())
    }

    /// Hex BLAKE3 digest of every byte emitted so far.
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest.finalize().as_bytes())
    }

    pub fn live_len(&self) -> usize {
        self.live.len()
    }

    pub fn output(&self) -> &W {
        &self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allocsim_wire::{parse_line, Line};
    use std::collections::BTreeSet;

    fn seeded_config(seed: u64) -> GeneratorConfig {
        GeneratorConfig {
            seed: Some(seed),
            ..GeneratorConfig::default()
        }
    }

    fn seeded_generator(config: GeneratorConfig) -> Generator<Vec<u8>> {
        Generator::new(
            config,
            Vec::new(),
            Box::new(crate::pacing::NoopPacer),
            MetricsRecorder::new(),
        )
    }

    async fn run_to_string(config: GeneratorConfig, iterations: u64) -> (String, String) {
        let mut generator = seeded_generator(config);
        let digest = generator.run(iterations).await.unwrap();
        let output = String::from_utf8(generator.output().clone()).unwrap();
        (output, digest)
    }

    #[tokio::test]
    async fn seeded_runs_are_byte_identical() {
        let (first, first_digest) = run_to_string(seeded_config(42), 400).await;
        let (second, second_digest) = run_to_string(seeded_config(42), 400).await;
        assert_eq!(first, second);
        assert_eq!(first_digest, second_digest);
    }

    #[tokio::test]
    async fn different_seeds_diverge() {
        let (first, _) = run_to_string(seeded_config(1), 100).await;
        let (second, _) = run_to_string(seeded_config(2), 100).await;
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn digest_covers_exactly_the_emitted_bytes() {
        let (output, digest) = run_to_string(seeded_config(9), 200).await;
        let expected = hex::encode(blake3::hash(output.as_bytes()).as_bytes());
        assert_eq!(digest, expected);
    }

    #[tokio::test]
    async fn malloc_fields_stay_in_bounds() {
        let (output, _) = run_to_string(seeded_config(7), 2000).await;
        let mut mallocs = 0;
        for line in output.lines() {
            if let Line::Event(AllocEvent::Malloc { addr, size, .. }) = parse_line(line).unwrap() {
                assert!(addr < 200_000, "address {addr} out of range");
                assert!((16..=1024).contains(&size), "size {size} out of range");
                mallocs += 1;
            }
        }
        assert_eq!(mallocs, 2000);
    }

    #[tokio::test]
    async fn frees_target_live_addresses_and_leave_threshold_minus_one() {
        let (output, _) = run_to_string(seeded_config(23), 3000).await;
        let mut mirror = BTreeSet::new();
        for line in output.lines() {
            match parse_line(line).unwrap() {
                Line::Event(AllocEvent::Malloc { addr, .. }) => {
                    assert!(mirror.insert(addr), "duplicate live address {addr:x}");
                }
                Line::Event(AllocEvent::Free { addr, .. }) => {
                    assert!(mirror.remove(&addr), "freed address {addr:x} was not live");
                    assert_eq!(mirror.len(), 23);
                }
                Line::Event(AllocEvent::Corrupt { .. }) | Line::Collision => {}
            }
        }
    }

    #[tokio::test]
    async fn corruption_rate_approximates_one_in_modulus() {
        let (output, _) = run_to_string(seeded_config(11), 6000).await;
        let mut frees = 0u64;
        let mut corruptions = 0u64;
        for line in output.lines() {
            match parse_line(line).unwrap() {
                Line::Event(AllocEvent::Free { .. }) => frees += 1,
                Line::Event(AllocEvent::Corrupt { .. }) => corruptions += 1,
                _ => {}
            }
        }
        assert!(frees > 5000);
        let rate = corruptions as f64 / frees as f64;
        assert!(
            (rate - 1.0 / 24.0).abs() < 0.015,
            "corruption rate {rate} too far from 1/24"
        );
    }

    #[tokio::test]
    async fn collisions_emit_used_and_preserve_uniqueness() {
        let config = GeneratorConfig {
            seed: Some(5),
            address_space: 8,
            size_min: 1,
            size_max: 8,
            live_threshold: 4,
            ..GeneratorConfig::default()
        };
        let (output, _) = run_to_string(config, 200).await;
        assert!(
            output.lines().any(|line| line == "used"),
            "expected collision retries in a tiny address space"
        );

        let mut mirror = BTreeSet::new();
        for line in output.lines() {
            match parse_line(line).unwrap() {
                Line::Event(AllocEvent::Malloc { addr, .. }) => {
                    assert!(mirror.insert(addr));
                }
                Line::Event(AllocEvent::Free { addr, .. }) => {
                    assert!(mirror.remove(&addr));
                }
                _ => {}
            }
        }
    }

    #[tokio::test]
    async fn live_set_stays_below_threshold_after_each_step() {
        let mut generator = seeded_generator(seeded_config(3));
        for _ in 0..100 {
            generator.step().await.unwrap();
            assert!(generator.live_len() < 24);
        }
    }
}
