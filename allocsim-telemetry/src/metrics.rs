//! ## allocsim-telemetry::metrics
//! **Prometheus counters for the stream lifecycle**
//!
//! One counter per observable line class, plus the watch-side anomaly count.
//! There is no exporter endpoint; run modes gather the registry as text and
//! log it on shutdown.

use prometheus::{Counter, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub mallocs: Counter,
    pub frees: Counter,
    pub corruptions: Counter,
    pub collisions: Counter,
    pub anomalies: Counter,
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder {
    pub fn new() -> Self {
        let registry = Registry::new();
        let mallocs = Counter::new("allocsim_mallocs_total", "Allocate events emitted").unwrap();
        let frees = Counter::new("allocsim_frees_total", "Free events emitted").unwrap();
        let corruptions =
            Counter::new("allocsim_corruptions_total", "Corruption markers emitted").unwrap();
        let collisions = Counter::new(
            "allocsim_collisions_total",
            "Address collision retries (`used` lines)",
        )
        .unwrap();
        let anomalies = Counter::new(
            "allocsim_anomalies_total",
            "Stream anomalies observed in watch mode",
        )
        .unwrap();

        registry.register(Box::new(mallocs.clone())).unwrap();
        registry.register(Box::new(frees.clone())).unwrap();
        registry.register(Box::new(corruptions.clone())).unwrap();
        registry.register(Box::new(collisions.clone())).unwrap();
        registry.register(Box::new(anomalies.clone())).unwrap();

        Self {
            registry,
            mallocs,
            frees,
            corruptions,
            collisions,
            anomalies,
        }
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    pub fn inc_mallocs(&self) {
        self.mallocs.inc();
    }

    pub fn inc_frees(&self) {
        self.frees.inc();
    }

    pub fn inc_corruptions(&self) {
        self.corruptions.inc();
    }

    pub fn inc_collisions(&self) {
        self.collisions.inc();
    }

    pub fn inc_anomalies(&self) {
        self.anomalies.inc();
    }
}
