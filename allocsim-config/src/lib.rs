//! # allocsim configuration system
//!
//! Layered configuration for the stream generator, validated on load.
//!
//! Hierarchy:
//! 1. Built-in defaults (the reference stream parameters)
//! 2. `config/allocsim.yaml`, when present
//! 3. `ALLOCSIM_*` environment variables (`__` separates nesting levels)

#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod error;
mod generator;
mod validation;

pub use error::ConfigError;
pub use generator::GeneratorConfig;

const DEFAULT_CONFIG_FILE: &str = "config/allocsim.yaml";
const ENV_PREFIX: &str = "ALLOCSIM_";

/// Top-level configuration container.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone, PartialEq, Eq)]
pub struct AllocsimConfig {
    /// Event generator parameters.
    #[validate(nested)]
    pub generator: GeneratorConfig,
}

impl AllocsimConfig {
    /// Load configuration from the default file (if any) and environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(AllocsimConfig::default()));

        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            figment = figment.merge(Yaml::file(DEFAULT_CONFIG_FILE));
        }

        let config: Self = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific path, still honoring environment
    /// overrides.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        let config: Self = Figment::from(Serialized::defaults(AllocsimConfig::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Re-run validation after programmatic overrides (CLI flags).
    pub fn ensure_valid(&self) -> Result<(), ConfigError> {
        self.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_reference_stream() {
        let config = AllocsimConfig::default();
        config.validate().expect("default config should validate");

        assert_eq!(config.generator.seed, None);
        assert_eq!(config.generator.cadence_ms, 100);
        assert_eq!(config.generator.address_space, 200_000);
        assert_eq!(config.generator.size_min, 16);
        assert_eq!(config.generator.size_max, 1024);
        assert_eq!(config.generator.live_threshold, 24);
        assert_eq!(config.generator.corrupt_modulus, 24);
    }

    #[test]
    fn inverted_size_range_is_rejected() {
        let config = AllocsimConfig {
            generator: GeneratorConfig {
                size_min: 2048,
                size_max: 1024,
                ..GeneratorConfig::default()
            },
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn address_space_below_threshold_is_rejected() {
        let config = AllocsimConfig {
            generator: GeneratorConfig {
                address_space: 10,
                live_threshold: 24,
                ..GeneratorConfig::default()
            },
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn environment_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("ALLOCSIM_GENERATOR__LIVE_THRESHOLD", "8");
            jail.set_env("ALLOCSIM_GENERATOR__SEED", "42");

            let config = AllocsimConfig::load().expect("load should succeed");
            assert_eq!(config.generator.live_threshold, 8);
            assert_eq!(config.generator.seed, Some(42));
            Ok(())
        });
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "generator.yaml",
                r#"
generator:
  seed: 7
  cadence_ms: 10
  live_threshold: 4
"#,
            )?;

            let config =
                AllocsimConfig::load_from_path("generator.yaml").expect("load should succeed");
            assert_eq!(config.generator.seed, Some(7));
            assert_eq!(config.generator.cadence_ms, 10);
            assert_eq!(config.generator.live_threshold, 4);
            // untouched fields keep their defaults
            assert_eq!(config.generator.address_space, 200_000);
            Ok(())
        });
    }

    #[test]
    fn missing_file_reports_path() {
        let err = AllocsimConfig::load_from_path("does/not/exist.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }
}
