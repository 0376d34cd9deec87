use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::evaluator::EvaluatorConfig;
use crate::matcher::MatchConfig;
use crate::normalizer::NormalizerConfig;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub matching: MatchConfig,
    pub evaluator: EvaluatorConfig,
    pub normalizer: NormalizerConfig,
    pub sources: SourcesConfig,
    pub annotation: AnnotationConfig,
}

/// Locations of the raw market dumps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub kalshi_path: PathBuf,
    pub polymarket_path: PathBuf,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            kalshi_path: PathBuf::from("data/kalshi_markets.json"),
            polymarket_path: PathBuf::from("data/polymarket_markets.json"),
        }
    }
}

/// Commentary attached to opportunities after a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    pub enabled: bool,
    pub timeout_ms: u64,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: 2_000,
        }
    }
}

impl AnnotationConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl EngineConfig {
    /// Checks cross-field consistency after loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.matching.validate().map_err(ConfigError::Invalid)?;
        self.evaluator.validate().map_err(ConfigError::Invalid)?;
        self.normalizer.validate().map_err(ConfigError::Invalid)?;
        if self.annotation.enabled && self.annotation.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "annotation.timeout_ms must be positive when annotation is enabled".to_string(),
            ));
        }
        Ok(())
    }
}
