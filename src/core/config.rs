// src/core/config.rs
use crate::core::errors::{NaiveBayesError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How local classification work is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    Sequential,
    Parallel,
}

/// What the dispatcher does when an offloaded work unit fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffloadFailurePolicy {
    /// Fail the whole classification pass with the unit's error.
    Abort,
    /// Re-evaluate the failed unit with the local evaluator.
    FallbackLocal,
}

/// Configuration for training and classification.
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// num_classes = 26
/// num_features = 784
/// epsilon = 0.05
/// backend = "parallel"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NaiveBayesConfig {
    pub num_classes: usize,
    pub num_features: usize,
    /// Additive variance regularizer used at classification time.
    pub epsilon: f64,
    /// Number of work units a dataset is split into.
    pub work_units: usize,
    /// Granularity that unit sizes are rounded up to.
    pub chunk_alignment: usize,
    /// Granularity that offloaded feature rows are padded to.
    pub feature_alignment: usize,
    pub backend: Backend,
    /// Size of the worker pool; `None` uses rayon's global pool.
    pub threads: Option<usize>,
    pub parallel_training: bool,
    pub offload_failure: OffloadFailurePolicy,
}

impl Default for NaiveBayesConfig {
    fn default() -> Self {
        NaiveBayesConfig {
            num_classes: 2,
            num_features: 1,
            epsilon: 0.05,
            work_units: 8,
            chunk_alignment: 8,
            feature_alignment: 16,
            backend: Backend::Parallel,
            threads: None,
            parallel_training: false,
            offload_failure: OffloadFailurePolicy::Abort,
        }
    }
}

impl NaiveBayesConfig {
    pub fn new(num_classes: usize, num_features: usize) -> Self {
        NaiveBayesConfig {
            num_classes,
            num_features,
            ..Default::default()
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: NaiveBayesConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_classes == 0 {
            return Err(NaiveBayesError::InvalidParameter(
                "num_classes must be positive.".to_string(),
            ));
        }
        if self.num_features == 0 {
            return Err(NaiveBayesError::InvalidParameter(
                "num_features must be positive.".to_string(),
            ));
        }
        validate_epsilon(self.epsilon)?;
        if self.work_units == 0 {
            return Err(NaiveBayesError::InvalidParameter(
                "work_units must be positive.".to_string(),
            ));
        }
        if self.chunk_alignment == 0 || self.feature_alignment == 0 {
            return Err(NaiveBayesError::InvalidParameter(
                "Alignments must be positive.".to_string(),
            ));
        }
        if self.threads == Some(0) {
            return Err(NaiveBayesError::InvalidParameter(
                "threads must be positive when set.".to_string(),
            ));
        }
        Ok(())
    }
}

/// Rejects negative, NaN and infinite epsilon values.
pub fn validate_epsilon(epsilon: f64) -> Result<()> {
    if !epsilon.is_finite() || epsilon < 0.0 {
        return Err(NaiveBayesError::InvalidParameter(format!(
            "epsilon must be a finite, non-negative number, got {}.",
            epsilon
        )));
    }
    Ok(())
}
