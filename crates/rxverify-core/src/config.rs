//! Pipeline tuning knobs.
//!
//! Every field has a default, so an empty TOML document (or
//! `PipelineConfig::default()`) yields a working pipeline.
//!
//! ```toml
//! extraction_max_tokens = 300
//! interaction_max_tokens = 200
//! dosage_max_tokens = 250
//! alternatives_max_tokens = 300
//! alternatives_limit = 3
//! polypharmacy_threshold = 5
//! fallback_confidence = 0.8
//! default_confidence = 0.8
//! oracle_concurrency = 4
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use rxverify_contracts::error::{RxError, RxResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Token budget for the extraction prompt.
    pub extraction_max_tokens: u32,
    /// Token budget for each pairwise interaction prompt.
    pub interaction_max_tokens: u32,
    /// Token budget for each dosage prompt.
    pub dosage_max_tokens: u32,
    /// Token budget for each alternatives prompt.
    pub alternatives_max_tokens: u32,
    /// Alternatives are requested for at most this many mentions, in order.
    pub alternatives_limit: usize,
    /// More mentions than this triggers the polypharmacy warning.
    pub polypharmacy_threshold: usize,
    /// Confidence assigned to pattern-derived mentions.
    pub fallback_confidence: f64,
    /// Confidence assumed when the oracle omits one.
    pub default_confidence: f64,
    /// Maximum oracle calls in flight within one stage. `1` is sequential.
    pub oracle_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            extraction_max_tokens: 300,
            interaction_max_tokens: 200,
            dosage_max_tokens: 250,
            alternatives_max_tokens: 300,
            alternatives_limit: 3,
            polypharmacy_threshold: 5,
            fallback_confidence: 0.8,
            default_confidence: 0.8,
            oracle_concurrency: 4,
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(toml_str: &str) -> RxResult<Self> {
        let config: PipelineConfig = toml::from_str(toml_str).map_err(|e| RxError::ConfigError {
            reason: format!("failed to parse pipeline config TOML: {e}"),
        })?;
        config.validate()?;
        info!(
            oracle_concurrency = config.oracle_concurrency,
            alternatives_limit = config.alternatives_limit,
            "pipeline config loaded"
        );
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> RxResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| RxError::ConfigError {
            reason: format!("cannot read pipeline config '{}': {e}", path.display()),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> RxResult<()> {
        let budgets = [
            ("extraction_max_tokens", self.extraction_max_tokens),
            ("interaction_max_tokens", self.interaction_max_tokens),
            ("dosage_max_tokens", self.dosage_max_tokens),
            ("alternatives_max_tokens", self.alternatives_max_tokens),
        ];
        if let Some((field, _)) = budgets.iter().find(|(_, v)| *v == 0) {
            return Err(RxError::ConfigError {
                reason: format!("{field} must be greater than zero"),
            });
        }
        if self.oracle_concurrency == 0 {
            return Err(RxError::ConfigError {
                reason: "oracle_concurrency must be at least 1".to_string(),
            });
        }
        for (field, value) in [
            ("fallback_confidence", self.fallback_confidence),
            ("default_confidence", self.default_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(RxError::ConfigError {
                    reason: format!("{field} must be within [0, 1], got {value}"),
                });
            }
        }
        Ok(())
    }
}
