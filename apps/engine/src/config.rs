use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

/// Engine configuration. Every knob is defaulted; callers construct this
/// explicitly and pass it into [`crate::pipeline::MatchEngine::new`] — there
/// is no process-wide mutable state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Jaccard similarity above which two same-fingerprint postings are
    /// considered duplicates.
    pub similarity_threshold: f32,
    /// Batch size above which dedup buckets postings by fingerprint before
    /// pairwise comparison.
    pub dedup_batch_ceiling: usize,
    /// Max concurrent per-posting extraction tasks.
    pub concurrency_limit: usize,
    /// Timeout for a single enrichment provider call.
    pub enrichment_timeout: Duration,
    /// Weight of extraction confidence in final-score dampening:
    /// `score *= (1 - w) + w * confidence`. 0.5 dampens a zero-confidence
    /// extraction to half its raw score.
    pub confidence_damping: f32,
    /// Penalty when the profile sits exactly one seniority tier below the
    /// requirement.
    pub adjacent_tier_penalty: f32,
    /// Penalty when the profile sits more than one tier below.
    pub distant_tier_penalty: f32,
    /// Extraction confidence below which required/preferred skill overlap is
    /// tolerated as ambiguous evidence.
    pub ambiguity_threshold: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.85,
            dedup_batch_ceiling: 500,
            concurrency_limit: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            enrichment_timeout: Duration::from_secs(10),
            confidence_damping: 0.5,
            adjacent_tier_penalty: 5.0,
            distant_tier_penalty: 10.0,
            ambiguity_threshold: 0.5,
        }
    }
}

impl EngineConfig {
    /// Rejects out-of-range values. Called by the engine constructor before
    /// any posting is processed.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(EngineError::Configuration(format!(
                "similarity_threshold must be in [0, 1], got {}",
                self.similarity_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence_damping) {
            return Err(EngineError::Configuration(format!(
                "confidence_damping must be in [0, 1], got {}",
                self.confidence_damping
            )));
        }
        if !(0.0..=1.0).contains(&self.ambiguity_threshold) {
            return Err(EngineError::Configuration(format!(
                "ambiguity_threshold must be in [0, 1], got {}",
                self.ambiguity_threshold
            )));
        }
        if self.concurrency_limit == 0 {
            return Err(EngineError::Configuration(
                "concurrency_limit must be at least 1".to_string(),
            ));
        }
        if self.adjacent_tier_penalty < 0.0 || self.distant_tier_penalty < 0.0 {
            return Err(EngineError::Configuration(
                "seniority tier penalties must be non-negative".to_string(),
            ));
        }
        if self.enrichment_timeout.is_zero() {
            return Err(EngineError::Configuration(
                "enrichment_timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let config = EngineConfig {
            similarity_threshold: -0.1,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn test_threshold_above_one_rejected() {
        let config = EngineConfig {
            similarity_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config = EngineConfig {
            concurrency_limit: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = EngineConfig {
            enrichment_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
