//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::SegmentError;

/// Default numerical floor below which an RSS reduction is not a split.
pub const RSS_TOLERANCE: f64 = 1e-6;

/// Cap on the number of accepted split points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxSplits {
    #[default]
    Unbounded,
    Limit(usize),
}

impl MaxSplits {
    /// True once `count` accepted splits exhaust the cap.
    pub fn reached(&self, count: usize) -> bool {
        match self {
            MaxSplits::Unbounded => false,
            MaxSplits::Limit(n) => count >= *n,
        }
    }
}

impl From<Option<usize>> for MaxSplits {
    fn from(limit: Option<usize>) -> Self {
        limit.map_or(MaxSplits::Unbounded, MaxSplits::Limit)
    }
}

/// How a candidate cut is scored when one of its sides has no observed price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    /// The cut carries no information and cannot win the maximum.
    #[default]
    Disqualify,
    /// The all-missing side contributes an RSS of zero.
    ZeroContribution,
}

/// Parameters of one segmentation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum partition span in time-index units.
    pub min_leaf_size: usize,
    pub max_splits: MaxSplits,
    /// RSS reductions at or below this value never produce a split.
    pub tolerance: f64,
    pub missing_policy: MissingPolicy,
    /// Scan the partitions of each round on the rayon pool.
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_leaf_size: 1,
            max_splits: MaxSplits::Unbounded,
            tolerance: RSS_TOLERANCE,
            missing_policy: MissingPolicy::Disqualify,
            parallel: false,
        }
    }
}

impl EngineConfig {
    pub fn new(min_leaf_size: usize, max_splits: MaxSplits) -> Self {
        Self {
            min_leaf_size,
            max_splits,
            ..Self::default()
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_missing_policy(mut self, policy: MissingPolicy) -> Self {
        self.missing_policy = policy;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn validate(&self) -> Result<(), SegmentError> {
        if self.min_leaf_size == 0 {
            return Err(SegmentError::invalid_input("min_leaf_size must be >= 1; got 0"));
        }
        if self.max_splits == MaxSplits::Limit(0) {
            return Err(SegmentError::invalid_input(
                "max_splits must be >= 1 when limited; got 0",
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(SegmentError::invalid_input(format!(
                "tolerance must be finite and non-negative; got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid_and_unbounded() {
        let cfg = EngineConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.max_splits, MaxSplits::Unbounded);
        assert_eq!(cfg.tolerance, RSS_TOLERANCE);
    }

    #[test]
    fn zero_leaf_size_is_invalid() {
        let cfg = EngineConfig::new(0, MaxSplits::Unbounded);
        assert!(matches!(cfg.validate(), Err(SegmentError::InvalidInput(_))));
    }

    #[test]
    fn zero_split_cap_is_invalid() {
        let cfg = EngineConfig::new(4, MaxSplits::Limit(0));
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn negative_tolerance_is_invalid() {
        let cfg = EngineConfig::default().with_tolerance(-1.0);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn cap_reached() {
        assert!(!MaxSplits::Unbounded.reached(usize::MAX));
        assert!(!MaxSplits::Limit(2).reached(1));
        assert!(MaxSplits::Limit(2).reached(2));
        assert_eq!(MaxSplits::from(None), MaxSplits::Unbounded);
        assert_eq!(MaxSplits::from(Some(3)), MaxSplits::Limit(3));
    }

    #[test]
    fn serde_uses_snake_case_variants() {
        let cfg = EngineConfig::new(28, MaxSplits::Limit(3))
            .with_missing_policy(MissingPolicy::ZeroContribution);
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains("\"limit\":3"));
        assert!(json.contains("\"zero_contribution\""));
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"min_leaf_size": 28}"#).unwrap();
        assert_eq!(cfg.min_leaf_size, 28);
        assert_eq!(cfg.max_splits, MaxSplits::Unbounded);
        assert!(!cfg.parallel);
    }
}
