//! Run fingerprinting: deterministic identification of a segmentation run.
//!
//! - `DatasetHash`: BLAKE3 over the time index and the raw price bits.
//! - `ConfigHash`: BLAKE3 over the parameters that influence the output.
//! - `RunId`: the pair, hashed again, so identical runs share one id.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::PriceSeries;
use crate::engine::{EngineConfig, MaxSplits, MissingPolicy};

/// Content hash of a price series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl DatasetHash {
    pub fn of(series: &PriceSeries) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(series.len() as u64).to_le_bytes());
        for t in series.time_index() {
            hasher.update(&t.to_le_bytes());
        }
        for p in series.prices() {
            // All NaN payloads hash alike: missing is missing.
            let bits = if p.is_nan() { f64::NAN.to_bits() } else { p.to_bits() };
            hasher.update(&bits.to_le_bytes());
        }
        Self(hasher.finalize().to_hex().to_string())
    }
}

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hash of the engine parameters that can change a segmentation.
///
/// `parallel` is excluded: parallel and sequential scans give identical output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigHash(pub String);

impl ConfigHash {
    pub fn of(config: &EngineConfig) -> Self {
        let cap = match config.max_splits {
            MaxSplits::Unbounded => "unbounded".to_string(),
            MaxSplits::Limit(n) => n.to_string(),
        };
        let missing = match config.missing_policy {
            MissingPolicy::Disqualify => "disqualify",
            MissingPolicy::ZeroContribution => "zero_contribution",
        };
        let canonical = format!(
            "min_leaf_size={};max_splits={};tolerance={:016x};missing={}",
            config.min_leaf_size,
            cap,
            config.tolerance.to_bits(),
            missing
        );
        Self(blake3::hash(canonical.as_bytes()).to_hex().to_string())
    }
}

impl fmt::Display for ConfigHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deterministic run id: config + dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId {
    pub config_hash: ConfigHash,
    pub dataset_hash: DatasetHash,
}

impl RunId {
    pub fn new(config: &EngineConfig, series: &PriceSeries) -> Self {
        Self {
            config_hash: ConfigHash::of(config),
            dataset_hash: DatasetHash::of(series),
        }
    }

    /// Short combined hash for file names and logs.
    pub fn hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.config_hash.0.as_bytes());
        hasher.update(b":");
        hasher.update(self.dataset_hash.0.as_bytes());
        let hex = hasher.finalize().to_hex();
        hex.as_str()[..16].to_string()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.config_hash, self.dataset_hash)
    }
}
