//! Regprice Core: regular-price segmentation of time-indexed price series.
//!
//! This crate contains the segmentation engine:
//! - Domain types (price series, partitions)
//! - Welford moments that skip missing observations
//! - Split refiner: two-stage admissibility rule with truncated re-search
//! - Split finder: RSS reduction of every candidate cut
//! - Partition driver: rounds of split search until a fixed point or split cap
//! - Regular-price extraction (maximum per partition)
//! - Run fingerprints

pub mod domain;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod regular;
pub mod stats;

pub use domain::{Partition, PriceSeries};
pub use engine::{
    segment, EngineConfig, MaxSplits, MissingPolicy, Segmentation, Segmenter, SplitRule,
};
pub use error::SegmentError;
