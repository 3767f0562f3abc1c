//! Domain types for regular-price segmentation

pub mod partition;
pub mod series;

pub use partition::{partitions_from_splits, Partition};
pub use series::{validate, PriceSeries};
