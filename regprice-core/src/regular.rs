//! Regular-price extraction from a segmentation.
//!
//! The regular price of a partition is the highest observed price in it;
//! anything below it within the partition is a temporary discount.

use serde::{Deserialize, Serialize};

use crate::domain::{Partition, PriceSeries};
use crate::engine::Segmentation;

/// Highest observed (non-`NaN`) value, if any.
pub fn max_observed(values: &[f64]) -> Option<f64> {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
}

/// Regular price of each partition; `NaN` for a partition with no observation.
pub fn regular_prices(prices: &[f64], seg: &Segmentation) -> Vec<f64> {
    seg.partitions
        .iter()
        .map(|p| max_observed(&prices[p.range()]).unwrap_or(f64::NAN))
        .collect()
}

/// Regular price at every observation (each partition's maximum repeated).
pub fn regular_price_series(prices: &[f64], seg: &Segmentation) -> Vec<f64> {
    let mut out = Vec::with_capacity(prices.len());
    for (p, level) in seg.partitions.iter().zip(regular_prices(prices, seg)) {
        out.extend(std::iter::repeat(level).take(p.len()));
    }
    out
}

/// Per-partition description of the recovered regular price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionSummary {
    pub first: i64,
    pub last: i64,
    pub observations: usize,
    pub missing: usize,
    pub regular_price: Option<f64>,
    /// Observed prices strictly below the regular price.
    pub discounted: usize,
    /// Largest discount as a fraction of the regular price.
    pub max_discount: f64,
}

impl PartitionSummary {
    fn from_partition(p: &Partition, prices: &[f64]) -> Self {
        let values = &prices[p.range()];
        let missing = values.iter().filter(|v| v.is_nan()).count();
        let regular = max_observed(values);
        let (discounted, max_discount) = match regular {
            Some(r) if r > 0.0 => values
                .iter()
                .filter(|v| !v.is_nan() && **v < r)
                .fold((0, 0.0_f64), |(n, depth), v| (n + 1, depth.max(1.0 - v / r))),
            Some(r) => (values.iter().filter(|v| !v.is_nan() && **v < r).count(), 0.0),
            None => (0, 0.0),
        };
        Self {
            first: p.first,
            last: p.last,
            observations: values.len(),
            missing,
            regular_price: regular,
            discounted,
            max_discount,
        }
    }
}

/// Summarize every partition of `seg` over `series`.
pub fn summarize(series: &PriceSeries, seg: &Segmentation) -> Vec<PartitionSummary> {
    seg.partitions
        .iter()
        .map(|p| PartitionSummary::from_partition(p, series.prices()))
        .collect()
}
