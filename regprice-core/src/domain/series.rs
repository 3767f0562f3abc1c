//! PriceSeries: a validated, time-indexed price series.

use serde::{Deserialize, Serialize};

use crate::error::SegmentError;

/// A univariate price series aligned to a strictly increasing integer time index.
///
/// Missing observations are `NaN` (the void-value convention). They keep their
/// time slot but are ignored by every statistic the engine computes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    time_index: Vec<i64>,
    prices: Vec<f64>,
}

impl PriceSeries {
    /// Build a series, validating length, ordering and price values.
    pub fn new(time_index: Vec<i64>, prices: Vec<f64>) -> Result<Self, SegmentError> {
        validate(&time_index, &prices)?;
        Ok(Self { time_index, prices })
    }

    /// Build a series with time index `1..=n`.
    pub fn from_prices(prices: Vec<f64>) -> Result<Self, SegmentError> {
        let time_index = (1..=prices.len() as i64).collect();
        Self::new(time_index, prices)
    }

    pub fn len(&self) -> usize {
        self.time_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_index.is_empty()
    }

    pub fn time_index(&self) -> &[i64] {
        &self.time_index
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    /// Number of observed (non-missing) prices.
    pub fn observed_count(&self) -> usize {
        self.prices.iter().filter(|p| !p.is_nan()).count()
    }

    pub fn missing_count(&self) -> usize {
        self.len() - self.observed_count()
    }
}

/// Check the engine preconditions on a raw index/price pair.
///
/// Rejects mismatched lengths, fewer than two observations, a time index that
/// is not strictly increasing, and infinite prices. `NaN` is accepted as missing.
pub fn validate(time_index: &[i64], prices: &[f64]) -> Result<(), SegmentError> {
    if time_index.len() != prices.len() {
        return Err(SegmentError::invalid_input(format!(
            "time index has {} entries but price series has {}",
            time_index.len(),
            prices.len()
        )));
    }
    if time_index.len() < 2 {
        return Err(SegmentError::invalid_input(format!(
            "series needs at least 2 observations, got {}",
            time_index.len()
        )));
    }
    if let Some(w) = time_index.windows(2).position(|w| w[1] <= w[0]) {
        return Err(SegmentError::invalid_input(format!(
            "time index not strictly increasing at position {}: {} then {}",
            w + 1,
            time_index[w],
            time_index[w + 1]
        )));
    }
    if let Some(i) = prices.iter().position(|p| p.is_infinite()) {
        return Err(SegmentError::invalid_input(format!(
            "price at position {i} is infinite"
        )));
    }
    Ok(())
}
