//! Split finder: RSS reduction of every candidate cut in one partition.

use crate::engine::config::{EngineConfig, MissingPolicy};
use crate::engine::refine::{refine, Refinement};
use crate::stats::{prefix_moments, suffix_moments, Moments};

/// RSS reduction of each candidate cut.
///
/// Entry `i` is `rss(all) - (rss(prices[..=i]) + rss(prices[i+1..]))`, each
/// RSS taken around its own mean over observed values only. A partition of
/// `n` observations has `n - 1` candidates.
///
/// A side with no observed price is scored by `policy`: `Disqualify` yields
/// `NaN` for that cut, `ZeroContribution` counts that side's RSS as zero.
pub fn rss_gains(prices: &[f64], policy: MissingPolicy) -> Vec<f64> {
    let n = prices.len();
    if n < 2 {
        return Vec::new();
    }

    let baseline = Moments::from_slice(prices);
    let Some(total) = baseline.rss() else {
        // Nothing observed: no cut can explain anything.
        return vec![f64::NAN; n - 1];
    };

    let left = prefix_moments(prices);
    let right = suffix_moments(prices);

    (0..n - 1)
        .map(|i| {
            match (left[i].rss(), right[i + 1].rss(), policy) {
                (Some(l), Some(r), _) => total - (l + r),
                (l, r, MissingPolicy::ZeroContribution) => {
                    total - (l.unwrap_or(0.0) + r.unwrap_or(0.0))
                }
                (_, _, MissingPolicy::Disqualify) => f64::NAN,
            }
        })
        .collect()
}

/// Find the best admissible split of one partition, if any.
pub fn find_split(index: &[i64], prices: &[f64], config: &EngineConfig) -> Option<Refinement> {
    if index.len() < 2 {
        return None;
    }
    let gains = rss_gains(prices, config.missing_policy);
    refine(
        &gains,
        index,
        prices,
        config.min_leaf_size,
        config.min_leaf_size,
        config.tolerance,
    )
}
