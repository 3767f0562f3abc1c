//! Split refiner: the two-stage admissibility rule.
//!
//! Given the RSS gain of every candidate cut, pick the best cut that respects
//! the minimum leaf sizes:
//!
//! 1. Both sides long enough: accept.
//! 2. Right side short: accept if the short tail is priced *higher* than the
//!    rest (a discount dip is never higher). Otherwise drop the trailing
//!    `back_min` observations, relax `back_min` to 1, and search again.
//! 3. Left side short: mirror image. Accept if the short head is priced higher,
//!    otherwise drop the leading `front_min` observations, relax `front_min`
//!    to 1, and search again.
//! 4. Both sides short: no split.
//!
//! Truncated searches reuse the original gains of the surviving candidates.
//! Every truncation consumes a real prefix or suffix, so the loop below
//! runs at most a handful of times: after one relaxation per side the next
//! candidate always satisfies case 1 or is rejected.

use serde::{Deserialize, Serialize};

use crate::stats::observed_mean;

/// Which branch of the rule accepted a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitRule {
    /// Both sides satisfy their minimum span.
    Balanced,
    /// Short trailing segment priced above the leading one.
    ShortHigherTail,
    /// Short leading segment priced above the trailing one.
    ShortHigherHead,
}

/// An accepted split and how it was reached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Refinement {
    /// Time-index value closing the left sub-partition.
    pub split: i64,
    /// RSS reduction of the accepted cut.
    pub gain: f64,
    pub rule: SplitRule,
    /// Number of truncations applied before acceptance.
    pub depth: usize,
}

/// Position and value of the largest non-`NaN` gain; earliest wins ties.
pub fn argmax(gains: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &g) in gains.iter().enumerate() {
        if g.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if g <= b => {}
            _ => best = Some((i, g)),
        }
    }
    best
}

/// Apply the two-stage rule.
///
/// `gains[i]` scores the cut between positions `i` and `i + 1`, so
/// `gains.len() + 1 == index.len() == prices.len()`. `front_min` and
/// `back_min` are minimum spans in time-index units for the left and right
/// sides.
pub fn refine(
    gains: &[f64],
    index: &[i64],
    prices: &[f64],
    front_min: usize,
    back_min: usize,
    tolerance: f64,
) -> Option<Refinement> {
    debug_assert_eq!(index.len(), prices.len());
    debug_assert_eq!(gains.len() + 1, index.len());

    let (mut gains, mut index, mut prices) = (gains, index, prices);
    let (mut front_min, mut back_min) = (front_min, back_min);
    let mut depth = 0;

    loop {
        let (i, gain) = argmax(gains)?;
        if gain <= tolerance {
            return None;
        }

        let n = index.len();
        let left_ok = span(index[0], index[i]) >= front_min as u64;
        let right_ok = span(index[i + 1], index[n - 1]) >= back_min as u64;

        let accept = |rule: SplitRule| {
            tracing::trace!(split = index[i], gain, ?rule, depth, "split accepted");
            Some(Refinement {
                split: index[i],
                gain,
                rule,
                depth,
            })
        };

        if left_ok && right_ok {
            return accept(SplitRule::Balanced);
        }

        if left_ok {
            if mean_lt(&prices[..=i], &prices[i + 1..]) {
                return accept(SplitRule::ShortHigherTail);
            }
            // Keep at least two observations so one candidate survives.
            if n < back_min.saturating_add(2) {
                return None;
            }
            let keep = n - back_min;
            gains = &gains[..keep - 1];
            index = &index[..keep];
            prices = &prices[..keep];
            back_min = 1;
        } else if right_ok {
            if mean_lt(&prices[i + 1..], &prices[..=i]) {
                return accept(SplitRule::ShortHigherHead);
            }
            if n < front_min.saturating_add(2) {
                return None;
            }
            let drop = front_min;
            gains = &gains[drop..];
            index = &index[drop..];
            prices = &prices[drop..];
            front_min = 1;
        } else {
            return None;
        }
        depth += 1;
    }
}

/// Inclusive span from `first` to `last` in time units, saturating at `u64::MAX`.
fn span(first: i64, last: i64) -> u64 {
    last.abs_diff(first).saturating_add(1)
}

/// `mean(a) < mean(b)`; false if either side has no observed price.
fn mean_lt(a: &[f64], b: &[f64]) -> bool {
    match (observed_mean(a), observed_mean(b)) {
        (Some(x), Some(y)) => x < y,
        _ => false,
    }
}
