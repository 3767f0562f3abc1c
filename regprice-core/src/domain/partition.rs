//! Partitions and the partition set produced by the driver.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::Range;

/// A contiguous, non-empty run of observations sharing one regular price.
///
/// `start..end` is the positional range into the parent series; `first` and
/// `last` are the time-index values at its two ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Partition {
    pub start: usize,
    pub end: usize,
    pub first: i64,
    pub last: i64,
}

impl Partition {
    /// Number of observations in the partition.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// Span in time-index units: `last - first + 1`, saturating at `u64::MAX`.
    pub fn span(&self) -> u64 {
        self.last.abs_diff(self.first).saturating_add(1)
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Cut `time_index` at every split point.
///
/// A split at `w` closes the left partition at the last index `<= w`. Split
/// points that would produce an empty partition (at or beyond the final index)
/// are ignored.
pub fn partitions_from_splits(time_index: &[i64], splits: &BTreeSet<i64>) -> Vec<Partition> {
    let n = time_index.len();
    let mut out = Vec::with_capacity(splits.len() + 1);
    let mut start = 0;
    for &w in splits {
        let end = time_index.partition_point(|&t| t <= w);
        if end <= start || end >= n {
            continue;
        }
        out.push(Partition {
            start,
            end,
            first: time_index[start],
            last: time_index[end - 1],
        });
        start = end;
    }
    if start < n {
        out.push(Partition {
            start,
            end: n,
            first: time_index[start],
            last: time_index[n - 1],
        });
    }
    out
}
