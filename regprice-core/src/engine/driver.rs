//! Partition driver: iterate split search to a fixed point.
//!
//! Each round scans every current partition for its best admissible split,
//! adds new splits to a sorted set, then rebuilds the partitions from the
//! original time index. The loop stops when a round adds nothing or the split
//! cap is reached. Rounds are barriers: scans within a round are independent
//! and may run on the rayon pool, but partitions are rebuilt only after every
//! scan of the round has finished.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::{partitions_from_splits, validate, Partition, PriceSeries};
use crate::engine::config::{EngineConfig, MaxSplits};
use crate::engine::finder::find_split;
use crate::engine::refine::{Refinement, SplitRule};
use crate::error::SegmentError;

/// One accepted split, in acceptance order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcceptedSplit {
    pub split: i64,
    /// Driver round (1-based) in which the split was accepted.
    pub round: usize,
    pub gain: f64,
    pub rule: SplitRule,
    pub depth: usize,
}

/// Final output of the partition driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segmentation {
    /// Ordered partitions covering the whole series exactly once.
    pub partitions: Vec<Partition>,
    /// Sorted, duplicate-free accepted split points.
    pub splits: Vec<i64>,
    /// Accepted splits in the order the driver took them.
    pub history: Vec<AcceptedSplit>,
    /// Number of rounds executed, including the final no-op round.
    pub rounds: usize,
    /// True if the split cap ended the run.
    pub capped: bool,
}

impl Segmentation {
    pub fn num_partitions(&self) -> usize {
        self.partitions.len()
    }

    /// Borrow each partition's time-index slice from the parent series.
    pub fn partition_indices<'a>(&self, time_index: &'a [i64]) -> Vec<&'a [i64]> {
        self.partitions
            .iter()
            .map(|p| &time_index[p.range()])
            .collect()
    }
}

/// Segmentation engine with a validated configuration.
#[derive(Debug, Clone)]
pub struct Segmenter {
    config: EngineConfig,
}

impl Segmenter {
    pub fn new(config: EngineConfig) -> Result<Self, SegmentError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Segment an already validated series.
    pub fn run(&self, series: &PriceSeries) -> Segmentation {
        self.drive(series.time_index(), series.prices())
    }

    /// Validate raw slices, then segment them.
    pub fn segment(&self, time_index: &[i64], prices: &[f64]) -> Result<Segmentation, SegmentError> {
        validate(time_index, prices)?;
        Ok(self.drive(time_index, prices))
    }

    fn drive(&self, time_index: &[i64], prices: &[f64]) -> Segmentation {
        let cap = self.config.max_splits;
        let mut splits: BTreeSet<i64> = BTreeSet::new();
        let mut history = Vec::new();
        let mut partitions = partitions_from_splits(time_index, &splits);
        let mut rounds = 0;
        let mut capped = false;

        loop {
            rounds += 1;
            let before = partitions.len();
            debug_assert_eq!(splits.len() + 1, before);

            let found = self.scan(&partitions, time_index, prices);

            let mut added = 0;
            let mut discarded = 0;
            for r in found.into_iter().flatten() {
                if cap.reached(splits.len()) {
                    discarded += 1;
                    continue;
                }
                if splits.insert(r.split) {
                    added += 1;
                    history.push(AcceptedSplit {
                        split: r.split,
                        round: rounds,
                        gain: r.gain,
                        rule: r.rule,
                        depth: r.depth,
                    });
                }
            }

            tracing::debug!(
                round = rounds,
                partitions = before,
                added,
                discarded,
                total = splits.len(),
                "segmentation round"
            );

            if added == 0 {
                break;
            }

            partitions = partitions_from_splits(time_index, &splits);
            if cap.reached(splits.len()) {
                capped = true;
                break;
            }
        }

        Segmentation {
            partitions,
            splits: splits.into_iter().collect(),
            history,
            rounds,
            capped,
        }
    }

    /// Best split per partition, in partition order.
    fn scan(
        &self,
        partitions: &[Partition],
        time_index: &[i64],
        prices: &[f64],
    ) -> Vec<Option<Refinement>> {
        let search = |p: &Partition| {
            find_split(&time_index[p.range()], &prices[p.range()], &self.config)
        };
        if self.config.parallel && partitions.len() > 1 {
            partitions.par_iter().map(search).collect()
        } else {
            partitions.iter().map(search).collect()
        }
    }
}

/// Segment a price series with default tolerance and missing-value policy.
///
/// `min_leaf_size` is the minimum partition span in time-index units;
/// `max_splits` caps the number of accepted splits.
pub fn segment(
    time_index: &[i64],
    prices: &[f64],
    min_leaf_size: usize,
    max_splits: MaxSplits,
) -> Result<Segmentation, SegmentError> {
    Segmenter::new(EngineConfig::new(min_leaf_size, max_splits))?.segment(time_index, prices)
}
