//! Batch runner: segment many named series and collect a report.
//!
//! Two entry points:
//! - `run_from_config()`: loads the CSV named in a `RunConfig`, then runs. Used by the CLI.
//! - `BatchRunner::run()`: takes already loaded series. Used by tests and benches.
//!
//! Series are independent, so the batch is spread over the rayon pool. A series
//! that fails validation is recorded as a failure and does not abort the batch.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use regprice_core::engine::AcceptedSplit;
use regprice_core::fingerprint::{ConfigHash, RunId};
use regprice_core::regular::{regular_price_series, summarize, PartitionSummary};
use regprice_core::{EngineConfig, PriceSeries, SegmentError, Segmenter};

use crate::config::{ConfigError, RunConfig};
use crate::data_loader::{load_csv, LoadError, LoadedSeries};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("engine error: {0}")]
    Engine(#[from] SegmentError),
}

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Segmentation of one series, ready for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesResult {
    pub id: String,
    /// Short combined hash of config and data.
    pub run_id: String,
    pub dataset_hash: String,
    pub observations: usize,
    pub missing: usize,
    pub splits: Vec<i64>,
    pub partitions: Vec<PartitionSummary>,
    pub history: Vec<AcceptedSplit>,
    pub rounds: usize,
    pub capped: bool,
    pub time_index: Vec<i64>,
    /// Observed prices; `None` for a missing observation.
    pub prices: Vec<Option<f64>>,
    /// Regular price at each observation; `None` inside an all-missing partition.
    pub regular: Vec<Option<f64>>,
}

fn to_option(v: f64) -> Option<f64> {
    if v.is_nan() {
        None
    } else {
        Some(v)
    }
}

impl SeriesResult {
    pub fn num_partitions(&self) -> usize {
        self.partitions.len()
    }
}

/// A series that could not be segmented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesFailure {
    pub id: String,
    pub error: String,
}

/// Totals over a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub series: usize,
    pub segmented: usize,
    pub failed: usize,
    pub splits: usize,
    pub capped: usize,
    pub mean_partitions: f64,
}

/// Complete result of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub engine: EngineConfig,
    pub config_hash: String,
    pub results: Vec<SeriesResult>,
    pub failures: Vec<SeriesFailure>,
    pub summary: RunSummary,
}

impl RunReport {
    pub fn result(&self, id: &str) -> Option<&SeriesResult> {
        self.results.iter().find(|r| r.id == id)
    }
}

/// Segments batches of series with one engine configuration.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    segmenter: Segmenter,
    parallel: bool,
}

impl BatchRunner {
    pub fn new(config: EngineConfig) -> Result<Self, RunError> {
        Ok(Self {
            segmenter: Segmenter::new(config)?,
            parallel: true,
        })
    }

    /// Enables or disables parallel execution across series.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        self.segmenter.config()
    }

    /// Segment one series.
    pub fn run_one(&self, series: &LoadedSeries) -> Result<SeriesResult, SegmentError> {
        let ps = PriceSeries::new(series.time_index.clone(), series.prices.clone())?;
        let seg = self.segmenter.run(&ps);
        let run_id = RunId::new(self.config(), &ps);
        Ok(SeriesResult {
            id: series.id.clone(),
            run_id: run_id.hash(),
            dataset_hash: run_id.dataset_hash.0,
            observations: ps.len(),
            missing: ps.missing_count(),
            partitions: summarize(&ps, &seg),
            regular: regular_price_series(ps.prices(), &seg)
                .into_iter()
                .map(to_option)
                .collect(),
            prices: ps.prices().iter().copied().map(to_option).collect(),
            time_index: series.time_index.clone(),
            splits: seg.splits,
            history: seg.history,
            rounds: seg.rounds,
            capped: seg.capped,
        })
    }

    /// Segment every series.
    pub fn run(&self, series: &[LoadedSeries]) -> RunReport {
        self.run_with_progress(series, |_, _, _| {})
    }

    /// Segment every series, calling `progress(done, total, result)` as each succeeds.
    ///
    /// Results keep input order regardless of parallelism; `done` counts
    /// completions, so under rayon it may arrive out of input order.
    pub fn run_with_progress<F>(&self, series: &[LoadedSeries], progress: F) -> RunReport
    where
        F: Fn(usize, usize, &SeriesResult) + Sync,
    {
        let total = series.len();
        let done = std::sync::atomic::AtomicUsize::new(0);
        let one = |s: &LoadedSeries| {
            let outcome = self.run_one(s);
            match &outcome {
                Ok(r) => {
                    let n = done.fetch_add(1, std::sync::atomic::Ordering::Relaxed) + 1;
                    progress(n, total, r);
                }
                Err(e) => tracing::warn!(series = %s.id, error = %e, "skipping series"),
            }
            (s.id.clone(), outcome)
        };

        let outcomes: Vec<(String, Result<SeriesResult, SegmentError>)> = if self.parallel {
            series.par_iter().map(one).collect()
        } else {
            series.iter().map(one).collect()
        };

        let mut results = Vec::with_capacity(total);
        let mut failures = Vec::new();
        for (id, outcome) in outcomes {
            match outcome {
                Ok(r) => results.push(r),
                Err(e) => failures.push(SeriesFailure {
                    id,
                    error: e.to_string(),
                }),
            }
        }

        let summary = summarize_run(&results, failures.len());
        tracing::info!(
            series = summary.series,
            segmented = summary.segmented,
            failed = summary.failed,
            splits = summary.splits,
            "batch segmented"
        );

        RunReport {
            schema_version: SCHEMA_VERSION,
            engine: self.config().clone(),
            config_hash: ConfigHash::of(self.config()).0,
            results,
            failures,
            summary,
        }
    }
}

fn summarize_run(results: &[SeriesResult], failed: usize) -> RunSummary {
    let segmented = results.len();
    let partitions: usize = results.iter().map(SeriesResult::num_partitions).sum();
    RunSummary {
        series: segmented + failed,
        segmented,
        failed,
        splits: results.iter().map(|r| r.splits.len()).sum(),
        capped: results.iter().filter(|r| r.capped).count(),
        mean_partitions: if segmented == 0 {
            0.0
        } else {
            partitions as f64 / segmented as f64
        },
    }
}

/// Load the input named in `config` and segment every series in it.
pub fn run_from_config(config: &RunConfig) -> Result<RunReport, RunError> {
    config.validate()?;
    let series = load_csv(&config.input.path, &config.input)?;
    tracing::info!(
        path = %config.input.path.display(),
        series = series.len(),
        "loaded input"
    );
    let runner = BatchRunner::new(config.engine.clone())?.with_parallelism(config.parallel_series);
    Ok(runner.run(&series))
}
