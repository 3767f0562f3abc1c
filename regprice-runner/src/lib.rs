//! Regprice Runner: batch segmentation on top of `regprice-core`.
//!
//! This crate provides:
//! - TOML run configuration
//! - Long-format CSV loading with missing-value markers
//! - Seeded synthetic price series with known regular prices
//! - Parallel batch runner with per-series failure reporting
//! - JSON and CSV export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;
pub mod synthetic;

pub use config::{ConfigError, InputConfig, OutputConfig, RunConfig, TimeFormat};
pub use data_loader::{load_csv, read_series, LoadError, LoadedSeries};
pub use export::{
    export_json, export_partitions_csv, export_regular_csv, import_json, load_artifacts,
    save_artifacts,
};
pub use runner::{
    run_from_config, BatchRunner, RunError, RunReport, RunSummary, SeriesFailure, SeriesResult,
    SCHEMA_VERSION,
};
pub use synthetic::{generate, generate_batch, write_csv, SyntheticConfig, SyntheticSeries};
