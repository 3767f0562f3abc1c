//! Serializable run configuration (TOML).
//!
//! ```toml
//! [input]
//! path = "prices.csv"
//! series_column = "sku"
//! time_column = "date"
//! price_column = "price"
//! time_format = "date"
//!
//! [engine]
//! min_leaf_size = 28
//! max_splits = "unbounded"
//!
//! [output]
//! dir = "results"
//! ```

use regprice_core::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from loading or validating a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// How the time column is encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFormat {
    /// Integer time index, used as-is.
    #[default]
    Integer,
    /// Calendar date, mapped to its day number so gaps are measured in days.
    Date,
}

/// Where and how to read price series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: PathBuf,
    /// Column identifying the series (e.g. product id). Absent: one series.
    #[serde(default)]
    pub series_column: Option<String>,
    #[serde(default = "default_time_column")]
    pub time_column: String,
    #[serde(default = "default_price_column")]
    pub price_column: String,
    #[serde(default)]
    pub time_format: TimeFormat,
    /// chrono format string for `time_format = "date"`.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl InputConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            series_column: None,
            time_column: default_time_column(),
            price_column: default_price_column(),
            time_format: TimeFormat::Integer,
            date_format: default_date_format(),
        }
    }
}

fn default_time_column() -> String {
    "time".into()
}

fn default_price_column() -> String {
    "price".into()
}

fn default_date_format() -> String {
    "%Y-%m-%d".into()
}

/// Which artifacts to write and where.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    /// Full JSON report.
    pub json: bool,
    /// One row per partition.
    pub partitions_csv: bool,
    /// One row per observation with its regular price.
    pub regular_csv: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("results"),
            json: true,
            partitions_csv: true,
            regular_csv: true,
        }
    }
}

/// Complete configuration of a segmentation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Segment independent series on the rayon pool.
    #[serde(default = "default_true")]
    pub parallel_series: bool,
}

fn default_true() -> bool {
    true
}

impl RunConfig {
    pub fn new(input: InputConfig, engine: EngineConfig) -> Self {
        Self {
            input,
            engine,
            output: OutputConfig::default(),
            parallel_series: true,
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.input.time_column.trim().is_empty() {
            return Err(ConfigError::Invalid("input.time_column is empty".into()));
        }
        if self.input.price_column.trim().is_empty() {
            return Err(ConfigError::Invalid("input.price_column is empty".into()));
        }
        if matches!(&self.input.series_column, Some(c) if c.trim().is_empty()) {
            return Err(ConfigError::Invalid("input.series_column is empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regprice_core::{MaxSplits, MissingPolicy};

    #[test]
    fn minimal_toml_uses_defaults() {
        let cfg = RunConfig::from_toml_str(
            r#"
            [input]
            path = "prices.csv"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.input.time_column, "time");
        assert_eq!(cfg.input.price_column, "price");
        assert_eq!(cfg.input.time_format, TimeFormat::Integer);
        assert_eq!(cfg.engine, EngineConfig::default());
        assert_eq!(cfg.output, OutputConfig::default());
        assert!(cfg.parallel_series);
    }

    #[test]
    fn full_toml_parses() {
        let cfg = RunConfig::from_toml_str(
            r#"
            parallel_series = false

            [input]
            path = "data/prices.csv"
            series_column = "sku"
            time_column = "date"
            price_column = "shelf_price"
            time_format = "date"
            date_format = "%d/%m/%Y"

            [engine]
            min_leaf_size = 28
            max_splits = { limit = 4 }
            missing_policy = "zero_contribution"
            parallel = true

            [output]
            dir = "out"
            regular_csv = false
            "#,
        )
        .unwrap();
        assert_eq!(cfg.input.series_column.as_deref(), Some("sku"));
        assert_eq!(cfg.input.time_format, TimeFormat::Date);
        assert_eq!(cfg.input.date_format, "%d/%m/%Y");
        assert_eq!(cfg.engine.min_leaf_size, 28);
        assert_eq!(cfg.engine.max_splits, MaxSplits::Limit(4));
        assert_eq!(cfg.engine.missing_policy, MissingPolicy::ZeroContribution);
        assert!(cfg.engine.parallel);
        assert_eq!(cfg.output.dir, PathBuf::from("out"));
        assert!(cfg.output.json);
        assert!(!cfg.output.regular_csv);
        assert!(!cfg.parallel_series);
    }

    #[test]
    fn unbounded_cap_is_a_string() {
        let cfg = RunConfig::from_toml_str(
            r#"
            [input]
            path = "p.csv"
            [engine]
            max_splits = "unbounded"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.engine.max_splits, MaxSplits::Unbounded);
    }

    #[test]
    fn zero_leaf_size_is_rejected() {
        let err = RunConfig::from_toml_str(
            r#"
            [input]
            path = "p.csv"
            [engine]
            min_leaf_size = 0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn missing_input_section_is_a_parse_error() {
        let err = RunConfig::from_toml_str("[engine]\nmin_leaf_size = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = RunConfig::from_file(Path::new("/nonexistent/regprice.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/regprice.toml"));
    }
}
