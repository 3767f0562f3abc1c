//! Report export: JSON and CSV artifacts.
//!
//! - **JSON**: the full `RunReport`, with schema versioning
//! - **Partitions CSV**: one row per partition of every series
//! - **Regular CSV**: one row per observation with its regular price
//!
//! Unknown (newer) schema versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::config::OutputConfig;
use crate::runner::{RunReport, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `RunReport` to pretty JSON.
pub fn export_json(report: &RunReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize RunReport to JSON")
}

/// Deserialize a `RunReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<RunReport> {
    let report: RunReport =
        serde_json::from_str(json).context("failed to deserialize RunReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

fn opt(v: Option<f64>) -> String {
    v.map(|x| format!("{:.6}", x)).unwrap_or_default()
}

/// Export every partition of every series.
///
/// Columns: series, partition, first, last, observations, missing,
/// regular_price, discounted, max_discount
pub fn export_partitions_csv(report: &RunReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "series",
        "partition",
        "first",
        "last",
        "observations",
        "missing",
        "regular_price",
        "discounted",
        "max_discount",
    ])?;
    for r in &report.results {
        for (i, p) in r.partitions.iter().enumerate() {
            wtr.write_record([
                &r.id,
                &i.to_string(),
                &p.first.to_string(),
                &p.last.to_string(),
                &p.observations.to_string(),
                &p.missing.to_string(),
                &opt(p.regular_price),
                &p.discounted.to_string(),
                &format!("{:.4}", p.max_discount),
            ])?;
        }
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export the per-observation regular price of every series.
///
/// Columns: series, time, price, regular_price. Missing values are blank.
pub fn export_regular_csv(report: &RunReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["series", "time", "price", "regular_price"])?;
    for r in &report.results {
        for ((t, p), reg) in r.time_index.iter().zip(&r.prices).zip(&r.regular) {
            wtr.write_record([&r.id, &t.to_string(), &opt(*p), &opt(*reg)])?;
        }
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the artifacts enabled in `output` for one batch run.
///
/// Creates a directory named `regprice_{timestamp}/` under `output.dir`
/// containing, as enabled:
/// - `report.json`: the full `RunReport`
/// - `partitions.csv`
/// - `regular.csv`
///
/// Returns the path to the created directory.
pub fn save_artifacts(report: &RunReport, output: &OutputConfig) -> Result<PathBuf> {
    let dirname = format!("regprice_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let run_dir = output.dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    if output.json {
        write(&run_dir.join("report.json"), &export_json(report)?)?;
    }
    if output.partitions_csv {
        write(&run_dir.join("partitions.csv"), &export_partitions_csv(report)?)?;
    }
    if output.regular_csv {
        write(&run_dir.join("regular.csv"), &export_regular_csv(report)?)?;
    }
    tracing::info!(dir = %run_dir.display(), "artifacts written");
    Ok(run_dir)
}

fn write(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

/// Load a `RunReport` from an artifact directory's report.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<RunReport> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}
