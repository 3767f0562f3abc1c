//! Regprice CLI: segment price series into regular-price regimes.
//!
//! Commands:
//! - `segment`: segment every series of a CSV, from a TOML config or flags
//! - `synth`: write a synthetic CSV with known regular-price changes

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use regprice_core::{MaxSplits, MissingPolicy};
use regprice_runner::{
    generate_batch, run_from_config, save_artifacts, write_csv, InputConfig, RunConfig,
    RunReport, SyntheticConfig, TimeFormat,
};

#[derive(Parser)]
#[command(
    name = "regprice",
    about = "Regprice: recover regular prices from promotional price series"
)]
struct Cli {
    /// More log output (-v debug, -vv trace). Overrides RUST_LOG.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Segment every series of a CSV file and write the artifacts.
    Segment(SegmentArgs),
    /// Write a synthetic price CSV with known regular-price changes.
    Synth(SynthArgs),
}

#[derive(Args, Debug)]
struct SegmentArgs {
    /// Path to a TOML run config. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input CSV (required without --config).
    #[arg(long)]
    input: Option<PathBuf>,

    /// Column holding the series id. Without it the file is one series.
    #[arg(long)]
    series_column: Option<String>,

    #[arg(long)]
    time_column: Option<String>,

    #[arg(long)]
    price_column: Option<String>,

    /// Parse the time column as dates with this chrono format (e.g. %Y-%m-%d).
    #[arg(long)]
    date: Option<String>,

    /// Minimum partition span in time units.
    #[arg(long)]
    min_leaf_size: Option<usize>,

    /// Cap on accepted splits per series. Unbounded when absent.
    #[arg(long)]
    max_splits: Option<usize>,

    /// Scoring of cuts with an all-missing side.
    #[arg(long, value_enum)]
    missing: Option<MissingArg>,

    /// Also scan the partitions of each round in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Segment series one after another instead of on the thread pool.
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Output directory for artifacts.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Print the summary only; write no artifacts.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MissingArg {
    Disqualify,
    Zero,
}

impl From<MissingArg> for MissingPolicy {
    fn from(arg: MissingArg) -> Self {
        match arg {
            MissingArg::Disqualify => MissingPolicy::Disqualify,
            MissingArg::Zero => MissingPolicy::ZeroContribution,
        }
    }
}

#[derive(Args, Debug)]
struct SynthArgs {
    /// Output CSV path.
    #[arg(long, default_value = "synthetic.csv")]
    output: PathBuf,

    /// Number of series.
    #[arg(long, default_value_t = 10)]
    count: usize,

    /// Observations per series.
    #[arg(long, default_value_t = 365)]
    length: usize,

    /// Regular-price changes per series.
    #[arg(long, default_value_t = 2)]
    changes: usize,

    /// Daily probability that a promotion starts.
    #[arg(long, default_value_t = 0.03)]
    promo_rate: f64,

    /// Share of missing observations.
    #[arg(long, default_value_t = 0.02)]
    missing_rate: f64,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Segment(args) => run_segment(args),
        Commands::Synth(args) => run_synth(args),
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Merge the TOML config (if any) with command-line overrides.
fn build_run_config(args: &SegmentArgs) -> Result<RunConfig> {
    let mut config = match (&args.config, &args.input) {
        (Some(path), _) => RunConfig::from_file(path)?,
        (None, Some(input)) => RunConfig::new(InputConfig::new(input), Default::default()),
        (None, None) => bail!("one of --config or --input is required"),
    };

    if let (Some(_), Some(input)) = (&args.config, &args.input) {
        config.input.path = input.clone();
    }
    if let Some(c) = &args.series_column {
        config.input.series_column = Some(c.clone());
    }
    if let Some(c) = &args.time_column {
        config.input.time_column = c.clone();
    }
    if let Some(c) = &args.price_column {
        config.input.price_column = c.clone();
    }
    if let Some(fmt) = &args.date {
        config.input.time_format = TimeFormat::Date;
        config.input.date_format = fmt.clone();
    }
    if let Some(n) = args.min_leaf_size {
        config.engine.min_leaf_size = n;
    }
    if let Some(n) = args.max_splits {
        config.engine.max_splits = MaxSplits::Limit(n);
    }
    if let Some(m) = args.missing {
        config.engine.missing_policy = m.into();
    }
    if args.parallel {
        config.engine.parallel = true;
    }
    if args.sequential {
        config.parallel_series = false;
    }
    if let Some(dir) = &args.output_dir {
        config.output.dir = dir.clone();
    }

    config.validate()?;
    Ok(config)
}

fn run_segment(args: SegmentArgs) -> Result<()> {
    let config = build_run_config(&args)?;
    let report = run_from_config(&config)
        .with_context(|| format!("segmentation of {} failed", config.input.path.display()))?;

    print_summary(&report);

    if !args.dry_run {
        let run_dir = save_artifacts(&report, &config.output)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn print_summary(report: &RunReport) {
    const SHOWN: usize = 20;

    println!(
        "{:<20} {:>6} {:>7} {:>6} {:>10}",
        "series", "obs", "missing", "splits", "regular"
    );
    for r in report.results.iter().take(SHOWN) {
        let levels: Vec<String> = r
            .partitions
            .iter()
            .map(|p| p.regular_price.map_or("-".to_string(), |v| format!("{v:.2}")))
            .collect();
        println!(
            "{:<20} {:>6} {:>7} {:>6} {:>10}",
            r.id,
            r.observations,
            r.missing,
            r.splits.len(),
            levels.join(" → ")
        );
    }
    if report.results.len() > SHOWN {
        println!("... {} more", report.results.len() - SHOWN);
    }
    for f in &report.failures {
        println!("{:<20} FAILED: {}", f.id, f.error);
    }

    let s = &report.summary;
    println!();
    println!(
        "{} series: {} segmented, {} failed, {} splits, {:.2} partitions/series, {} capped",
        s.series, s.segmented, s.failed, s.splits, s.mean_partitions, s.capped
    );
}

fn run_synth(args: SynthArgs) -> Result<()> {
    let config = SyntheticConfig {
        length: args.length,
        regular_changes: args.changes,
        promo_rate: args.promo_rate,
        missing_rate: args.missing_rate,
        seed: args.seed,
        ..SyntheticConfig::default()
    };
    let batch = generate_batch(&config, args.count)?;
    write_csv(&args.output, &batch)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    tracing::info!(series = batch.len(), path = %args.output.display(), "synthetic data written");
    println!(
        "Wrote {} series x {} observations to {}",
        batch.len(),
        args.length,
        args.output.display()
    );
    Ok(())
}
