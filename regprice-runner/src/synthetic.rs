//! Synthetic retail price series with known regular prices.
//!
//! A series starts at `base_price`, changes its regular price at a few random
//! points, and is overlaid with short temporary promotions and missing days.
//! The ground truth (regular price per day and the change points) is returned
//! alongside, so segmentation quality can be checked.
//!
//! Seeds are derived per series id with BLAKE3, so a batch is identical no
//! matter how many series it has or in which order they are generated.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::ConfigError;

/// Generator parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    /// Observations per series (daily, time index `1..=length`).
    pub length: usize,
    pub base_price: f64,
    /// Number of regular-price changes per series.
    pub regular_changes: usize,
    /// Relative size of a regular-price change, drawn uniformly.
    pub change_range: (f64, f64),
    /// Probability that a promotion starts on a non-promoted day.
    pub promo_rate: f64,
    pub promo_length: (usize, usize),
    /// Promotion depth as a fraction of the regular price.
    pub promo_depth: (f64, f64),
    pub missing_rate: f64,
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            length: 365,
            base_price: 4.99,
            regular_changes: 2,
            change_range: (-0.15, 0.25),
            promo_rate: 0.03,
            promo_length: (3, 10),
            promo_depth: (0.1, 0.4),
            missing_rate: 0.02,
            seed: 42,
        }
    }
}

impl SyntheticConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| -> Result<(), ConfigError> { Err(ConfigError::Invalid(msg)) };
        if self.length < 2 {
            return invalid(format!("length must be >= 2; got {}", self.length));
        }
        if !(self.base_price.is_finite() && self.base_price > 0.0) {
            return invalid(format!("base_price must be positive; got {}", self.base_price));
        }
        if self.regular_changes >= self.length {
            return invalid(format!(
                "regular_changes ({}) must be below length ({})",
                self.regular_changes, self.length
            ));
        }
        for (name, rate) in [("promo_rate", self.promo_rate), ("missing_rate", self.missing_rate)] {
            if !(0.0..=1.0).contains(&rate) {
                return invalid(format!("{name} must be in [0, 1]; got {rate}"));
            }
        }
        let (lo, hi) = self.change_range;
        if !(lo <= hi && lo > -1.0) {
            return invalid(format!("change_range ({lo}, {hi}) is not a valid range above -1"));
        }
        let (lo, hi) = self.promo_length;
        if lo == 0 || lo > hi {
            return invalid(format!("promo_length ({lo}, {hi}) must be a non-empty range >= 1"));
        }
        let (lo, hi) = self.promo_depth;
        if !(lo > 0.0 && lo <= hi && hi < 1.0) {
            return invalid(format!("promo_depth ({lo}, {hi}) must lie in (0, 1)"));
        }
        Ok(())
    }

    /// Seed for one series, independent of generation order.
    pub fn sub_seed(&self, id: &str) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.seed.to_le_bytes());
        hasher.update(id.as_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }
}

/// One generated series with its ground truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticSeries {
    pub id: String,
    pub time_index: Vec<i64>,
    /// Observed prices; `NaN` marks a missing day.
    pub prices: Vec<f64>,
    /// True regular price on every day.
    pub regular: Vec<f64>,
    /// Last day of each regular-price regime except the final one.
    pub change_points: Vec<i64>,
}

fn cents(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Generate one series.
pub fn generate(config: &SyntheticConfig, id: &str) -> Result<SyntheticSeries, ConfigError> {
    config.validate()?;
    let mut rng = StdRng::seed_from_u64(config.sub_seed(id));
    let n = config.length;

    // Regime ends are positions 0..n-1 so that each regime is non-empty.
    let mut ends: Vec<usize> = sample(&mut rng, n - 1, config.regular_changes).into_vec();
    ends.sort_unstable();

    let mut regular = Vec::with_capacity(n);
    let mut level = cents(config.base_price);
    let mut next_change = ends.iter().peekable();
    for day in 0..n {
        regular.push(level);
        if next_change.next_if(|&&end| end == day).is_some() {
            let (lo, hi) = config.change_range;
            let step = if lo < hi { rng.gen_range(lo..hi) } else { lo };
            let changed = cents(level * (1.0 + step)).max(0.01);
            // Keep every regime distinguishable from its neighbour.
            level = if changed == level { cents(level + 0.01) } else { changed };
        }
    }

    let mut prices = regular.clone();
    let mut day = 0;
    while day < n {
        if rng.gen_bool(config.promo_rate) {
            let (lo, hi) = config.promo_length;
            let len = rng.gen_range(lo..=hi);
            let (dlo, dhi) = config.promo_depth;
            let depth = if dlo < dhi { rng.gen_range(dlo..dhi) } else { dlo };
            for p in prices.iter_mut().skip(day).take(len) {
                *p = cents(*p * (1.0 - depth)).min(*p - 0.01).max(0.01);
            }
            day += len;
        } else {
            day += 1;
        }
    }

    for p in prices.iter_mut() {
        if rng.gen_bool(config.missing_rate) {
            *p = f64::NAN;
        }
    }

    Ok(SyntheticSeries {
        id: id.to_string(),
        time_index: (1..=n as i64).collect(),
        prices,
        regular,
        change_points: ends.into_iter().map(|e| e as i64 + 1).collect(),
    })
}

/// Generate `count` series named `sku-0001`, `sku-0002`, ...
pub fn generate_batch(
    config: &SyntheticConfig,
    count: usize,
) -> Result<Vec<SyntheticSeries>, ConfigError> {
    (1..=count)
        .map(|i| generate(config, &format!("sku-{i:04}")))
        .collect()
}

/// Write series in the long CSV layout the loader reads
/// (`series,time,price,regular`; missing prices are blank).
pub fn write_csv(path: &Path, series: &[SyntheticSeries]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["series", "time", "price", "regular"])?;
    for s in series {
        for ((t, p), r) in s.time_index.iter().zip(&s.prices).zip(&s.regular) {
            let price = if p.is_nan() { String::new() } else { p.to_string() };
            writer.write_record([s.id.clone(), t.to_string(), price, r.to_string()])?;
        }
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_is_deterministic_per_id() {
        let cfg = SyntheticConfig::default();
        let a = generate(&cfg, "sku-1").unwrap();
        let b = generate(&cfg, "sku-1").unwrap();
        let c = generate(&cfg, "sku-2").unwrap();
        assert_eq!(a.regular, b.regular);
        assert_eq!(a.change_points, b.change_points);
        let bits = |s: &SyntheticSeries| s.prices.iter().map(|p| p.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
        assert_ne!(bits(&a), bits(&c));
    }

    #[test]
    fn batch_order_does_not_change_series() {
        let cfg = SyntheticConfig::default();
        let batch = generate_batch(&cfg, 3).unwrap();
        let third = generate(&cfg, "sku-0003").unwrap();
        assert_eq!(batch[2].regular, third.regular);
    }

    #[test]
    fn ground_truth_shape() {
        let cfg = SyntheticConfig {
            length: 200,
            regular_changes: 3,
            ..SyntheticConfig::default()
        };
        let s = generate(&cfg, "x").unwrap();
        assert_eq!(s.prices.len(), 200);
        assert_eq!(s.regular.len(), 200);
        assert_eq!(s.change_points.len(), 3);
        assert!(s.change_points.windows(2).all(|w| w[0] < w[1]));
        // Regular price changes exactly after each change point.
        let changes: Vec<i64> = s
            .regular
            .windows(2)
            .enumerate()
            .filter(|(_, w)| w[0] != w[1])
            .map(|(i, _)| i as i64 + 1)
            .collect();
        assert_eq!(changes, s.change_points);
    }

    #[test]
    fn observed_prices_never_exceed_regular() {
        let cfg = SyntheticConfig {
            promo_rate: 0.2,
            ..SyntheticConfig::default()
        };
        let s = generate(&cfg, "promo-heavy").unwrap();
        for (p, r) in s.prices.iter().zip(&s.regular) {
            assert!(p.is_nan() || p <= r);
        }
        assert!(s.prices.iter().zip(&s.regular).any(|(p, r)| p < r));
    }

    #[test]
    fn no_noise_gives_pure_step_function() {
        let cfg = SyntheticConfig {
            promo_rate: 0.0,
            missing_rate: 0.0,
            ..SyntheticConfig::default()
        };
        let s = generate(&cfg, "clean").unwrap();
        assert_eq!(s.prices, s.regular);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let base = SyntheticConfig::default;
        let short = SyntheticConfig { length: 1, ..base() };
        assert!(generate(&short, "x").is_err());
        let rate = SyntheticConfig { missing_rate: 1.5, ..base() };
        assert!(rate.validate().is_err());
        let depth = SyntheticConfig { promo_depth: (0.5, 1.0), ..base() };
        assert!(depth.validate().is_err());
        let changes = SyntheticConfig { length: 3, regular_changes: 3, ..base() };
        assert!(changes.validate().is_err());
    }
}
