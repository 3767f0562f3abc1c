//! Running mean and residual sum of squares (Welford).
//!
//! Missing observations (`NaN`) are skipped: they contribute neither to the
//! count nor to the moments.

/// Welford accumulator over the observed values of a segment.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Moments {
    count: usize,
    mean: f64,
    m2: f64,
}

impl Moments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate a whole slice.
    pub fn from_slice(values: &[f64]) -> Self {
        let mut m = Self::new();
        for &x in values {
            m.push(x);
        }
        m
    }

    /// Add one value. `NaN` is ignored.
    pub fn push(&mut self, x: f64) {
        if x.is_nan() {
            return;
        }
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    /// Number of observed values.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Mean of the observed values, `None` if nothing was observed.
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    /// Residual sum of squares around the mean, `None` if nothing was observed.
    pub fn rss(&self) -> Option<f64> {
        (self.count > 0).then_some(self.m2)
    }
}

/// Mean of the observed values in `values`.
pub fn observed_mean(values: &[f64]) -> Option<f64> {
    Moments::from_slice(values).mean()
}

/// Running moments of every prefix: `out[i]` covers `values[..=i]`.
pub fn prefix_moments(values: &[f64]) -> Vec<Moments> {
    let mut acc = Moments::new();
    values
        .iter()
        .map(|&x| {
            acc.push(x);
            acc
        })
        .collect()
}

/// Running moments of every suffix: `out[i]` covers `values[i..]`.
///
/// Accumulated right to left.
pub fn suffix_moments(values: &[f64]) -> Vec<Moments> {
    let mut out = vec![Moments::new(); values.len()];
    let mut acc = Moments::new();
    for (i, &x) in values.iter().enumerate().rev() {
        acc.push(x);
        out[i] = acc;
    }
    out
}
