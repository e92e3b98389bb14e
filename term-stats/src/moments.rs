//! Weighted moment accumulation and the derived small-sample statistics.
//!
//! Accumulation happens in two passes. The first pass ([`MomentAccumulator::observe`])
//! collects the weight total, weighted sum, extremes and the retained `(value, weight)`
//! rows. The second pass ([`MomentAccumulator::finish`]) sums weighted powers of the
//! deviations from the mean over the retained rows only, which keeps the central
//! moments stable for values far from zero.

use serde::{Deserialize, Serialize};

/// First-pass accumulator over the valid rows of one column.
#[derive(Debug, Clone, Default)]
pub struct MomentAccumulator {
    count: u64,
    sum_weights: f64,
    weighted_sum: f64,
    min: Option<f64>,
    max: Option<f64>,
    rows: Vec<(f64, f64)>,
}

impl MomentAccumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one valid value with its case weight.
    pub fn observe(&mut self, x: f64, w: f64) {
        self.count += 1;
        self.sum_weights += w;
        self.weighted_sum += x * w;
        self.min = Some(self.min.map_or(x, |m| m.min(x)));
        self.max = Some(self.max.map_or(x, |m| m.max(x)));
        self.rows.push((x, w));
    }

    /// Number of valid rows observed.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Sum of the weights of the valid rows.
    pub fn sum_weights(&self) -> f64 {
        self.sum_weights
    }

    /// Weighted mean, or `None` when no weight has been observed.
    pub fn mean(&self) -> Option<f64> {
        if self.sum_weights == 0.0 {
            None
        } else {
            Some(self.weighted_sum / self.sum_weights)
        }
    }

    /// The retained `(value, weight)` rows in input order.
    pub fn rows(&self) -> &[(f64, f64)] {
        &self.rows
    }

    /// Runs the second pass and returns the complete moment state.
    pub fn finish(&self) -> CentralMoments {
        let mean = self.mean();
        let mut state = CentralMoments {
            count: self.count,
            sum_weights: self.sum_weights,
            sum_sq_weights: 0.0,
            weighted_sum: self.weighted_sum,
            mean,
            m2: 0.0,
            m3: 0.0,
            m4: 0.0,
            min: self.min,
            max: self.max,
        };

        if let Some(mean) = mean {
            for &(x, w) in &self.rows {
                let d = x - mean;
                let d2 = d * d;
                state.m2 += w * d2;
                state.m3 += w * d2 * d;
                state.m4 += w * d2 * d2;
                state.sum_sq_weights += w * w;
            }
        }

        state
    }
}

/// Raw accumulators after both passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralMoments {
    /// Number of valid rows (N).
    pub count: u64,
    /// Sum of valid weights (W).
    pub sum_weights: f64,
    /// Sum of squared valid weights (W2).
    pub sum_sq_weights: f64,
    /// Weighted sum (S).
    pub weighted_sum: f64,
    /// Weighted mean (M1).
    pub mean: Option<f64>,
    /// Weighted sum of squared deviations.
    pub m2: f64,
    /// Weighted sum of cubed deviations.
    pub m3: f64,
    /// Weighted sum of fourth-power deviations.
    pub m4: f64,
    /// Smallest valid value.
    pub min: Option<f64>,
    /// Largest valid value.
    pub max: Option<f64>,
}

impl CentralMoments {
    /// Derives every statistic once. Variance and standard deviation are computed a
    /// single time and reused by the standard error, skewness and kurtosis.
    pub fn derive(&self) -> DerivedMoments {
        let w = self.sum_weights;
        let has_rows = self.count > 0;

        let variance = if w > 1.0 {
            finite(self.m2 / (w - 1.0))
        } else {
            None
        };
        let std_dev = variance.and_then(|v| finite(v.sqrt()));
        let spread = std_dev.filter(|_| variance.is_some_and(|v| v > 0.0));

        let se_mean = std_dev.and_then(|s| finite(s / w.sqrt()));

        let skewness = match spread {
            Some(s) if w >= 3.0 => {
                finite((w * self.m3) / ((w - 1.0) * (w - 2.0) * s * s * s))
            }
            _ => None,
        };
        let se_skewness = if w >= 3.0 {
            finite((6.0 * w * (w - 1.0) / ((w - 2.0) * (w + 1.0) * (w + 3.0))).sqrt())
        } else {
            None
        };

        let kurtosis = match spread {
            Some(s) if w >= 4.0 => {
                let s4 = s * s * s * s;
                finite(
                    (w * (w + 1.0) * self.m4 - 3.0 * self.m2 * self.m2 * (w - 1.0))
                        / ((w - 1.0) * (w - 2.0) * (w - 3.0) * s4),
                )
            }
            _ => None,
        };
        let se_kurtosis = if w >= 4.0 {
            finite(
                (24.0 * w * (w - 1.0) * (w - 1.0)
                    / ((w - 3.0) * (w - 2.0) * (w + 3.0) * (w + 5.0)))
                    .sqrt(),
            )
        } else {
            None
        };

        let (minimum, maximum) = if has_rows {
            (self.min, self.max)
        } else {
            (None, None)
        };
        let range = match (minimum, maximum) {
            (Some(lo), Some(hi)) => finite(hi - lo),
            _ => None,
        };

        DerivedMoments {
            mean: self.mean.and_then(finite),
            sum: if has_rows {
                finite(self.weighted_sum)
            } else {
                None
            },
            variance,
            std_dev,
            se_mean,
            skewness,
            se_skewness,
            kurtosis,
            se_kurtosis,
            minimum,
            maximum,
            range,
        }
    }
}

/// Statistics derived from [`CentralMoments`]. `None` marks a statistic whose
/// denominator would be zero or negative for the observed weight total.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DerivedMoments {
    pub mean: Option<f64>,
    pub sum: Option<f64>,
    pub variance: Option<f64>,
    pub std_dev: Option<f64>,
    pub se_mean: Option<f64>,
    pub skewness: Option<f64>,
    pub se_skewness: Option<f64>,
    pub kurtosis: Option<f64>,
    pub se_kurtosis: Option<f64>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub range: Option<f64>,
}

fn finite(x: f64) -> Option<f64> {
    x.is_finite().then_some(x)
}
