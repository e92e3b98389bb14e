//! Weighted order statistics using SPSS's weighted-average rule ("Definition 1").
//!
//! Distinct values are sorted ascending with their aggregated weights. For a
//! percentile `p` the target rank is `tp = (W + 1) * p / 100`. The first value whose
//! cumulative weight reaches `tp` bounds the interpolation: if the gap between `tp`
//! and the cumulative weight below it is a full unit of weight or more, the upper
//! value is returned as is, otherwise the two neighbours are interpolated linearly by
//! the fractional gap.

use std::cmp::Ordering;

/// Distinct values of a weighted sample with cumulative weights.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedDistribution {
    values: Vec<f64>,
    cumulative: Vec<f64>,
}

impl WeightedDistribution {
    /// Builds the distribution from `(value, weight)` rows. Weights of equal values
    /// are summed. Returns `None` for an empty sample.
    pub fn from_rows(rows: &[(f64, f64)]) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }

        let mut sorted = rows.to_vec();
        sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

        let mut values: Vec<f64> = Vec::with_capacity(sorted.len());
        let mut weights: Vec<f64> = Vec::with_capacity(sorted.len());
        for (x, w) in sorted {
            match values.last() {
                Some(&last) if last == x => {
                    if let Some(total) = weights.last_mut() {
                        *total += w;
                    }
                }
                _ => {
                    values.push(x);
                    weights.push(w);
                }
            }
        }

        let mut running = 0.0;
        let cumulative = weights
            .iter()
            .map(|w| {
                running += w;
                running
            })
            .collect();

        Some(Self { values, cumulative })
    }

    /// Total weight of the sample (the last cumulative weight).
    pub fn total_weight(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Sorted distinct values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Cumulative weights aligned with [`values`](Self::values).
    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    /// Returns the `p`-th percentile, `p` in `[0, 100]`.
    pub fn percentile(&self, p: f64) -> f64 {
        let total = self.total_weight();
        let last = self.values.len() - 1;
        let tp = (total + 1.0) * (p / 100.0);

        let Some(i) = self.cumulative.iter().position(|&cc| cc >= tp) else {
            return self.values[last];
        };
        if i == 0 {
            return self.values[0];
        }

        let (x1, x2) = (self.values[i - 1], self.values[i]);
        let gap = tp - self.cumulative[i - 1];
        if gap >= 1.0 {
            x2
        } else {
            (1.0 - gap) * x1 + gap * x2
        }
    }

    /// Returns the weighted median.
    pub fn median(&self) -> f64 {
        self.percentile(50.0)
    }
}

/// Weighted median of `(value, weight)` rows, `None` for an empty sample.
pub fn weighted_median(rows: &[(f64, f64)]) -> Option<f64> {
    WeightedDistribution::from_rows(rows).map(|d| d.median())
}

/// Weighted `p`-th percentile of `(value, weight)` rows, `None` for an empty sample.
pub fn weighted_percentile(rows: &[(f64, f64)], p: f64) -> Option<f64> {
    WeightedDistribution::from_rows(rows).map(|d| d.percentile(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(values: &[f64]) -> Vec<(f64, f64)> {
        values.iter().map(|&x| (x, 1.0)).collect()
    }

    #[test]
    fn test_even_count_interpolates() {
        assert_eq!(weighted_median(&unit(&[1.0, 2.0, 3.0, 4.0])), Some(2.5));
        assert_eq!(
            weighted_median(&unit(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])),
            Some(3.5)
        );
    }

    #[test]
    fn test_odd_count_picks_middle() {
        assert_eq!(weighted_median(&unit(&[3.0, 1.0, 2.0])), Some(2.0));
        assert_eq!(weighted_median(&unit(&[9.0])), Some(9.0));
    }

    #[test]
    fn test_quartiles() {
        let rows = unit(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(weighted_percentile(&rows, 25.0), Some(1.75));
        assert_eq!(weighted_percentile(&rows, 75.0), Some(5.25));
    }

    #[test]
    fn test_extreme_percentiles() {
        let rows = unit(&[1.0, 2.0, 3.0]);
        assert_eq!(weighted_percentile(&rows, 0.0), Some(1.0));
        assert_eq!(weighted_percentile(&rows, 100.0), Some(3.0));
    }

    #[test]
    fn test_duplicate_values_aggregate() {
        let dist = WeightedDistribution::from_rows(&unit(&[2.0, 1.0, 2.0, 2.0])).unwrap();
        assert_eq!(dist.values(), &[1.0, 2.0]);
        assert_eq!(dist.cumulative(), &[1.0, 4.0]);
        assert_eq!(dist.total_weight(), 4.0);
    }

    #[test]
    fn test_weights_equal_expanded_sequence() {
        // 1 once, 2 three times: expanded [1, 2, 2, 2] has median 2.
        let weighted = vec![(1.0, 1.0), (2.0, 3.0)];
        assert_eq!(weighted_median(&weighted), Some(2.0));

        // 1 three times, 2 once: expanded [1, 1, 1, 2] has median 1.
        let weighted = vec![(1.0, 3.0), (2.0, 1.0)];
        assert_eq!(weighted_median(&weighted), Some(1.0));

        // 1 twice, 4 twice: expanded [1, 1, 4, 4] has median 2.5.
        let weighted = vec![(1.0, 2.0), (4.0, 2.0)];
        assert_eq!(weighted_median(&weighted), Some(2.5));
    }

    #[test]
    fn test_empty_sample() {
        assert_eq!(weighted_median(&[]), None);
        assert_eq!(weighted_percentile(&[], 25.0), None);
    }
}
