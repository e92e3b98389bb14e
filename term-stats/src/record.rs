//! The structured statistics record returned to hosts.
//!
//! A statistic that is not exposed for the variable's treatment is absent from the
//! record (and from its JSON form). A statistic that is exposed but undefined for the
//! observed weight total is present with value `None` (JSON `null`).

use serde::Serialize;

use crate::moments::DerivedMoments;
use crate::types::MetricValue;

/// Summary statistics for one variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsRecord {
    /// Rows in the column.
    #[serde(rename = "N")]
    pub n: usize,
    /// Rows that contributed to the statistics.
    #[serde(rename = "Valid")]
    pub valid: usize,
    /// Rows excluded as missing, non-numeric or carrying an unusable weight.
    #[serde(rename = "Missing")]
    pub missing: usize,
    /// Total case weight of the valid rows. Equals `valid` for unweighted columns.
    #[serde(rename = "SumOfWeights")]
    pub sum_of_weights: f64,
    /// Moments and extremes, present for numeric treatment only.
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub moments: Option<NumericSummary>,
    /// Order statistics, present for numeric and ordinal treatment.
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderSummary>,
}

/// Moment-based statistics and extremes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct NumericSummary {
    #[serde(rename = "Mean")]
    pub mean: Option<f64>,
    #[serde(rename = "Sum")]
    pub sum: Option<f64>,
    #[serde(rename = "StdDev")]
    pub std_dev: Option<f64>,
    #[serde(rename = "Variance")]
    pub variance: Option<f64>,
    #[serde(rename = "SEMean")]
    pub se_mean: Option<f64>,
    #[serde(rename = "Minimum")]
    pub minimum: Option<f64>,
    #[serde(rename = "Maximum")]
    pub maximum: Option<f64>,
    #[serde(rename = "Range")]
    pub range: Option<f64>,
    #[serde(rename = "Skewness")]
    pub skewness: Option<f64>,
    #[serde(rename = "SESkewness")]
    pub se_skewness: Option<f64>,
    #[serde(rename = "Kurtosis")]
    pub kurtosis: Option<f64>,
    #[serde(rename = "SEKurtosis")]
    pub se_kurtosis: Option<f64>,
}

impl From<DerivedMoments> for NumericSummary {
    fn from(d: DerivedMoments) -> Self {
        Self {
            mean: d.mean,
            sum: d.sum,
            std_dev: d.std_dev,
            variance: d.variance,
            se_mean: d.se_mean,
            minimum: d.minimum,
            maximum: d.maximum,
            range: d.range,
            skewness: d.skewness,
            se_skewness: d.se_skewness,
            kurtosis: d.kurtosis,
            se_kurtosis: d.se_kurtosis,
        }
    }
}

/// Order statistics computed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct OrderSummary {
    #[serde(rename = "Median")]
    pub median: Option<f64>,
}

impl StatisticsRecord {
    /// Creates a record with counts only.
    pub fn counts(n: usize, valid: usize, sum_of_weights: f64) -> Self {
        Self {
            n,
            valid,
            missing: n - valid,
            sum_of_weights,
            moments: None,
            order: None,
        }
    }

    pub fn mean(&self) -> Option<f64> {
        self.moments.and_then(|m| m.mean)
    }

    pub fn sum(&self) -> Option<f64> {
        self.moments.and_then(|m| m.sum)
    }

    pub fn std_dev(&self) -> Option<f64> {
        self.moments.and_then(|m| m.std_dev)
    }

    pub fn variance(&self) -> Option<f64> {
        self.moments.and_then(|m| m.variance)
    }

    pub fn range(&self) -> Option<f64> {
        self.moments.and_then(|m| m.range)
    }

    pub fn median(&self) -> Option<f64> {
        self.order.and_then(|o| o.median)
    }

    /// Flattens the exposed fields into `(name, value)` pairs using the record's
    /// field names. Absent fields are skipped; undefined ones map to
    /// [`MetricValue::Undefined`].
    pub fn metrics(&self) -> Vec<(&'static str, MetricValue)> {
        let mut out = vec![
            ("N", MetricValue::from(self.n)),
            ("Valid", MetricValue::from(self.valid)),
            ("Missing", MetricValue::from(self.missing)),
            ("SumOfWeights", MetricValue::Double(self.sum_of_weights)),
        ];

        if let Some(m) = &self.moments {
            out.extend([
                ("Mean", MetricValue::from(m.mean)),
                ("Sum", MetricValue::from(m.sum)),
                ("StdDev", MetricValue::from(m.std_dev)),
                ("Variance", MetricValue::from(m.variance)),
                ("SEMean", MetricValue::from(m.se_mean)),
                ("Minimum", MetricValue::from(m.minimum)),
                ("Maximum", MetricValue::from(m.maximum)),
                ("Range", MetricValue::from(m.range)),
                ("Skewness", MetricValue::from(m.skewness)),
                ("SESkewness", MetricValue::from(m.se_skewness)),
                ("Kurtosis", MetricValue::from(m.kurtosis)),
                ("SEKurtosis", MetricValue::from(m.se_kurtosis)),
            ]);
        }
        if let Some(o) = &self.order {
            out.push(("Median", MetricValue::from(o.median)));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_counts_only_record_omits_statistics() {
        let record = StatisticsRecord::counts(7, 5, 5.0);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({ "N": 7, "Valid": 5, "Missing": 2, "SumOfWeights": 5.0 })
        );
        assert_eq!(record.mean(), None);
        assert_eq!(record.median(), None);
    }

    #[test]
    fn test_undefined_statistics_serialize_as_null() {
        let mut record = StatisticsRecord::counts(1, 1, 1.0);
        record.moments = Some(NumericSummary {
            mean: Some(3.0),
            ..NumericSummary::default()
        });
        record.order = Some(OrderSummary { median: Some(3.0) });

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["Mean"], json!(3.0));
        assert_eq!(value["Variance"], json!(null));
        assert_eq!(value["SEKurtosis"], json!(null));
        assert_eq!(value["Median"], json!(3.0));
    }

    #[test]
    fn test_metrics_flattening() {
        let mut record = StatisticsRecord::counts(3, 2, 2.0);
        record.order = Some(OrderSummary { median: None });
        let metrics = record.metrics();
        let names: Vec<_> = metrics.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["N", "Valid", "Missing", "SumOfWeights", "Median"]);
        assert_eq!(metrics[4].1, MetricValue::Undefined);
    }
}
