//! Frequency table, mode and percentiles for one variable.
//!
//! This module is the companion of [`engine`](crate::engine): it shares the
//! classification and weighting rules but produces the statistics the engine leaves
//! out. Percentiles use the same weighted-average rule as the engine's median.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::cell::{format_number, Cell};
use crate::classifier::{classify, numeric_value, CellClass};
use crate::dispatch::Treatment;
use crate::engine::{check_inputs, ordinal_rows, row_weight, valid_rows};
use crate::error::StatsResult;
use crate::median::WeightedDistribution;
use crate::options::DescriptivesOptions;
use crate::perf_debug;
use crate::variable::VariableDescriptor;

/// One distinct value with its weighted and unweighted frequency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    /// The value as first seen in the column.
    pub value: Cell,
    /// Rows holding the value.
    pub count: usize,
    /// Sum of the weights of those rows.
    pub weight: f64,
}

/// A requested percentile and its value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentileValue {
    pub percentile: f64,
    /// `None` when the valid values are not all numeric or there are none.
    pub value: Option<f64>,
}

/// Frequency output for one variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencySummary {
    pub variable: String,
    pub treatment: Treatment,
    /// Distinct valid values, ordered numerically when all are numeric and by text
    /// otherwise.
    pub categories: Vec<CategoryCount>,
    /// The most frequent value(s) by weight, in category order. `None` when modes
    /// were not requested.
    pub modes: Option<Vec<Cell>>,
    /// Present for numeric and ordinal treatments.
    pub percentiles: Option<Vec<PercentileValue>>,
}

impl FrequencySummary {
    /// Looks up a computed percentile by its requested value.
    pub fn percentile(&self, p: f64) -> Option<f64> {
        self.percentiles
            .as_ref()?
            .iter()
            .find(|pv| pv.percentile == p)
            .and_then(|pv| pv.value)
    }

    /// Total weight over all categories.
    pub fn total_weight(&self) -> f64 {
        self.categories.iter().map(|c| c.weight).sum()
    }
}

/// Builds the frequency table of a column together with its modes and percentiles.
///
/// Validity follows the engine: under numeric treatment, and for ordinal variables
/// with numeric or temporal storage, only numeric values count. Otherwise every
/// non-missing value is a category. Rows with an unusable weight are
/// skipped.
#[instrument(
    skip(variable, column, weights, options),
    fields(variable = %variable.name, rows = column.len())
)]
pub fn analyze(
    variable: &VariableDescriptor,
    column: &[Cell],
    weights: Option<&[Cell]>,
    options: &DescriptivesOptions,
) -> StatsResult<FrequencySummary> {
    check_inputs(variable, column, weights, options)?;
    let treatment = Treatment::resolve(variable, column);

    let valid: Vec<(&Cell, Option<f64>, f64)> = if treatment.numeric_context() {
        column
            .iter()
            .enumerate()
            .filter_map(|(i, cell)| match (classify(cell, variable), row_weight(weights, i)) {
                (CellClass::Value(x), Some(w)) => Some((cell, Some(x), w)),
                _ => None,
            })
            .collect()
    } else if treatment == Treatment::Ordinal {
        ordinal_rows(variable, column, weights)
            .into_iter()
            .map(|(_, cell, x, w)| (cell, x, w))
            .collect()
    } else {
        valid_rows(variable, column, weights)
            .map(|(i, cell)| {
                (
                    cell,
                    numeric_value(cell, variable.var_type),
                    row_weight(weights, i).unwrap_or(1.0),
                )
            })
            .collect()
    };

    let categories = tabulate(&valid);
    let modes = options.compute_modes.then(|| modes_of(&categories));

    let percentiles = if treatment.exposes_percentiles() {
        let rows: Option<Vec<(f64, f64)>> = valid.iter().map(|(_, x, w)| x.map(|x| (x, *w))).collect();
        let distribution = rows.as_deref().and_then(WeightedDistribution::from_rows);
        if distribution.is_none() && !valid.is_empty() {
            perf_debug!(options.log, "Non-numeric values present; percentiles undefined");
        }
        Some(
            options
                .percentiles
                .iter()
                .map(|&p| PercentileValue {
                    percentile: p,
                    value: distribution.as_ref().map(|d| d.percentile(p)),
                })
                .collect(),
        )
    } else {
        None
    };

    debug!(
        categories = categories.len(),
        modes = modes.as_ref().map_or(0, Vec::len),
        "Computed frequencies"
    );

    Ok(FrequencySummary {
        variable: variable.name.clone(),
        treatment,
        categories,
        modes,
        percentiles,
    })
}

/// Groups valid rows into categories. Numeric values are keyed by value so that
/// `1`, `"1"` and `"1.0"` fall together; other values by their trimmed text.
fn tabulate(valid: &[(&Cell, Option<f64>, f64)]) -> Vec<CategoryCount> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut categories: Vec<(CategoryCount, Option<f64>)> = Vec::new();

    for &(cell, x, w) in valid {
        let key = match x {
            Some(x) => format_number(x),
            None => cell.text().trim().to_string(),
        };
        match index.get(&key) {
            Some(&i) => {
                categories[i].0.count += 1;
                categories[i].0.weight += w;
            }
            None => {
                index.insert(key, categories.len());
                categories.push((
                    CategoryCount {
                        value: cell.clone(),
                        count: 1,
                        weight: w,
                    },
                    x,
                ));
            }
        }
    }

    let all_numeric = categories.iter().all(|(_, x)| x.is_some());
    categories.sort_by(|(a, ax), (b, bx)| match (all_numeric, ax, bx) {
        (true, Some(ax), Some(bx)) => ax.partial_cmp(bx).unwrap_or(Ordering::Equal),
        _ => a.value.text().trim().cmp(b.value.text().trim()),
    });

    categories.into_iter().map(|(c, _)| c).collect()
}

fn modes_of(categories: &[CategoryCount]) -> Vec<Cell> {
    let Some(top) = categories
        .iter()
        .map(|c| c.weight)
        .max_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
    else {
        return Vec::new();
    };

    categories
        .iter()
        .filter(|c| c.weight == top)
        .map(|c| c.value.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::column;
    use crate::classifier::date_to_seconds;
    use crate::variable::{MeasurementLevel, VariableType};

    #[test]
    fn test_nominal_mode() {
        let variable =
            VariableDescriptor::new("v", VariableType::String, MeasurementLevel::Nominal);
        let cells = column(["a", "b", "a", "", "null", "b", "b"]);
        let summary = analyze(&variable, &cells, None, &DescriptivesOptions::default()).unwrap();

        assert_eq!(summary.modes, Some(vec![Cell::from("b")]));
        assert_eq!(summary.categories.len(), 2);
        assert_eq!(summary.categories[0].value, Cell::from("a"));
        assert_eq!(summary.categories[0].count, 2);
        assert_eq!(summary.total_weight(), 5.0);
        assert!(summary.percentiles.is_none());
    }

    #[test]
    fn test_ordinal_percentiles_and_tied_modes() {
        let variable =
            VariableDescriptor::new("v", VariableType::Numeric, MeasurementLevel::Ordinal);
        let cells = column([6.0, 5.0, 4.0, 3.0, 2.0, 1.0]);
        let summary = analyze(&variable, &cells, None, &DescriptivesOptions::default()).unwrap();

        assert_eq!(summary.percentile(25.0), Some(1.75));
        assert_eq!(summary.percentile(50.0), Some(3.5));
        assert_eq!(summary.percentile(75.0), Some(5.25));
        assert_eq!(
            summary.modes,
            Some(column([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]))
        );
    }

    #[test]
    fn test_numeric_keys_merge_spellings() {
        let variable =
            VariableDescriptor::new("v", VariableType::String, MeasurementLevel::Scale);
        let cells = column([Cell::from(10.0), Cell::from("10"), Cell::from("9"), Cell::from("x")]);
        let summary = analyze(&variable, &cells, None, &DescriptivesOptions::default()).unwrap();

        assert_eq!(summary.categories.len(), 2);
        assert_eq!(summary.categories[0].value, Cell::from("9"));
        assert_eq!(summary.categories[1].count, 2);
        assert_eq!(summary.modes, Some(vec![Cell::from(10.0)]));
    }

    #[test]
    fn test_weighted_mode() {
        let variable =
            VariableDescriptor::new("v", VariableType::String, MeasurementLevel::Nominal);
        let cells = column(["a", "b", "b"]);
        let weights = column([5.0, 1.0, 1.0]);
        let summary =
            analyze(&variable, &cells, Some(&weights), &DescriptivesOptions::default()).unwrap();
        assert_eq!(summary.modes, Some(vec![Cell::from("a")]));
    }

    #[test]
    fn test_ordinal_text_percentiles_undefined() {
        let variable =
            VariableDescriptor::new("v", VariableType::String, MeasurementLevel::Ordinal);
        let summary = analyze(
            &variable,
            &column(["low", "mid", "high"]),
            None,
            &DescriptivesOptions::default().with_modes(false),
        )
        .unwrap();
        assert!(summary.modes.is_none());
        assert_eq!(summary.percentile(50.0), None);
        assert_eq!(summary.percentiles.as_ref().map(Vec::len), Some(3));
    }

    #[test]
    fn test_ordinal_numeric_nan_excluded_from_percentiles() {
        let variable =
            VariableDescriptor::new("v", VariableType::Numeric, MeasurementLevel::Ordinal);
        let cells = column([Cell::from(1.0), Cell::from(2.0), Cell::from(3.0), Cell::from(f64::NAN)]);
        let summary = analyze(&variable, &cells, None, &DescriptivesOptions::default()).unwrap();

        assert_eq!(summary.categories.len(), 3);
        assert_eq!(summary.total_weight(), 3.0);
        assert_eq!(summary.percentile(50.0), Some(2.0));
        assert_eq!(summary.percentile(25.0), Some(1.0));
    }

    #[test]
    fn test_ordinal_date_percentiles_skip_garbage() {
        let variable =
            VariableDescriptor::new("v", VariableType::Date, MeasurementLevel::Ordinal);
        let cells = column(["2024-03-01", "garbage", "2024-03-03", "2024-03-02"]);
        let summary = analyze(&variable, &cells, None, &DescriptivesOptions::default()).unwrap();

        assert_eq!(summary.categories.len(), 3);
        assert_eq!(summary.percentile(50.0), date_to_seconds("2024-03-02"));
        assert!(summary.percentile(50.0).is_some());
    }
}
