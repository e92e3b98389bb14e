//! The descriptive statistics engine.
//!
//! [`compute`] is a pure function of its inputs: it resolves the variable's
//! [`Treatment`], classifies every cell, accumulates the weighted moments of the valid
//! rows and assembles a [`StatisticsRecord`] holding exactly the statistics the
//! treatment exposes. Mode and percentiles are not computed here; see
//! [`frequencies`](crate::frequencies).

use serde::Serialize;
use tracing::{debug, instrument};

use crate::cell::Cell;
use crate::classifier::{classify, is_missing, numeric_value, weight_value, CellClass};
use crate::dispatch::Treatment;
use crate::error::{StatsError, StatsResult};
use crate::logging::truncate_field;
use crate::median::weighted_median;
use crate::moments::MomentAccumulator;
use crate::options::DescriptivesOptions;
use crate::record::{NumericSummary, OrderSummary, StatisticsRecord};
use crate::variable::{VariableDescriptor, VariableType};
use crate::zscore::{standardize, ZScore};
use crate::{log_cell, perf_debug};

/// Engine output for one variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Descriptives {
    /// Name of the variable.
    pub variable: String,
    /// The statistics set the variable was dispatched to.
    pub treatment: Treatment,
    pub stats: StatisticsRecord,
    /// One entry per input row when standardization was requested and defined. Rows
    /// without a usable value or weight are [`ZScore::Empty`].
    #[serde(rename = "zScores")]
    pub z_scores: Option<Vec<ZScore>>,
}

/// Computes the descriptive statistics of one column.
///
/// `weights`, when given, must have one cell per row. A row is excluded when its
/// value is missing or non-numeric, or when its weight is non-numeric or not
/// strictly positive. Such rows count towards `Missing`.
///
/// # Errors
///
/// Returns [`StatsError::LengthMismatch`] when the weight column is misaligned,
/// [`StatsError::InvalidDescriptor`] for a malformed missing-value specification and
/// [`StatsError::InvalidConfiguration`] for invalid options. Irregular cell values are
/// never errors.
///
/// # Examples
///
/// ```rust
/// use term_stats::prelude::*;
///
/// let variable = VariableDescriptor::new("x", VariableType::Numeric, MeasurementLevel::Scale);
/// let column = term_stats::cell::column([1.0, 2.0, 3.0, 4.0]);
/// let result = compute(&variable, &column, None, &DescriptivesOptions::default()).unwrap();
///
/// assert_eq!(result.stats.mean(), Some(2.5));
/// assert_eq!(result.stats.median(), Some(2.5));
/// ```
#[instrument(
    skip(variable, column, weights, options),
    fields(variable = %variable.name, rows = column.len(), weighted = weights.is_some())
)]
pub fn compute(
    variable: &VariableDescriptor,
    column: &[Cell],
    weights: Option<&[Cell]>,
    options: &DescriptivesOptions,
) -> StatsResult<Descriptives> {
    check_inputs(variable, column, weights, options)?;

    let treatment = Treatment::resolve(variable, column);
    perf_debug!(
        options.log,
        measure = %variable.measure,
        var_type = ?variable.var_type,
        treatment = %treatment,
        "Resolved treatment"
    );

    let (stats, z_scores) = match treatment {
        Treatment::Numeric => numeric_record(variable, column, weights, options),
        Treatment::Ordinal => (ordinal_record(variable, column, weights, options), None),
        Treatment::Categorical => (counts_record(variable, column, weights, options), None),
    };

    if options.log.log_metrics {
        debug!(
            valid = stats.valid,
            missing = stats.missing,
            sum_of_weights = stats.sum_of_weights,
            mean = ?stats.mean(),
            median = ?stats.median(),
            "Computed descriptives"
        );
    }

    Ok(Descriptives {
        variable: variable.name.clone(),
        treatment,
        stats,
        z_scores,
    })
}

/// Validates the call contract shared by every entry point.
pub(crate) fn check_inputs(
    variable: &VariableDescriptor,
    column: &[Cell],
    weights: Option<&[Cell]>,
    options: &DescriptivesOptions,
) -> StatsResult<()> {
    if let Some(weights) = weights {
        if weights.len() != column.len() {
            return Err(StatsError::LengthMismatch {
                column: column.len(),
                weights: weights.len(),
            });
        }
    }
    variable.validate()?;
    options.validate()
}

/// Weight of row `i`; 1 for unweighted columns, `None` when the row is excluded.
pub(crate) fn row_weight(weights: Option<&[Cell]>, i: usize) -> Option<f64> {
    match weights {
        Some(weights) => weights.get(i).and_then(weight_value),
        None => Some(1.0),
    }
}

fn numeric_record(
    variable: &VariableDescriptor,
    column: &[Cell],
    weights: Option<&[Cell]>,
    options: &DescriptivesOptions,
) -> (StatisticsRecord, Option<Vec<ZScore>>) {
    let mut acc = MomentAccumulator::new();

    for (i, cell) in column.iter().enumerate() {
        let class = classify(cell, variable);
        let weight = row_weight(weights, i);
        log_cell!(
            options.log,
            row = i,
            cell = %truncate_field(&cell.text(), options.log.max_field_length),
            class = ?class,
            weight = ?weight,
            "Classified cell"
        );
        if let (CellClass::Value(x), Some(w)) = (class, weight) {
            acc.observe(x, w);
        }
    }

    let derived = acc.finish().derive();
    let mut stats = StatisticsRecord::counts(column.len(), acc.count() as usize, acc.sum_weights());
    stats.moments = Some(NumericSummary::from(derived));
    stats.order = Some(OrderSummary {
        median: weighted_median(acc.rows()),
    });

    let z_scores = match (derived.mean, derived.std_dev) {
        (Some(mean), Some(sd)) if options.standardize && sd > 0.0 => {
            Some(standardize(variable, column, weights, mean, sd))
        }
        _ => {
            if options.standardize {
                perf_debug!(options.log, "Standard deviation undefined or zero; no z-scores");
            }
            None
        }
    };

    (stats, z_scores)
}

/// Counts, plus the median when every valid value is numeric.
fn ordinal_record(
    variable: &VariableDescriptor,
    column: &[Cell],
    weights: Option<&[Cell]>,
    options: &DescriptivesOptions,
) -> StatisticsRecord {
    let rows = ordinal_rows(variable, column, weights);
    for &(i, cell, x, w) in &rows {
        log_cell!(options.log, row = i, cell = %truncate_field(&cell.text(), options.log.max_field_length), value = ?x, weight = w, "Valid cell");
    }

    let sum_weights = rows.iter().map(|&(_, _, _, w)| w).sum();
    let mut stats = StatisticsRecord::counts(column.len(), rows.len(), sum_weights);

    let values: Option<Vec<(f64, f64)>> = rows.iter().map(|&(_, _, x, w)| x.map(|x| (x, w))).collect();
    let median = match values {
        Some(values) => weighted_median(&values),
        None => {
            perf_debug!(options.log, "Ordinal values are not numeric; median undefined");
            None
        }
    };
    stats.order = Some(OrderSummary { median });
    stats
}

fn counts_record(
    variable: &VariableDescriptor,
    column: &[Cell],
    weights: Option<&[Cell]>,
    options: &DescriptivesOptions,
) -> StatisticsRecord {
    let mut valid = 0;
    let mut sum_weights = 0.0;
    for (i, cell) in valid_rows(variable, column, weights) {
        log_cell!(options.log, row = i, cell = %truncate_field(&cell.text(), options.log.max_field_length), "Valid cell");
        valid += 1;
        sum_weights += row_weight(weights, i).unwrap_or(1.0);
    }
    StatisticsRecord::counts(column.len(), valid, sum_weights)
}

/// Rows that are not missing (outside a numeric context) and carry a usable weight.
pub(crate) fn valid_rows<'a>(
    variable: &'a VariableDescriptor,
    column: &'a [Cell],
    weights: Option<&'a [Cell]>,
) -> impl Iterator<Item = (usize, &'a Cell)> + 'a {
    column.iter().enumerate().filter(move |(i, cell)| {
        !is_missing(cell, &variable.missing, false) && row_weight(weights, *i).is_some()
    })
}

/// Rows an ordinal variable counts as valid, with their numeric value if any.
///
/// Numeric and temporal storage is read as numbers, so NaN, malformed values and
/// unparseable dates are missing. String storage keeps every non-missing value as a
/// category.
pub(crate) fn ordinal_rows<'a>(
    variable: &VariableDescriptor,
    column: &'a [Cell],
    weights: Option<&[Cell]>,
) -> Vec<(usize, &'a Cell, Option<f64>, f64)> {
    column
        .iter()
        .enumerate()
        .filter_map(|(i, cell)| {
            let w = row_weight(weights, i)?;
            if variable.var_type == VariableType::String {
                (!is_missing(cell, &variable.missing, false))
                    .then(|| (i, cell, numeric_value(cell, variable.var_type), w))
            } else {
                classify(cell, variable).value().map(|x| (i, cell, Some(x), w))
            }
        })
        .collect()
}
