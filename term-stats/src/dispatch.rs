//! Measurement-level dispatch: which statistics a variable receives.
//!
//! The decision depends on the declared measurement level first and the storage type
//! second. It is resolved once per call into a [`Treatment`], so the rest of the
//! engine never branches on the descriptor directly.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cell::Cell;
use crate::classifier::{is_missing, numeric_value};
use crate::variable::{MeasurementLevel, VariableDescriptor, VariableType};

/// The set of statistics exposed for a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Treatment {
    /// Full numeric record: moments, extremes and median.
    Numeric,
    /// Counts and median; percentiles and mode come from the frequency module.
    Ordinal,
    /// Counts only; mode comes from the frequency module.
    Categorical,
}

/// How one cell of the decision table resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Always(Treatment),
    /// Numeric when every non-missing cell is numeric-coded, categorical otherwise.
    NumericIfCoded,
}

/// Decision table indexed by measurement level, then storage type.
fn rule_for(measure: MeasurementLevel, var_type: VariableType) -> Rule {
    use MeasurementLevel as M;
    use VariableType as T;

    match (measure, var_type) {
        (M::Nominal, _) => Rule::Always(Treatment::Categorical),
        (M::Ordinal, _) => Rule::Always(Treatment::Ordinal),
        (M::Scale, _) => Rule::Always(Treatment::Numeric),
        (M::Unknown, T::Numeric | T::Date | T::DateTime) => Rule::Always(Treatment::Numeric),
        (M::Unknown, T::String) => Rule::NumericIfCoded,
    }
}

impl Treatment {
    /// Resolves the treatment for a variable and its column.
    pub fn resolve(variable: &VariableDescriptor, column: &[Cell]) -> Self {
        match rule_for(variable.measure, variable.var_type) {
            Rule::Always(treatment) => treatment,
            Rule::NumericIfCoded => {
                if is_numeric_coded(variable, column) {
                    Treatment::Numeric
                } else {
                    Treatment::Categorical
                }
            }
        }
    }

    /// Mean, sum, dispersion, extremes and shape statistics.
    pub fn exposes_moments(&self) -> bool {
        matches!(self, Treatment::Numeric)
    }

    /// The weighted median.
    pub fn exposes_median(&self) -> bool {
        matches!(self, Treatment::Numeric | Treatment::Ordinal)
    }

    /// Percentiles from the frequency module.
    pub fn exposes_percentiles(&self) -> bool {
        matches!(self, Treatment::Numeric | Treatment::Ordinal)
    }

    /// Standardized values.
    pub fn allows_z_scores(&self) -> bool {
        matches!(self, Treatment::Numeric)
    }

    /// Whether NaN cells count as missing under this treatment.
    pub fn numeric_context(&self) -> bool {
        matches!(self, Treatment::Numeric)
    }
}

impl fmt::Display for Treatment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Treatment::Numeric => "numeric",
            Treatment::Ordinal => "ordinal",
            Treatment::Categorical => "categorical",
        };
        f.write_str(name)
    }
}

/// True when at least one cell is present and every non-missing cell is numeric.
fn is_numeric_coded(variable: &VariableDescriptor, column: &[Cell]) -> bool {
    let mut present = column
        .iter()
        .filter(|cell| !is_missing(cell, &variable.missing, true))
        .peekable();

    present.peek().is_some()
        && present.all(|cell| numeric_value(cell, variable.var_type).is_some())
}
