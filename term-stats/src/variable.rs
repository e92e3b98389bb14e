//! Variable metadata supplied by the caller: storage type, measurement level and
//! missing-value specification.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{StatsError, StatsResult};

/// Declared storage type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VariableType {
    /// Numeric storage.
    Numeric,
    /// Free text storage. Numeric-coded text is parsed when the measurement level asks
    /// for numeric treatment.
    String,
    /// Calendar dates, coerced to seconds since the Gregorian epoch.
    Date,
    /// Dates with a time of day, coerced the same way as [`VariableType::Date`].
    #[serde(alias = "DATE_TIME")]
    DateTime,
}

impl VariableType {
    /// Returns true for types whose cells are coerced from date strings.
    pub fn is_temporal(&self) -> bool {
        matches!(self, VariableType::Date | VariableType::DateTime)
    }
}

/// Declared statistical role of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementLevel {
    /// Continuous values.
    Scale,
    /// Ranked categories.
    Ordinal,
    /// Unordered categories.
    Nominal,
    /// No declared role.
    #[default]
    Unknown,
}

impl fmt::Display for MeasurementLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MeasurementLevel::Scale => "scale",
            MeasurementLevel::Ordinal => "ordinal",
            MeasurementLevel::Nominal => "nominal",
            MeasurementLevel::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// User-defined missing values.
///
/// Null and blank cells are always missing; this specification adds the values a
/// user has declared as missing on top of that.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MissingSpec {
    /// No user-defined missing values.
    #[default]
    None,
    /// A set of literal values, compared by their text form.
    Discrete { values: Vec<String> },
    /// An inclusive numeric range.
    Range { low: f64, high: f64 },
    /// An inclusive numeric range plus a set of literal values.
    RangeDiscrete {
        values: Vec<String>,
        low: f64,
        high: f64,
    },
}

impl MissingSpec {
    /// Creates a discrete specification from the given literals.
    pub fn discrete<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MissingSpec::Discrete {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates an inclusive range specification.
    pub fn range(low: f64, high: f64) -> Self {
        MissingSpec::Range { low, high }
    }

    /// Creates a range-plus-discrete specification.
    pub fn range_discrete<I, S>(values: I, low: f64, high: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MissingSpec::RangeDiscrete {
            values: values.into_iter().map(Into::into).collect(),
            low,
            high,
        }
    }

    /// Returns the literal set, if this variant has one.
    pub fn discrete_values(&self) -> &[String] {
        match self {
            MissingSpec::Discrete { values } | MissingSpec::RangeDiscrete { values, .. } => {
                values
            }
            MissingSpec::None | MissingSpec::Range { .. } => &[],
        }
    }

    /// Returns the inclusive bounds, if this variant has them.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match self {
            MissingSpec::Range { low, high } | MissingSpec::RangeDiscrete { low, high, .. } => {
                Some((*low, *high))
            }
            MissingSpec::None | MissingSpec::Discrete { .. } => None,
        }
    }

    /// Checks that range bounds are finite and ordered.
    pub fn validate(&self) -> StatsResult<()> {
        if let Some((low, high)) = self.bounds() {
            if !low.is_finite() || !high.is_finite() {
                return Err(StatsError::invalid_descriptor(format!(
                    "missing range bounds must be finite, got [{low}, {high}]"
                )));
            }
            if low > high {
                return Err(StatsError::invalid_descriptor(format!(
                    "missing range low {low} exceeds high {high}"
                )));
            }
        }
        Ok(())
    }
}

/// Immutable description of the variable a column belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDescriptor {
    /// Variable name, used as the key in runner output.
    pub name: String,
    /// Declared storage type.
    #[serde(rename = "type")]
    pub var_type: VariableType,
    /// Declared measurement level.
    #[serde(default)]
    pub measure: MeasurementLevel,
    /// User-defined missing values.
    #[serde(default, rename = "missingSpec", alias = "missing")]
    pub missing: MissingSpec,
}

impl VariableDescriptor {
    /// Creates a descriptor with no user-defined missing values.
    pub fn new(name: impl Into<String>, var_type: VariableType, measure: MeasurementLevel) -> Self {
        Self {
            name: name.into(),
            var_type,
            measure,
            missing: MissingSpec::None,
        }
    }

    /// Sets the missing-value specification.
    pub fn with_missing(mut self, missing: MissingSpec) -> Self {
        self.missing = missing;
        self
    }

    /// Parses a descriptor from its JSON representation.
    pub fn from_json(json: &str) -> StatsResult<Self> {
        let descriptor: Self = serde_json::from_str(json)?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Checks the descriptor for contract violations.
    pub fn validate(&self) -> StatsResult<()> {
        self.missing
            .validate()
            .map_err(|e| match e {
                StatsError::InvalidDescriptor(msg) => {
                    StatsError::invalid_descriptor(format!("variable '{}': {msg}", self.name))
                }
                other => other,
            })
    }
}
