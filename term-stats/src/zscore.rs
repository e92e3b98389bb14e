//! Standardized values aligned with the input column.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::cell::Cell;
use crate::classifier::classify;
use crate::engine::row_weight;
use crate::variable::VariableDescriptor;

/// One entry of a z-score column.
///
/// Rows without a usable value map to [`ZScore::Empty`], which serializes as the empty
/// string so the array can be written back as a derived dataset column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZScore {
    Value(f64),
    Empty,
}

impl ZScore {
    /// Returns the standardized value, if any.
    pub fn value(&self) -> Option<f64> {
        match self {
            ZScore::Value(z) => Some(*z),
            ZScore::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ZScore::Empty)
    }
}

impl Serialize for ZScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ZScore::Value(z) => serializer.serialize_f64(*z),
            ZScore::Empty => serializer.serialize_str(""),
        }
    }
}

struct ZScoreVisitor;

impl<'de> Visitor<'de> for ZScoreVisitor {
    type Value = ZScore;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or an empty string")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<ZScore, E> {
        Ok(ZScore::Value(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<ZScore, E> {
        Ok(ZScore::Value(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<ZScore, E> {
        Ok(ZScore::Value(v as f64))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ZScore, E> {
        if v.is_empty() {
            Ok(ZScore::Empty)
        } else {
            Err(E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }
}

impl<'de> Deserialize<'de> for ZScore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ZScoreVisitor)
    }
}

/// Standardizes every row of the column against the given mean and standard
/// deviation. Missing and non-numeric rows, and rows whose weight excludes them, yield
/// [`ZScore::Empty`].
///
/// Callers must only pass a strictly positive `std_dev`.
pub fn standardize(
    variable: &VariableDescriptor,
    column: &[Cell],
    weights: Option<&[Cell]>,
    mean: f64,
    std_dev: f64,
) -> Vec<ZScore> {
    column
        .iter()
        .enumerate()
        .map(|(i, cell)| match (classify(cell, variable).value(), row_weight(weights, i)) {
            (Some(x), Some(_)) => ZScore::Value((x - mean) / std_dev),
            _ => ZScore::Empty,
        })
        .collect()
}
