//! Type and measurement-level inference for columns that arrive without metadata.
//!
//! A sample of the column is matched against numeric and date patterns. The storage
//! type is the first family that covers at least `confidence_threshold` of the present
//! cells; integral numeric columns with few distinct values are treated as codes.
//!
//! # Example
//!
//! ```rust
//! use term_stats::inference::TypeInferenceEngine;
//! use term_stats::variable::{MeasurementLevel, VariableType};
//!
//! let engine = TypeInferenceEngine::builder().categorical_threshold(5).build();
//! let cells = term_stats::cell::column(["1", "2", "2", "1", ""]);
//! let inferred = engine.infer(&cells);
//!
//! assert_eq!(inferred.var_type, VariableType::Numeric);
//! assert_eq!(inferred.measure, MeasurementLevel::Nominal);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, instrument};

use crate::cell::Cell;
use crate::classifier::date_to_seconds;
use crate::variable::{MeasurementLevel, VariableDescriptor, VariableType};

/// Configuration for the type inference engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InferenceConfig {
    /// Number of leading cells to inspect (default: 1000)
    pub sample_size: usize,
    /// Share of present cells a type must cover (default: 0.9)
    pub confidence_threshold: f64,
    /// Integral numeric columns with at most this many distinct values are nominal
    /// (default: 12)
    pub categorical_threshold: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            sample_size: 1000,
            confidence_threshold: 0.9,
            categorical_threshold: 12,
        }
    }
}

/// Inferred metadata with the evidence behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeInference {
    pub var_type: VariableType,
    pub measure: MeasurementLevel,
    /// Share of present cells matching `var_type`; 0 when nothing was present.
    pub confidence: f64,
    pub samples_analyzed: usize,
    pub null_count: usize,
    pub distinct_values: usize,
}

/// Counts gathered over the sample.
#[derive(Debug, Default)]
struct TypeStats {
    present: usize,
    nulls: usize,
    numeric: usize,
    integral: usize,
    date: usize,
    datetime: usize,
    distinct: HashSet<String>,
}

struct TypePatterns {
    time_suffix: Regex,
}

static PATTERNS: Lazy<TypePatterns> = Lazy::new(|| TypePatterns {
    time_suffix: Regex::new(r"[T ]\d{1,2}:\d{2}").unwrap(),
});

pub struct TypeInferenceEngineBuilder {
    config: InferenceConfig,
}

impl TypeInferenceEngineBuilder {
    pub fn sample_size(mut self, size: usize) -> Self {
        self.config.sample_size = size;
        self
    }

    pub fn confidence_threshold(mut self, threshold: f64) -> Self {
        self.config.confidence_threshold = threshold;
        self
    }

    pub fn categorical_threshold(mut self, threshold: usize) -> Self {
        self.config.categorical_threshold = threshold;
        self
    }

    pub fn build(self) -> TypeInferenceEngine {
        TypeInferenceEngine {
            config: self.config,
        }
    }
}

/// Infers [`VariableType`] and [`MeasurementLevel`] from cell contents.
#[derive(Debug, Clone, Default)]
pub struct TypeInferenceEngine {
    config: InferenceConfig,
}

impl TypeInferenceEngine {
    pub fn builder() -> TypeInferenceEngineBuilder {
        TypeInferenceEngineBuilder {
            config: InferenceConfig::default(),
        }
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: InferenceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Infers the metadata of one column.
    #[instrument(skip(self, cells), fields(rows = cells.len()))]
    pub fn infer(&self, cells: &[Cell]) -> TypeInference {
        let stats = self.analyze_samples(cells);
        let result = self.determine_type(&stats);
        debug!(
            var_type = ?result.var_type,
            measure = %result.measure,
            confidence = result.confidence,
            "Inferred column type"
        );
        result
    }

    /// Builds a descriptor for `name` from the inferred metadata.
    pub fn infer_descriptor(&self, name: impl Into<String>, cells: &[Cell]) -> VariableDescriptor {
        let inferred = self.infer(cells);
        VariableDescriptor::new(name, inferred.var_type, inferred.measure)
    }

    fn analyze_samples(&self, cells: &[Cell]) -> TypeStats {
        let mut stats = TypeStats::default();

        for cell in cells.iter().take(self.config.sample_size) {
            if cell.is_blank() {
                stats.nulls += 1;
                continue;
            }
            stats.present += 1;
            stats.distinct.insert(cell.text().trim().to_string());

            if let Some(x) = cell.as_f64() {
                stats.numeric += 1;
                if x.fract() == 0.0 {
                    stats.integral += 1;
                }
            } else if let Cell::Text(text) = cell {
                if date_to_seconds(text).is_some() {
                    if PATTERNS.time_suffix.is_match(text) {
                        stats.datetime += 1;
                    } else {
                        stats.date += 1;
                    }
                }
            }
        }

        stats
    }

    fn determine_type(&self, stats: &TypeStats) -> TypeInference {
        let share = |count: usize| {
            if stats.present == 0 {
                0.0
            } else {
                count as f64 / stats.present as f64
            }
        };
        let threshold = self.config.confidence_threshold;
        let distinct = stats.distinct.len();

        let (var_type, measure, confidence) = if stats.present == 0 {
            (VariableType::String, MeasurementLevel::Nominal, 0.0)
        } else if share(stats.numeric) >= threshold {
            let codes = stats.integral == stats.numeric
                && distinct <= self.config.categorical_threshold;
            let measure = if codes {
                MeasurementLevel::Nominal
            } else {
                MeasurementLevel::Scale
            };
            (VariableType::Numeric, measure, share(stats.numeric))
        } else if share(stats.date + stats.datetime) >= threshold {
            let var_type = if stats.datetime > 0 {
                VariableType::DateTime
            } else {
                VariableType::Date
            };
            (var_type, MeasurementLevel::Scale, share(stats.date + stats.datetime))
        } else {
            let text = stats.present - stats.numeric - stats.date - stats.datetime;
            (VariableType::String, MeasurementLevel::Nominal, share(text))
        };

        TypeInference {
            var_type,
            measure,
            confidence,
            samples_analyzed: stats.present + stats.nulls,
            null_count: stats.nulls,
            distinct_values: distinct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::column;

    #[test]
    fn test_continuous_numbers_are_scale() {
        let cells = column((0..50).map(|i| i as f64 * 1.5));
        let inferred = TypeInferenceEngine::new().infer(&cells);
        assert_eq!(inferred.var_type, VariableType::Numeric);
        assert_eq!(inferred.measure, MeasurementLevel::Scale);
        assert_eq!(inferred.confidence, 1.0);
    }

    #[test]
    fn test_integer_codes_are_nominal() {
        let cells = column([1.0, 2.0, 3.0, 1.0, 2.0]);
        let inferred = TypeInferenceEngine::new().infer(&cells);
        assert_eq!(inferred.measure, MeasurementLevel::Nominal);
        assert_eq!(inferred.distinct_values, 3);
    }

    #[test]
    fn test_dates_and_datetimes() {
        let engine = TypeInferenceEngine::new();
        let dates = column(["2024-01-01", "02/15/2024", "", "14-OCT-1582"]);
        let inferred = engine.infer(&dates);
        assert_eq!(inferred.var_type, VariableType::Date);
        assert_eq!(inferred.null_count, 1);

        let stamps = column(["2024-01-01 10:00", "2024-01-02T11:30:00"]);
        assert_eq!(engine.infer(&stamps).var_type, VariableType::DateTime);
    }

    #[test]
    fn test_mixed_text_is_string() {
        let cells = column(["a", "b", "3", "c"]);
        let inferred = TypeInferenceEngine::new().infer(&cells);
        assert_eq!(inferred.var_type, VariableType::String);
        assert_eq!(inferred.confidence, 0.75);

        let empty = TypeInferenceEngine::new().infer(&column(["", "null"]));
        assert_eq!(empty.var_type, VariableType::String);
        assert_eq!(empty.confidence, 0.0);
    }

    #[test]
    fn test_sample_size_limits_inspection() {
        let mut cells = column([1.5, 2.5]);
        cells.extend(column(["x", "y", "z"]));
        let engine = TypeInferenceEngine::builder().sample_size(2).build();
        let descriptor = engine.infer_descriptor("v", &cells);
        assert_eq!(descriptor.var_type, VariableType::Numeric);
        assert_eq!(descriptor.name, "v");
    }
}
