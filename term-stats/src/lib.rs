//! # term-stats - SPSS-compatible descriptive statistics
//!
//! term-stats computes the summary statistics a statistical package reports for one
//! variable of a survey-style dataset: counts, weighted moments with small-sample
//! corrected variance, skewness and kurtosis (plus their standard errors), the
//! weighted median, and optional z-scores. Columns arrive as raw, possibly mixed-type
//! cells; the engine decides what is missing, what is numeric and which statistics
//! the variable's measurement level allows.
//!
//! ## Quick Start
//!
//! ```rust
//! use term_stats::prelude::*;
//! use term_stats::cell::column;
//!
//! let variable = VariableDescriptor::new("income", VariableType::Numeric, MeasurementLevel::Scale)
//!     .with_missing(MissingSpec::discrete(["-9"]));
//! let values = column([Cell::from(1200.0), Cell::from(-9.0), Cell::from(""), Cell::from(1800.0)]);
//! let weights = column([2.0, 1.0, 1.0, 1.0]);
//!
//! let result = compute(
//!     &variable,
//!     &values,
//!     Some(&weights),
//!     &DescriptivesOptions::default().with_standardize(true),
//! )?;
//!
//! assert_eq!(result.stats.valid, 2);
//! assert_eq!(result.stats.sum_of_weights, 3.0);
//! assert_eq!(result.stats.mean(), Some(1400.0));
//! # Ok::<(), StatsError>(())
//! ```
//!
//! ## Measurement levels
//!
//! | measure | statistics |
//! |---|---|
//! | scale, or unknown on numeric/date data | N, Valid, Missing, moments, extremes, Median |
//! | ordinal | N, Valid, Missing, Median |
//! | nominal | N, Valid, Missing |
//!
//! Mode and percentiles come from [`frequencies`]; [`report::describe`] runs both.
//!
//! ## Architecture
//!
//! - **`classifier`**: missingness, numeric interpretation, date coercion
//! - **`moments`** / **`median`**: weighted accumulation and order statistics
//! - **`dispatch`**: measurement-level decision table
//! - **`engine`**: the per-variable entry point
//! - **`frequencies`** / **`report`**: mode, percentiles and the combined report
//! - **`runner`** / **`context`**: concurrent multi-variable runs
//! - **`columnar`** / **`inference`**: Arrow input and metadata inference

pub mod cell;
pub mod classifier;
pub mod columnar;
pub mod context;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod frequencies;
pub mod inference;
pub mod logging;
pub mod median;
pub mod moments;
pub mod options;
pub mod prelude;
pub mod record;
pub mod report;
pub mod runner;
pub mod types;
pub mod variable;
pub mod zscore;
