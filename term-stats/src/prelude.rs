//! Prelude for commonly used types and functions in term-stats.

pub use crate::cell::Cell;
pub use crate::context::AnalysisContext;
pub use crate::dispatch::Treatment;
pub use crate::engine::{compute, Descriptives};
pub use crate::error::{StatsError, StatsResult};
pub use crate::frequencies::{analyze, FrequencySummary};
pub use crate::logging::LogConfig;
pub use crate::options::DescriptivesOptions;
pub use crate::record::StatisticsRecord;
pub use crate::report::{describe, VariableReport};
pub use crate::runner::{DescriptivesRunner, RunnerConfig};
pub use crate::types::MetricValue;
pub use crate::variable::{MeasurementLevel, MissingSpec, VariableDescriptor, VariableType};
pub use crate::zscore::ZScore;
