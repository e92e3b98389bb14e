//! Collected results of a multi-variable run.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::error::StatsError;
use crate::report::VariableReport;
use crate::types::MetricValue;

/// Reports of every variable a [`DescriptivesRunner`](crate::runner::DescriptivesRunner)
/// processed, plus the failures it recorded.
///
/// # Example
///
/// ```rust
/// use term_stats::prelude::*;
///
/// let variable = VariableDescriptor::new("age", VariableType::Numeric, MeasurementLevel::Scale);
/// let column = term_stats::cell::column([20.0, 30.0, 40.0]);
/// let report = describe(&variable, &column, None, &DescriptivesOptions::default()).unwrap();
///
/// let mut context = AnalysisContext::new();
/// context.store_report(report);
///
/// assert_eq!(context.get_metric("age.Mean"), Some(MetricValue::Double(30.0)));
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisContext {
    /// Reports keyed by variable name.
    reports: BTreeMap<String, VariableReport>,
    metadata: AnalysisMetadata,
    errors: Vec<AnalysisError>,
}

impl AnalysisContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context labelled with the dataset the variables belong to.
    pub fn with_dataset(dataset_name: impl Into<String>) -> Self {
        Self {
            metadata: AnalysisMetadata::with_dataset(dataset_name),
            ..Self::default()
        }
    }

    /// Stores a report under its variable name, replacing any earlier one.
    pub fn store_report(&mut self, report: VariableReport) {
        self.reports.insert(report.variable.clone(), report);
    }

    pub fn report(&self, variable: &str) -> Option<&VariableReport> {
        self.reports.get(variable)
    }

    /// All reports in variable-name order.
    pub fn reports(&self) -> impl Iterator<Item = &VariableReport> {
        self.reports.values()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Looks up a metric by `"<variable>.<metric>"`, e.g. `"income.Mean"` or
    /// `"income.P25"`.
    ///
    /// Variable names may contain dots; the key is split at the last one.
    pub fn get_metric(&self, key: &str) -> Option<MetricValue> {
        let (variable, metric) = key.rsplit_once('.')?;
        self.reports
            .get(variable)?
            .metrics()
            .into_iter()
            .find(|(name, _)| name == metric)
            .map(|(_, value)| value)
    }

    /// Every metric of one variable keyed by metric name.
    pub fn get_variable_metrics(&self, variable: &str) -> HashMap<String, MetricValue> {
        self.reports
            .get(variable)
            .map(|report| report.metrics().into_iter().collect())
            .unwrap_or_default()
    }

    pub fn record_error(&mut self, variable: impl Into<String>, error: &StatsError) {
        self.errors.push(AnalysisError {
            variable: variable.into(),
            error: error.to_string(),
        });
    }

    pub fn errors(&self) -> &[AnalysisError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn metadata(&self) -> &AnalysisMetadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut AnalysisMetadata {
        &mut self.metadata
    }

    /// Merges another context into this one. Reports from `other` win on name
    /// clashes.
    pub fn merge(&mut self, other: AnalysisContext) {
        self.reports.extend(other.reports);
        self.errors.extend(other.errors);
        self.metadata.merge(other.metadata);
    }

    pub fn summary(&self) -> AnalysisSummary {
        AnalysisSummary {
            variables: self.reports.len(),
            errors: self.errors.len(),
            dataset_name: self.metadata.dataset_name.clone(),
        }
    }

    /// Serializes the whole context as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, StatsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Timing and labelling of a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisMetadata {
    pub dataset_name: Option<String>,
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
    /// Free-form annotations supplied by the host.
    pub custom: HashMap<String, String>,
}

impl AnalysisMetadata {
    pub fn with_dataset(name: impl Into<String>) -> Self {
        Self {
            dataset_name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn record_start(&mut self) {
        self.start_time = Some(chrono::Utc::now());
    }

    pub fn record_end(&mut self) {
        self.end_time = Some(chrono::Utc::now());
    }

    /// Elapsed time between start and end, if both were recorded.
    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    pub fn add_custom(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.custom.insert(key.into(), value.into());
    }

    fn merge(&mut self, other: AnalysisMetadata) {
        self.dataset_name = self.dataset_name.take().or(other.dataset_name);
        self.start_time = match (self.start_time, other.start_time) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.end_time = match (self.end_time, other.end_time) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        self.custom.extend(other.custom);
    }
}

/// A variable that could not be described.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisError {
    pub variable: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSummary {
    pub variables: usize,
    pub errors: usize,
    pub dataset_name: Option<String>,
}
