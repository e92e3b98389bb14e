//! The combined per-variable report a host renders.

use serde::Serialize;
use tracing::instrument;

use crate::cell::{format_number, Cell};
use crate::dispatch::Treatment;
use crate::engine::{compute, Descriptives};
use crate::error::StatsResult;
use crate::frequencies::{analyze, FrequencySummary};
use crate::options::DescriptivesOptions;
use crate::record::StatisticsRecord;
use crate::types::MetricValue;
use crate::variable::VariableDescriptor;
use crate::zscore::ZScore;

/// Engine statistics and frequency output for one variable, side by side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableReport {
    pub variable: String,
    pub treatment: Treatment,
    pub stats: StatisticsRecord,
    pub frequencies: FrequencySummary,
    #[serde(rename = "zScores", skip_serializing_if = "Option::is_none")]
    pub z_scores: Option<Vec<ZScore>>,
}

impl VariableReport {
    /// Flattens the report into named metrics.
    ///
    /// Names follow the statistics record, plus `Mode` and one `P<p>` entry per
    /// requested percentile.
    pub fn metrics(&self) -> Vec<(String, MetricValue)> {
        let mut out: Vec<(String, MetricValue)> = self
            .stats
            .metrics()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();

        if let Some(modes) = &self.frequencies.modes {
            out.push(("Mode".to_string(), MetricValue::Categories(modes.clone())));
        }
        if let Some(percentiles) = &self.frequencies.percentiles {
            for pv in percentiles {
                out.push((
                    format!("P{}", format_number(pv.percentile)),
                    MetricValue::from(pv.value),
                ));
            }
        }

        out
    }

    /// Returns the modes, if they were computed.
    pub fn modes(&self) -> Option<&[Cell]> {
        self.frequencies.modes.as_deref()
    }
}

/// Runs the engine and the frequency module over the same column.
#[instrument(skip_all, fields(variable = %variable.name))]
pub fn describe(
    variable: &VariableDescriptor,
    column: &[Cell],
    weights: Option<&[Cell]>,
    options: &DescriptivesOptions,
) -> StatsResult<VariableReport> {
    let Descriptives {
        variable: name,
        treatment,
        stats,
        z_scores,
    } = compute(variable, column, weights, options)?;
    let frequencies = analyze(variable, column, weights, options)?;

    Ok(VariableReport {
        variable: name,
        treatment,
        stats,
        frequencies,
        z_scores,
    })
}
