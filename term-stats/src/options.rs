//! Per-call options for the descriptive engine and the frequency module.

use serde::{Deserialize, Serialize};

use crate::error::{StatsError, StatsResult};
use crate::logging::LogConfig;

/// Options shared by [`engine::compute`](crate::engine::compute),
/// [`frequencies::analyze`](crate::frequencies::analyze) and
/// [`report::describe`](crate::report::describe).
///
/// Hosts usually supply these as JSON:
///
/// ```rust
/// use term_stats::options::DescriptivesOptions;
///
/// let options = DescriptivesOptions::from_json(r#"{ "standardize": true }"#).unwrap();
/// assert!(options.standardize);
/// assert_eq!(options.percentiles, vec![25.0, 50.0, 75.0]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DescriptivesOptions {
    /// Produce a z-score column for numeric variables.
    pub standardize: bool,
    /// Percentiles reported by the frequency module, each in `[0, 100]`.
    pub percentiles: Vec<f64>,
    /// Compute the mode(s) in the frequency module.
    pub compute_modes: bool,
    #[serde(skip)]
    pub log: LogConfig,
}

impl Default for DescriptivesOptions {
    fn default() -> Self {
        Self {
            standardize: false,
            percentiles: vec![25.0, 50.0, 75.0],
            compute_modes: true,
            log: LogConfig::default(),
        }
    }
}

impl DescriptivesOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_standardize(mut self, standardize: bool) -> Self {
        self.standardize = standardize;
        self
    }

    pub fn with_percentiles(mut self, percentiles: impl Into<Vec<f64>>) -> Self {
        self.percentiles = percentiles.into();
        self
    }

    pub fn with_modes(mut self, compute_modes: bool) -> Self {
        self.compute_modes = compute_modes;
        self
    }

    pub fn with_log_config(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Parses and validates options from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> StatsResult<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Checks that every requested percentile is a finite number in `[0, 100]`.
    pub fn validate(&self) -> StatsResult<()> {
        if let Some(p) = self
            .percentiles
            .iter()
            .find(|p| !p.is_finite() || **p < 0.0 || **p > 100.0)
        {
            return Err(StatsError::invalid_config(format!(
                "percentile {p} is outside [0, 100]"
            )));
        }
        Ok(())
    }
}
