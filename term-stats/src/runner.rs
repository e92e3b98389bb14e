//! Runs the engine over many variables of one dataset.

use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::cell::Cell;
use crate::context::AnalysisContext;
use crate::error::{StatsError, StatsResult};
use crate::options::DescriptivesOptions;
use crate::report::{describe, VariableReport};
use crate::variable::VariableDescriptor;

/// Type alias for progress callback function.
pub type ProgressCallback = Arc<dyn Fn(f64) + Send + Sync>;

/// Concurrency and failure handling of a [`DescriptivesRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Variables computed at the same time on the blocking pool.
    pub max_concurrency: usize,
    /// Record a failing variable and keep going, instead of aborting the run.
    pub continue_on_error: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: num_cpus::get(),
            continue_on_error: true,
        }
    }
}

impl RunnerConfig {
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    pub fn validate(&self) -> StatsResult<()> {
        if self.max_concurrency == 0 {
            return Err(StatsError::invalid_config(
                "max_concurrency must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Describes every registered variable of a dataset, sharing one weight column and
/// one set of options.
///
/// Each variable runs on tokio's blocking pool; results land in an
/// [`AnalysisContext`] keyed by variable name.
///
/// # Example
///
/// ```rust
/// use term_stats::prelude::*;
/// use term_stats::cell::column;
///
/// # async fn example() -> Result<(), StatsError> {
/// let context = DescriptivesRunner::new()
///     .add(
///         VariableDescriptor::new("age", VariableType::Numeric, MeasurementLevel::Scale),
///         column([31.0, 45.0, 27.0]),
///     )
///     .add(
///         VariableDescriptor::new("city", VariableType::String, MeasurementLevel::Nominal),
///         column(["Oslo", "Lima", "Oslo"]),
///     )
///     .on_progress(|progress| println!("{:.0}%", progress * 100.0))
///     .run()
///     .await?;
///
/// assert_eq!(context.len(), 2);
/// # Ok(())
/// # }
/// ```
pub struct DescriptivesRunner {
    variables: Vec<(VariableDescriptor, Arc<[Cell]>)>,
    weights: Option<Arc<[Cell]>>,
    options: Arc<DescriptivesOptions>,
    config: RunnerConfig,
    dataset_name: Option<String>,
    on_progress: Option<ProgressCallback>,
}

impl Default for DescriptivesRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptivesRunner {
    pub fn new() -> Self {
        Self {
            variables: Vec::new(),
            weights: None,
            options: Arc::new(DescriptivesOptions::default()),
            config: RunnerConfig::default(),
            dataset_name: None,
            on_progress: None,
        }
    }

    /// Registers a variable and its column.
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, variable: VariableDescriptor, column: impl Into<Vec<Cell>>) -> Self {
        self.variables
            .push((variable, Arc::from(column.into())));
        self
    }

    /// Sets the case-weight column applied to every variable.
    pub fn weights(mut self, weights: impl Into<Vec<Cell>>) -> Self {
        self.weights = Some(Arc::from(weights.into()));
        self
    }

    pub fn options(mut self, options: DescriptivesOptions) -> Self {
        self.options = Arc::new(options);
        self
    }

    pub fn config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.max_concurrency = max_concurrency;
        self
    }

    /// Default is true (continue on error).
    pub fn continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.config.continue_on_error = continue_on_error;
        self
    }

    pub fn dataset(mut self, name: impl Into<String>) -> Self {
        self.dataset_name = Some(name.into());
        self
    }

    /// Sets a callback receiving the completed fraction in `(0, 1]` after each
    /// variable.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    /// Number of registered variables.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Describes every variable.
    ///
    /// Variables complete in any order; the returned context is keyed by name so the
    /// order does not show. With `continue_on_error` a failing variable is recorded in
    /// the context's errors, otherwise the first failure aborts the run.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::InvalidConfiguration`] for a zero concurrency limit or
    /// when two registered variables share a name.
    #[instrument(skip(self), fields(variables = self.variables.len(), weighted = self.weights.is_some()))]
    pub async fn run(&self) -> StatsResult<AnalysisContext> {
        self.config.validate()?;
        self.check_unique_names()?;
        info!(
            "Starting descriptives for {} variables (concurrency {})",
            self.variables.len(),
            self.config.max_concurrency
        );

        let mut context = match &self.dataset_name {
            Some(name) => AnalysisContext::with_dataset(name.clone()),
            None => AnalysisContext::new(),
        };
        context.metadata_mut().record_start();

        let total = self.variables.len() as f64;
        let mut completed = 0.0;

        let mut results = stream::iter(self.variables.iter().cloned())
            .map(|(variable, column)| {
                let weights = self.weights.clone();
                let options = Arc::clone(&self.options);
                async move {
                    let name = variable.name.clone();
                    let joined = tokio::task::spawn_blocking(move || {
                        describe(&variable, &column, weights.as_deref(), &options)
                    })
                    .await;
                    (name, flatten(joined))
                }
            })
            .buffer_unordered(self.config.max_concurrency);

        while let Some((name, result)) = results.next().await {
            match result {
                Ok(report) => {
                    debug!(variable = %name, treatment = %report.treatment, "Stored report");
                    context.store_report(report);
                }
                Err(e) => {
                    warn!(variable = %name, error = %e, "Variable failed");
                    if !self.config.continue_on_error {
                        return Err(StatsError::execution(format!(
                            "variable '{name}' failed: {e}"
                        )));
                    }
                    context.record_error(name, &e);
                }
            }

            completed += 1.0;
            if let Some(ref callback) = self.on_progress {
                callback(completed / total);
            }
        }

        context.metadata_mut().record_end();
        if let Some(duration) = context.metadata().duration() {
            info!(
                "Descriptives completed in {:.2}s",
                duration.num_milliseconds() as f64 / 1000.0
            );
        }

        Ok(context)
    }

    fn check_unique_names(&self) -> StatsResult<()> {
        let mut seen = HashSet::new();
        for (variable, _) in &self.variables {
            if !seen.insert(variable.name.as_str()) {
                return Err(StatsError::invalid_config(format!(
                    "variable '{}' is registered more than once",
                    variable.name
                )));
            }
        }
        Ok(())
    }
}

fn flatten(
    joined: Result<StatsResult<VariableReport>, tokio::task::JoinError>,
) -> StatsResult<VariableReport> {
    joined.map_err(StatsError::from).and_then(|result| result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::column;
    use crate::variable::{MeasurementLevel, VariableType};
    use std::sync::Mutex;

    fn scale(name: &str) -> VariableDescriptor {
        VariableDescriptor::new(name, VariableType::Numeric, MeasurementLevel::Scale)
    }

    #[tokio::test]
    async fn test_runner_describes_all_variables() {
        let progress = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&progress);

        let context = DescriptivesRunner::new()
            .add(scale("a"), column([1.0, 2.0, 3.0]))
            .add(scale("b"), column([4.0, 4.0, 7.0]))
            .max_concurrency(2)
            .on_progress(move |p| seen.lock().unwrap().push(p))
            .run()
            .await
            .unwrap();

        assert_eq!(context.len(), 2);
        assert!(!context.has_errors());
        assert_eq!(context.report("b").unwrap().stats.mean(), Some(5.0));
        assert_eq!(*progress.lock().unwrap(), vec![0.5, 1.0]);
    }

    #[tokio::test]
    async fn test_continue_on_error_records_failure() {
        let context = DescriptivesRunner::new()
            .add(scale("ok"), column([1.0, 2.0]))
            .add(scale("short"), column([1.0]))
            .weights(column([1.0, 1.0]))
            .run()
            .await
            .unwrap();

        assert_eq!(context.len(), 1);
        assert_eq!(context.errors().len(), 1);
        assert_eq!(context.errors()[0].variable, "short");
    }

    #[tokio::test]
    async fn test_fail_fast() {
        let err = DescriptivesRunner::new()
            .add(scale("short"), column([1.0]))
            .weights(column([1.0, 1.0]))
            .continue_on_error(false)
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, StatsError::Execution(_)));
    }

    #[tokio::test]
    async fn test_zero_concurrency_rejected() {
        let err = DescriptivesRunner::new()
            .add(scale("a"), column([1.0]))
            .max_concurrency(0)
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, StatsError::InvalidConfiguration(_)));
    }

    #[tokio::test]
    async fn test_duplicate_names_rejected() {
        let err = DescriptivesRunner::new()
            .add(scale("a"), column([1.0, 2.0]))
            .add(scale("a"), column([3.0, 4.0]))
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, StatsError::InvalidConfiguration(_)));
        assert!(err.to_string().contains("'a'"));
    }
}
