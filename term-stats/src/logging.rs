//! Logging configuration and helpers for the statistics engine.
//!
//! The engine runs once per variable and may be called on very long columns, so
//! per-cell output is opt-in through [`LogConfig::log_cell_details`] and cell text in
//! log fields is capped by [`truncate_field`].

use tracing::Level;

/// Controls how much the engine logs while computing a variable.
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// Level at which engine-internal decisions are reported
    pub base_level: Level,
    /// Trace every cell classification (missing, non-numeric, value)
    pub log_cell_details: bool,
    /// Emit the computed statistics as a debug event after each variable
    pub log_metrics: bool,
    /// Maximum length of cell text in log fields
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
            log_cell_details: false,
            log_metrics: true,
            max_field_length: 64,
        }
    }
}

impl LogConfig {
    /// Everything on, for debugging a single variable.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_cell_details: true,
            log_metrics: true,
            max_field_length: 256,
        }
    }

    /// Warnings only.
    pub fn production() -> Self {
        Self {
            base_level: Level::WARN,
            log_cell_details: false,
            log_metrics: false,
            max_field_length: 32,
        }
    }

    pub fn balanced() -> Self {
        Self::default()
    }

    /// Returns true when debug events should be built at all.
    pub fn debug_enabled(&self) -> bool {
        self.base_level >= Level::DEBUG
    }
}

/// Debug logging that skips argument formatting unless the config asks for debug
/// output.
#[macro_export]
macro_rules! perf_debug {
    ($config:expr, $($arg:tt)*) => {
        if $config.debug_enabled() {
            tracing::debug!($($arg)*);
        }
    };
}

/// Per-cell trace logging, gated on [`LogConfig::log_cell_details`].
#[macro_export]
macro_rules! log_cell {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_cell_details {
            tracing::trace!($($arg)*);
        }
    };
}

/// Caps `value` at `max_length` bytes, backing off to the nearest character
/// boundary.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    if value.len() <= max_length {
        return value.to_string();
    }
    let mut end = max_length;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...(truncated)", &value[..end])
}

/// Subscriber setup for binaries and tests that embed the engine.
pub mod setup {
    use tracing::Level;

    /// Configuration for the global `tracing` subscriber.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Level for everything outside this crate
        pub level: Level,
        /// Level for `term_stats` targets
        pub stats_level: Level,
        /// Emit JSON lines instead of human-readable output
        pub json_format: bool,
        /// Full `EnvFilter` directive, overriding the two levels above
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::INFO,
                stats_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        pub fn production() -> Self {
            Self {
                level: Level::WARN,
                stats_level: Level::INFO,
                json_format: true,
                env_filter: None,
            }
        }

        pub fn development() -> Self {
            Self {
                level: Level::DEBUG,
                stats_level: Level::TRACE,
                json_format: false,
                env_filter: None,
            }
        }

        pub fn with_level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        pub fn with_stats_level(mut self, level: Level) -> Self {
            self.stats_level = level;
            self
        }

        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
            self.env_filter = Some(filter.into());
            self
        }

        /// Builds the `EnvFilter` directive string.
        pub fn env_filter(&self) -> String {
            match &self.env_filter {
                Some(filter) => filter.clone(),
                None => format!(
                    "{},term_stats={}",
                    self.level.as_str().to_lowercase(),
                    self.stats_level.as_str().to_lowercase()
                ),
            }
        }
    }

    /// Installs a global subscriber. `RUST_LOG` takes precedence over the config.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use term_stats::logging::setup::{init_logging, LoggingConfig};
    ///
    /// init_logging(LoggingConfig::development().with_json_format(true)).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer().json().boxed()
        } else {
            tracing_subscriber::fmt::layer().boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;

        Ok(())
    }
}
