//! Logging configuration for StatQuest.
//!
//! The library only emits `tracing` events; installing a subscriber is up to
//! the application, for which [`setup::init_logging`] offers a ready-made
//! registry with an `EnvFilter` and optional JSON output.

use tracing::Level;

/// Controls how much the discovery engine and the sources log.
///
/// A full discovery visits every pair of observables with every test, so the
/// per-pair events are off by default.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Level of the `statquest` target when the subscriber is installed
    /// through [`setup::LoggingConfig::with_log_config`]
    pub base_level: Level,
    /// Whether to log every pair/test attempt
    pub log_pair_details: bool,
    /// Whether to log data loading operations
    pub log_data_operations: bool,
    /// Maximum length for logged field values
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
            log_pair_details: false,
            log_data_operations: true,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Logs every pair and test, for debugging a single dataset.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_pair_details: true,
            log_data_operations: true,
            max_field_length: 1024,
        }
    }

    /// Warnings only.
    pub fn quiet() -> Self {
        Self {
            base_level: Level::WARN,
            log_pair_details: false,
            log_data_operations: false,
            max_field_length: 128,
        }
    }
}

/// Debug event emitted only when pair details are enabled.
#[macro_export]
macro_rules! log_pair {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_pair_details {
            tracing::debug!($($arg)*);
        }
    };
}

/// Info event emitted only when data operations are logged.
#[macro_export]
macro_rules! log_data_op {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_data_operations {
            tracing::info!($($arg)*);
        }
    };
}

/// Shortens `value` to at most `max_length` bytes, on a character boundary.
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

/// Subscriber installation for applications.
pub mod setup {
    use tracing::Level;

    use crate::error::{QuestError, Result};

    /// Configuration for the global subscriber.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Log level for everything else
        pub level: Level,
        /// Log level for the `statquest` target
        pub statquest_level: Level,
        /// Whether to emit JSON lines
        pub json_format: bool,
        /// Filter directive replacing the computed one
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::WARN,
                statquest_level: Level::INFO,
                json_format: false,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        /// Debug output from StatQuest, human readable.
        pub fn development() -> Self {
            Self {
                level: Level::INFO,
                statquest_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }

        /// JSON lines for log collectors.
        pub fn structured() -> Self {
            Self {
                json_format: true,
                ..Self::default()
            }
        }

        pub fn with_level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        pub fn with_statquest_level(mut self, level: Level) -> Self {
            self.statquest_level = level;
            self
        }

        /// Takes the `statquest` level from a component configuration.
        pub fn with_log_config(mut self, config: &super::LogConfig) -> Self {
            self.statquest_level = config.base_level;
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

        /// The filter directive used when `RUST_LOG` is not set.
        pub fn env_filter(&self) -> String {
            match &self.env_filter {
                Some(filter) => filter.clone(),
                None => format!(
                    "{},statquest={}",
                    self.level.as_str().to_lowercase(),
                    self.statquest_level.as_str().to_lowercase()
                ),
            }
        }
    }

    /// Installs the global subscriber. `RUST_LOG` takes precedence over the
    /// configured filter.
    ///
    /// ```rust,no_run
    /// use statquest::logging::setup::{init_logging, LoggingConfig};
    ///
    /// init_logging(LoggingConfig::development().with_json_format(true)).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<()> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| QuestError::Configuration(format!("cannot install logger: {e}")))
    }
}
