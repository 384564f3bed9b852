//! Error types for the StatQuest library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`QuestError`] enum. Only classification failures, an empty observable
//! pool and ambiguous observable names reach the caller of the discovery
//! engine; per-pair problems are
//! absorbed by the engine and reported as skipped units instead.

use thiserror::Error;

/// The main error type for the StatQuest library.
#[derive(Error, Debug)]
pub enum QuestError {
    /// An observable could not be assigned any measurement scale.
    #[error("Cannot classify observable '{observable}': {reason}")]
    Classification {
        /// Name of the rejected observable
        observable: String,
        /// Why no scale fits
        reason: String,
    },

    /// A test was invoked on a pair of observables it does not accept.
    ///
    /// The engine checks applicability before every invocation, so this
    /// variant indicates a dispatch bug in the caller.
    #[error("Test '{test}' cannot be carried out on '{a}' and '{b}'")]
    NotApplicable {
        /// Identifier of the test
        test: String,
        /// Name of the first observable
        a: String,
        /// Name of the second observable
        b: String,
    },

    /// The statistical computation produced no defined result.
    #[error("Test '{test}' failed: {message}")]
    Computation {
        /// Identifier of the test
        test: String,
        /// Description of the degenerate input
        message: String,
    },

    /// Two observables share too few keys for any test to be meaningful.
    #[error("Observables '{a}' and '{b}' share only {shared} key(s)")]
    InsufficientOverlap {
        /// Name of the first observable
        a: String,
        /// Name of the second observable
        b: String,
        /// Number of keys present in both
        shared: usize,
    },

    /// No usable observable was supplied.
    #[error("No observables available for analysis")]
    NoObservables,

    /// Two distinct observables in one pool carry the same name.
    #[error("Observable name '{name}' is used by more than one observable")]
    DuplicateObservable {
        /// The repeated name
        name: String,
    },

    /// Significance level outside of [0, 1].
    #[error("Invalid alpha {0}: must be a probability between 0 and 1")]
    InvalidAlpha(f64),

    /// Error from DataFusion operations.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from data source operations.
    #[error("Data source error: {message}")]
    DataSource {
        /// Type of data source (e.g., "CSV", "RecordBatch")
        source_type: String,
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error when a requested column is not present in the input.
    #[error("Column '{column}' not found in dataset")]
    ColumnNotFound { column: String },

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, QuestError>`.
///
/// # Examples
///
/// ```rust
/// use statquest::error::Result;
/// use statquest::observable::Observable;
///
/// fn load() -> Result<Observable> {
///     Observable::new("height", [(1, 180), (2, 175)])
/// }
/// # assert!(load().is_ok());
/// ```
pub type Result<T> = std::result::Result<T, QuestError>;

impl QuestError {
    /// Creates a classification error for the named observable.
    pub fn classification(observable: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Classification {
            observable: observable.into(),
            reason: reason.into(),
        }
    }

    /// Creates a computation error for the given test identifier.
    pub fn computation(test: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Computation {
            test: test.into(),
            message: message.into(),
        }
    }

    /// Creates a new data source error.
    pub fn data_source(source_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new data source error with a source error.
    pub fn data_source_with_source(
        source_type: impl Into<String>,
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Returns true for errors the discovery engine recovers from locally.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Computation { .. } | Self::InsufficientOverlap { .. }
        )
    }
}

impl From<serde_json::Error> for QuestError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<QuestError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| match e.into() {
            QuestError::Internal(inner) => QuestError::Internal(format!("{msg}: {inner}")),
            other => QuestError::Internal(format!("{msg}: {other}")),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let msg = f();
            match e.into() {
                QuestError::Internal(inner) => QuestError::Internal(format!("{msg}: {inner}")),
                other => QuestError::Internal(format!("{msg}: {other}")),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_classification_error() {
        let err = QuestError::classification("height", "no values");
        assert_eq!(
            err.to_string(),
            "Cannot classify observable 'height': no values"
        );
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(QuestError::computation("pearson", "constant input").is_recoverable());
        let overlap = QuestError::InsufficientOverlap {
            a: "a".to_string(),
            b: "b".to_string(),
            shared: 1,
        };
        assert!(overlap.is_recoverable());
        assert_eq!(overlap.to_string(), "Observables 'a' and 'b' share only 1 key(s)");
        assert!(!QuestError::NoObservables.is_recoverable());
    }

    #[test]
    fn test_data_source_error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err = QuestError::data_source_with_source("CSV", "Could not open", Box::new(source));
        assert_eq!(err.to_string(), "Data source error: Could not open");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_error_context() {
        fn failing_operation() -> Result<()> {
            Err(QuestError::Internal("Something went wrong".to_string()))
        }

        let err = failing_operation()
            .context("During discovery")
            .unwrap_err();
        assert!(err.to_string().contains("During discovery"));
        assert!(err.to_string().contains("Something went wrong"));
    }

    #[test]
    fn test_serde_json_conversion() {
        let err: QuestError = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert!(matches!(err, QuestError::Serialization(_)));
    }
}
