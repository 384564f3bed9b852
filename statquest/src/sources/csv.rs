//! CSV file source.

use std::path::Path;
use std::sync::Arc;

use arrow::datatypes::Schema;
use async_trait::async_trait;
use datafusion::prelude::{CsvReadOptions, SessionContext};
use tracing::{debug, instrument};

use super::batch::{observables_from_batches, BatchConversion};
use super::ObservableSource;
use crate::error::{QuestError, Result};
use crate::logging::LogConfig;
use crate::observable::Observable;

/// Options for configuring CSV file reading.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Whether the CSV file has a header row
    pub has_header: bool,
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
    /// Decimal separator of numeric text (default: '.')
    pub decimal_separator: char,
    /// Columns to load, in this order (default: all)
    pub columns: Option<Vec<String>>,
    /// Column holding row keys (default: the row number)
    pub key_column: Option<String>,
    /// Schema to use (if None, will be inferred)
    pub schema: Option<Arc<Schema>>,
    /// Maximum records to read for schema inference
    pub schema_infer_max_records: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            quote: b'"',
            decimal_separator: '.',
            columns: None,
            key_column: None,
            schema: None,
            schema_infer_max_records: 1000,
        }
    }
}

/// A CSV file loaded through DataFusion, one observable per column.
///
/// # Examples
///
/// ```rust,no_run
/// use statquest::sources::{CsvOptions, CsvSource};
///
/// // semicolon separated with decimal commas
/// let options = CsvOptions {
///     delimiter: b';',
///     decimal_separator: ',',
///     ..Default::default()
/// };
/// let source = CsvSource::with_options("data/survey.csv", options);
/// ```
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: String,
    options: CsvOptions,
    log_config: LogConfig,
}

impl CsvSource {
    /// Creates a new CSV source from a single file path.
    pub fn new(path: impl Into<String>) -> Self {
        Self::with_options(path, CsvOptions::default())
    }

    /// Creates a new CSV source with custom options.
    pub fn with_options(path: impl Into<String>, options: CsvOptions) -> Self {
        Self {
            path: path.into(),
            options,
            log_config: LogConfig::default(),
        }
    }

    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn options(&self) -> &CsvOptions {
        &self.options
    }

    fn conversion(&self) -> BatchConversion {
        BatchConversion {
            decimal_separator: self.options.decimal_separator,
            key_column: self.options.key_column.clone(),
        }
    }

    /// Columns passed to the projection; the key column rides along.
    fn projection(&self) -> Option<Vec<&str>> {
        let columns = self.options.columns.as_ref()?;
        let mut projection: Vec<&str> = columns.iter().map(String::as_str).collect();
        if let Some(key) = &self.options.key_column {
            if !projection.contains(&key.as_str()) {
                projection.push(key);
            }
        }
        Some(projection)
    }
}

#[async_trait]
impl ObservableSource for CsvSource {
    #[instrument(skip(self), fields(path = %self.path))]
    async fn load(&self) -> Result<Vec<Arc<Observable>>> {
        if !Path::new(&self.path).is_file() {
            return Err(QuestError::data_source(
                "CSV",
                format!("file not found: {}", self.path),
            ));
        }

        // DataFusion filters listed files by extension, so pass the actual one.
        let extension = Path::new(&self.path)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let mut read_options = CsvReadOptions::new()
            .has_header(self.options.has_header)
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .schema_infer_max_records(self.options.schema_infer_max_records)
            .file_extension(&extension);
        if let Some(schema) = &self.options.schema {
            read_options = read_options.schema(schema.as_ref());
        }

        let ctx = SessionContext::new();
        let mut df = ctx
            .read_csv(self.path.as_str(), read_options)
            .await
            .map_err(|e| {
                QuestError::data_source_with_source(
                    "CSV",
                    format!("cannot read {}", self.path),
                    Box::new(e),
                )
            })?;

        if let Some(projection) = self.projection() {
            let available: Vec<String> = df
                .schema()
                .fields()
                .iter()
                .map(|f| f.name().clone())
                .collect();
            if let Some(missing) = projection
                .iter()
                .find(|column| !available.iter().any(|name| name == *column))
            {
                return Err(QuestError::ColumnNotFound {
                    column: missing.to_string(),
                });
            }
            df = df.select_columns(&projection)?;
        }

        let batches = df.collect().await?;
        let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
        debug!(batches = batches.len(), rows, "Collected CSV batches");

        let observables = observables_from_batches(&batches, &self.conversion())?;
        crate::log_data_op!(
            self.log_config,
            path = %self.path,
            rows,
            observables = observables.len(),
            "Loaded observables from CSV"
        );
        Ok(observables)
    }

    fn description(&self) -> String {
        format!("CSV file: {}", self.path)
    }
}
