//! Conversion of Arrow record batches into observables.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use super::ObservableSource;
use crate::error::{ErrorContext, QuestError, Result};
use crate::observable::{Key, Observable, Value};

/// How batch cells become keys and values.
#[derive(Debug, Clone)]
pub struct BatchConversion {
    /// Decimal separator used in text cells (default: '.')
    pub decimal_separator: char,
    /// Column providing row keys; the row number is used when `None`
    pub key_column: Option<String>,
}

impl Default for BatchConversion {
    fn default() -> Self {
        Self {
            decimal_separator: '.',
            key_column: None,
        }
    }
}

impl BatchConversion {
    pub fn with_decimal_separator(mut self, separator: char) -> Self {
        self.decimal_separator = separator;
        self
    }

    pub fn with_key_column(mut self, column: impl Into<String>) -> Self {
        self.key_column = Some(column.into());
        self
    }
}

/// Builds one observable per column of `batches`.
///
/// Integers and booleans become [`Value::Int`], floats [`Value::Float`] and
/// strings [`Value::Text`]; any other type is represented by its display
/// text. Nulls, NaNs and blank strings are missing and dropped.
///
/// # Errors
///
/// [`QuestError::ColumnNotFound`] for an unknown key column and
/// [`QuestError::NoObservables`] when no column can be classified.
#[instrument(skip_all, fields(batches = batches.len()))]
pub fn observables_from_batches(
    batches: &[RecordBatch],
    conversion: &BatchConversion,
) -> Result<Vec<Arc<Observable>>> {
    let Some(schema) = batches.first().map(RecordBatch::schema) else {
        return Err(QuestError::NoObservables);
    };

    let key_index = match &conversion.key_column {
        Some(name) => Some(schema.index_of(name).map_err(|_| QuestError::ColumnNotFound {
            column: name.clone(),
        })?),
        None => None,
    };

    let mut keys: Vec<Option<Key>> = Vec::new();
    for batch in batches {
        match key_index {
            Some(index) => keys.extend(key_values(batch.column(index))?),
            None => {
                let offset = keys.len();
                keys.extend((0..batch.num_rows()).map(|row| Some(Key::from(offset + row))));
            }
        }
    }

    let mut observables = Vec::new();
    for (index, field) in schema.fields().iter().enumerate() {
        if Some(index) == key_index {
            continue;
        }
        let mut data: Vec<(Key, Value)> = Vec::new();
        let mut row = 0;
        for batch in batches {
            let values = column_values(batch.column(index), conversion.decimal_separator)
                .with_context(|| format!("converting column '{}'", field.name()))?;
            for value in values {
                if let (Some(key), Some(value)) = (&keys[row], value) {
                    data.push((key.clone(), value));
                }
                row += 1;
            }
        }

        match Observable::new(field.name().as_str(), data) {
            Ok(observable) => {
                debug!(
                    column = field.name().as_str(),
                    scale = %observable.scale(),
                    values = observable.len(),
                    "Classified column"
                );
                observables.push(Arc::new(observable));
            }
            Err(e) => warn!(column = field.name().as_str(), error = %e, "Skipping column"),
        }
    }

    if observables.is_empty() {
        return Err(QuestError::NoObservables);
    }
    Ok(observables)
}

fn key_values(array: &ArrayRef) -> Result<Vec<Option<Key>>> {
    let keys = match array.data_type() {
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 | DataType::UInt8
        | DataType::UInt16 | DataType::UInt32 => {
            let ints = cast(array, &DataType::Int64)?;
            ints.as_primitive::<Int64Type>()
                .iter()
                .map(|v| v.map(Key::Index))
                .collect()
        }
        _ => (0..array.len())
            .map(|row| {
                if array.is_null(row) {
                    Ok(None)
                } else {
                    array_value_to_string(array, row).map(|s| Some(Key::Label(s)))
                }
            })
            .collect::<std::result::Result<Vec<_>, _>>()?,
    };
    Ok(keys)
}

fn column_values(array: &ArrayRef, decimal_separator: char) -> Result<Vec<Option<Value>>> {
    let values = match array.data_type() {
        DataType::Boolean => array
            .as_boolean()
            .iter()
            .map(|v| v.map(Value::from))
            .collect(),
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 | DataType::UInt8
        | DataType::UInt16 | DataType::UInt32 => {
            let ints = cast(array, &DataType::Int64)?;
            ints.as_primitive::<Int64Type>()
                .iter()
                .map(|v| v.map(Value::Int))
                .collect()
        }
        DataType::UInt64 | DataType::Float16 | DataType::Float32 | DataType::Float64 => {
            let floats = cast(array, &DataType::Float64)?;
            floats
                .as_primitive::<Float64Type>()
                .iter()
                .map(|v| v.filter(|f| !f.is_nan()).map(Value::Float))
                .collect()
        }
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
            let strings = cast(array, &DataType::Utf8)?;
            strings
                .as_string::<i32>()
                .iter()
                .map(|v| v.and_then(|s| text_value(s, decimal_separator)))
                .collect()
        }
        _ => (0..array.len())
            .map(|row| {
                if array.is_null(row) {
                    Ok(None)
                } else {
                    array_value_to_string(array, row).map(|s| text_value(&s, decimal_separator))
                }
            })
            .collect::<std::result::Result<Vec<_>, _>>()?,
    };
    Ok(values)
}

/// Text cell as a value; blank text is missing. A number written with a
/// non-standard decimal separator is normalized to use '.'.
fn text_value(text: &str, decimal_separator: char) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if decimal_separator != '.' && trimmed.contains(decimal_separator) {
        let normalized = Value::Text(trimmed.replace(decimal_separator, "."));
        if normalized.as_float().is_some() {
            return Some(normalized);
        }
    }
    Some(Value::Text(trimmed.to_string()))
}

/// Observables from batches already in memory.
#[derive(Debug, Clone)]
pub struct BatchSource {
    batches: Vec<RecordBatch>,
    conversion: BatchConversion,
}

impl BatchSource {
    pub fn new(batches: Vec<RecordBatch>) -> Self {
        Self {
            batches,
            conversion: BatchConversion::default(),
        }
    }

    pub fn with_conversion(mut self, conversion: BatchConversion) -> Self {
        self.conversion = conversion;
        self
    }
}

#[async_trait]
impl ObservableSource for BatchSource {
    async fn load(&self) -> Result<Vec<Arc<Observable>>> {
        observables_from_batches(&self.batches, &self.conversion)
    }

    fn description(&self) -> String {
        let rows: usize = self.batches.iter().map(RecordBatch::num_rows).sum();
        format!("{} record batch(es), {rows} row(s)", self.batches.len())
    }
}
