//! Discovery over Arrow record batches already in memory, with a key column
//! identifying the rows.
//!
//! Run with:
//! ```bash
//! cargo run -p statquest-demos --example arrow_batches
//! ```

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use statquest::formatters::{JsonFormatter, RelationFormatter};
use statquest::prelude::*;
use statquest::sources::{BatchConversion, BatchSource};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let schema = Arc::new(Schema::new(vec![
        Field::new("sku", DataType::Utf8, false),
        Field::new("price", DataType::Float64, true),
        Field::new("units_sold", DataType::Int64, true),
        Field::new("category", DataType::Utf8, true),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(vec!["p1", "p2", "p3", "p4", "p5", "p6"])) as ArrayRef,
            Arc::new(Float64Array::from(vec![9.99, 4.5, 19.0, 2.25, 14.5, 7.75])),
            Arc::new(Int64Array::from(vec![Some(120), Some(340), Some(35), Some(510), None, Some(180)])),
            Arc::new(StringArray::from(vec!["toys", "food", "toys", "food", "tools", "tools"])),
        ],
    )?;

    let source = BatchSource::new(vec![batch])
        .with_conversion(BatchConversion::default().with_key_column("sku"));
    let observables = source.load().await?;

    let discovery = DiscoveryEngine::new(TestSuite::all(), DiscoveryConfig::default())
        .discover(&observables)?;

    let alpha = Alpha::new(0.1)?;
    println!("{}", JsonFormatter::new().format(&discovery.relations, alpha)?);
    Ok(())
}
