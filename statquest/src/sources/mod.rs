//! Loaders producing observables.
//!
//! A source turns tabular input into one [`Observable`] per column. Columns
//! that cannot be classified (for example, entirely empty ones) are logged
//! and left out; a source with no usable column fails with
//! [`QuestError::NoObservables`](crate::error::QuestError::NoObservables).

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::observable::Observable;

mod batch;
mod csv;

pub use batch::{observables_from_batches, BatchConversion, BatchSource};
pub use csv::{CsvOptions, CsvSource};

/// Anything that can supply the observable pool for discovery.
///
/// # Examples
///
/// ```rust,no_run
/// use statquest::sources::{CsvSource, ObservableSource};
///
/// # async fn example() -> statquest::error::Result<()> {
/// let source = CsvSource::new("data/patients.csv");
/// let observables = source.load().await?;
/// println!("{} observables from {}", observables.len(), source.description());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait ObservableSource: Debug + Send + Sync {
    /// Reads the input and builds the observables, in column order.
    async fn load(&self) -> Result<Vec<Arc<Observable>>>;

    /// Returns a human-readable description of this source.
    fn description(&self) -> String;
}
