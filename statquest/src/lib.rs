//! # StatQuest - Exploratory Pairwise Statistics for Rust
//!
//! StatQuest takes a table of observed variables and looks for statistically
//! credible relationships between every pair of them. It decides on its own
//! which hypothesis tests make sense for each pair, based on the measurement
//! scale of the data, so a new dataset can be screened without writing any
//! test selection by hand.
//!
//! ## Overview
//!
//! Each column of the input becomes an [`Observable`](observable::Observable):
//! a named map from row keys to values, classified as nominal, ordinal or
//! continuous. For every unordered pair of observables the discovery engine
//! runs each applicable test from its [`TestSuite`](hypothesis::TestSuite),
//! keeps the resulting [`Relation`](relation::Relation)s and finally filters
//! them by a significance level.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use statquest::prelude::*;
//! use statquest::formatters::{DelimitedFormatter, RelationFormatter};
//!
//! # async fn example() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let observables = CsvSource::new("data/patients.csv").load().await?;
//!
//! let engine = DiscoveryEngine::new(TestSuite::all(), DiscoveryConfig::default());
//! let discovery = engine.discover(&observables)?;
//!
//! let alpha = Alpha::new(0.05)?;
//! let credible = discovery.relations.credible_only(alpha);
//! print!("{}", DelimitedFormatter::tsv().format(&credible, alpha)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Key Features
//!
//! ### Scale-driven test selection
//!
//! | Test           | Applies to                                   | Proves relationship |
//! |----------------|----------------------------------------------|---------------------|
//! | Chi-square     | two categorical observables                  | yes                 |
//! | Kruskal-Wallis | a categorical and a continuous observable    | no                  |
//! | Pearson r      | two continuous observables                   | yes                 |
//! | Spearman r     | two continuous observables                   | yes                 |
//! | Kendall tau    | two continuous observables                   | yes                 |
//!
//! A test that does not prove a relationship counts as evidence when its
//! p-value is close to 1 rather than close to 0.
//!
//! ### Failure isolation
//!
//! Degenerate data (a constant column, pairs sharing too few rows) never
//! aborts a discovery run: the affected pair or test is skipped and reported
//! in [`Discovery::skipped`](discovery::Discovery::skipped).
//!
//! ### Data Sources
//!
//! CSV files are read through DataFusion; in-memory Arrow record batches are
//! accepted as well. See the [`sources`] module.
//!
//! ### Observability
//!
//! StatQuest emits structured `tracing` events. Applications install a
//! subscriber with [`logging::setup::init_logging`].
//!
//! ## Architecture
//!
//! - **`observable`**: values, keys, scale classification, descriptive statistics
//! - **`hypothesis`**: the statistical tests and the test suite
//! - **`relation`**: test results and the credibility rule
//! - **`discovery`**: the pairwise discovery engine and the relation index
//! - **`sources`**: CSV and Arrow loaders
//! - **`formatters`**: delimited, DOT and JSON reports
//! - **`logging`**: log configuration and subscriber setup

pub mod discovery;
pub mod error;
pub mod formatters;
pub mod hypothesis;
pub mod logging;
pub mod observable;
pub mod prelude;
pub mod relation;
pub mod sources;
