//! Prelude for commonly used types and traits in statquest.

pub use crate::discovery::{credible_only, Discovery, DiscoveryConfig, DiscoveryEngine, RelationIndex};
pub use crate::error::{ErrorContext, QuestError, Result};
pub use crate::hypothesis::{StatisticalTest, TestSuite};
pub use crate::logging::LogConfig;
pub use crate::observable::{Key, Observable, Scale, Value};
pub use crate::relation::{Alpha, Relation};
pub use crate::sources::{CsvSource, ObservableSource};
