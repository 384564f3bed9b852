//! Relation discovery over a pool of observables.
//!
//! The engine runs in three phases:
//!
//! 1. **Enumeration**: every unordered pair is visited once, in canonical
//!    order, with every applicable test of the suite. Pairs sharing too few
//!    rows and tests failing on degenerate data are skipped and reported.
//! 2. **Symmetric deduplication**: a symmetric test keeps only its canonical
//!    orientation.
//! 3. **Pruning**: pairs without relations are dropped.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use statquest::prelude::*;
//!
//! let observables = vec![
//!     Arc::new(Observable::new("A", [(1, 1), (2, 3), (3, 1), (4, 2), (5, 6)]).unwrap()),
//!     Arc::new(Observable::new("B", [(1, 1.0), (2, 3.2), (3, 1.1), (4, 2.1), (5, 6.1)]).unwrap()),
//! ];
//!
//! let engine = DiscoveryEngine::new(TestSuite::all(), DiscoveryConfig::default());
//! let discovery = engine.discover(&observables).unwrap();
//!
//! let relations = discovery.relations.get("A", "B").unwrap();
//! assert_eq!(relations.len(), 4);
//! let credible = discovery.relations.credible_only(Alpha::new(0.05).unwrap());
//! assert!(credible.get("A", "B").is_some());
//! ```

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::error::{QuestError, Result};
use crate::hypothesis::{StatisticalTest, TestSuite};
use crate::log_pair;
use crate::logging::{truncate_field, LogConfig};
use crate::observable::Observable;
use crate::relation::{Alpha, Relation};

mod index;

pub use index::{PairKey, RelationIndex};

/// Fewest shared rows any test is attempted on.
pub const MIN_SHARED_KEYS: usize = 2;

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Pairs sharing fewer rows are skipped; values below 2 are raised to 2.
    pub min_shared_keys: usize,
    /// Whether skipped units are listed in the [`Discovery`].
    pub collect_skipped: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            min_shared_keys: MIN_SHARED_KEYS,
            collect_skipped: true,
        }
    }
}

impl DiscoveryConfig {
    pub fn builder() -> DiscoveryConfigBuilder {
        DiscoveryConfigBuilder::default()
    }

    /// The threshold actually applied.
    pub fn effective_min_shared_keys(&self) -> usize {
        self.min_shared_keys.max(MIN_SHARED_KEYS)
    }
}

/// Builder for [`DiscoveryConfig`].
#[derive(Debug, Default)]
pub struct DiscoveryConfigBuilder {
    config: DiscoveryConfig,
}

impl DiscoveryConfigBuilder {
    pub fn min_shared_keys(mut self, min_shared_keys: usize) -> Self {
        self.config.min_shared_keys = min_shared_keys;
        self
    }

    pub fn collect_skipped(mut self, collect: bool) -> Self {
        self.config.collect_skipped = collect;
        self
    }

    pub fn build(self) -> DiscoveryConfig {
        self.config
    }
}

/// Why a pair, or a pair and test, produced no relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// The pair shares fewer rows than required; no test was attempted.
    InsufficientOverlap { shared: usize },
    /// The test could not produce a defined result.
    ComputationFailed { message: String },
}

/// A unit of work that was skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedTest {
    pub pair: PairKey,
    /// `None` when the whole pair was skipped.
    pub test: Option<StatisticalTest>,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Result of one discovery run.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Deduplicated relations, non-empty per pair.
    pub relations: RelationIndex,
    /// Skipped units, when collection is enabled.
    pub skipped: Vec<SkippedTest>,
}

impl Discovery {
    pub fn credible_only(&self, alpha: Alpha) -> RelationIndex {
        self.relations.credible_only(alpha)
    }
}

/// The relations of `relations` that are credible at `alpha`.
pub fn credible_only(relations: &RelationIndex, alpha: Alpha) -> RelationIndex {
    relations.credible_only(alpha)
}

/// One-shot batch computation of relations.
#[derive(Debug, Clone)]
pub struct DiscoveryEngine {
    suite: TestSuite,
    config: DiscoveryConfig,
    log_config: LogConfig,
}

impl DiscoveryEngine {
    pub fn new(suite: TestSuite, config: DiscoveryConfig) -> Self {
        Self {
            suite,
            config,
            log_config: LogConfig::default(),
        }
    }

    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    pub fn suite(&self) -> &TestSuite {
        &self.suite
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Runs every applicable test on every pair.
    ///
    /// # Errors
    ///
    /// [`QuestError::NoObservables`] for an empty pool and
    /// [`QuestError::DuplicateObservable`] when two distinct observables
    /// share a name. Per-pair problems never fail the run.
    pub fn discover(&self, observables: &[Arc<Observable>]) -> Result<Discovery> {
        self.discover_with_progress(observables, |_, _| {})
    }

    /// Like [`discover`](Self::discover), calling `progress(step, total)`
    /// after each outer observable.
    #[instrument(skip_all, fields(observables = observables.len(), tests = self.suite.len()))]
    pub fn discover_with_progress<F>(
        &self,
        observables: &[Arc<Observable>],
        mut progress: F,
    ) -> Result<Discovery>
    where
        F: FnMut(usize, usize),
    {
        if observables.is_empty() {
            return Err(QuestError::NoObservables);
        }
        let started = Instant::now();

        let mut ordered: Vec<(usize, &Arc<Observable>)> = observables.iter().enumerate().collect();
        ordered.sort_by(|(i, x), (j, y)| x.name().cmp(y.name()).then(i.cmp(j)));
        // the same observable passed twice is visited once
        ordered.dedup_by(|(_, later), (_, kept)| Arc::ptr_eq(*later, *kept));
        check_unique_names(&ordered)?;

        let min_shared = self.config.effective_min_shared_keys();
        let total = ordered.len();
        let mut discovery = Discovery::default();

        for (step, (_, a)) in ordered.iter().enumerate() {
            for (_, b) in &ordered[step + 1..] {
                self.visit_pair(a, b, min_shared, &mut discovery);
            }
            progress(step + 1, total);
        }

        let removed = discovery.relations.deduplicate_symmetric();
        let pruned = discovery.relations.prune_empty();
        debug!(removed, pruned, "Deduplicated and pruned relations");

        info!(
            pairs = discovery.relations.len(),
            relations = discovery.relations.relation_count(),
            skipped = discovery.skipped.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Discovery completed"
        );
        Ok(discovery)
    }

    fn visit_pair(
        &self,
        a: &Arc<Observable>,
        b: &Arc<Observable>,
        min_shared: usize,
        discovery: &mut Discovery,
    ) {
        let key = PairKey::new(a.name(), b.name());
        let applicable: Vec<StatisticalTest> = self
            .suite
            .iter()
            .filter(|test| test.can_be_carried_out(a, b))
            .collect();
        if applicable.is_empty() {
            log_pair!(self.log_config, pair = %key, "No applicable test");
            return;
        }

        let shared = a.shared_keys(b).len();
        if shared < min_shared {
            let overlap = QuestError::InsufficientOverlap {
                a: key.a.clone(),
                b: key.b.clone(),
                shared,
            };
            warn!(error = %overlap, "Skipping pair");
            self.record_skip(discovery, key, None, SkipReason::InsufficientOverlap { shared });
            return;
        }

        let relations = discovery.relations.touch(key.clone());
        let mut failures = Vec::new();
        for test in applicable {
            match self.attempt(test, a, b) {
                Ok(relation) => {
                    log_pair!(
                        self.log_config,
                        pair = %key,
                        test = test.id(),
                        statistic = relation.statistic(),
                        p_value = relation.p_value(),
                        "Computed relation"
                    );
                    relations.push(relation);
                }
                Err(e) => {
                    let message = truncate_field(&e.to_string(), self.log_config.max_field_length);
                    if e.is_recoverable() {
                        warn!(pair = %key, test = test.id(), error = %message, "Test failed, skipping");
                    } else {
                        error!(pair = %key, test = test.id(), error = %message, "Unexpected test error, skipping");
                    }
                    failures.push((test, e.to_string()));
                }
            }
        }
        for (test, message) in failures {
            self.record_skip(
                discovery,
                key.clone(),
                Some(test),
                SkipReason::ComputationFailed { message },
            );
        }
    }

    fn attempt(
        &self,
        test: StatisticalTest,
        a: &Arc<Observable>,
        b: &Arc<Observable>,
    ) -> Result<Relation> {
        let relation = test.apply(a, b)?;
        if relation.statistic().is_nan() || relation.p_value().is_nan() {
            return Err(QuestError::computation(test.id(), "result is not a number"));
        }
        Ok(relation)
    }

    fn record_skip(
        &self,
        discovery: &mut Discovery,
        pair: PairKey,
        test: Option<StatisticalTest>,
        reason: SkipReason,
    ) {
        if self.config.collect_skipped {
            discovery.skipped.push(SkippedTest { pair, test, reason });
        }
    }
}

/// Relations are keyed by name, so names must identify observables.
fn check_unique_names(ordered: &[(usize, &Arc<Observable>)]) -> Result<()> {
    match ordered
        .windows(2)
        .find(|window| window[0].1.name() == window[1].1.name())
    {
        Some(window) => Err(QuestError::DuplicateObservable {
            name: window[0].1.name().to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs<K, V>(name: &str, data: impl IntoIterator<Item = (K, V)>) -> Arc<Observable>
    where
        K: Into<crate::observable::Key>,
        V: Into<crate::observable::Value>,
    {
        Arc::new(Observable::new(name, data).unwrap())
    }

    fn engine() -> DiscoveryEngine {
        DiscoveryEngine::new(TestSuite::all(), DiscoveryConfig::default())
    }

    #[test]
    fn test_empty_pool_is_an_error() {
        assert!(matches!(
            engine().discover(&[]),
            Err(QuestError::NoObservables)
        ));
    }

    #[test]
    fn test_single_observable_yields_nothing() {
        let discovery = engine().discover(&[obs("a", [(1, 1), (2, 2)])]).unwrap();
        assert!(discovery.relations.is_empty());
        assert!(discovery.skipped.is_empty());
    }

    #[test]
    fn test_observable_is_never_paired_with_itself() {
        let a = obs("a", [(1, 1.0), (2, 2.5), (3, 2.0), (4, 4.0)]);
        let discovery = engine().discover(&[a.clone(), a.clone()]).unwrap();
        assert!(discovery.relations.is_empty());
        assert!(discovery.skipped.is_empty());

        let b = obs("b", [(1, 2.0), (2, 3.5), (3, 3.0), (4, 6.0)]);
        let discovery = engine().discover(&[a.clone(), b, a]).unwrap();
        assert_eq!(discovery.relations.len(), 1);
        assert!(discovery.relations.get("a", "a").is_none());
    }

    #[test]
    fn test_distinct_observables_with_one_name_are_rejected() {
        let first = obs("a", [(1, 1), (2, 2), (3, 3)]);
        let second = obs("a", [(1, 3), (2, 1), (3, 2)]);
        let err = engine().discover(&[first, second]).unwrap_err();
        assert!(matches!(err, QuestError::DuplicateObservable { name } if name == "a"));
    }

    #[test]
    fn test_pairs_are_canonical_regardless_of_input_order() {
        let x = obs("x", [(1, 1.0), (2, 2.5), (3, 2.0), (4, 4.0)]);
        let y = obs("y", [(1, 1.5), (2, 2.0), (3, 3.5), (4, 3.0)]);
        let forward = engine().discover(&[x.clone(), y.clone()]).unwrap();
        let backward = engine().discover(&[y, x]).unwrap();

        let keys: Vec<_> = backward.relations.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, vec![PairKey::new("x", "y")]);
        let tests = |d: &Discovery| -> Vec<StatisticalTest> {
            d.relations.relations().map(Relation::test).collect()
        };
        assert_eq!(tests(&forward), tests(&backward));
        assert_eq!(
            tests(&forward),
            vec![
                StatisticalTest::Pearson,
                StatisticalTest::Spearman,
                StatisticalTest::Kendall
            ]
        );
    }

    #[test]
    fn test_insufficient_overlap_is_reported() {
        let a = obs("a", [(1, 1.0), (2, 2.0)]);
        let b = obs("b", [(2, 5.0), (3, 6.0)]);
        let discovery = engine().discover(&[a, b]).unwrap();
        assert!(discovery.relations.is_empty());
        assert_eq!(
            discovery.skipped,
            vec![SkippedTest {
                pair: PairKey::new("a", "b"),
                test: None,
                reason: SkipReason::InsufficientOverlap { shared: 1 },
            }]
        );
    }

    #[test]
    fn test_min_shared_keys_is_configurable_but_never_below_two() {
        let config = DiscoveryConfig::builder().min_shared_keys(0).build();
        assert_eq!(config.effective_min_shared_keys(), 2);

        let a = obs("a", [(1, 1.0), (2, 2.0), (3, 2.5)]);
        let b = obs("b", [(1, 5.0), (2, 6.5), (3, 6.0)]);
        let strict = DiscoveryEngine::new(
            TestSuite::all(),
            DiscoveryConfig::builder().min_shared_keys(4).build(),
        );
        let discovery = strict.discover(&[a, b]).unwrap();
        assert!(discovery.relations.is_empty());
        assert_eq!(discovery.skipped.len(), 1);
    }

    #[test]
    fn test_failures_are_isolated() {
        // a constant ordinal leaves only the chi-square test defined
        let a = obs("a", [(1, 7), (2, 7), (3, 7)]);
        let b = obs("b", [(1, 1), (2, 2), (3, 3)]);
        let discovery = engine().discover(&[a, b]).unwrap();

        let relations = discovery.relations.get("a", "b").unwrap();
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].test(), StatisticalTest::ChiSquare);
        assert_eq!(discovery.skipped.len(), 4);
        assert!(discovery
            .skipped
            .iter()
            .all(|s| matches!(s.reason, SkipReason::ComputationFailed { .. })));
    }

    #[test]
    fn test_skips_are_not_collected_when_disabled() {
        let config = DiscoveryConfig::builder().collect_skipped(false).build();
        let a = obs("a", [(1, 1.0), (2, 2.0)]);
        let b = obs("b", [(3, 5.0), (4, 6.0)]);
        let discovery = DiscoveryEngine::new(TestSuite::all(), config)
            .discover(&[a, b])
            .unwrap();
        assert!(discovery.skipped.is_empty());
    }

    #[test]
    fn test_progress_reports_each_outer_observable() {
        let pool = vec![
            obs("a", [(1, 1), (2, 2)]),
            obs("b", [(1, 2), (2, 1)]),
            obs("c", [(1, "x"), (2, "y")]),
        ];
        let mut steps = Vec::new();
        engine()
            .discover_with_progress(&pool, |step, total| steps.push((step, total)))
            .unwrap();
        assert_eq!(steps, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn test_suite_restricts_tests() {
        let a = obs("a", [(1, 1.0), (2, 2.5), (3, 2.0), (4, 4.0)]);
        let b = obs("b", [(1, 1.5), (2, 2.0), (3, 3.5), (4, 3.0)]);
        let engine = DiscoveryEngine::new(
            TestSuite::new([StatisticalTest::Kendall]),
            DiscoveryConfig::default(),
        );
        let discovery = engine.discover(&[a, b]).unwrap();
        assert_eq!(discovery.relations.relation_count(), 1);
    }

    #[test]
    fn test_config_serde_defaults() {
        let config: DiscoveryConfig = serde_json::from_str(r#"{"min_shared_keys": 5}"#).unwrap();
        assert_eq!(config.min_shared_keys, 5);
        assert!(config.collect_skipped);
    }
}
