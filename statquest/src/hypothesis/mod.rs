//! Statistical tests over pairs of observables.
//!
//! Every test is a stateless unit type implementing [`PairwiseTest`]. The
//! discovery engine dispatches over the closed [`StatisticalTest`] enum and
//! receives the set it should run as an explicit [`TestSuite`].
//!
//! | Test | Accepts | Proves |
//! |------|---------|--------|
//! | [`ChiSquareTest`] | nominal/ordinal × nominal/ordinal | relationship |
//! | [`KruskalWallisTest`] | nominal/ordinal × continuous, either order | equal distributions |
//! | [`PearsonTest`], [`SpearmanTest`], [`KendallTest`] | ordinal/continuous × ordinal/continuous | relationship |
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use statquest::hypothesis::StatisticalTest;
//! use statquest::observable::Observable;
//!
//! let x = Arc::new(Observable::new("x", [(1, 1.0), (2, 2.0), (3, 3.0), (4, 4.5)]).unwrap());
//! let y = Arc::new(Observable::new("y", [(1, 2.0), (2, 4.1), (3, 6.2), (4, 8.0)]).unwrap());
//!
//! let test = StatisticalTest::Pearson;
//! assert!(test.can_be_carried_out(&x, &y));
//! let relation = test.apply(&x, &y).unwrap();
//! assert!(relation.statistic() > 0.99);
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{QuestError, Result};
use crate::observable::Observable;
use crate::relation::Relation;

mod chi_square;
mod correlation;
mod kruskal;
pub(crate) mod special;

pub use chi_square::ChiSquareTest;
pub use correlation::{KendallTest, PearsonTest, SpearmanTest};
pub use kruskal::KruskalWallisTest;

/// Maximum width of a test's short name in tabular reports.
pub const SHORT_NAME_WIDTH: usize = 16;

/// Statistic and p-value produced by one test invocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub statistic: f64,
    pub p_value: f64,
}

/// A statistical procedure applicable to two observables.
pub trait PairwiseTest: Send + Sync + fmt::Debug {
    /// Stable identifier used in configuration.
    fn id(&self) -> &'static str;

    /// Full display name.
    fn name(&self) -> &'static str;

    /// Name fitting in [`SHORT_NAME_WIDTH`] columns.
    fn short_name(&self) -> &'static str;

    /// Symbol of the computed statistic.
    fn statistic_name(&self) -> &'static str;

    /// Null hypothesis, retained when p-value ≥ alpha.
    fn h0_thesis(&self) -> &'static str;

    /// Alternative hypothesis, accepted when p-value < alpha.
    fn h1_thesis(&self) -> &'static str;

    /// Longer explanation for the test-description report.
    fn description(&self) -> &'static str;

    /// True if rejecting the null hypothesis is evidence of a relationship.
    fn prove_relationship(&self) -> bool;

    /// True if `compute(a, b)` and `compute(b, a)` are interchangeable
    /// results for the same pair.
    fn is_symmetric(&self) -> bool {
        true
    }

    /// Decides applicability from the scale flags alone.
    fn can_be_carried_out(&self, a: &Observable, b: &Observable) -> bool;

    /// Runs the test on the rows the two observables share.
    ///
    /// # Errors
    ///
    /// [`QuestError::NotApplicable`] when the scales do not fit and
    /// [`QuestError::Computation`] when the data are degenerate.
    fn compute(&self, a: &Observable, b: &Observable) -> Result<TestOutcome>;
}

/// The closed set of tests known to the discovery engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatisticalTest {
    ChiSquare,
    KruskalWallis,
    Pearson,
    Spearman,
    Kendall,
}

impl StatisticalTest {
    /// Every test, in reporting order.
    pub const ALL: [StatisticalTest; 5] = [
        StatisticalTest::ChiSquare,
        StatisticalTest::KruskalWallis,
        StatisticalTest::Pearson,
        StatisticalTest::Spearman,
        StatisticalTest::Kendall,
    ];

    /// The procedure implementing this test.
    pub fn procedure(&self) -> &'static dyn PairwiseTest {
        match self {
            StatisticalTest::ChiSquare => &ChiSquareTest,
            StatisticalTest::KruskalWallis => &KruskalWallisTest,
            StatisticalTest::Pearson => &PearsonTest,
            StatisticalTest::Spearman => &SpearmanTest,
            StatisticalTest::Kendall => &KendallTest,
        }
    }

    pub fn id(&self) -> &'static str {
        self.procedure().id()
    }

    pub fn name(&self) -> &'static str {
        self.procedure().name()
    }

    pub fn short_name(&self) -> &'static str {
        self.procedure().short_name()
    }

    pub fn statistic_name(&self) -> &'static str {
        self.procedure().statistic_name()
    }

    pub fn h0_thesis(&self) -> &'static str {
        self.procedure().h0_thesis()
    }

    pub fn h1_thesis(&self) -> &'static str {
        self.procedure().h1_thesis()
    }

    pub fn description(&self) -> &'static str {
        self.procedure().description()
    }

    pub fn prove_relationship(&self) -> bool {
        self.procedure().prove_relationship()
    }

    pub fn is_symmetric(&self) -> bool {
        self.procedure().is_symmetric()
    }

    pub fn can_be_carried_out(&self, a: &Observable, b: &Observable) -> bool {
        self.procedure().can_be_carried_out(a, b)
    }

    pub fn compute(&self, a: &Observable, b: &Observable) -> Result<TestOutcome> {
        self.procedure().compute(a, b)
    }

    /// Runs the test and records the result as a [`Relation`] on `(a, b)`.
    pub fn apply(&self, a: &Arc<Observable>, b: &Arc<Observable>) -> Result<Relation> {
        let outcome = self.compute(a, b)?;
        Ok(Relation::new(
            Arc::clone(a),
            Arc::clone(b),
            *self,
            outcome.statistic,
            outcome.p_value,
        ))
    }
}

impl fmt::Display for StatisticalTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StatisticalTest {
    type Err = QuestError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|test| test.id() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|t| t.id()).collect();
                QuestError::Configuration(format!(
                    "unknown test '{s}', expected one of: {}",
                    known.join(", ")
                ))
            })
    }
}

/// The immutable set of tests handed to the discovery engine.
///
/// Order is preserved and duplicates are dropped, so every test contributes
/// at most once per pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<StatisticalTest>", into = "Vec<StatisticalTest>")]
pub struct TestSuite {
    tests: Vec<StatisticalTest>,
}

impl TestSuite {
    pub fn new(tests: impl IntoIterator<Item = StatisticalTest>) -> Self {
        let mut unique: Vec<StatisticalTest> = Vec::new();
        for test in tests {
            if !unique.contains(&test) {
                unique.push(test);
            }
        }
        Self { tests: unique }
    }

    /// All five tests.
    pub fn all() -> Self {
        Self::new(StatisticalTest::ALL)
    }

    /// Builds a suite from test identifiers such as `"pearson"`.
    pub fn from_ids<S: AsRef<str>>(ids: &[S]) -> Result<Self> {
        let tests = ids
            .iter()
            .map(|id| id.as_ref().parse())
            .collect::<Result<Vec<StatisticalTest>>>()?;
        Ok(Self::new(tests))
    }

    pub fn tests(&self) -> &[StatisticalTest] {
        &self.tests
    }

    pub fn iter(&self) -> impl Iterator<Item = StatisticalTest> + '_ {
        self.tests.iter().copied()
    }

    pub fn contains(&self, test: StatisticalTest) -> bool {
        self.tests.contains(&test)
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

impl Default for TestSuite {
    fn default() -> Self {
        Self::all()
    }
}

impl From<Vec<StatisticalTest>> for TestSuite {
    fn from(tests: Vec<StatisticalTest>) -> Self {
        Self::new(tests)
    }
}

impl From<TestSuite> for Vec<StatisticalTest> {
    fn from(suite: TestSuite) -> Self {
        suite.tests
    }
}

fn not_applicable(test: &dyn PairwiseTest, a: &Observable, b: &Observable) -> QuestError {
    QuestError::NotApplicable {
        test: test.id().to_string(),
        a: a.name().to_string(),
        b: b.name().to_string(),
    }
}

/// Aligned float pairs over shared keys.
fn paired_floats(
    test: &dyn PairwiseTest,
    a: &Observable,
    b: &Observable,
) -> Result<(Vec<f64>, Vec<f64>)> {
    let aligned = a.aligned_values(b);
    let mut xs = Vec::with_capacity(aligned.len());
    let mut ys = Vec::with_capacity(aligned.len());
    for (x, y) in aligned {
        match (x.as_float(), y.as_float()) {
            (Some(x), Some(y)) => {
                xs.push(x);
                ys.push(y);
            }
            _ => return Err(not_applicable(test, a, b)),
        }
    }
    Ok((xs, ys))
}

/// 1-based ranks, ties receiving the average of the ranks they span.
pub(crate) fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut indexed: Vec<(usize, f64)> = values.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < indexed.len() {
        let mut j = i;
        while j < indexed.len() && indexed[j].1 == indexed[i].1 {
            j += 1;
        }
        let rank = (i + j + 1) as f64 / 2.0;
        for &(position, _) in &indexed[i..j] {
            ranks[position] = rank;
        }
        i = j;
    }
    ranks
}

/// Sizes of the runs of equal values, runs of one included.
pub(crate) fn tie_groups(values: &[f64]) -> Vec<usize> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
        .chunk_by(|a, b| a == b)
        .map(<[f64]>::len)
        .collect()
}
