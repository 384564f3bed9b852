//! Results of applying a test to a pair of observables.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{QuestError, Result};
use crate::hypothesis::StatisticalTest;
use crate::observable::Observable;

/// Significance level, a probability in [0, 1].
///
/// ```rust
/// use statquest::relation::Alpha;
///
/// assert_eq!(Alpha::new(0.05).unwrap().value(), 0.05);
/// assert!(Alpha::new(1.5).is_err());
/// assert!(Alpha::new(f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Alpha(f64);

impl Alpha {
    pub fn new(value: f64) -> Result<Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(QuestError::InvalidAlpha(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Alpha {
    type Error = QuestError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Alpha> for f64 {
    fn from(alpha: Alpha) -> Self {
        alpha.0
    }
}

impl fmt::Display for Alpha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One test applied to one pair of observables.
///
/// Relations are created by [`StatisticalTest::apply`] and never change.
#[derive(Debug, Clone)]
pub struct Relation {
    a: Arc<Observable>,
    b: Arc<Observable>,
    test: StatisticalTest,
    statistic: f64,
    p_value: f64,
}

impl Relation {
    pub(crate) fn new(
        a: Arc<Observable>,
        b: Arc<Observable>,
        test: StatisticalTest,
        statistic: f64,
        p_value: f64,
    ) -> Self {
        Self {
            a,
            b,
            test,
            statistic,
            p_value,
        }
    }

    pub fn a(&self) -> &Arc<Observable> {
        &self.a
    }

    pub fn b(&self) -> &Arc<Observable> {
        &self.b
    }

    pub fn test(&self) -> StatisticalTest {
        self.test
    }

    pub fn statistic(&self) -> f64 {
        self.statistic
    }

    pub fn p_value(&self) -> f64 {
        self.p_value
    }

    /// Whether the relation counts as evidence at level `alpha`.
    ///
    /// A test that proves relationships needs `p < alpha`; a test whose null
    /// hypothesis is the relationship needs `p > 1 - alpha`.
    pub fn credible(&self, alpha: Alpha) -> bool {
        if self.test.prove_relationship() {
            self.p_value < alpha.value()
        } else {
            self.p_value > 1.0 - alpha.value()
        }
    }

    /// The hypothesis retained at level `alpha`: H0 when `p >= alpha`,
    /// H1 otherwise.
    pub fn thesis(&self, alpha: Alpha) -> &'static str {
        if self.p_value >= alpha.value() {
            self.test.h0_thesis()
        } else {
            self.test.h1_thesis()
        }
    }

    /// Flat, serializable view for report writers.
    pub fn record(&self, alpha: Alpha) -> RelationRecord {
        RelationRecord {
            a: self.a.name().to_string(),
            b: self.b.name().to_string(),
            test: self.test,
            test_name: self.test.name().to_string(),
            statistic_name: self.test.statistic_name().to_string(),
            statistic: self.statistic,
            p_value: self.p_value,
            thesis: self.thesis(alpha).to_string(),
            credible: self.credible(alpha),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ~ {}: {} {} = {:.6}, p = {:.6}",
            self.a.name(),
            self.b.name(),
            self.test.short_name(),
            self.test.statistic_name(),
            self.statistic,
            self.p_value
        )
    }
}

/// Serializable view of a [`Relation`] at a given alpha.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationRecord {
    pub a: String,
    pub b: String,
    pub test: StatisticalTest,
    pub test_name: String,
    pub statistic_name: String,
    pub statistic: f64,
    pub p_value: f64,
    pub thesis: String,
    pub credible: bool,
}
