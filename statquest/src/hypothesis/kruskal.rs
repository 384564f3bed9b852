//! Kruskal-Wallis H-test.

use tracing::trace;

use super::special::chi_square_sf;
use super::{average_ranks, not_applicable, tie_groups, PairwiseTest, TestOutcome};
use crate::error::{QuestError, Result};
use crate::observable::{distinct_sorted, rank_index, Observable};

/// Kruskal-Wallis test of a continuous observable grouped by a categorical
/// one.
///
/// The operands may come in either order: the categorical side always forms
/// the groups. When both sides could group the other (two ordinal
/// observables) the one with fewer distinct values forms the groups, and on
/// equal counts the one whose name sorts first, so `compute(a, b)` and
/// `compute(b, a)` agree.
#[derive(Debug, Clone, Copy, Default)]
pub struct KruskalWallisTest;

impl KruskalWallisTest {
    /// Returns `(grouping, measured)`, or `None` if neither side can group.
    fn orient<'a>(
        a: &'a Observable,
        b: &'a Observable,
    ) -> Option<(&'a Observable, &'a Observable)> {
        let a_groups = a.flags().is_categorical() && b.is_continuous();
        let b_groups = b.flags().is_categorical() && a.is_continuous();
        match (a_groups, b_groups) {
            (true, false) => Some((a, b)),
            (false, true) => Some((b, a)),
            (true, true) => {
                let a_first = (a.distinct_count(), a.name()) <= (b.distinct_count(), b.name());
                Some(if a_first { (a, b) } else { (b, a) })
            }
            (false, false) => None,
        }
    }
}

impl PairwiseTest for KruskalWallisTest {
    fn id(&self) -> &'static str {
        "kruskal-wallis"
    }

    fn name(&self) -> &'static str {
        "Kruskal-Wallis Test"
    }

    fn short_name(&self) -> &'static str {
        "Kruskal-Wallis"
    }

    fn statistic_name(&self) -> &'static str {
        "H"
    }

    fn h0_thesis(&self) -> &'static str {
        "H0: distributions are equal"
    }

    fn h1_thesis(&self) -> &'static str {
        "H1: distributions are not equal"
    }

    fn description(&self) -> &'static str {
        "Groups the values of a continuous variable by the categories of a \
         nominal or ordinal variable and compares the rank distributions of \
         the groups without assuming normality. A p-value below alpha means \
         the distributions differ between groups."
    }

    fn prove_relationship(&self) -> bool {
        false
    }

    fn is_symmetric(&self) -> bool {
        false
    }

    fn can_be_carried_out(&self, a: &Observable, b: &Observable) -> bool {
        Self::orient(a, b).is_some()
    }

    fn compute(&self, a: &Observable, b: &Observable) -> Result<TestOutcome> {
        let (grouping, measured) =
            Self::orient(a, b).ok_or_else(|| not_applicable(self, a, b))?;
        trace!(
            grouping = grouping.name(),
            measured = measured.name(),
            "Oriented Kruskal-Wallis operands"
        );

        let aligned = grouping.aligned_values(measured);
        let categories = distinct_sorted(aligned.iter().map(|(category, _)| *category));
        let category_index = rank_index(&categories);

        let mut groups: Vec<Vec<f64>> = vec![Vec::new(); categories.len()];
        for (category, value) in &aligned {
            let value = value
                .as_float()
                .ok_or_else(|| not_applicable(self, a, b))?;
            groups[category_index[*category]].push(value);
        }

        kruskal_wallis(&groups)
    }
}

/// H statistic with tie correction and its chi-square p-value.
pub(crate) fn kruskal_wallis(groups: &[Vec<f64>]) -> Result<TestOutcome> {
    let groups: Vec<&Vec<f64>> = groups.iter().filter(|g| !g.is_empty()).collect();
    if groups.len() < 2 {
        return Err(QuestError::computation(
            "kruskal-wallis",
            "at least two groups are required",
        ));
    }

    let pooled: Vec<f64> = groups.iter().flat_map(|g| g.iter().copied()).collect();
    let n = pooled.len() as f64;
    let ranks = average_ranks(&pooled);

    let mut offset = 0;
    let mut weighted = 0.0;
    for group in &groups {
        let rank_sum: f64 = ranks[offset..offset + group.len()].iter().sum();
        weighted += rank_sum * rank_sum / group.len() as f64;
        offset += group.len();
    }
    let h = 12.0 / (n * (n + 1.0)) * weighted - 3.0 * (n + 1.0);

    let ties: f64 = tie_groups(&pooled)
        .into_iter()
        .map(|t| {
            let t = t as f64;
            t * t * t - t
        })
        .sum();
    let correction = 1.0 - ties / (n * n * n - n);
    if correction <= 0.0 {
        return Err(QuestError::computation(
            "kruskal-wallis",
            "all values are identical",
        ));
    }

    let statistic = h / correction;
    Ok(TestOutcome {
        statistic,
        p_value: chi_square_sf(statistic, (groups.len() - 1) as f64),
    })
}
