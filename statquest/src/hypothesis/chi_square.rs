//! Pearson's chi-square test of independence.

use tracing::trace;

use super::special::chi_square_sf;
use super::{not_applicable, PairwiseTest, TestOutcome};
use crate::error::{QuestError, Result};
use crate::observable::{distinct_sorted, rank_index, Observable};

/// Chi-square test on the cross-tabulation of two categorical observables.
///
/// A 2×2 table gets the Yates continuity correction. A table with a single
/// row or column has no degrees of freedom and reports independence
/// (statistic 0, p-value 1).
#[derive(Debug, Clone, Copy, Default)]
pub struct ChiSquareTest;

impl PairwiseTest for ChiSquareTest {
    fn id(&self) -> &'static str {
        "chi-square"
    }

    fn name(&self) -> &'static str {
        "Pearson's Chi-Square Test of Independence"
    }

    fn short_name(&self) -> &'static str {
        "chi-square"
    }

    fn statistic_name(&self) -> &'static str {
        "chi-square"
    }

    fn h0_thesis(&self) -> &'static str {
        "H0: variables are independent"
    }

    fn h1_thesis(&self) -> &'static str {
        "H1: variables are not independent"
    }

    fn description(&self) -> &'static str {
        "Cross-tabulates two categorical variables (nominal or ordinal) over \
         the rows they share and compares the observed counts with the counts \
         expected under independence. A p-value below alpha rejects \
         independence: the variables are related."
    }

    fn prove_relationship(&self) -> bool {
        true
    }

    fn can_be_carried_out(&self, a: &Observable, b: &Observable) -> bool {
        a.flags().is_categorical() && b.flags().is_categorical()
    }

    fn compute(&self, a: &Observable, b: &Observable) -> Result<TestOutcome> {
        if !self.can_be_carried_out(a, b) {
            return Err(not_applicable(self, a, b));
        }
        let aligned = a.aligned_values(b);
        if aligned.is_empty() {
            return Err(QuestError::computation(self.id(), "no shared rows"));
        }

        let rows = distinct_sorted(aligned.iter().map(|(x, _)| *x));
        let columns = distinct_sorted(aligned.iter().map(|(_, y)| *y));
        let row_index = rank_index(&rows);
        let column_index = rank_index(&columns);

        let mut observed = vec![vec![0.0f64; columns.len()]; rows.len()];
        for (x, y) in &aligned {
            observed[row_index[*x]][column_index[*y]] += 1.0;
        }
        trace!(
            rows = rows.len(),
            columns = columns.len(),
            "Built contingency table"
        );

        Ok(chi_square_independence(&observed))
    }
}

/// Chi-square statistic and p-value of a contingency table whose margins are
/// all positive.
pub(crate) fn chi_square_independence(observed: &[Vec<f64>]) -> TestOutcome {
    let row_count = observed.len();
    let column_count = observed.first().map_or(0, Vec::len);
    let dof = row_count.saturating_sub(1) * column_count.saturating_sub(1);
    if dof == 0 {
        return TestOutcome {
            statistic: 0.0,
            p_value: 1.0,
        };
    }

    let row_totals: Vec<f64> = observed.iter().map(|row| row.iter().sum()).collect();
    let column_totals: Vec<f64> = (0..column_count)
        .map(|j| observed.iter().map(|row| row[j]).sum())
        .collect();
    let total: f64 = row_totals.iter().sum();

    let mut statistic = 0.0;
    for (i, row) in observed.iter().enumerate() {
        for (j, &count) in row.iter().enumerate() {
            let expected = row_totals[i] * column_totals[j] / total;
            let mut count = count;
            if dof == 1 {
                // Yates: move each count half a unit towards its expectation
                let difference = expected - count;
                count += difference.signum() * difference.abs().min(0.5);
            }
            statistic += (count - expected).powi(2) / expected;
        }
    }

    TestOutcome {
        statistic,
        p_value: chi_square_sf(statistic, dof as f64),
    }
}
