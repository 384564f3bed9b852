//! Correlation tests: Pearson r, Spearman r and Kendall tau-b.
//!
//! All three restrict both observables to their shared rows, are symmetric in
//! their operands, and reject constant input as undefined.

use super::special::{normal_two_sided_p, student_t_two_sided_p};
use super::{average_ranks, not_applicable, paired_floats, tie_groups, PairwiseTest, TestOutcome};
use crate::error::{QuestError, Result};
use crate::observable::Observable;

/// Largest sample without ties that gets an exact Kendall p-value.
const KENDALL_EXACT_MAX_N: usize = 33;

const CORRELATION_H0: &str = "H0: data are not correlated";
const CORRELATION_H1: &str = "H1: data are correlated";

fn both_numeric(a: &Observable, b: &Observable) -> bool {
    a.flags().is_numeric() && b.flags().is_numeric()
}

/// Pearson product-moment correlation with a t-distribution p-value.
#[derive(Debug, Clone, Copy, Default)]
pub struct PearsonTest;

impl PairwiseTest for PearsonTest {
    fn id(&self) -> &'static str {
        "pearson"
    }

    fn name(&self) -> &'static str {
        "Pearson Correlation Test"
    }

    fn short_name(&self) -> &'static str {
        "Pearson r"
    }

    fn statistic_name(&self) -> &'static str {
        "r"
    }

    fn h0_thesis(&self) -> &'static str {
        CORRELATION_H0
    }

    fn h1_thesis(&self) -> &'static str {
        CORRELATION_H1
    }

    fn description(&self) -> &'static str {
        "Measures the linear correlation of two numeric variables. Assumes \
         roughly normal data and a linear dependency; strongly non-linear \
         relationships can go unnoticed. A p-value below alpha means the \
         variables are correlated."
    }

    fn prove_relationship(&self) -> bool {
        true
    }

    fn can_be_carried_out(&self, a: &Observable, b: &Observable) -> bool {
        both_numeric(a, b)
    }

    fn compute(&self, a: &Observable, b: &Observable) -> Result<TestOutcome> {
        if !self.can_be_carried_out(a, b) {
            return Err(not_applicable(self, a, b));
        }
        let (x, y) = paired_floats(self, a, b)?;
        correlation_outcome(self.id(), &x, &y)
    }
}

/// Spearman rank correlation: Pearson r on average ranks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpearmanTest;

impl PairwiseTest for SpearmanTest {
    fn id(&self) -> &'static str {
        "spearman"
    }

    fn name(&self) -> &'static str {
        "Spearman r Test"
    }

    fn short_name(&self) -> &'static str {
        "Spearman r"
    }

    fn statistic_name(&self) -> &'static str {
        "rho"
    }

    fn h0_thesis(&self) -> &'static str {
        CORRELATION_H0
    }

    fn h1_thesis(&self) -> &'static str {
        CORRELATION_H1
    }

    fn description(&self) -> &'static str {
        "Measures the monotonic correlation of two numeric variables by \
         correlating their ranks. It needs no normality and detects any \
         monotonic dependency. A p-value below alpha means the variables are \
         correlated."
    }

    fn prove_relationship(&self) -> bool {
        true
    }

    fn can_be_carried_out(&self, a: &Observable, b: &Observable) -> bool {
        both_numeric(a, b)
    }

    fn compute(&self, a: &Observable, b: &Observable) -> Result<TestOutcome> {
        if !self.can_be_carried_out(a, b) {
            return Err(not_applicable(self, a, b));
        }
        let (x, y) = paired_floats(self, a, b)?;
        correlation_outcome(self.id(), &average_ranks(&x), &average_ranks(&y))
    }
}

/// Kendall rank correlation (tau-b).
#[derive(Debug, Clone, Copy, Default)]
pub struct KendallTest;

impl PairwiseTest for KendallTest {
    fn id(&self) -> &'static str {
        "kendall"
    }

    fn name(&self) -> &'static str {
        "Kendall tau Test"
    }

    fn short_name(&self) -> &'static str {
        "Kendall tau"
    }

    fn statistic_name(&self) -> &'static str {
        "tau"
    }

    fn h0_thesis(&self) -> &'static str {
        CORRELATION_H0
    }

    fn h1_thesis(&self) -> &'static str {
        CORRELATION_H1
    }

    fn description(&self) -> &'static str {
        "Counts concordant and discordant pairs of rows to measure the ordinal \
         association of two numeric variables, correcting for ties. Robust for \
         small samples. A p-value below alpha means the variables are \
         correlated."
    }

    fn prove_relationship(&self) -> bool {
        true
    }

    fn can_be_carried_out(&self, a: &Observable, b: &Observable) -> bool {
        both_numeric(a, b)
    }

    fn compute(&self, a: &Observable, b: &Observable) -> Result<TestOutcome> {
        if !self.can_be_carried_out(a, b) {
            return Err(not_applicable(self, a, b));
        }
        let (x, y) = paired_floats(self, a, b)?;
        kendall_tau(&x, &y)
    }
}

/// Pearson coefficient of two equally long samples.
pub(crate) fn pearson_r(test: &str, x: &[f64], y: &[f64]) -> Result<f64> {
    let n = x.len();
    if n < 2 {
        return Err(QuestError::computation(test, "at least two rows are required"));
    }
    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return Err(QuestError::computation(test, "input is constant"));
    }
    Ok((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

fn correlation_outcome(test: &str, x: &[f64], y: &[f64]) -> Result<TestOutcome> {
    let r = pearson_r(test, x, y)?;
    let n = x.len() as f64;
    let p_value = if x.len() == 2 {
        1.0
    } else if r.abs() == 1.0 {
        0.0
    } else {
        let df = n - 2.0;
        let t = r * (df / (1.0 - r * r)).sqrt();
        student_t_two_sided_p(t, df)
    };
    Ok(TestOutcome {
        statistic: r,
        p_value,
    })
}

/// Kendall tau-b and its two-sided p-value.
pub(crate) fn kendall_tau(x: &[f64], y: &[f64]) -> Result<TestOutcome> {
    let n = x.len();
    if n < 2 {
        return Err(QuestError::computation("kendall", "at least two rows are required"));
    }

    let (mut concordant, mut discordant) = (0u64, 0u64);
    for i in 0..n {
        for j in (i + 1)..n {
            let product = (x[i] - x[j]) * (y[i] - y[j]);
            if product > 0.0 {
                concordant += 1;
            } else if product < 0.0 {
                discordant += 1;
            }
        }
    }

    let total = (n * (n - 1) / 2) as f64;
    let x_ties = tie_groups(x);
    let y_ties = tie_groups(y);
    let tied_pairs = |groups: &[usize]| -> f64 {
        groups.iter().map(|&t| (t * (t - 1) / 2) as f64).sum()
    };
    let untied_x = total - tied_pairs(&x_ties);
    let untied_y = total - tied_pairs(&y_ties);
    if untied_x == 0.0 || untied_y == 0.0 {
        return Err(QuestError::computation("kendall", "input is constant"));
    }

    let score = concordant as f64 - discordant as f64;
    let tau = (score / (untied_x * untied_y).sqrt()).clamp(-1.0, 1.0);

    let has_ties = x_ties.len() < n || y_ties.len() < n;
    let p_value = if !has_ties && n <= KENDALL_EXACT_MAX_N {
        kendall_exact_p(n, discordant)
    } else {
        kendall_asymptotic_p(n, score, &x_ties, &y_ties)
    };

    Ok(TestOutcome {
        statistic: tau,
        p_value,
    })
}

/// Exact two-sided p-value from the distribution of permutation inversions.
fn kendall_exact_p(n: usize, discordant: u64) -> f64 {
    let total = n * (n - 1) / 2;
    let c = (discordant as usize).min(total - discordant as usize);

    // counts[k]: permutations of the current size with k inversions
    let mut counts = vec![0.0f64; total + 1];
    counts[0] = 1.0;
    for size in 2..=n {
        let max_inversions = size * (size - 1) / 2;
        let mut next = vec![0.0f64; total + 1];
        let mut window = 0.0;
        for k in 0..=max_inversions {
            window += counts[k];
            if k >= size {
                window -= counts[k - size];
            }
            next[k] = window;
        }
        counts = next;
    }

    let permutations: f64 = counts.iter().sum();
    let tail: f64 = counts[..=c].iter().sum();
    (2.0 * tail / permutations).min(1.0)
}

/// Normal approximation with the variance of the score corrected for ties.
fn kendall_asymptotic_p(n: usize, score: f64, x_ties: &[usize], y_ties: &[usize]) -> f64 {
    let nf = n as f64;
    let m = nf * (nf - 1.0);
    let moments = |groups: &[usize]| -> (f64, f64, f64) {
        groups.iter().fold((0.0, 0.0, 0.0), |(pairs, triples, weighted), &t| {
            let t = t as f64;
            (
                pairs + t * (t - 1.0),
                triples + t * (t - 1.0) * (t - 2.0),
                weighted + t * (t - 1.0) * (2.0 * t + 5.0),
            )
        })
    };
    let (x_pairs, x_triples, x_weighted) = moments(x_ties);
    let (y_pairs, y_triples, y_weighted) = moments(y_ties);

    let mut variance = (m * (2.0 * nf + 5.0) - x_weighted - y_weighted) / 18.0
        + x_pairs * y_pairs / (2.0 * m);
    if n > 2 {
        variance += x_triples * y_triples / (9.0 * m * (nf - 2.0));
    }
    if variance <= 0.0 {
        return 1.0;
    }
    normal_two_sided_p(score / variance.sqrt())
}
