//! Descriptive statistics for numeric observables.

use serde::{Deserialize, Serialize};

/// Summary of a numeric sample.
///
/// Standard deviation and variance are population values (divisor n);
/// skewness and kurtosis are the biased moment estimators, kurtosis in excess
/// form (0 for a normal distribution).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStatistics {
    pub mean: f64,
    pub median: f64,
    pub lower_quartile: f64,
    pub upper_quartile: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
    pub variance: f64,
    pub skewness: f64,
    pub kurtosis: f64,
}

impl DescriptiveStatistics {
    /// Column labels, in the order of [`values`](Self::values).
    pub const LABELS: [&'static str; 10] = [
        "mean",
        "median",
        "lower quartile",
        "upper quartile",
        "min",
        "max",
        "std dev",
        "variance",
        "skewness",
        "kurtosis",
    ];

    /// Computes the summary; `None` for an empty sample.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let moment = |k: i32| sorted.iter().map(|x| (x - mean).powi(k)).sum::<f64>() / n;
        let variance = moment(2);
        let (skewness, kurtosis) = if variance > 0.0 {
            (
                moment(3) / variance.powf(1.5),
                moment(4) / (variance * variance) - 3.0,
            )
        } else {
            (f64::NAN, f64::NAN)
        };

        Some(Self {
            mean,
            median: percentile(&sorted, 50.0),
            lower_quartile: percentile(&sorted, 25.0),
            upper_quartile: percentile(&sorted, 75.0),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            std_dev: variance.sqrt(),
            variance,
            skewness,
            kurtosis,
        })
    }

    pub fn values(&self) -> [f64; 10] {
        [
            self.mean,
            self.median,
            self.lower_quartile,
            self.upper_quartile,
            self.min,
            self.max,
            self.std_dev,
            self.variance,
            self.skewness,
            self.kurtosis,
        ]
    }
}

/// Percentile of sorted data with linear interpolation between closest ranks.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let position = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_quartiles_interpolate() {
        let stats = DescriptiveStatistics::from_values(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_close(stats.mean, 2.5);
        assert_close(stats.median, 2.5);
        assert_close(stats.lower_quartile, 1.75);
        assert_close(stats.upper_quartile, 3.25);
        assert_close(stats.min, 1.0);
        assert_close(stats.max, 4.0);
        assert_close(stats.variance, 1.25);
        assert_close(stats.std_dev, 1.25f64.sqrt());
        assert_close(stats.skewness, 0.0);
        assert_close(stats.kurtosis, -1.36);
    }

    #[test]
    fn test_skewed_sample() {
        let stats = DescriptiveStatistics::from_values(&[1.0, 1.0, 1.0, 10.0]).unwrap();
        assert!(stats.skewness > 0.0);
        assert_close(stats.median, 1.0);
    }

    #[test]
    fn test_constant_sample_has_undefined_shape() {
        let stats = DescriptiveStatistics::from_values(&[5.0, 5.0]).unwrap();
        assert_close(stats.variance, 0.0);
        assert!(stats.skewness.is_nan());
        assert!(stats.kurtosis.is_nan());
    }

    #[test]
    fn test_empty_sample() {
        assert!(DescriptiveStatistics::from_values(&[]).is_none());
    }
}
