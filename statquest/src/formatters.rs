//! Report writers for discovered relations and observable summaries.
//!
//! Relation reports implement [`RelationFormatter`]; the observable summaries
//! (descriptive statistics, frequency tables) and the test descriptions are
//! plain functions since they need no configuration beyond a separator.
//!
//! # Examples
//!
//! ```rust
//! use statquest::formatters::{DelimitedFormatter, RelationFormatter};
//! use statquest::discovery::RelationIndex;
//! use statquest::relation::Alpha;
//!
//! let formatter = DelimitedFormatter::tsv();
//! let output = formatter
//!     .format(&RelationIndex::new(), Alpha::new(0.05).unwrap())
//!     .unwrap();
//! assert!(output.starts_with("observable_a\tobservable_b"));
//! ```

use std::sync::Arc;

use crate::discovery::RelationIndex;
use crate::error::Result;
use crate::hypothesis::TestSuite;
use crate::observable::{DescriptiveStatistics, Observable};
use crate::relation::{Alpha, RelationRecord};

/// Configuration shared by the relation formatters.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Digits after the decimal point for statistics and p-values
    pub precision: usize,
    /// Whether to include the credibility flag
    pub include_credibility: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            precision: 6,
            include_credibility: true,
        }
    }
}

impl FormatterConfig {
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_credibility(mut self, include: bool) -> Self {
        self.include_credibility = include;
        self
    }
}

/// Renders a set of relations at a given significance level.
pub trait RelationFormatter {
    /// Formats every relation of `relations`, in pair order.
    fn format(&self, relations: &RelationIndex, alpha: Alpha) -> Result<String>;
}

fn records(relations: &RelationIndex, alpha: Alpha) -> Vec<RelationRecord> {
    relations.relations().map(|r| r.record(alpha)).collect()
}

/// Quotes a field if it contains the separator, a quote or a line break.
fn escape_field(field: &str, separator: char) -> String {
    if field.contains(separator) || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Delimited relation table, one row per relation, with the retained thesis.
#[derive(Debug, Clone)]
pub struct DelimitedFormatter {
    separator: char,
    config: FormatterConfig,
}

impl DelimitedFormatter {
    pub fn new(separator: char) -> Self {
        Self {
            separator,
            config: FormatterConfig::default(),
        }
    }

    /// Comma separated values.
    pub fn csv() -> Self {
        Self::new(',')
    }

    /// Tab separated values.
    pub fn tsv() -> Self {
        Self::new('\t')
    }

    pub fn with_config(mut self, config: FormatterConfig) -> Self {
        self.config = config;
        self
    }

    fn row<S: AsRef<str>>(&self, fields: &[S]) -> String {
        let sep = self.separator.to_string();
        fields
            .iter()
            .map(|f| escape_field(f.as_ref(), self.separator))
            .collect::<Vec<_>>()
            .join(&sep)
    }
}

impl Default for DelimitedFormatter {
    fn default() -> Self {
        Self::tsv()
    }
}

impl RelationFormatter for DelimitedFormatter {
    fn format(&self, relations: &RelationIndex, alpha: Alpha) -> Result<String> {
        let mut header = vec![
            "observable_a",
            "observable_b",
            "test",
            "statistic_name",
            "statistic",
            "p_value",
            "thesis",
        ];
        if self.config.include_credibility {
            header.push("credible");
        }

        let mut output = self.row(&header);
        output.push('\n');

        let precision = self.config.precision;
        for record in records(relations, alpha) {
            let mut fields = vec![
                record.a,
                record.b,
                record.test_name,
                record.statistic_name,
                format!("{:.precision$}", record.statistic),
                format!("{:.precision$}", record.p_value),
                record.thesis,
            ];
            if self.config.include_credibility {
                fields.push(record.credible.to_string());
            }
            output.push_str(&self.row(&fields));
            output.push('\n');
        }
        Ok(output)
    }
}

/// Undirected graph in the DOT language, one edge per pair.
///
/// The formatter draws every pair it is given; pass
/// [`RelationIndex::credible_only`] output to draw credible links only.
#[derive(Debug, Clone, Default)]
pub struct DotFormatter {
    label_edges: bool,
}

impl DotFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Labels each edge with the short names of the tests relating the pair.
    pub fn with_edge_labels(mut self, enabled: bool) -> Self {
        self.label_edges = enabled;
        self
    }
}

fn dot_id(name: &str) -> String {
    format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}

impl RelationFormatter for DotFormatter {
    fn format(&self, relations: &RelationIndex, _alpha: Alpha) -> Result<String> {
        let mut output = String::from("graph {\n");
        for (pair, pair_relations) in relations {
            if pair_relations.is_empty() {
                continue;
            }
            output.push_str(&format!("    {} -- {}", dot_id(&pair.a), dot_id(&pair.b)));
            if self.label_edges {
                let label = pair_relations
                    .iter()
                    .map(|r| r.test().short_name())
                    .collect::<Vec<_>>()
                    .join(", ");
                output.push_str(&format!(" [label={}]", dot_id(&label)));
            }
            output.push('\n');
        }
        output.push_str("}\n");
        Ok(output)
    }
}

/// JSON array of [`RelationRecord`]s.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl RelationFormatter for JsonFormatter {
    fn format(&self, relations: &RelationIndex, alpha: Alpha) -> Result<String> {
        let records = records(relations, alpha);
        let json = if self.pretty {
            serde_json::to_string_pretty(&records)?
        } else {
            serde_json::to_string(&records)?
        };
        Ok(json)
    }
}

/// Table of descriptive statistics, one row per ordinal or continuous
/// observable. Returns an empty string when there is no such observable.
pub fn descriptive_statistics_table(observables: &[Arc<Observable>], separator: char) -> String {
    let rows: Vec<(&str, DescriptiveStatistics)> = observables
        .iter()
        .filter_map(|o| o.descriptive_statistics().map(|s| (o.name(), s)))
        .collect();
    if rows.is_empty() {
        return String::new();
    }

    let sep = separator.to_string();
    let mut output = std::iter::once("observable")
        .chain(DescriptiveStatistics::LABELS)
        .collect::<Vec<_>>()
        .join(&sep);
    output.push('\n');
    for (name, stats) in rows {
        output.push_str(&escape_field(name, separator));
        for value in stats.values() {
            output.push(separator);
            output.push_str(&value.to_string());
        }
        output.push('\n');
    }
    output
}

/// Frequency table of each observable, separated by blank lines.
pub fn frequency_tables(observables: &[Arc<Observable>], separator: char) -> String {
    let mut blocks = Vec::with_capacity(observables.len());
    for observable in observables {
        let mut block = format!(
            "{}{separator}count\n",
            escape_field(observable.name(), separator)
        );
        for (value, count) in observable.frequency_table() {
            block.push_str(&escape_field(&value.to_string(), separator));
            block.push(separator);
            block.push_str(&count.to_string());
            block.push('\n');
        }
        blocks.push(block);
    }
    blocks.join("\n")
}

/// Long descriptions of the tests in `suite`, between ruler lines.
pub fn test_descriptions(suite: &TestSuite) -> String {
    let ruler = "=".repeat(80);
    let mut output = String::new();
    for test in suite.iter() {
        output.push_str(&ruler);
        output.push('\n');
        output.push_str(&format!("{} ({})\n\n", test.name(), test.id()));
        output.push_str(test.description().trim());
        output.push('\n');
    }
    if !suite.is_empty() {
        output.push_str(&ruler);
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hypothesis::StatisticalTest;

    fn alpha() -> Alpha {
        Alpha::new(0.05).unwrap()
    }

    fn sample_index() -> RelationIndex {
        let a = Arc::new(Observable::new("height", (1..=5).zip([1.0, 2.0, 3.0, 4.0, 5.0])).unwrap());
        let b = Arc::new(Observable::new("weight", (1..=5).zip([2.0, 4.1, 6.0, 8.2, 9.9])).unwrap());
        [
            StatisticalTest::Pearson.apply(&a, &b).unwrap(),
            StatisticalTest::Spearman.apply(&a, &b).unwrap(),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_delimited_rows() {
        let output = DelimitedFormatter::csv().format(&sample_index(), alpha()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "observable_a,observable_b,test,statistic_name,statistic,p_value,thesis,credible"
        );
        assert!(lines[1].starts_with("height,weight,Pearson Correlation Test,r,0.99"));
        assert!(lines[1].ends_with(",true"));
    }

    #[test]
    fn test_delimited_without_credibility() {
        let formatter = DelimitedFormatter::tsv()
            .with_config(FormatterConfig::default().with_credibility(false).with_precision(2));
        let output = formatter.format(&sample_index(), alpha()).unwrap();
        assert!(!output.contains("credible"));
        assert!(output.lines().nth(1).unwrap().contains("\t1.00\t"));
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain", ','), "plain");
        assert_eq!(escape_field("a,b", ','), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\"", '\t'), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_dot_one_edge_per_pair() {
        let output = DotFormatter::new().format(&sample_index(), alpha()).unwrap();
        assert_eq!(output, "graph {\n    \"height\" -- \"weight\"\n}\n");

        let labelled = DotFormatter::new()
            .with_edge_labels(true)
            .format(&sample_index(), alpha())
            .unwrap();
        assert!(labelled.contains("[label=\"Pearson r, Spearman r\"]"));
    }

    #[test]
    fn test_dot_empty_graph() {
        let output = DotFormatter::new().format(&RelationIndex::new(), alpha()).unwrap();
        assert_eq!(output, "graph {\n}\n");
    }

    #[test]
    fn test_json_records() {
        let output = JsonFormatter::new()
            .with_pretty(false)
            .format(&sample_index(), alpha())
            .unwrap();
        let records: Vec<RelationRecord> = serde_json::from_str(&output).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].test, StatisticalTest::Pearson);
        assert!(records[1].credible);
    }

    #[test]
    fn test_descriptive_statistics_table_skips_nominal() {
        let numbers = Arc::new(Observable::new("n", (1..=4).zip([1, 2, 3, 4])).unwrap());
        let labels = Arc::new(Observable::new("l", (1..=2).zip(["x", "y"])).unwrap());
        let table = descriptive_statistics_table(&[numbers, labels.clone()], ',');
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("observable,mean,median"));
        assert!(lines[1].starts_with("n,2.5,2.5,"));

        assert_eq!(descriptive_statistics_table(&[labels], ','), "");
    }

    #[test]
    fn test_frequency_tables() {
        let obs = Arc::new(Observable::new("g", (1..=3).zip(["b", "a", "b"])).unwrap());
        let output = frequency_tables(&[obs], ';');
        assert_eq!(output, "g;count\na;1\nb;2\n");
    }

    #[test]
    fn test_descriptions_cover_suite() {
        let suite = TestSuite::new([StatisticalTest::ChiSquare, StatisticalTest::Kendall]);
        let output = test_descriptions(&suite);
        assert_eq!(output.matches(&"=".repeat(80)).count(), 3);
        assert!(output.contains("(chi-square)"));
        assert!(output.contains("(kendall)"));
        assert_eq!(test_descriptions(&TestSuite::new([])), "");
    }
}
