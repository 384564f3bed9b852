//! StatQuest CLI - shared functionality for the `statquest` binary.
//!
//! Settings come from three layers: command line flags win over the JSON run
//! configuration file, which wins over the built-in defaults.

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use statquest::discovery::{Discovery, DiscoveryConfig, DiscoveryEngine};
use statquest::formatters::{
    descriptive_statistics_table, frequency_tables, test_descriptions, DelimitedFormatter,
    DotFormatter, JsonFormatter, RelationFormatter,
};
use statquest::hypothesis::{StatisticalTest, TestSuite};
use statquest::logging::LogConfig;
use statquest::observable::Observable;
use statquest::relation::Alpha;
use statquest::sources::{CsvOptions, CsvSource, ObservableSource};

/// Significance level used when neither the flag nor the config sets one.
pub const DEFAULT_ALPHA: f64 = 0.05;

pub const TESTS_CSV_FILE_NAME: &str = "tests.csv";
pub const TESTS_DOT_FILE_NAME: &str = "tests.gv";
pub const RELATIONS_JSON_FILE_NAME: &str = "relations.json";
pub const STATS_CSV_FILE_NAME: &str = "stats.csv";
pub const FREQS_CSV_FILE_NAME: &str = "freqs.csv";
pub const TESTS_TXT_FILE_NAME: &str = "tests.txt";

/// Arguments of `statquest run`.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// CSV file to analyse
    #[arg(long, short)]
    pub input: PathBuf,

    /// JSON run configuration
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Significance level in [0, 1]
    #[arg(long, short)]
    pub alpha: Option<f64>,

    /// Columns to analyse (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub columns: Option<Vec<String>>,

    /// Field delimiter of the input
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Decimal separator of numbers in the input
    #[arg(long)]
    pub decimal: Option<char>,

    /// Column holding row identifiers
    #[arg(long)]
    pub key_column: Option<String>,

    /// Test identifiers to run (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub tests: Option<Vec<String>>,

    /// Directory for the report files
    #[arg(long, short)]
    pub output_dir: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Log every pair and test
    #[arg(long, short)]
    pub verbose: bool,
}

/// Contents of the `--config` file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub alpha: Option<f64>,
    pub columns: Option<Vec<String>>,
    pub delimiter: Option<char>,
    pub decimal_separator: Option<char>,
    pub key_column: Option<String>,
    pub tests: Option<Vec<String>>,
    pub output_dir: Option<PathBuf>,
    pub discovery: Option<DiscoveryConfig>,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))
    }
}

/// Fully resolved settings of one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub input: PathBuf,
    pub alpha: Alpha,
    pub csv: CsvOptions,
    pub suite: TestSuite,
    pub discovery: DiscoveryConfig,
    pub log_config: LogConfig,
    pub output_dir: PathBuf,
}

impl Settings {
    /// Merges the flags with the config file named by `--config`, if any.
    pub fn resolve(args: &RunArgs) -> Result<Self> {
        let config = match &args.config {
            Some(path) => RunConfig::load(path)?,
            None => RunConfig::default(),
        };
        Self::merge(args, config)
    }

    pub fn merge(args: &RunArgs, config: RunConfig) -> Result<Self> {
        let alpha = Alpha::new(args.alpha.or(config.alpha).unwrap_or(DEFAULT_ALPHA))?;

        let delimiter = match args.delimiter.or(config.delimiter) {
            Some(c) if c.is_ascii() => c as u8,
            Some(c) => bail!("delimiter must be an ASCII character, got {c:?}"),
            None => b',',
        };

        let suite = match args.tests.as_ref().or(config.tests.as_ref()) {
            Some(ids) => TestSuite::from_ids(ids)?,
            None => TestSuite::all(),
        };
        if suite.is_empty() {
            bail!("no test selected");
        }

        let csv = CsvOptions {
            delimiter,
            decimal_separator: args.decimal.or(config.decimal_separator).unwrap_or('.'),
            columns: args.columns.clone().or(config.columns),
            key_column: args.key_column.clone().or(config.key_column),
            ..Default::default()
        };

        Ok(Self {
            input: args.input.clone(),
            alpha,
            csv,
            suite,
            discovery: config.discovery.unwrap_or_default(),
            log_config: if args.verbose {
                LogConfig::verbose()
            } else {
                LogConfig::default()
            },
            output_dir: args
                .output_dir
                .clone()
                .or(config.output_dir)
                .unwrap_or_else(|| PathBuf::from(".")),
        })
    }
}

/// What a run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub observables: usize,
    pub relations: usize,
    pub credible: usize,
    pub skipped: usize,
    pub files: Vec<PathBuf>,
}

/// Loads the input, runs discovery and writes every report file.
pub async fn run(settings: &Settings) -> Result<RunSummary> {
    let source = CsvSource::with_options(settings.input.to_string_lossy(), settings.csv.clone())
        .with_log_config(settings.log_config.clone());
    let observables = source
        .load()
        .await
        .with_context(|| format!("cannot load {}", source.description()))?;
    info!(observables = observables.len(), "Loaded observables");

    let engine = DiscoveryEngine::new(settings.suite.clone(), settings.discovery.clone())
        .with_log_config(settings.log_config.clone());
    let discovery = engine.discover_with_progress(&observables, |step, total| {
        debug!(step, total, "Discovery progress");
    })?;

    let files = write_reports(settings, &observables, &discovery)?;
    let credible = discovery.credible_only(settings.alpha).relation_count();

    Ok(RunSummary {
        observables: observables.len(),
        relations: discovery.relations.relation_count(),
        credible,
        skipped: discovery.skipped.len(),
        files,
    })
}

fn write_reports(
    settings: &Settings,
    observables: &[Arc<Observable>],
    discovery: &Discovery,
) -> Result<Vec<PathBuf>> {
    let dir = &settings.output_dir;
    fs::create_dir_all(dir)
        .with_context(|| format!("cannot create output directory {}", dir.display()))?;

    let alpha = settings.alpha;
    let credible = discovery.credible_only(alpha);

    let reports = [
        (
            TESTS_CSV_FILE_NAME,
            DelimitedFormatter::csv().format(&discovery.relations, alpha)?,
        ),
        (
            TESTS_DOT_FILE_NAME,
            DotFormatter::new().format(&credible, alpha)?,
        ),
        (
            RELATIONS_JSON_FILE_NAME,
            JsonFormatter::new().format(&discovery.relations, alpha)?,
        ),
        (
            STATS_CSV_FILE_NAME,
            descriptive_statistics_table(observables, ','),
        ),
        (FREQS_CSV_FILE_NAME, frequency_tables(observables, ',')),
        (TESTS_TXT_FILE_NAME, test_descriptions(&settings.suite)),
    ];

    let mut files = Vec::with_capacity(reports.len());
    for (name, content) in reports {
        let path = dir.join(name);
        fs::write(&path, content).with_context(|| format!("cannot write {}", path.display()))?;
        debug!(path = %path.display(), "Wrote report");
        files.push(path);
    }
    Ok(files)
}

/// Table of the available tests for `statquest tests`.
pub fn list_tests() -> String {
    let mut output = format!("{:<16}{:<26}{}\n", "ID", "NAME", "PROVES RELATIONSHIP");
    for test in StatisticalTest::ALL {
        output.push_str(&format!(
            "{:<16}{:<26}{}\n",
            test.id(),
            test.name(),
            if test.prove_relationship() { "yes" } else { "no" }
        ));
    }
    output
}
