//! `statquest` - screen a table for credible pairwise relationships.
//!
//! ```text
//! statquest run --input patients.csv --alpha 0.05 --output-dir report/
//! statquest tests
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;

use statquest::logging::setup::{init_logging, LoggingConfig};
use statquest_cli::{list_tests, run, RunArgs, Settings};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Discover relations in a CSV file and write the reports
    Run(RunArgs),
    /// List the available statistical tests
    Tests,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => {
            let settings = Settings::resolve(&args)?;
            let logging = if args.verbose {
                LoggingConfig::development()
            } else {
                LoggingConfig::default()
            };
            init_logging(
                logging
                    .with_log_config(&settings.log_config)
                    .with_json_format(args.json_logs),
            )?;

            tracing::event!(
                Level::INFO,
                input = %settings.input.display(),
                alpha = %settings.alpha,
                tests = settings.suite.len(),
                "Starting discovery"
            );

            let summary = run(&settings).await?;
            println!(
                "{} observables, {} relations ({} credible at alpha = {}), {} skipped",
                summary.observables,
                summary.relations,
                summary.credible,
                settings.alpha,
                summary.skipped
            );
            for file in &summary.files {
                println!("  wrote {}", file.display());
            }
        }
        Command::Tests => print!("{}", list_tests()),
    }
    Ok(())
}
