//! CSV discovery example: load a semicolon separated file with decimal
//! commas and write the standard reports.
//!
//! Run with:
//! ```bash
//! cargo run -p statquest-demos --example csv_discovery
//! ```

use statquest::formatters::{
    descriptive_statistics_table, DelimitedFormatter, DotFormatter, RelationFormatter,
};
use statquest::logging::setup::{init_logging, LoggingConfig};
use statquest::prelude::*;
use statquest::sources::CsvOptions;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingConfig::development())?;

    let csv_data = "\
station;temperature;humidity;wind;sky
north;12,5;81;3;cloudy
north;14,1;77;4;cloudy
south;21,3;55;2;clear
south;22,8;49;1;clear
east;17,2;66;5;rain
east;16,4;70;6;rain
west;19,9;58;2;clear
west;18,7;61;3;cloudy
";

    let temp_dir = tempfile::tempdir()?;
    let path = temp_dir.path().join("weather.csv");
    std::fs::write(&path, csv_data)?;

    let options = CsvOptions {
        delimiter: b';',
        decimal_separator: ',',
        ..Default::default()
    };
    let source = CsvSource::with_options(path.to_string_lossy(), options);
    let observables = source.load().await?;
    println!("Loaded {} observables from {}\n", observables.len(), source.description());

    print!("{}", descriptive_statistics_table(&observables, '\t'));

    let engine = DiscoveryEngine::new(TestSuite::all(), DiscoveryConfig::default());
    let discovery = engine.discover(&observables)?;

    let alpha = Alpha::new(0.05)?;
    println!("\n{}", DelimitedFormatter::tsv().format(&discovery.relations, alpha)?);
    println!(
        "{}",
        DotFormatter::new()
            .with_edge_labels(true)
            .format(&discovery.credible_only(alpha), alpha)?
    );
    Ok(())
}
