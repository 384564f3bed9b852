//! Basic discovery example demonstrating StatQuest's core functionality.
//!
//! This example shows how to:
//! - Build observables of each scale from in-memory data
//! - Run the discovery engine with every test
//! - Filter the relations by credibility and print the retained theses
//!
//! Run with:
//! ```bash
//! cargo run -p statquest-demos --example basic_discovery
//! ```

use std::sync::Arc;

use statquest::prelude::*;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Twelve patients: age in years, height in cm, blood group and smoking habit
    let age = [23, 35, 41, 52, 29, 60, 47, 33, 38, 55, 26, 44];
    let height = [
        170.5, 182.0, 165.3, 175.0, 190.2, 160.8, 178.4, 171.1, 168.9, 162.4, 185.7, 174.3,
    ];
    let blood = ["A", "B", "A", "0", "B", "A", "0", "AB", "A", "0", "B", "A"];
    let smoker = ["no", "yes", "no", "yes", "no", "yes", "yes", "no", "no", "yes", "no", "yes"];

    let observables = vec![
        Arc::new(Observable::new("age", (1..).zip(age))?),
        Arc::new(Observable::new("height", (1..).zip(height))?),
        Arc::new(Observable::new("blood", (1..).zip(blood))?),
        Arc::new(Observable::new("smoker", (1..).zip(smoker))?),
    ];

    println!("Observables:");
    for observable in &observables {
        println!(
            "  {:<8} {:<10} {} values",
            observable.name(),
            observable.scale().to_string(),
            observable.len()
        );
    }

    let engine = DiscoveryEngine::new(TestSuite::all(), DiscoveryConfig::default());
    let discovery = engine.discover(&observables)?;

    println!("\nAll relations:");
    for relation in discovery.relations.relations() {
        println!("  {relation}");
    }

    let alpha = Alpha::new(0.05)?;
    println!("\nCredible at alpha = {alpha}:");
    for relation in discovery.credible_only(alpha).relations() {
        println!(
            "  {} ~ {} [{}]: {}",
            relation.a().name(),
            relation.b().name(),
            relation.test().short_name(),
            relation.thesis(alpha)
        );
    }

    if !discovery.skipped.is_empty() {
        println!("\nSkipped: {}", discovery.skipped.len());
    }
    Ok(())
}
