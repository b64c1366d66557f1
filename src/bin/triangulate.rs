//! Facility Triangulation Pipeline
//!
//! Cross-tabulates the full facility table: per-country clusters, operational
//! patterns by facility type, product patterns, workforce metrics, and the
//! concentration view. Writes a timestamped JSON report and mirrors the
//! summary to stdout.
//!
//! Environment overrides:
//!   FACILITY_EXPORT   source CSV (default: facility_export.csv)
//!   OUTPUT_REPORT     JSON report (default: facility_triangulation_report.json)

use anyhow::Result;
use std::path::PathBuf;

use facility_atlas::aggregate::{concentration_insights, summarize_by, workforce_metrics};
use facility_atlas::report::{
    self, TriangulationMetadata, TriangulationReport, TriangulationResults, TriangulationSummary,
};
use facility_atlas::FacilityTable;

fn main() -> Result<()> {
    env_logger::init();

    println!("\n{}", "=".repeat(70));
    println!("FACILITY TRIANGULATION PIPELINE");
    println!("{}", "=".repeat(70));

    let source = PathBuf::from(
        std::env::var("FACILITY_EXPORT").unwrap_or_else(|_| "facility_export.csv".to_string()),
    );
    let output = PathBuf::from(
        std::env::var("OUTPUT_REPORT")
            .unwrap_or_else(|_| "facility_triangulation_report.json".to_string()),
    );

    // Step 1: Load.
    println!("\nStep 1: Loading facility export...");
    let table = FacilityTable::load(&source)?;
    println!("  Records: {} ({} rows skipped)", table.records.len(), table.skipped_rows);

    // Step 2: Aggregate.
    println!("\nStep 2: Cross-tabulating...");
    let records = &table.records;
    let facility_clusters = summarize_by(records, |r| r.country.clone());
    let operational_patterns = summarize_by(records, |r| Some(r.category.clone()));
    let product_patterns = summarize_by(records, |r| r.product_type.clone());
    let metrics = workforce_metrics(records);
    let concentration = concentration_insights(records);
    println!("  Countries analyzed: {}", facility_clusters.len());
    println!("  Facility types analyzed: {}", operational_patterns.len());

    // Step 3: Report.
    let mut facility_types: Vec<String> = operational_patterns.keys().cloned().collect();
    facility_types.sort();

    let report = TriangulationReport {
        metadata: TriangulationMetadata {
            generated_at: report::timestamp(),
            source: source.display().to_string(),
            total_facilities: records.len(),
            skipped_rows: table.skipped_rows,
        },
        summary: TriangulationSummary {
            countries_with_facilities: facility_clusters.len(),
            facility_types,
            total_workforce: metrics.total_workers,
        },
        results: TriangulationResults {
            facility_clusters,
            operational_patterns,
            product_patterns,
            workforce_metrics: metrics,
            concentration,
        },
    };

    report::write_json(&output, &report)?;
    println!("\nReport saved as: {}", output.display());

    report.print_summary();
    Ok(())
}
