//! Facility Geo-Analytics Pipeline
//!
//! Loads the facility export, splits it into two category groups, resolves
//! coordinates offline, ranks every cross-category geodesic distance, writes
//! the interactive map and the JSON report, and mirrors a summary to stdout.
//!
//! Paths and the group preset can be overridden through the environment:
//!   FACILITY_EXPORT   source CSV (default: facility_export.csv)
//!   OUTPUT_MAP        map document (default: facility_locations_map.html)
//!   OUTPUT_REPORT     JSON report (default: facility_map_report.json)
//!   GROUP_PRESET      "finished_goods" (default) or "equipment"

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use facility_atlas::aggregate::country_counts;
use facility_atlas::geocode::{attach_coordinates, retain_resolved, OfflineResolver};
use facility_atlas::report::{self, MapMetadata, MapReport, MapResults};
use facility_atlas::{distance, map, AtlasError, FacilityTable, MapConfig};

fn main() -> Result<()> {
    env_logger::init();

    println!("\n{}", "=".repeat(70));
    println!("FACILITY MAPPING PIPELINE");
    println!("{}", "=".repeat(70));

    let mut cfg = match std::env::var("GROUP_PRESET").as_deref() {
        Ok("equipment") => MapConfig::components_vs_equipment(),
        _ => MapConfig::finished_goods_vs_components(),
    };
    if let Ok(path) = std::env::var("FACILITY_EXPORT") {
        cfg.source_path = PathBuf::from(path);
    }
    if let Ok(path) = std::env::var("OUTPUT_MAP") {
        cfg.output_map = PathBuf::from(path);
    }
    if let Ok(path) = std::env::var("OUTPUT_REPORT") {
        cfg.output_report = PathBuf::from(path);
    }

    // Step 1: Load and partition.
    println!("\nStep 1: Loading facility export...");
    let table = FacilityTable::load(&cfg.source_path)?;
    println!("  Records: {} ({} rows skipped)", table.records.len(), table.skipped_rows);

    let (mut group_a, mut group_b) = table.partition(&cfg.group_a, &cfg.group_b);
    println!("  {}: {} facilities", cfg.group_a_label, group_a.len());
    println!("  {}: {} facilities", cfg.group_b_label, group_b.len());

    if group_a.is_empty() {
        return Err(AtlasError::EmptyPartition(cfg.group_a.describe()).into());
    }
    if group_b.is_empty() {
        return Err(AtlasError::EmptyPartition(cfg.group_b.describe()).into());
    }

    // Step 2: Resolve coordinates.
    println!("\nStep 2: Resolving coordinates (offline table)...");
    let mut resolver = OfflineResolver::new();
    let mut resolution = attach_coordinates(&mut group_a, &mut resolver);
    let stats_b = attach_coordinates(&mut group_b, &mut resolver);
    resolution.merge(&stats_b);

    let group_a_total = group_a.len();
    let group_b_total = group_b.len();
    let (group_a, dropped_a) = retain_resolved(group_a);
    let (group_b, dropped_b) = retain_resolved(group_b);
    println!(
        "  {}: {} of {} located",
        cfg.group_a_label,
        group_a.len(),
        group_a_total
    );
    println!(
        "  {}: {} of {} located",
        cfg.group_b_label,
        group_b.len(),
        group_b_total
    );

    // Zero resolved records in either group is the designed-fatal condition.
    if group_a.is_empty() {
        return Err(AtlasError::NoResolvedFacilities(cfg.group_a_label.clone()).into());
    }
    if group_b.is_empty() {
        return Err(AtlasError::NoResolvedFacilities(cfg.group_b_label.clone()).into());
    }

    // Step 3: Pairwise distances.
    println!("\nStep 3: Ranking cross-category distances...");
    let pairs = distance::rank_pairs(&group_a, &group_b);
    println!("  {} pairs computed", pairs.len());
    let closest = distance::top_k(&pairs, cfg.line_count);

    // Step 4: Map document.
    println!("\nStep 4: Writing map document...");
    let html = map::render_map(&group_a, &group_b, &closest, &cfg)?;
    fs::write(&cfg.output_map, html)
        .with_context(|| format!("Failed to write map: {}", cfg.output_map.display()))?;
    println!("  Map saved as: {}", cfg.output_map.display());

    // Step 5: Report.
    let report = MapReport {
        metadata: MapMetadata {
            generated_at: report::timestamp(),
            group_a_label: cfg.group_a_label.clone(),
            group_b_label: cfg.group_b_label.clone(),
            group_a_total,
            group_a_resolved: group_a.len(),
            group_a_dropped: dropped_a,
            group_b_total,
            group_b_resolved: group_b.len(),
            group_b_dropped: dropped_b,
            resolution,
            line_count: cfg.line_count,
        },
        results: MapResults {
            distance_stats: distance::DistanceStats::from_sorted(&pairs),
            closest_pairs: closest,
            group_a_top_countries: country_counts(&group_a),
            group_b_top_countries: country_counts(&group_b),
        },
    };
    report::write_json(&cfg.output_report, &report)?;
    println!("  Report saved as: {}", cfg.output_report.display());

    report.print_summary();
    Ok(())
}
