//! Report Envelopes
//!
//! Every pipeline emits a JSON report with a `metadata` block (timestamp,
//! counts, configuration echoes) and a `results` block, plus a plain-text
//! summary mirrored to stdout. Unresolved and dropped record counts always
//! travel in the metadata so silent data loss stays visible.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::aggregate::{ConcentrationInsights, CountryCount, GroupSummary, WorkforceMetrics};
use crate::distance::{DistanceStats, FacilityPair};
use crate::filings::DocumentEntry;
use crate::geocode::ResolutionStats;
use crate::scan::insights::{OpportunityAnalysis, RiskAnalysis, StrategicInsights};
use crate::scan::{CategoryMatches, SentimentScore};

/// ISO-8601 timestamp for metadata blocks.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339()
}

/// Pretty-printed JSON to disk, creating parent directories as needed.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    let json = serde_json::to_vec_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write report: {}", path.display()))
}

/* ------------------------------------------------------------------------- */
/* Facility map report                                                       */
/* ------------------------------------------------------------------------- */

#[derive(Debug, Serialize)]
pub struct MapReport {
    pub metadata: MapMetadata,
    pub results: MapResults,
}

#[derive(Debug, Serialize)]
pub struct MapMetadata {
    pub generated_at: String,
    pub group_a_label: String,
    pub group_b_label: String,
    pub group_a_total: usize,
    pub group_a_resolved: usize,
    pub group_a_dropped: usize,
    pub group_b_total: usize,
    pub group_b_resolved: usize,
    pub group_b_dropped: usize,
    /// How resolutions were obtained; country-approximate entries are
    /// jittered centroids, not geocoding results.
    pub resolution: ResolutionStats,
    pub line_count: usize,
}

#[derive(Debug, Serialize)]
pub struct MapResults {
    pub distance_stats: Option<DistanceStats>,
    pub closest_pairs: Vec<FacilityPair>,
    pub group_a_top_countries: Vec<CountryCount>,
    pub group_b_top_countries: Vec<CountryCount>,
}

impl MapReport {
    /// Mirror the human-readable summary to stdout.
    pub fn print_summary(&self) {
        let m = &self.metadata;
        println!("\n{}", "=".repeat(70));
        println!("FACILITY MAPPING REPORT");
        println!("{}", "=".repeat(70));

        println!(
            "\n{} facilities: {} ({} of {} resolved, {} dropped)",
            m.group_a_label, m.group_a_resolved, m.group_a_resolved, m.group_a_total, m.group_a_dropped
        );
        print_top_countries(&self.results.group_a_top_countries);

        println!(
            "\n{} facilities: {} ({} of {} resolved, {} dropped)",
            m.group_b_label, m.group_b_resolved, m.group_b_resolved, m.group_b_total, m.group_b_dropped
        );
        print_top_countries(&self.results.group_b_top_countries);

        if let Some(stats) = &self.results.distance_stats {
            println!("\nDistance statistics between {} and {} (km):", m.group_a_label, m.group_b_label);
            println!("  Shortest distance: {:.1}", stats.shortest_km);
            println!("  Longest distance:  {:.1}", stats.longest_km);
            println!("  Average distance:  {:.1}", stats.mean_km);
            println!("  Median distance:   {:.1}", stats.median_km);
        }

        if !self.results.closest_pairs.is_empty() {
            println!("\nTop 5 closest facility pairs:");
            for (i, pair) in self.results.closest_pairs.iter().take(5).enumerate() {
                println!("  {}. {:.1} km", i + 1, pair.distance_km);
                println!("     {}: {}", m.group_a_label, shorten(&pair.facility_a));
                println!("     {}: {}", m.group_b_label, shorten(&pair.facility_b));
            }
        }
        println!("{}", "=".repeat(70));
    }
}

fn print_top_countries(counts: &[CountryCount]) {
    if counts.is_empty() {
        return;
    }
    println!("Top countries:");
    for c in counts.iter().take(5) {
        println!("  {}: {}", c.country, c.facilities);
    }
}

fn shorten(name: &str) -> String {
    if name.chars().count() <= 40 {
        name.to_string()
    } else {
        let cut: String = name.chars().take(40).collect();
        format!("{}...", cut)
    }
}

/* ------------------------------------------------------------------------- */
/* Triangulation report                                                      */
/* ------------------------------------------------------------------------- */

#[derive(Debug, Serialize)]
pub struct TriangulationReport {
    pub metadata: TriangulationMetadata,
    pub results: TriangulationResults,
    pub summary: TriangulationSummary,
}

#[derive(Debug, Serialize)]
pub struct TriangulationMetadata {
    pub generated_at: String,
    pub source: String,
    pub total_facilities: usize,
    pub skipped_rows: usize,
}

#[derive(Debug, Serialize)]
pub struct TriangulationResults {
    /// Per-country aggregates.
    pub facility_clusters: BTreeMap<String, GroupSummary>,
    /// Per-facility-type aggregates.
    pub operational_patterns: BTreeMap<String, GroupSummary>,
    /// Per-product-type aggregates.
    pub product_patterns: BTreeMap<String, GroupSummary>,
    pub workforce_metrics: WorkforceMetrics,
    pub concentration: ConcentrationInsights,
}

#[derive(Debug, Serialize)]
pub struct TriangulationSummary {
    pub countries_with_facilities: usize,
    pub facility_types: Vec<String>,
    pub total_workforce: f64,
}

impl TriangulationReport {
    pub fn print_summary(&self) {
        let w = &self.results.workforce_metrics;
        println!("\n{}", "=".repeat(70));
        println!("FACILITY TRIANGULATION REPORT");
        println!("{}", "=".repeat(70));
        println!("  Total facilities: {}", w.total_facilities);
        println!("  Total workers: {}", w.total_workers);
        println!("  Average facility size: {} workers", w.average_facility_size);
        println!(
            "  Countries with facilities: {}",
            self.summary.countries_with_facilities
        );

        println!("\nTop manufacturing countries:");
        for c in &self.results.concentration.top_manufacturing_countries {
            let workers = self
                .results
                .facility_clusters
                .get(&c.country)
                .map(|s| s.workers.sum)
                .unwrap_or(0.0);
            println!("  {}: {} facilities, {} workers", c.country, c.facilities, workers);
        }
        println!(
            "\nConcentration: {}",
            self.results.concentration.geographic_concentration
        );
        println!("{}", "=".repeat(70));
    }
}

/* ------------------------------------------------------------------------- */
/* Keyword analysis report                                                   */
/* ------------------------------------------------------------------------- */

#[derive(Debug, Serialize)]
pub struct KeywordReport {
    pub metadata: KeywordMetadata,
    pub results: KeywordResults,
    pub summary: KeywordSummary,
}

#[derive(Debug, Serialize)]
pub struct KeywordMetadata {
    pub generated_at: String,
    pub year: String,
    pub documents_loaded: usize,
    pub documents_failed: usize,
    pub characters_analyzed: usize,
    pub categories_analyzed: usize,
    pub keywords_defined: usize,
}

#[derive(Debug, Serialize)]
pub struct KeywordResults {
    pub keyword_matches: Vec<CategoryMatches>,
    pub sentiment: BTreeMap<String, SentimentScore>,
    pub risk_indicators: RiskAnalysis,
    pub opportunity_indicators: OpportunityAnalysis,
    pub strategic_insights: StrategicInsights,
    pub documents: Vec<DocumentEntry>,
}

#[derive(Debug, Serialize)]
pub struct KeywordSummary {
    pub categories_with_matches: usize,
    pub total_unique_keywords_found: usize,
    pub total_keyword_occurrences: usize,
    pub highest_sentiment_categories: Vec<SentimentRanking>,
    pub top_risk_indicators: Vec<String>,
    pub top_opportunities: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SentimentRanking {
    pub category: String,
    pub sentiment_ratio: f64,
}

impl KeywordSummary {
    pub fn from_results(results: &KeywordResults) -> Self {
        let categories_with_matches = results
            .keyword_matches
            .iter()
            .filter(|c| !c.matches.is_empty())
            .count();
        let total_unique_keywords_found = results
            .keyword_matches
            .iter()
            .map(|c| c.matches.len())
            .sum();
        let total_keyword_occurrences = results
            .keyword_matches
            .iter()
            .map(|c| c.total_occurrences())
            .sum();

        let mut rankings: Vec<SentimentRanking> = results
            .sentiment
            .iter()
            .filter(|(_, s)| s.total_score > 0)
            .map(|(category, s)| SentimentRanking {
                category: category.clone(),
                sentiment_ratio: s.sentiment_ratio,
            })
            .collect();
        rankings.sort_by(|a, b| {
            b.sentiment_ratio
                .partial_cmp(&a.sentiment_ratio)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        rankings.truncate(5);

        Self {
            categories_with_matches,
            total_unique_keywords_found,
            total_keyword_occurrences,
            highest_sentiment_categories: rankings,
            top_risk_indicators: results
                .risk_indicators
                .high_frequency_risks
                .iter()
                .take(5)
                .map(|r| r.risk.clone())
                .collect(),
            top_opportunities: results
                .opportunity_indicators
                .growth_drivers
                .iter()
                .take(5)
                .map(|o| o.opportunity.clone())
                .collect(),
        }
    }
}

impl KeywordReport {
    pub fn print_summary(&self) {
        println!("\n{}", "=".repeat(70));
        println!("KEYWORD ANALYSIS REPORT - YEAR {}", self.metadata.year);
        println!("{}", "=".repeat(70));
        println!(
            "  Documents analyzed: {} ({} failed)",
            self.metadata.documents_loaded, self.metadata.documents_failed
        );
        println!(
            "  Categories with matches: {} of {}",
            self.summary.categories_with_matches, self.metadata.categories_analyzed
        );
        println!(
            "  Keyword occurrences: {} across {} unique keywords",
            self.summary.total_keyword_occurrences, self.summary.total_unique_keywords_found
        );

        println!("\nKey themes:");
        for theme in self.results.strategic_insights.key_themes.iter().take(5) {
            println!("  {}: {} mentions", theme.theme, theme.total_mentions);
        }

        if !self.summary.top_risk_indicators.is_empty() {
            println!("\nTop risk indicators:");
            for risk in &self.summary.top_risk_indicators {
                println!("  {}", risk);
            }
        }

        if !self.summary.top_opportunities.is_empty() {
            println!("\nTop opportunities:");
            for opp in &self.summary.top_opportunities {
                println!("  {}", opp);
            }
        }
        println!("{}", "=".repeat(70));
    }
}
