//! Filing Keyword Scanning Pipeline
//!
//! Loads a year's extracted filing documents, scans them against the keyword
//! taxonomy, scores category sentiment, derives risk/opportunity/theme
//! sections, and writes the JSON report plus a stdout summary.
//!
//! Usage: keyword_scan <year>   (or set SCAN_YEAR)

use anyhow::Result;

use facility_atlas::filings;
use facility_atlas::report::{self, KeywordMetadata, KeywordReport, KeywordResults, KeywordSummary};
use facility_atlas::scan::{
    identify_opportunities, identify_risks, score_categories, strategic_insights,
};
use facility_atlas::{scan, AtlasError, KeywordTaxonomy, ScanConfig, ScanOptions};

fn main() -> Result<()> {
    env_logger::init();

    let year = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("SCAN_YEAR").ok())
        .unwrap_or_else(|| {
            eprintln!("Usage: keyword_scan <year>");
            std::process::exit(2);
        });

    println!("\n{}", "=".repeat(70));
    println!("FILING KEYWORD SCAN - YEAR {}", year);
    println!("{}", "=".repeat(70));

    let cfg = ScanConfig::for_year(&year);
    let taxonomy = KeywordTaxonomy::default_filing();

    // Step 1: Load the corpus.
    println!("\nStep 1: Loading extracted documents...");
    let corpus = filings::load_corpus(&cfg.extracted_dir)?;
    println!(
        "  Documents: {} loaded, {} failed",
        corpus.loaded_count(),
        corpus.failed_count()
    );
    if corpus.loaded_count() == 0 {
        return Err(AtlasError::NoDocuments(cfg.extracted_dir.clone()).into());
    }
    println!("  Analyzing {} characters of text", corpus.text.len());

    // Step 2: Scan.
    println!("\nStep 2: Scanning for keywords across all categories...");
    let options = ScanOptions {
        context_chars: cfg.context_chars,
        stored_contexts: cfg.stored_contexts,
    };
    let matches = scan(&corpus.text, &taxonomy, options)?;

    // Step 3: Score and derive.
    println!("\nStep 3: Scoring sentiment and deriving insights...");
    let sentiment = score_categories(&matches);
    let risks = identify_risks(&matches);
    let opportunities = identify_opportunities(&matches);
    let insights = strategic_insights(&matches, &sentiment);

    // Step 4: Report.
    let results = KeywordResults {
        keyword_matches: matches,
        sentiment,
        risk_indicators: risks,
        opportunity_indicators: opportunities,
        strategic_insights: insights,
        documents: corpus.documents,
    };
    let summary = KeywordSummary::from_results(&results);
    let report = KeywordReport {
        metadata: KeywordMetadata {
            generated_at: report::timestamp(),
            year: year.clone(),
            documents_loaded: results
                .documents
                .iter()
                .filter(|d| d.error.is_none())
                .count(),
            documents_failed: results
                .documents
                .iter()
                .filter(|d| d.error.is_some())
                .count(),
            characters_analyzed: corpus.text.len(),
            categories_analyzed: taxonomy.categories.len(),
            keywords_defined: taxonomy.keyword_count(),
        },
        results,
        summary,
    };

    report::write_json(&cfg.output_report, &report)?;
    println!("\nReport saved as: {}", cfg.output_report.display());

    report.print_summary();
    Ok(())
}
