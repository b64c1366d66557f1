//! Run Configuration
//!
//! Everything the original scripts kept as module-level constants (file paths,
//! category filters, colors, line counts) is injected here instead, so the two
//! near-identical mapper scripts collapse into one parameterized pipeline.

use crate::records::CategoryFilter;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for one facility map run.
#[derive(Debug, Clone, Serialize)]
pub struct MapConfig {
    pub source_path: PathBuf,
    pub cache_path: PathBuf,
    pub output_map: PathBuf,
    pub output_report: PathBuf,

    pub group_a: CategoryFilter,
    pub group_b: CategoryFilter,
    pub group_a_label: String,
    pub group_b_label: String,
    pub group_a_color: String,
    pub group_b_color: String,

    /// How many of the shortest cross-category pairs to draw and report.
    pub line_count: usize,

    /// Minimum pause between external geocoding calls.
    #[serde(skip)]
    pub rate_limit: Duration,
}

impl MapConfig {
    /// The finished-goods vs components pairing.
    pub fn finished_goods_vs_components() -> Self {
        Self {
            source_path: PathBuf::from("facility_export.csv"),
            cache_path: PathBuf::from("geocoding_cache.json"),
            output_map: PathBuf::from("facility_locations_map.html"),
            output_report: PathBuf::from("facility_map_report.json"),
            group_a: CategoryFilter::category("FINISHED GOODS"),
            group_b: CategoryFilter::category("FINISHED GOODS - COMPONENTS"),
            group_a_label: "Finished Goods".to_string(),
            group_b_label: "Components".to_string(),
            group_a_color: "#2E86AB".to_string(),
            group_b_color: "#A23B72".to_string(),
            line_count: 20,
            rate_limit: Duration::from_secs(1),
        }
    }

    /// The components vs equipment-handling pairing.
    pub fn components_vs_equipment() -> Self {
        Self {
            group_a: CategoryFilter::category("FINISHED GOODS - COMPONENTS"),
            group_b: CategoryFilter::category_and_product("FINISHED GOODS", "Equipment"),
            group_a_label: "Components".to_string(),
            group_b_label: "Equipment".to_string(),
            group_a_color: "#A23B72".to_string(),
            group_b_color: "#2E8B57".to_string(),
            line_count: 25,
            ..Self::finished_goods_vs_components()
        }
    }
}

/// Configuration for one filing keyword scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanConfig {
    /// Directory of per-year extraction results, e.g. `extracted_data/2019/`.
    pub extracted_dir: PathBuf,
    pub output_report: PathBuf,
    pub year: String,

    /// Characters of context captured on each side of a match.
    pub context_chars: usize,
    /// Contexts stored per keyword; occurrences beyond this are still counted.
    pub stored_contexts: usize,
}

impl ScanConfig {
    pub fn for_year(year: &str) -> Self {
        Self {
            extracted_dir: PathBuf::from("extracted_data").join(year),
            output_report: PathBuf::from("analysis_results")
                .join(year)
                .join("keyword_analysis.json"),
            year: year.to_string(),
            context_chars: 50,
            stored_contexts: 5,
        }
    }
}
