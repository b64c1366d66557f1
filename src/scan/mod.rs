//! Keyword Scanning
//!
//! Finds every case-insensitive occurrence of every taxonomy keyword in a
//! text blob with a single multi-pattern pass, capturing a bounded context
//! window per occurrence. All occurrences are counted; only the first few
//! contexts per keyword are stored.

pub mod insights;
pub mod sentiment;
pub mod taxonomy;

pub use insights::{identify_opportunities, identify_risks, strategic_insights};
pub use sentiment::{score_categories, SentimentScore};
pub use taxonomy::{KeywordCategory, KeywordTaxonomy};

use aho_corasick::AhoCorasick;
use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Window sizing for the scan.
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    /// Characters captured on each side of a match.
    pub context_chars: usize,
    /// Contexts stored per keyword. Occurrences past this are counted only.
    pub stored_contexts: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            context_chars: 50,
            stored_contexts: 5,
        }
    }
}

/// Text surrounding one keyword occurrence.
#[derive(Debug, Clone, Serialize)]
pub struct ContextWindow {
    pub before: String,
    pub after: String,
    pub full: String,
}

/// All occurrences of one keyword.
#[derive(Debug, Clone, Serialize)]
pub struct KeywordMatch {
    pub keyword: String,
    pub count: usize,
    pub contexts: Vec<ContextWindow>,
}

/// Scan result for one taxonomy category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryMatches {
    pub category: String,
    pub matches: Vec<KeywordMatch>,
}

impl CategoryMatches {
    pub fn total_occurrences(&self) -> usize {
        self.matches.iter().map(|m| m.count).sum()
    }
}

/// Scan `text` against the full taxonomy in one pass.
///
/// Categories come back in taxonomy order; within a category, matched
/// keywords keep their taxonomy order. Keywords with zero occurrences are
/// omitted.
pub fn scan(
    text: &str,
    taxonomy: &KeywordTaxonomy,
    opts: ScanOptions,
) -> Result<Vec<CategoryMatches>> {
    let lower = text.to_lowercase();

    // One automaton over every keyword; pattern id -> (category, keyword).
    let mut patterns = Vec::with_capacity(taxonomy.keyword_count());
    let mut pattern_origin = Vec::with_capacity(taxonomy.keyword_count());
    for (ci, category) in taxonomy.categories.iter().enumerate() {
        for (ki, keyword) in category.keywords.iter().enumerate() {
            patterns.push(keyword.to_lowercase());
            pattern_origin.push((ci, ki));
        }
    }

    let automaton = AhoCorasick::new(&patterns).context("Failed to build keyword automaton")?;

    // Accumulators keyed by (category index, keyword index).
    let mut found: FxHashMap<(usize, usize), KeywordMatch> = FxHashMap::default();

    // Overlapping search so "growth" inside "revenue growth" still counts
    // for both keywords.
    for mat in automaton.find_overlapping_iter(&lower) {
        let (ci, ki) = pattern_origin[mat.pattern().as_usize()];
        let entry = found.entry((ci, ki)).or_insert_with(|| KeywordMatch {
            keyword: taxonomy.categories[ci].keywords[ki].clone(),
            count: 0,
            contexts: Vec::new(),
        });
        entry.count += 1;
        if entry.contexts.len() < opts.stored_contexts {
            entry
                .contexts
                .push(extract_window(&lower, mat.start(), mat.end(), opts.context_chars));
        }
    }

    let mut results = Vec::with_capacity(taxonomy.categories.len());
    for (ci, category) in taxonomy.categories.iter().enumerate() {
        let matches: Vec<KeywordMatch> = (0..category.keywords.len())
            .filter_map(|ki| found.remove(&(ci, ki)))
            .collect();

        log::info!(
            "  {}: {} unique keywords, {} total matches",
            category.name,
            matches.len(),
            matches.iter().map(|m| m.count).sum::<usize>()
        );

        results.push(CategoryMatches {
            category: category.name.clone(),
            matches,
        });
    }

    Ok(results)
}

/// Capture up to `chars` characters on each side of the match, respecting
/// UTF-8 boundaries.
fn extract_window(text: &str, start: usize, end: usize, chars: usize) -> ContextWindow {
    let before_start = {
        let mut idx = start;
        for (taken, (i, _)) in text[..start].char_indices().rev().enumerate() {
            idx = i;
            if taken + 1 == chars {
                break;
            }
        }
        if chars == 0 {
            start
        } else {
            idx
        }
    };

    let after_end = {
        let mut idx = end;
        for (taken, (i, ch)) in text[end..].char_indices().enumerate() {
            if taken == chars {
                break;
            }
            idx = end + i + ch.len_utf8();
        }
        idx
    };

    ContextWindow {
        before: text[before_start..start].trim().to_string(),
        after: text[end..after_end].trim().to_string(),
        full: text[before_start..after_end].trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_taxonomy() -> KeywordTaxonomy {
        KeywordTaxonomy::new(vec![
            KeywordCategory {
                name: "finance".to_string(),
                keywords: vec!["revenue".to_string(), "revenue growth".to_string()],
            },
            KeywordCategory {
                name: "risk".to_string(),
                keywords: vec!["supply chain".to_string()],
            },
        ])
    }

    #[test]
    fn counts_all_occurrences_despite_context_truncation() {
        let text = "revenue. revenue! revenue? revenue; revenue: revenue end";
        let taxonomy = KeywordTaxonomy::new(vec![KeywordCategory {
            name: "finance".to_string(),
            keywords: vec!["revenue".to_string()],
        }]);
        let results = scan(text, &taxonomy, ScanOptions::default()).unwrap();
        let m = &results[0].matches[0];
        assert_eq!(m.count, 6);
        assert_eq!(m.contexts.len(), 5);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let results = scan(
            "Revenue grew. REVENUE fell.",
            &tiny_taxonomy(),
            ScanOptions::default(),
        )
        .unwrap();
        assert_eq!(results[0].matches[0].count, 2);
    }

    #[test]
    fn overlapping_keywords_both_count() {
        let results = scan(
            "strong revenue growth this quarter",
            &tiny_taxonomy(),
            ScanOptions::default(),
        )
        .unwrap();
        let finance = &results[0];
        assert_eq!(finance.matches.len(), 2);
        assert_eq!(finance.matches[0].keyword, "revenue");
        assert_eq!(finance.matches[0].count, 1);
        assert_eq!(finance.matches[1].keyword, "revenue growth");
        assert_eq!(finance.matches[1].count, 1);
    }

    #[test]
    fn context_windows_are_bounded() {
        let padding = "x".repeat(200);
        let text = format!("{} supply chain {}", padding, padding);
        let results = scan(&text, &tiny_taxonomy(), ScanOptions::default()).unwrap();
        let ctx = &results[1].matches[0].contexts[0];
        assert!(ctx.before.chars().count() <= 50);
        assert!(ctx.after.chars().count() <= 50);
        assert!(ctx.full.contains("supply chain"));
    }

    #[test]
    fn window_extraction_respects_multibyte_boundaries() {
        let text = "ééééé revenue ééééé";
        let taxonomy = KeywordTaxonomy::new(vec![KeywordCategory {
            name: "finance".to_string(),
            keywords: vec!["revenue".to_string()],
        }]);
        let results = scan(text, &taxonomy, ScanOptions::default()).unwrap();
        assert_eq!(results[0].matches[0].count, 1);
        assert_eq!(results[0].matches[0].contexts[0].before, "ééééé");
    }

    #[test]
    fn unmatched_keywords_are_omitted() {
        let results = scan("nothing relevant here", &tiny_taxonomy(), ScanOptions::default())
            .unwrap();
        assert!(results.iter().all(|c| c.matches.is_empty()));
    }
}
