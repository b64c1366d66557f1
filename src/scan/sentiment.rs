//! Count-Based Sentiment Scoring
//!
//! Scores each category by counting fixed positive and negative indicator
//! words inside the stored context windows. This is a deliberately crude
//! substring-count heuristic, not sentiment analysis, and the reports label
//! it that way. Each stored context also contributes one neutral point, so
//! the ratio is damped by how much context was examined.

use serde::Serialize;
use std::collections::BTreeMap;

use super::CategoryMatches;

pub static POSITIVE_INDICATORS: &[&str] = &[
    "growth",
    "increase",
    "strong",
    "successful",
    "improved",
    "positive",
    "opportunity",
    "expansion",
    "benefit",
    "advantage",
    "outperformed",
    "exceeded",
    "solid",
    "robust",
    "healthy",
    "momentum",
];

pub static NEGATIVE_INDICATORS: &[&str] = &[
    "decline",
    "decrease",
    "weak",
    "challenged",
    "negative",
    "risk",
    "uncertainty",
    "volatility",
    "pressure",
    "headwind",
    "impact",
    "concern",
    "difficulty",
    "obstacle",
    "threat",
    "disruption",
];

/// Normalized indicator counts for one category.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SentimentScore {
    pub positive_score: f64,
    pub negative_score: f64,
    pub neutral_score: f64,
    /// `(positive - negative) / total`, in [-1, 1].
    pub sentiment_ratio: f64,
    /// Denominator: positive + negative + one neutral point per context.
    pub total_score: usize,
}

impl SentimentScore {
    fn zero() -> Self {
        Self {
            positive_score: 0.0,
            negative_score: 0.0,
            neutral_score: 0.0,
            sentiment_ratio: 0.0,
            total_score: 0,
        }
    }
}

/// Score every category from its stored context windows.
pub fn score_categories(matches: &[CategoryMatches]) -> BTreeMap<String, SentimentScore> {
    matches
        .iter()
        .map(|category| (category.category.clone(), score_category(category)))
        .collect()
}

fn score_category(category: &CategoryMatches) -> SentimentScore {
    let mut positive = 0usize;
    let mut negative = 0usize;
    let mut neutral = 0usize;

    for keyword_match in &category.matches {
        for context in &keyword_match.contexts {
            let text = context.full.as_str();
            for indicator in POSITIVE_INDICATORS {
                positive += text.matches(indicator).count();
            }
            for indicator in NEGATIVE_INDICATORS {
                negative += text.matches(indicator).count();
            }
            neutral += 1;
        }
    }

    let total = positive + negative + neutral;
    if total == 0 {
        return SentimentScore::zero();
    }

    let total_f = total as f64;
    SentimentScore {
        positive_score: round3(positive as f64 / total_f),
        negative_score: round3(negative as f64 / total_f),
        neutral_score: round3(neutral as f64 / total_f),
        sentiment_ratio: round3((positive as f64 - negative as f64) / total_f),
        total_score: total,
    }
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}
