//! Risk, Opportunity, and Theme Derivation
//!
//! Turns raw keyword matches into the report's intelligence sections:
//! high-frequency risks, risk families, repeated opportunities by focus
//! area, ranked themes, and positively-scored focus areas.

use serde::Serialize;
use std::collections::BTreeMap;

use super::sentiment::SentimentScore;
use super::CategoryMatches;

/// A risk keyword that clears the frequency threshold.
#[derive(Debug, Clone, Serialize)]
pub struct RiskIndicator {
    pub risk: String,
    pub frequency: usize,
    pub sample_context: String,
}

/// A risk keyword grouped into a family.
#[derive(Debug, Clone, Serialize)]
pub struct RiskMention {
    pub risk: String,
    pub frequency: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskAnalysis {
    /// Risk keywords appearing at least three times.
    pub high_frequency_risks: Vec<RiskIndicator>,
    /// Risks grouped into operational/financial/regulatory/competitive/external.
    pub risk_families: BTreeMap<String, Vec<RiskMention>>,
}

/// A keyword mentioned repeatedly in an opportunity-bearing category.
#[derive(Debug, Clone, Serialize)]
pub struct Opportunity {
    pub opportunity: String,
    pub category: String,
    pub frequency: usize,
    pub sample_context: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OpportunityAnalysis {
    pub growth_drivers: Vec<Opportunity>,
    pub strategic_opportunities: Vec<Opportunity>,
    pub innovation_areas: Vec<Opportunity>,
    pub market_opportunities: Vec<Opportunity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyTheme {
    pub theme: String,
    pub total_mentions: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FocusArea {
    pub area: String,
    pub sentiment_score: f64,
    pub confidence: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompetitiveElement {
    pub element: String,
    pub frequency: usize,
    pub context: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StrategicInsights {
    pub key_themes: Vec<KeyTheme>,
    pub positive_focus_areas: Vec<FocusArea>,
    pub competitive_positioning: Vec<CompetitiveElement>,
}

const HIGH_FREQUENCY_THRESHOLD: usize = 3;
const REPEATED_MENTION_THRESHOLD: usize = 2;

/// Risk families and the keyword fragments that map into them.
static RISK_FAMILIES: &[(&str, &[&str])] = &[
    ("operational", &["supply chain", "manufacturing", "cybersecurity"]),
    ("financial", &["currency", "inflation", "economic conditions"]),
    ("regulatory", &["regulatory", "litigation", "tariff"]),
    ("competitive", &["competition", "competitive"]),
    ("external", &["pandemic", "trade war", "volatility"]),
];

/// Category pairs feeding each opportunity bucket.
static OPPORTUNITY_SOURCES: &[(&str, &[&str])] = &[
    ("growth_drivers", &["innovation_technology", "business_segments"]),
    ("strategic_opportunities", &["strategic_initiatives", "geographic_markets"]),
    ("innovation_areas", &["innovation_technology", "consumer_trends"]),
    ("market_opportunities", &["geographic_markets", "consumer_trends"]),
];

fn sample_context(matches: &CategoryMatches, keyword_idx: usize) -> String {
    matches.matches[keyword_idx]
        .contexts
        .first()
        .map(|c| c.full.clone())
        .unwrap_or_default()
}

/// Extract high-frequency risks and group them into families.
pub fn identify_risks(matches: &[CategoryMatches]) -> RiskAnalysis {
    let mut analysis = RiskAnalysis {
        high_frequency_risks: Vec::new(),
        risk_families: BTreeMap::new(),
    };

    let Some(risk_category) = matches.iter().find(|c| c.category == "risk_factors") else {
        return analysis;
    };

    for (idx, m) in risk_category.matches.iter().enumerate() {
        if m.count >= HIGH_FREQUENCY_THRESHOLD {
            analysis.high_frequency_risks.push(RiskIndicator {
                risk: m.keyword.clone(),
                frequency: m.count,
                sample_context: sample_context(risk_category, idx),
            });
        }
    }

    for (family, fragments) in RISK_FAMILIES {
        let members: Vec<RiskMention> = risk_category
            .matches
            .iter()
            .filter(|m| {
                let keyword = m.keyword.to_lowercase();
                fragments.iter().any(|f| keyword.contains(f))
            })
            .map(|m| RiskMention {
                risk: m.keyword.clone(),
                frequency: m.count,
            })
            .collect();
        if !members.is_empty() {
            analysis.risk_families.insert(family.to_string(), members);
        }
    }

    analysis
}

/// Repeated mentions in growth/strategy/innovation/market categories.
pub fn identify_opportunities(matches: &[CategoryMatches]) -> OpportunityAnalysis {
    let collect = |source_categories: &[&str]| -> Vec<Opportunity> {
        let mut out = Vec::new();
        for name in source_categories {
            if let Some(category) = matches.iter().find(|c| &c.category == name) {
                for (idx, m) in category.matches.iter().enumerate() {
                    if m.count >= REPEATED_MENTION_THRESHOLD {
                        out.push(Opportunity {
                            opportunity: m.keyword.clone(),
                            category: category.category.clone(),
                            frequency: m.count,
                            sample_context: sample_context(category, idx),
                        });
                    }
                }
            }
        }
        out.sort_by(|a, b| b.frequency.cmp(&a.frequency));
        out.truncate(10);
        out
    };

    OpportunityAnalysis {
        growth_drivers: collect(OPPORTUNITY_SOURCES[0].1),
        strategic_opportunities: collect(OPPORTUNITY_SOURCES[1].1),
        innovation_areas: collect(OPPORTUNITY_SOURCES[2].1),
        market_opportunities: collect(OPPORTUNITY_SOURCES[3].1),
    }
}

/// Ranked themes, positive focus areas, and the competitive picture.
pub fn strategic_insights(
    matches: &[CategoryMatches],
    sentiment: &BTreeMap<String, SentimentScore>,
) -> StrategicInsights {
    let mut themes: Vec<KeyTheme> = matches
        .iter()
        .map(|c| KeyTheme {
            theme: c.category.clone(),
            total_mentions: c.total_occurrences(),
        })
        .collect();
    themes.sort_by(|a, b| b.total_mentions.cmp(&a.total_mentions));
    themes.truncate(8);

    let mut focus_areas: Vec<FocusArea> = sentiment
        .iter()
        .filter(|(_, s)| s.sentiment_ratio > 0.1 && s.total_score > 5)
        .map(|(area, s)| FocusArea {
            area: area.clone(),
            sentiment_score: s.sentiment_ratio,
            confidence: s.total_score,
        })
        .collect();
    focus_areas.sort_by(|a, b| {
        b.sentiment_score
            .partial_cmp(&a.sentiment_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let competitive_positioning = matches
        .iter()
        .find(|c| c.category == "competitive_landscape")
        .map(|category| {
            category
                .matches
                .iter()
                .take(5)
                .map(|m| CompetitiveElement {
                    element: m.keyword.clone(),
                    frequency: m.count,
                    context: m.contexts.first().map(|c| c.full.clone()).unwrap_or_default(),
                })
                .collect()
        })
        .unwrap_or_default();

    StrategicInsights {
        key_themes: themes,
        positive_focus_areas: focus_areas,
        competitive_positioning,
    }
}
