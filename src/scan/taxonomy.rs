//! Keyword Taxonomy
//!
//! The fixed category → keyword-list table driving the filing scan. Defined
//! once at startup and never mutated; callers can substitute their own table
//! through `KeywordTaxonomy::new`.

/// One scanning category with its keyword list.
#[derive(Debug, Clone)]
pub struct KeywordCategory {
    pub name: String,
    pub keywords: Vec<String>,
}

/// Ordered set of scanning categories.
#[derive(Debug, Clone)]
pub struct KeywordTaxonomy {
    pub categories: Vec<KeywordCategory>,
}

impl KeywordTaxonomy {
    pub fn new(categories: Vec<KeywordCategory>) -> Self {
        Self { categories }
    }

    /// Total number of keywords across all categories.
    pub fn keyword_count(&self) -> usize {
        self.categories.iter().map(|c| c.keywords.len()).sum()
    }

    /// The built-in filing-analysis taxonomy.
    pub fn default_filing() -> Self {
        fn cat(name: &str, keywords: &[&str]) -> KeywordCategory {
            KeywordCategory {
                name: name.to_string(),
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
            }
        }

        Self::new(vec![
            cat(
                "financial_performance",
                &[
                    "revenue",
                    "sales",
                    "growth",
                    "profit",
                    "margin",
                    "earnings",
                    "income",
                    "cash flow",
                    "return on investment",
                    "ebitda",
                    "gross profit",
                    "net income",
                    "operating income",
                    "revenue growth",
                ],
            ),
            cat(
                "business_segments",
                &[
                    "footwear",
                    "apparel",
                    "equipment",
                    "wholesale",
                    "direct-to-consumer",
                    "retail",
                    "digital",
                    "e-commerce",
                ],
            ),
            cat(
                "geographic_markets",
                &[
                    "north america",
                    "emea",
                    "greater china",
                    "asia pacific",
                    "latin america",
                    "international",
                    "domestic",
                    "global",
                    "emerging markets",
                    "developed markets",
                ],
            ),
            cat(
                "innovation_technology",
                &[
                    "innovation",
                    "research and development",
                    "r&d",
                    "technology",
                    "digital transformation",
                    "consumer insights",
                    "product innovation",
                    "design",
                    "materials",
                    "manufacturing",
                ],
            ),
            cat(
                "risk_factors",
                &[
                    "risk",
                    "uncertainty",
                    "volatility",
                    "litigation",
                    "regulatory",
                    "competition",
                    "economic conditions",
                    "supply chain",
                    "currency",
                    "cybersecurity",
                    "pandemic",
                    "tariff",
                    "trade war",
                    "inflation",
                ],
            ),
            cat(
                "competitive_landscape",
                &[
                    "competitive",
                    "market share",
                    "brand strength",
                    "differentiation",
                    "competitive advantage",
                    "market position",
                    "rivals",
                ],
            ),
            cat(
                "strategic_initiatives",
                &[
                    "strategy",
                    "strategic",
                    "acquisition",
                    "partnership",
                    "expansion",
                    "investment",
                    "transformation",
                    "digital strategy",
                ],
            ),
            cat(
                "operational_metrics",
                &[
                    "inventory",
                    "distribution",
                    "logistics",
                    "working capital",
                    "operational efficiency",
                    "cost management",
                    "productivity",
                    "capacity utilization",
                ],
            ),
            cat(
                "consumer_trends",
                &[
                    "consumer behavior",
                    "lifestyle",
                    "wellness",
                    "fitness",
                    "athletic",
                    "fashion",
                    "trends",
                    "demographics",
                ],
            ),
            cat(
                "esg_sustainability",
                &[
                    "sustainability",
                    "environmental",
                    "social responsibility",
                    "governance",
                    "diversity",
                    "inclusion",
                    "climate change",
                    "carbon footprint",
                    "circular design",
                ],
            ),
        ])
    }
}
