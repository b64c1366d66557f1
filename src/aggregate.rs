//! Cross-Tabulation of Facility Records
//!
//! Pure functional reductions over the loaded record set: group-by summaries
//! for any categorical field, corpus-wide workforce metrics, and the
//! concentration view (top countries, diversification, migrant dependency).
//! Inputs are never mutated.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::records::FacilityRecord;

/// Count/sum/mean/median of one numeric field within a group.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NumericSummary {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
}

impl NumericSummary {
    fn empty() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            mean: 0.0,
            median: 0.0,
        }
    }
}

/// Per-group aggregate over the three numeric fields.
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub facilities: usize,
    pub workers: NumericSummary,
    pub female_pct: NumericSummary,
    pub migrant_pct: NumericSummary,
}

/// Corpus-wide workforce metrics and composition buckets.
#[derive(Debug, Clone, Serialize)]
pub struct WorkforceMetrics {
    pub total_facilities: usize,
    pub total_workers: f64,
    pub average_facility_size: f64,
    pub median_facility_size: f64,
    pub largest_facility: f64,
    pub smallest_facility: f64,
    pub avg_female_percentage: f64,
    pub avg_migrant_percentage: f64,
    pub facilities_high_female_workforce: usize,
    pub facilities_high_migrant_workforce: usize,
    pub composition: WorkforceComposition,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkforceComposition {
    pub primarily_female: usize,
    pub balanced_gender: usize,
    pub primarily_male: usize,
    pub high_migrant: usize,
    pub low_migrant: usize,
}

/// Geographic concentration view over the full record set.
#[derive(Debug, Clone, Serialize)]
pub struct ConcentrationInsights {
    /// Top countries by facility count, descending.
    pub top_manufacturing_countries: Vec<CountryCount>,
    pub geographic_concentration: String,
    /// Number of distinct countries.
    pub diversification_score: usize,
    /// Share of facilities held by the single largest country, in percent.
    pub top_country_share_pct: f64,
    /// Countries ranked by mean migrant-worker percentage, descending.
    pub high_migrant_dependency: Vec<CountryShare>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountryCount {
    pub country: String,
    pub facilities: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountryShare {
    pub country: String,
    pub avg_migrant_pct: f64,
}

fn summarize(mut values: Vec<f64>) -> NumericSummary {
    if values.is_empty() {
        return NumericSummary::empty();
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len();
    let sum: f64 = values.iter().sum();
    let median = if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    };
    NumericSummary {
        count: n,
        sum: round2(sum),
        mean: round2(sum / n as f64),
        median: round2(median),
    }
}

/// Group records by a categorical key and summarize each group.
///
/// Records for which `key_fn` returns `None` are left out of the result.
/// The returned map is ordered by key for deterministic reports.
pub fn summarize_by<F>(records: &[FacilityRecord], key_fn: F) -> BTreeMap<String, GroupSummary>
where
    F: Fn(&FacilityRecord) -> Option<String>,
{
    let mut groups: FxHashMap<String, Vec<&FacilityRecord>> = FxHashMap::default();
    for record in records {
        if let Some(key) = key_fn(record) {
            groups.entry(key).or_default().push(record);
        }
    }

    groups
        .into_iter()
        .map(|(key, members)| {
            let summary = GroupSummary {
                facilities: members.len(),
                workers: summarize(members.iter().filter_map(|r| r.worker_count).collect()),
                female_pct: summarize(
                    members.iter().filter_map(|r| r.female_worker_pct).collect(),
                ),
                migrant_pct: summarize(
                    members.iter().filter_map(|r| r.migrant_worker_pct).collect(),
                ),
            };
            (key, summary)
        })
        .collect()
}

/// Corpus-wide workforce metrics.
pub fn workforce_metrics(records: &[FacilityRecord]) -> WorkforceMetrics {
    let workers: Vec<f64> = records.iter().filter_map(|r| r.worker_count).collect();
    let worker_summary = summarize(workers.clone());
    let female = summarize(records.iter().filter_map(|r| r.female_worker_pct).collect());
    let migrant = summarize(
        records
            .iter()
            .filter_map(|r| r.migrant_worker_pct)
            .collect(),
    );

    let female_count = |above: f64| {
        records
            .iter()
            .filter(|r| r.female_worker_pct.map_or(false, |p| p > above))
            .count()
    };
    let migrant_count = |above: f64| {
        records
            .iter()
            .filter(|r| r.migrant_worker_pct.map_or(false, |p| p > above))
            .count()
    };
    let balanced = records
        .iter()
        .filter(|r| {
            r.female_worker_pct
                .map_or(false, |p| (40.0..=60.0).contains(&p))
        })
        .count();
    let primarily_male = records
        .iter()
        .filter(|r| r.female_worker_pct.map_or(false, |p| p < 40.0))
        .count();
    let low_migrant = records
        .iter()
        .filter(|r| r.migrant_worker_pct.map_or(false, |p| p < 10.0))
        .count();

    let largest = workers.iter().copied().fold(0.0, f64::max);
    let smallest = if workers.is_empty() {
        0.0
    } else {
        workers.iter().copied().fold(f64::INFINITY, f64::min)
    };

    WorkforceMetrics {
        total_facilities: records.len(),
        total_workers: worker_summary.sum,
        average_facility_size: worker_summary.mean,
        median_facility_size: worker_summary.median,
        largest_facility: largest,
        smallest_facility: smallest,
        avg_female_percentage: female.mean,
        avg_migrant_percentage: migrant.mean,
        facilities_high_female_workforce: female_count(70.0),
        facilities_high_migrant_workforce: migrant_count(30.0),
        composition: WorkforceComposition {
            primarily_female: female_count(60.0),
            balanced_gender: balanced,
            primarily_male,
            high_migrant: migrant_count(50.0),
            low_migrant,
        },
    }
}

/// Country counts, descending by count, ties broken alphabetically.
pub fn country_counts(records: &[FacilityRecord]) -> Vec<CountryCount> {
    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    for record in records {
        if let Some(country) = record.country.as_deref() {
            *counts.entry(country).or_default() += 1;
        }
    }
    let mut out: Vec<CountryCount> = counts
        .into_iter()
        .map(|(country, facilities)| CountryCount {
            country: country.to_string(),
            facilities,
        })
        .collect();
    out.sort_by(|a, b| {
        b.facilities
            .cmp(&a.facilities)
            .then_with(|| a.country.cmp(&b.country))
    });
    out
}

/// The concentration / dependency view.
pub fn concentration_insights(records: &[FacilityRecord]) -> ConcentrationInsights {
    let counts = country_counts(records);
    let total = records.len();
    let top3: usize = counts.iter().take(3).map(|c| c.facilities).sum();

    let by_country = summarize_by(records, |r| r.country.clone());
    let mut dependency: Vec<CountryShare> = by_country
        .iter()
        .filter(|(_, s)| s.migrant_pct.count > 0)
        .map(|(country, s)| CountryShare {
            country: country.clone(),
            avg_migrant_pct: s.migrant_pct.mean,
        })
        .collect();
    dependency.sort_by(|a, b| {
        b.avg_migrant_pct
            .partial_cmp(&a.avg_migrant_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.country.cmp(&b.country))
    });
    dependency.truncate(3);

    let top_country_share_pct = counts
        .first()
        .map(|c| round2(c.facilities as f64 / total.max(1) as f64 * 100.0))
        .unwrap_or(0.0);

    ConcentrationInsights {
        geographic_concentration: format!("{}/{} facilities in top 3 countries", top3, total),
        diversification_score: counts.len(),
        top_country_share_pct,
        top_manufacturing_countries: counts.into_iter().take(5).collect(),
        high_migrant_dependency: dependency,
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn record(country: &str, category: &str, workers: f64, female: f64, migrant: f64) -> FacilityRecord {
        FacilityRecord {
            name: format!("{} plant", country),
            category: category.to_string(),
            city: None,
            country: Some(country.to_string()),
            worker_count: Some(workers),
            female_worker_pct: Some(female),
            migrant_worker_pct: Some(migrant),
            product_type: None,
            coordinates: None,
        }
    }

    fn fixture() -> Vec<FacilityRecord> {
        vec![
            record("Vietnam", "FINISHED GOODS", 1000.0, 75.0, 5.0),
            record("Vietnam", "FINISHED GOODS", 3000.0, 65.0, 12.0),
            record("China", "FINISHED GOODS - COMPONENTS", 500.0, 45.0, 60.0),
            record("Thailand", "FINISHED GOODS", 200.0, 30.0, 8.0),
        ]
    }

    #[test]
    fn summarize_by_country_computes_all_four_statistics() {
        let records = fixture();
        let by_country = summarize_by(&records, |r| r.country.clone());

        let vietnam = &by_country["Vietnam"];
        assert_eq!(vietnam.facilities, 2);
        assert_eq!(vietnam.workers.count, 2);
        assert_relative_eq!(vietnam.workers.sum, 4000.0);
        assert_relative_eq!(vietnam.workers.mean, 2000.0);
        assert_relative_eq!(vietnam.workers.median, 2000.0);
        assert_relative_eq!(vietnam.female_pct.mean, 70.0);
    }

    #[test]
    fn median_of_odd_sized_group() {
        let records = fixture();
        let by_category = summarize_by(&records, |r| Some(r.category.clone()));
        let fg = &by_category["FINISHED GOODS"];
        assert_eq!(fg.facilities, 3);
        assert_relative_eq!(fg.workers.median, 1000.0);
    }

    #[test]
    fn inputs_are_not_mutated() {
        let records = fixture();
        let before: Vec<f64> = records.iter().filter_map(|r| r.worker_count).collect();
        let _ = summarize_by(&records, |r| r.country.clone());
        let after: Vec<f64> = records.iter().filter_map(|r| r.worker_count).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn workforce_metrics_buckets() {
        let metrics = workforce_metrics(&fixture());
        assert_eq!(metrics.total_facilities, 4);
        assert_relative_eq!(metrics.total_workers, 4700.0);
        assert_relative_eq!(metrics.largest_facility, 3000.0);
        assert_relative_eq!(metrics.smallest_facility, 200.0);
        assert_eq!(metrics.facilities_high_female_workforce, 1); // >70%
        assert_eq!(metrics.composition.primarily_female, 2); // >60%
        assert_eq!(metrics.composition.balanced_gender, 1); // 40-60%
        assert_eq!(metrics.composition.primarily_male, 1); // <40%
        assert_eq!(metrics.composition.high_migrant, 1); // >50%
        assert_eq!(metrics.composition.low_migrant, 2); // <10%
    }

    #[test]
    fn concentration_ranks_countries_by_count() {
        let insights = concentration_insights(&fixture());
        assert_eq!(insights.top_manufacturing_countries[0].country, "Vietnam");
        assert_eq!(insights.top_manufacturing_countries[0].facilities, 2);
        assert_eq!(insights.diversification_score, 3);
        assert_eq!(insights.geographic_concentration, "4/4 facilities in top 3 countries");
        assert_relative_eq!(insights.top_country_share_pct, 50.0);
        assert_eq!(insights.high_migrant_dependency[0].country, "China");
    }
}
