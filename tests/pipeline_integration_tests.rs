//! End-to-end checks across the facility pipelines: loading, partitioning,
//! coordinate resolution, pairwise ranking, scanning, and report output.

use approx::assert_relative_eq;
use std::fs;
use std::time::Duration;

use facility_atlas::geocode::{
    attach_coordinates, retain_resolved, GeocodeBackend, GeocodeCache, OfflineResolver,
    OnlineResolver, ResolveCoordinates,
};
use facility_atlas::records::{Coordinates, FacilityRecord, FacilityTable};
use facility_atlas::scan::{KeywordCategory, KeywordTaxonomy};
use facility_atlas::{distance, map, report, scan, AtlasError, MapConfig, ScanOptions};

fn record(name: &str, category: &str, city: &str, country: &str) -> FacilityRecord {
    FacilityRecord {
        name: name.to_string(),
        category: category.to_string(),
        city: Some(city.to_string()),
        country: Some(country.to_string()),
        worker_count: Some(1000.0),
        female_worker_pct: Some(60.0),
        migrant_worker_pct: Some(10.0),
        product_type: None,
        coordinates: None,
    }
}

fn located(name: &str, category: &str, lat: f64, lng: f64) -> FacilityRecord {
    let mut r = record(name, category, "-", "-");
    r.coordinates = Some(Coordinates { lat, lng });
    r
}

/* ------------------------------------------------------------------------- */
/* Pairwise ranker properties                                                */
/* ------------------------------------------------------------------------- */

#[test]
fn ranker_returns_exactly_m_times_n_sorted_entries() {
    let group_a: Vec<_> = (0..7)
        .map(|i| located(&format!("a{}", i), "X", 5.0 + i as f64 * 3.0, 100.0 - i as f64))
        .collect();
    let group_b: Vec<_> = (0..5)
        .map(|i| located(&format!("b{}", i), "Y", -10.0 + i as f64 * 7.0, 90.0 + i as f64 * 2.0))
        .collect();

    let pairs = distance::rank_pairs(&group_a, &group_b);
    assert_eq!(pairs.len(), 35);
    for w in pairs.windows(2) {
        assert!(w[0].distance_km <= w[1].distance_km);
    }
}

#[test]
fn distance_is_symmetric_at_report_precision() {
    let points = [
        Coordinates { lat: 21.0285, lng: 105.8542 },
        Coordinates { lat: -6.2088, lng: 106.8456 },
        Coordinates { lat: 37.0902, lng: -95.7129 },
        Coordinates { lat: 41.0833, lng: 22.8833 },
    ];
    for a in &points {
        for b in &points {
            assert_relative_eq!(
                distance::round1(distance::geodesic_km(*a, *b)),
                distance::round1(distance::geodesic_km(*b, *a)),
                epsilon = 1e-9
            );
        }
    }
}

#[test]
fn single_cross_pair_example() {
    // A at (10, 10) in category X, B at (10, 11) in category Y: one pair,
    // one degree of longitude at ten degrees north, and top-1 selects it.
    let group_a = vec![located("A", "X", 10.0, 10.0)];
    let group_b = vec![located("B", "Y", 10.0, 11.0)];

    let pairs = distance::rank_pairs(&group_a, &group_b);
    assert_eq!(pairs.len(), 1);
    assert_relative_eq!(pairs[0].distance_km, 109.64, epsilon = 0.1);

    let top = distance::top_k(&pairs, 1);
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].facility_a, "A");
    assert_eq!(top[0].facility_b, "B");
}

/* ------------------------------------------------------------------------- */
/* Coordinate resolution                                                     */
/* ------------------------------------------------------------------------- */

#[test]
fn offline_lookup_priority_is_deterministic() {
    let mut resolver = OfflineResolver::with_seed(42);

    // Exact city entry wins, unmodified.
    let hanoi = resolver.resolve("Hanoi", "Vietnam").unwrap();
    assert_eq!(hanoi.coords, Coordinates { lat: 21.0285, lng: 105.8542 });

    // Unknown city falls back to the jittered country centroid.
    let unknown = resolver.resolve("Unknown City", "Vietnam").unwrap();
    assert!((unknown.coords.lat - 14.0583).abs() <= 1.5);
    assert!((unknown.coords.lng - 108.2772).abs() <= 1.5);
    assert_ne!(unknown.coords, Coordinates { lat: 14.0583, lng: 108.2772 });
}

/// Backend that answers once and panics on any further lookup, for the
/// idempotency property.
struct OnceBackend {
    used: bool,
}

impl GeocodeBackend for OnceBackend {
    fn lookup(&mut self, query: &str) -> anyhow::Result<Option<Coordinates>> {
        if self.used {
            panic!("second external call for '{}'", query);
        }
        self.used = true;
        Ok(Some(Coordinates { lat: 1.0, lng: 2.0 }))
    }
}

#[test]
fn resolving_the_same_key_twice_makes_one_external_call() {
    let mut resolver = OnlineResolver::new(
        OnceBackend { used: false },
        GeocodeCache::in_memory(),
        Duration::ZERO,
    );

    let first = resolver.resolve("Hanoi", "Vietnam").unwrap();
    let second = resolver.resolve(" hanoi ", " VIETNAM ").unwrap();
    assert_eq!(first.coords, second.coords);
}

#[test]
fn online_cache_persists_between_runs() {
    let dir = tempfile::tempdir().unwrap();
    let cache_path = dir.path().join("geocoding_cache.json");

    {
        let cache = GeocodeCache::load(&cache_path).unwrap();
        let mut resolver = OnlineResolver::new(OnceBackend { used: false }, cache, Duration::ZERO);
        resolver.resolve("Hanoi", "Vietnam").unwrap();
    }

    // A second run sees the entry without any backend available.
    struct NeverCalled;
    impl GeocodeBackend for NeverCalled {
        fn lookup(&mut self, query: &str) -> anyhow::Result<Option<Coordinates>> {
            panic!("unexpected external call for '{}'", query);
        }
    }
    let cache = GeocodeCache::load(&cache_path).unwrap();
    assert_eq!(cache.len(), 1);
    let mut resolver = OnlineResolver::new(NeverCalled, cache, Duration::ZERO);
    let hit = resolver.resolve("Hanoi", "Vietnam").unwrap();
    assert_eq!(hit.coords, Coordinates { lat: 1.0, lng: 2.0 });
}

#[test]
fn unresolved_records_are_dropped_and_counted() {
    let mut records = vec![
        record("known", "X", "Hanoi", "Vietnam"),
        record("unknown", "X", "Nowhere", "Atlantis"),
    ];
    let mut resolver = OfflineResolver::with_seed(1);
    let stats = attach_coordinates(&mut records, &mut resolver);
    assert_eq!(stats.resolved(), 1);
    assert_eq!(stats.unresolved, 1);

    let (resolved, dropped) = retain_resolved(records);
    assert_eq!(resolved.len(), 1);
    assert_eq!(dropped, 1);
    assert_eq!(resolved[0].name, "known");
}

/* ------------------------------------------------------------------------- */
/* Spreadsheet loading                                                       */
/* ------------------------------------------------------------------------- */

#[test]
fn export_loads_past_the_banner_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("facility_export.csv");
    fs::write(
        &path,
        "Facility export generated 2024-03-01,,,,,,,\n\
         Factory Name,Factory Type,City,Country / Region,Total Workers,% Female Workers,% Migrant Workers,Product Type\n\
         Alpha Plant,FINISHED GOODS,Hanoi,Vietnam,1200,70,4,Footwear\n\
         Beta Works,FINISHED GOODS - COMPONENTS,Bangkok,Thailand,800,55,10,Components\n\
         ,FINISHED GOODS,Hue,Vietnam,10,1,1,Footwear\n",
    )
    .unwrap();

    let table = FacilityTable::load(&path).unwrap();
    assert_eq!(table.records.len(), 2);
    assert_eq!(table.skipped_rows, 1);

    let alpha = &table.records[0];
    assert_eq!(alpha.name, "Alpha Plant");
    assert_eq!(alpha.category, "FINISHED GOODS");
    assert_eq!(alpha.worker_count, Some(1200.0));
    assert_eq!(alpha.product_type.as_deref(), Some("Footwear"));
}

/* ------------------------------------------------------------------------- */
/* Keyword scanning                                                          */
/* ------------------------------------------------------------------------- */

#[test]
fn scan_counts_are_monotonic_in_occurrences() {
    let taxonomy = KeywordTaxonomy::new(vec![KeywordCategory {
        name: "finance".to_string(),
        keywords: vec!["revenue".to_string()],
    }]);

    for n in 1..=8usize {
        let text = vec!["revenue"; n].join(" and then ");
        let results = scan(&text, &taxonomy, ScanOptions::default()).unwrap();
        let m = &results[0].matches[0];
        assert_eq!(m.count, n);
        assert_eq!(m.contexts.len(), n.min(5));
    }
}

/* ------------------------------------------------------------------------- */
/* End-to-end map run                                                        */
/* ------------------------------------------------------------------------- */

#[test]
fn map_pipeline_end_to_end() {
    let cfg = MapConfig::finished_goods_vs_components();
    let table = FacilityTable {
        records: vec![
            record("Alpha Plant", "FINISHED GOODS", "Hanoi", "Vietnam"),
            record("Beta Works", "FINISHED GOODS - COMPONENTS", "Bangkok", "Thailand"),
            record("Gamma Site", "FINISHED GOODS - COMPONENTS", "Nowhere", "Atlantis"),
        ],
        skipped_rows: 0,
    };

    let (mut group_a, mut group_b) = table.partition(&cfg.group_a, &cfg.group_b);
    assert_eq!(group_a.len(), 1);
    assert_eq!(group_b.len(), 2);

    let mut resolver = OfflineResolver::with_seed(9);
    attach_coordinates(&mut group_a, &mut resolver);
    attach_coordinates(&mut group_b, &mut resolver);
    let (group_a, _) = retain_resolved(group_a);
    let (group_b, dropped_b) = retain_resolved(group_b);
    assert_eq!(dropped_b, 1);

    let pairs = distance::rank_pairs(&group_a, &group_b);
    assert_eq!(pairs.len(), 1);
    // Hanoi to Bangkok is on the order of a thousand kilometers.
    assert!(pairs[0].distance_km > 800.0 && pairs[0].distance_km < 1200.0);

    let html = map::render_map(&group_a, &group_b, &pairs, &cfg).unwrap();
    assert!(html.contains("Alpha Plant"));
    assert!(html.contains("Beta Works"));
    assert!(!html.contains("Gamma Site"));

    let dir = tempfile::tempdir().unwrap();
    let report_path = dir.path().join("out/facility_map_report.json");
    report::write_json(&report_path, &serde_json::json!({"pairs": pairs})).unwrap();
    let raw = fs::read_to_string(&report_path).unwrap();
    assert!(raw.contains("Alpha Plant"));
}

#[test]
fn empty_resolved_group_is_the_designed_fatal_condition() {
    let cfg = MapConfig::finished_goods_vs_components();
    let err = map::render_map(&[], &[], &[], &cfg).unwrap_err();
    let atlas = err.downcast_ref::<AtlasError>().unwrap();
    assert!(matches!(atlas, AtlasError::NoResolvedFacilities(_)));
}
