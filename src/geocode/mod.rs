//! Coordinate Resolution
//!
//! Maps a `(city, country)` pair to coordinates through one of two
//! interchangeable strategies:
//! - `OnlineResolver`: cache-first lookup against an external geocoding
//!   backend, with a rate-limit pause between external calls.
//! - `OfflineResolver`: static lookup table with a jittered country-level
//!   fallback.
//!
//! Both are non-fatal by contract: a failure means "no coordinates for this
//! record", never an aborted batch. Unresolved records are excluded from all
//! downstream geographic computation and the exclusion is counted, not hidden.

pub mod cache;
pub mod offline;
pub mod online;
pub mod tables;

pub use cache::GeocodeCache;
pub use offline::OfflineResolver;
pub use online::{GeocodeBackend, OnlineResolver};

use serde::Serialize;

use crate::records::{Coordinates, FacilityRecord};

/// How a coordinate was obtained. Country-level answers are approximations
/// and are labeled as such in report metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Resolution {
    /// Exact `"city, country"` match.
    Exact,
    /// Matched on the bare city name.
    CityOnly,
    /// Backend answered for the country alone.
    CountryLevel,
    /// Country centroid with a pseudorandom offset, not a geocoding result.
    CountryApproximate,
    /// Served from the persistent cache without an external call.
    Cached,
}

/// A successful resolution.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedLocation {
    pub coords: Coordinates,
    pub resolution: Resolution,
}

/// A coordinate resolution strategy.
pub trait ResolveCoordinates {
    /// Resolve a city/country pair. `None` means unresolved; implementations
    /// must not abort the batch on failure.
    fn resolve(&mut self, city: &str, country: &str) -> Option<ResolvedLocation>;
}

/// Tallies of resolution outcomes for one record set.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ResolutionStats {
    pub exact: usize,
    pub city_only: usize,
    pub country_level: usize,
    pub country_approximate: usize,
    pub cached: usize,
    pub unresolved: usize,
}

impl ResolutionStats {
    pub fn resolved(&self) -> usize {
        self.exact + self.city_only + self.country_level + self.country_approximate + self.cached
    }

    fn record(&mut self, outcome: Option<Resolution>) {
        match outcome {
            Some(Resolution::Exact) => self.exact += 1,
            Some(Resolution::CityOnly) => self.city_only += 1,
            Some(Resolution::CountryLevel) => self.country_level += 1,
            Some(Resolution::CountryApproximate) => self.country_approximate += 1,
            Some(Resolution::Cached) => self.cached += 1,
            None => self.unresolved += 1,
        }
    }

    pub fn merge(&mut self, other: &ResolutionStats) {
        self.exact += other.exact;
        self.city_only += other.city_only;
        self.country_level += other.country_level;
        self.country_approximate += other.country_approximate;
        self.cached += other.cached;
        self.unresolved += other.unresolved;
    }
}

/// Normalized cache/table key: lowercased, trimmed `"city, country"`.
pub fn location_key(city: &str, country: &str) -> String {
    format!(
        "{}, {}",
        city.trim().to_lowercase(),
        country.trim().to_lowercase()
    )
}

/// Attach coordinates to every record in place. Records without a usable
/// country, or that the resolver cannot place, stay at `coordinates: None`.
pub fn attach_coordinates(
    records: &mut [FacilityRecord],
    resolver: &mut dyn ResolveCoordinates,
) -> ResolutionStats {
    let mut stats = ResolutionStats::default();

    for record in records.iter_mut() {
        let city = record.city.as_deref().unwrap_or("");
        let Some(country) = record.country.as_deref().filter(|c| !c.trim().is_empty()) else {
            log::warn!("No location fields for facility '{}'", record.name);
            stats.record(None);
            continue;
        };

        match resolver.resolve(city, country) {
            Some(found) => {
                record.coordinates = Some(found.coords);
                stats.record(Some(found.resolution));
            }
            None => {
                log::warn!(
                    "No coordinates found for: {}, {} ('{}')",
                    city,
                    country,
                    record.name
                );
                stats.record(None);
            }
        }
    }

    stats
}

/// Drop unresolved records, returning the survivors and the dropped count.
pub fn retain_resolved(records: Vec<FacilityRecord>) -> (Vec<FacilityRecord>, usize) {
    let total = records.len();
    let resolved: Vec<_> = records
        .into_iter()
        .filter(|r| r.coordinates.is_some())
        .collect();
    let dropped = total - resolved.len();
    (resolved, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_key_normalizes_case_and_whitespace() {
        assert_eq!(location_key(" Hanoi ", " VIETNAM"), "hanoi, vietnam");
    }

    #[test]
    fn stats_resolved_counts_every_non_failure() {
        let mut stats = ResolutionStats::default();
        stats.record(Some(Resolution::Exact));
        stats.record(Some(Resolution::CountryApproximate));
        stats.record(Some(Resolution::Cached));
        stats.record(None);
        assert_eq!(stats.resolved(), 3);
        assert_eq!(stats.unresolved, 1);
    }
}
