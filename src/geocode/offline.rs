//! Offline Coordinate Resolution
//!
//! Looks up the embedded table in priority order: exact `"city, country"`,
//! bare city, bare country. A country-only hit gets a bounded pseudorandom
//! offset so co-located fallbacks do not stack on one map pixel; the outcome
//! is labeled `CountryApproximate` because it is not a geocoding result.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;

use super::tables::{CITIES, COUNTRIES};
use super::{location_key, ResolveCoordinates, ResolvedLocation, Resolution};
use crate::records::Coordinates;

/// Maximum offset, in degrees, applied to country-level fallbacks.
pub const COUNTRY_JITTER_DEGREES: f64 = 1.5;

pub struct OfflineResolver {
    table: FxHashMap<&'static str, Coordinates>,
    rng: StdRng,
}

impl OfflineResolver {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic jitter for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let mut table = FxHashMap::default();
        for e in COUNTRIES.iter().chain(CITIES.iter()) {
            table.insert(
                e.key,
                Coordinates {
                    lat: e.lat,
                    lng: e.lng,
                },
            );
        }
        Self { table, rng }
    }

    fn jittered(&mut self, base: Coordinates) -> Coordinates {
        Coordinates {
            lat: base.lat
                + self
                    .rng
                    .gen_range(-COUNTRY_JITTER_DEGREES..=COUNTRY_JITTER_DEGREES),
            lng: base.lng
                + self
                    .rng
                    .gen_range(-COUNTRY_JITTER_DEGREES..=COUNTRY_JITTER_DEGREES),
        }
    }
}

impl Default for OfflineResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolveCoordinates for OfflineResolver {
    fn resolve(&mut self, city: &str, country: &str) -> Option<ResolvedLocation> {
        let city_norm = city.trim().to_lowercase();
        let country_norm = country.trim().to_lowercase();

        if let Some(&coords) = self.table.get(location_key(city, country).as_str()) {
            return Some(ResolvedLocation {
                coords,
                resolution: Resolution::Exact,
            });
        }

        if !city_norm.is_empty() {
            if let Some(&coords) = self.table.get(city_norm.as_str()) {
                return Some(ResolvedLocation {
                    coords,
                    resolution: Resolution::CityOnly,
                });
            }
        }

        if let Some(&coords) = self.table.get(country_norm.as_str()) {
            return Some(ResolvedLocation {
                coords: self.jittered(coords),
                resolution: Resolution::CountryApproximate,
            });
        }

        None
    }
}
