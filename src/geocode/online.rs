//! Online Coordinate Resolution
//!
//! Cache-first resolution against an external geocoding backend. The backend
//! itself (HTTP geocoder, stub, whatever) lives behind the `GeocodeBackend`
//! trait; this module owns the lookup policy:
//!
//! - cache hit → no external call
//! - miss → query `"city, country"`, then `country` alone
//! - success → write-through to the cache, then hold the rate-limit pause
//!   before the next external call
//! - total failure → unresolved, with no negative caching so a later run
//!   can retry

use anyhow::Result;
use std::time::{Duration, Instant};

use super::cache::GeocodeCache;
use super::{location_key, ResolveCoordinates, ResolvedLocation, Resolution};
use crate::records::Coordinates;

/// External geocoding capability. Implementations perform the actual network
/// call; the crate only ships test stubs, the real client is a collaborator.
pub trait GeocodeBackend {
    /// `Ok(None)` means the service answered but found nothing.
    fn lookup(&mut self, query: &str) -> Result<Option<Coordinates>>;
}

pub struct OnlineResolver<B: GeocodeBackend> {
    backend: B,
    cache: GeocodeCache,
    min_delay: Duration,
    last_call: Option<Instant>,
}

impl<B: GeocodeBackend> OnlineResolver<B> {
    pub fn new(backend: B, cache: GeocodeCache, min_delay: Duration) -> Self {
        Self {
            backend,
            cache,
            min_delay,
            last_call: None,
        }
    }

    pub fn cache(&self) -> &GeocodeCache {
        &self.cache
    }

    /// Query the backend, holding the rate-limit pause since the previous call.
    fn query(&mut self, q: &str) -> Result<Option<Coordinates>> {
        if let Some(last) = self.last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_delay {
                std::thread::sleep(self.min_delay - elapsed);
            }
        }
        let result = self.backend.lookup(q);
        self.last_call = Some(Instant::now());
        result
    }
}

impl<B: GeocodeBackend> ResolveCoordinates for OnlineResolver<B> {
    fn resolve(&mut self, city: &str, country: &str) -> Option<ResolvedLocation> {
        let key = location_key(city, country);

        if let Some(coords) = self.cache.get(&key) {
            return Some(ResolvedLocation {
                coords,
                resolution: Resolution::Cached,
            });
        }

        let city_trimmed = city.trim();
        let country_trimmed = country.trim();

        // Full address first, country alone as the fallback.
        let attempts: Vec<(String, Resolution)> = if city_trimmed.is_empty() {
            vec![(country_trimmed.to_string(), Resolution::CountryLevel)]
        } else {
            vec![
                (
                    format!("{}, {}", city_trimmed, country_trimmed),
                    Resolution::Exact,
                ),
                (country_trimmed.to_string(), Resolution::CountryLevel),
            ]
        };

        for (query, resolution) in attempts {
            match self.query(&query) {
                Ok(Some(coords)) => {
                    if let Err(e) = self.cache.insert(key.clone(), coords) {
                        log::warn!("Failed to persist geocode cache entry: {:#}", e);
                    }
                    log::info!("Geocoded: {} -> ({:.4}, {:.4})", query, coords.lat, coords.lng);
                    return Some(ResolvedLocation { coords, resolution });
                }
                Ok(None) => continue,
                Err(e) => {
                    log::warn!("Geocoding error for '{}': {:#}", query, e);
                    return None;
                }
            }
        }

        log::warn!("Failed to geocode: {}, {}", city_trimmed, country_trimmed);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted backend recording every query it receives.
    struct ScriptedBackend {
        answers: Vec<Option<Coordinates>>,
        queries: Vec<String>,
    }

    impl ScriptedBackend {
        fn new(answers: Vec<Option<Coordinates>>) -> Self {
            Self {
                answers,
                queries: Vec::new(),
            }
        }
    }

    impl GeocodeBackend for ScriptedBackend {
        fn lookup(&mut self, query: &str) -> Result<Option<Coordinates>> {
            self.queries.push(query.to_string());
            Ok(if self.answers.is_empty() {
                None
            } else {
                self.answers.remove(0)
            })
        }
    }

    fn coords(lat: f64, lng: f64) -> Coordinates {
        Coordinates { lat, lng }
    }

    #[test]
    fn cache_hit_skips_the_backend() {
        let mut cache = GeocodeCache::in_memory();
        cache
            .insert("hanoi, vietnam".to_string(), coords(21.0, 105.9))
            .unwrap();
        let backend = ScriptedBackend::new(vec![]);
        let mut resolver = OnlineResolver::new(backend, cache, Duration::ZERO);

        let hit = resolver.resolve("Hanoi", "Vietnam").unwrap();
        assert_eq!(hit.resolution, Resolution::Cached);
        assert!(resolver.backend.queries.is_empty());
    }

    #[test]
    fn miss_tries_full_address_then_country() {
        let backend = ScriptedBackend::new(vec![None, Some(coords(14.1, 108.3))]);
        let mut resolver =
            OnlineResolver::new(backend, GeocodeCache::in_memory(), Duration::ZERO);

        let hit = resolver.resolve("Nowhere", "Vietnam").unwrap();
        assert_eq!(hit.resolution, Resolution::CountryLevel);
        assert_eq!(
            resolver.backend.queries,
            vec!["Nowhere, Vietnam".to_string(), "Vietnam".to_string()]
        );
        // Second resolution of the same key is served from the cache.
        let again = resolver.resolve("Nowhere", "Vietnam").unwrap();
        assert_eq!(again.resolution, Resolution::Cached);
        assert_eq!(resolver.backend.queries.len(), 2);
    }

    #[test]
    fn total_failure_is_unresolved_and_not_cached() {
        let backend = ScriptedBackend::new(vec![None, None]);
        let mut resolver =
            OnlineResolver::new(backend, GeocodeCache::in_memory(), Duration::ZERO);

        assert!(resolver.resolve("Nowhere", "Atlantis").is_none());
        assert!(resolver.cache().is_empty());
    }

    #[test]
    fn backend_error_does_not_abort_the_batch() {
        struct FailingBackend;
        impl GeocodeBackend for FailingBackend {
            fn lookup(&mut self, _query: &str) -> Result<Option<Coordinates>> {
                anyhow::bail!("connection reset")
            }
        }
        let mut resolver =
            OnlineResolver::new(FailingBackend, GeocodeCache::in_memory(), Duration::ZERO);
        assert!(resolver.resolve("Hanoi", "Vietnam").is_none());
    }
}
