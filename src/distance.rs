//! Geodesic Distance and Pairwise Ranking
//!
//! Distances use the inverse geodesic on the WGS-84 ellipsoid (Vincenty's
//! formula) so results are reproducible across implementations at the
//! one-decimal-kilometer precision the reports use. Inputs are lat/lng
//! degrees at global scale, so flat-plane distance is not an option.
//!
//! `rank_pairs` enumerates every cross pair between two disjoint groups and
//! stable-sorts ascending by distance; ties keep (A-index, B-index)
//! enumeration order. No deduplication: a facility may appear in several of
//! the top-K pairs.

use serde::Serialize;

use crate::records::{Coordinates, FacilityRecord};

/// WGS-84 semi-major axis in meters.
const WGS84_A: f64 = 6_378_137.0;
/// WGS-84 flattening.
const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// One cross-category facility pair with its separation.
#[derive(Debug, Clone, Serialize)]
pub struct FacilityPair {
    pub facility_a: String,
    pub facility_b: String,
    pub from: Coordinates,
    pub to: Coordinates,
    pub distance_km: f64,
}

/// Geodesic distance in kilometers between two points on the WGS-84
/// ellipsoid. Falls back to the spherical great-circle for the rare
/// near-antipodal pair where Vincenty's iteration does not converge.
pub fn geodesic_km(a: Coordinates, b: Coordinates) -> f64 {
    match vincenty_m(a, b) {
        Some(m) => m / 1000.0,
        None => haversine_m(a, b) / 1000.0,
    }
}

/// Vincenty's inverse formula. `None` when the iteration fails to converge.
fn vincenty_m(p1: Coordinates, p2: Coordinates) -> Option<f64> {
    let a = WGS84_A;
    let f = WGS84_F;
    let b = a * (1.0 - f);

    let lat1 = p1.lat.to_radians();
    let lat2 = p2.lat.to_radians();
    let l = (p2.lng - p1.lng).to_radians();

    let u1 = ((1.0 - f) * lat1.tan()).atan();
    let u2 = ((1.0 - f) * lat2.tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;

    for _ in 0..200 {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();
        if sin_sigma == 0.0 {
            // Coincident points.
            return Some(0.0);
        }
        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        let cos2_sigma_m = if cos_sq_alpha.abs() > f64::EPSILON {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        } else {
            // Both points on the equator.
            0.0
        };
        let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
        let lambda_prev = lambda;
        lambda = l
            + (1.0 - c)
                * f
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos2_sigma_m
                            + c * cos_sigma * (-1.0 + 2.0 * cos2_sigma_m * cos2_sigma_m)));
        if (lambda - lambda_prev).abs() < 1e-12 {
            let u_sq = cos_sq_alpha * (a * a - b * b) / (b * b);
            let big_a =
                1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
            let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
            let delta_sigma = big_b
                * sin_sigma
                * (cos2_sigma_m
                    + big_b / 4.0
                        * (cos_sigma * (-1.0 + 2.0 * cos2_sigma_m * cos2_sigma_m)
                            - big_b / 6.0
                                * cos2_sigma_m
                                * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                                * (-3.0 + 4.0 * cos2_sigma_m * cos2_sigma_m)));
            return Some(b * big_a * (sigma - delta_sigma));
        }
    }

    None
}

/// Spherical great-circle distance (mean earth radius), convergence fallback.
fn haversine_m(p1: Coordinates, p2: Coordinates) -> f64 {
    const EARTH_RADIUS_M: f64 = 6_371_008.8;
    let lat1 = p1.lat.to_radians();
    let lat2 = p2.lat.to_radians();
    let dlat = (p2.lat - p1.lat).to_radians();
    let dlng = (p2.lng - p1.lng).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// All m×n cross pairs between two groups, ascending by distance.
///
/// Only records with attached coordinates participate; callers are expected
/// to have dropped unresolved records (and counted them) beforehand.
pub fn rank_pairs(group_a: &[FacilityRecord], group_b: &[FacilityRecord]) -> Vec<FacilityPair> {
    let mut pairs = Vec::with_capacity(group_a.len() * group_b.len());

    for ra in group_a {
        let Some(from) = ra.coordinates else { continue };
        for rb in group_b {
            let Some(to) = rb.coordinates else { continue };
            pairs.push(FacilityPair {
                facility_a: ra.name.clone(),
                facility_b: rb.name.clone(),
                from,
                to,
                distance_km: geodesic_km(from, to),
            });
        }
    }

    // Stable: ties keep the (A-index, B-index) enumeration order.
    pairs.sort_by(|x, y| {
        x.distance_km
            .partial_cmp(&y.distance_km)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    pairs
}

/// First K entries of the ranked sequence.
pub fn top_k(pairs: &[FacilityPair], k: usize) -> Vec<FacilityPair> {
    pairs.iter().take(k).cloned().collect()
}

/// Min/max/mean/median over the full ranked sequence, one-decimal precision.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DistanceStats {
    pub shortest_km: f64,
    pub longest_km: f64,
    pub mean_km: f64,
    pub median_km: f64,
}

impl DistanceStats {
    /// `None` for an empty sequence. Input must already be sorted ascending.
    pub fn from_sorted(pairs: &[FacilityPair]) -> Option<Self> {
        if pairs.is_empty() {
            return None;
        }
        let n = pairs.len();
        let sum: f64 = pairs.iter().map(|p| p.distance_km).sum();
        let median = if n % 2 == 1 {
            pairs[n / 2].distance_km
        } else {
            (pairs[n / 2 - 1].distance_km + pairs[n / 2].distance_km) / 2.0
        };
        Some(Self {
            shortest_km: round1(pairs[0].distance_km),
            longest_km: round1(pairs[n - 1].distance_km),
            mean_km: round1(sum / n as f64),
            median_km: round1(median),
        })
    }
}

/// Round to the one-decimal-kilometer report precision.
pub fn round1(km: f64) -> f64 {
    (km * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn point(lat: f64, lng: f64) -> Coordinates {
        Coordinates { lat, lng }
    }

    fn record(name: &str, coords: Option<Coordinates>) -> FacilityRecord {
        FacilityRecord {
            name: name.to_string(),
            category: "X".to_string(),
            city: None,
            country: None,
            worker_count: None,
            female_worker_pct: None,
            migrant_worker_pct: None,
            product_type: None,
            coordinates: coords,
        }
    }

    #[test]
    fn one_degree_of_longitude_on_the_equator() {
        // 1/360 of the WGS-84 equatorial circumference.
        let d = geodesic_km(point(0.0, 10.0), point(0.0, 11.0));
        assert_relative_eq!(d, 111.32, epsilon = 0.05);
    }

    #[test]
    fn one_degree_of_longitude_at_ten_north() {
        let d = geodesic_km(point(10.0, 10.0), point(10.0, 11.0));
        assert_relative_eq!(d, 109.64, epsilon = 0.1);
    }

    #[test]
    fn distance_is_symmetric() {
        let hcmc = point(10.8231, 106.6297);
        let bangkok = point(13.7563, 100.5018);
        assert_relative_eq!(
            geodesic_km(hcmc, bangkok),
            geodesic_km(bangkok, hcmc),
            epsilon = 1e-9
        );
    }

    #[test]
    fn coincident_points_are_zero() {
        let p = point(21.0285, 105.8542);
        assert_eq!(geodesic_km(p, p), 0.0);
    }

    #[test]
    fn ranker_returns_m_times_n_sorted_pairs() {
        let group_a = vec![
            record("a1", Some(point(10.0, 10.0))),
            record("a2", Some(point(20.0, 20.0))),
            record("a3", Some(point(-5.0, 30.0))),
        ];
        let group_b = vec![
            record("b1", Some(point(10.5, 10.5))),
            record("b2", Some(point(50.0, 50.0))),
        ];

        let pairs = rank_pairs(&group_a, &group_b);
        assert_eq!(pairs.len(), 6);
        for w in pairs.windows(2) {
            assert!(w[0].distance_km <= w[1].distance_km);
        }
    }

    #[test]
    fn single_cross_pair_is_the_top_one() {
        let group_a = vec![record("a", Some(point(10.0, 10.0)))];
        let group_b = vec![record("b", Some(point(10.0, 11.0)))];

        let pairs = rank_pairs(&group_a, &group_b);
        assert_eq!(pairs.len(), 1);

        let top = top_k(&pairs, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].facility_a, "a");
        assert_eq!(top[0].facility_b, "b");
        assert_relative_eq!(top[0].distance_km, 109.64, epsilon = 0.1);
    }

    #[test]
    fn stats_cover_the_whole_sequence() {
        let group_a = vec![record("a", Some(point(0.0, 0.0)))];
        let group_b = vec![
            record("b1", Some(point(0.0, 1.0))),
            record("b2", Some(point(0.0, 3.0))),
        ];
        let pairs = rank_pairs(&group_a, &group_b);
        let stats = DistanceStats::from_sorted(&pairs).unwrap();
        assert_relative_eq!(stats.shortest_km, 111.3, epsilon = 0.1);
        assert_relative_eq!(stats.longest_km, 334.0, epsilon = 0.2);
        assert!(stats.shortest_km <= stats.median_km && stats.median_km <= stats.longest_km);
    }

    #[test]
    fn unresolved_records_never_reach_the_grid() {
        let group_a = vec![record("a", Some(point(0.0, 0.0))), record("x", None)];
        let group_b = vec![record("b", Some(point(1.0, 1.0)))];
        assert_eq!(rank_pairs(&group_a, &group_b).len(), 1);
    }
}
