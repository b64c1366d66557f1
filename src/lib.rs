//! Facility Atlas
//!
//! Batch analytics over a company's facility disclosures:
//! - `records` / `geocode` / `distance` / `map`: load the facility export,
//!   resolve coordinates (offline table or cached online backend), rank the
//!   cross-category geodesic distances, and emit the interactive bubble map.
//! - `aggregate`: cross-tabulation of the facility table (per-country,
//!   per-type, workforce metrics, concentration).
//! - `filings` / `scan`: keyword and sentiment scanning over extracted
//!   filing text.
//! - `report`: JSON report envelopes with stdout summaries.
//!
//! Everything runs as sequential, run-once batch pipelines; the binaries
//! under `src/bin/` wire the pieces together.

pub mod aggregate;
pub mod config;
pub mod distance;
pub mod error;
pub mod filings;
pub mod geocode;
pub mod map;
pub mod records;
pub mod report;
pub mod scan;

// Re-export commonly used types
pub use config::{MapConfig, ScanConfig};
pub use distance::{geodesic_km, rank_pairs, top_k, DistanceStats, FacilityPair};
pub use error::AtlasError;
pub use geocode::{
    attach_coordinates, retain_resolved, GeocodeCache, OfflineResolver, OnlineResolver,
    ResolveCoordinates,
};
pub use records::{CategoryFilter, Coordinates, FacilityRecord, FacilityTable};
pub use scan::{scan, KeywordTaxonomy, ScanOptions};
