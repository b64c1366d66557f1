//! Geocode Cache
//!
//! JSON-backed map from normalized `"city, country"` keys to coordinates.
//! Loaded fully at the start of a run and persisted write-through: every new
//! resolution rewrites the file, so a crash loses at most the in-flight
//! lookup. Entries are append-only and never expire; if a location's true
//! coordinates ever change, the stale entry must be removed by hand.

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::records::Coordinates;

pub struct GeocodeCache {
    path: Option<PathBuf>,
    entries: FxHashMap<String, Coordinates>,
}

impl GeocodeCache {
    /// Load the cache file, or start empty when none exists yet.
    pub fn load(path: &Path) -> Result<Self> {
        let entries = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read geocode cache: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse geocode cache: {}", path.display()))?
        } else {
            FxHashMap::default()
        };

        log::info!(
            "Geocode cache: {} entries from {}",
            entries.len(),
            path.display()
        );

        Ok(Self {
            path: Some(path.to_path_buf()),
            entries,
        })
    }

    /// Cache without a backing file. Used by tests and dry runs.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: FxHashMap::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Coordinates> {
        self.entries.get(key).copied()
    }

    /// Insert a resolution and persist immediately.
    pub fn insert(&mut self, key: String, coords: Coordinates) -> Result<()> {
        self.entries.insert(key, coords);
        self.persist()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write geocode cache: {}", path.display()))
    }
}
