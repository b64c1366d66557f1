//! Facility Data Model and Spreadsheet Loading
//!
//! Loads the facility export with Polars and converts it to typed records.
//! The export carries a banner line above the real header, so the reader
//! skips one row before parsing column names.
//!
//! Records are immutable after load except for the `coordinates` field,
//! which the resolution step fills in.

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A resolved latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// One row of the facility export.
#[derive(Debug, Clone, Serialize)]
pub struct FacilityRecord {
    pub name: String,
    /// Facility type label, e.g. "FINISHED GOODS" or "FINISHED GOODS - COMPONENTS"
    pub category: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub worker_count: Option<f64>,
    pub female_worker_pct: Option<f64>,
    pub migrant_worker_pct: Option<f64>,
    pub product_type: Option<String>,
    /// Attached by the resolution step; `None` means the record is excluded
    /// from all geographic computation (and counted as dropped).
    pub coordinates: Option<Coordinates>,
}

/// The loaded table plus accounting for rows the loader had to drop.
#[derive(Debug)]
pub struct FacilityTable {
    pub records: Vec<FacilityRecord>,
    /// Rows without a facility name or category label.
    pub skipped_rows: usize,
}

/// Predicate selecting one category group for a map run.
///
/// "category == X", optionally narrowed to "AND product_type == Y".
#[derive(Debug, Clone, Serialize)]
pub struct CategoryFilter {
    pub category: String,
    pub product_type: Option<String>,
}

impl CategoryFilter {
    pub fn category(category: &str) -> Self {
        Self {
            category: category.to_string(),
            product_type: None,
        }
    }

    pub fn category_and_product(category: &str, product_type: &str) -> Self {
        Self {
            category: category.to_string(),
            product_type: Some(product_type.to_string()),
        }
    }

    pub fn matches(&self, record: &FacilityRecord) -> bool {
        if record.category != self.category {
            return false;
        }
        match &self.product_type {
            Some(wanted) => record.product_type.as_deref() == Some(wanted.as_str()),
            None => true,
        }
    }

    /// Human-readable form for reports and error messages.
    pub fn describe(&self) -> String {
        match &self.product_type {
            Some(p) => format!("{} / {}", self.category, p),
            None => self.category.clone(),
        }
    }
}

/// Column names expected in the export. Defaults match the vendor export.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    pub name: &'static str,
    pub category: &'static str,
    pub city: &'static str,
    pub country: &'static str,
    pub workers: &'static str,
    pub female_pct: &'static str,
    pub migrant_pct: &'static str,
    pub product_type: &'static str,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            name: "Factory Name",
            category: "Factory Type",
            city: "City",
            country: "Country / Region",
            workers: "Total Workers",
            female_pct: "% Female Workers",
            migrant_pct: "% Migrant Workers",
            product_type: "Product Type",
        }
    }
}

impl FacilityTable {
    /// Load the facility export (CSV rendition of the spreadsheet).
    ///
    /// The header row sits one row below the top of the file.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_columns(path, &ColumnMap::default())
    }

    pub fn load_with_columns(path: &Path, columns: &ColumnMap) -> Result<Self> {
        log::info!("Loading facility export: {}", path.display());

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_skip_rows(1)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .with_context(|| format!("Failed to open facility export: {}", path.display()))?
            .finish()
            .with_context(|| format!("Failed to parse facility export: {}", path.display()))?;

        let table = Self::from_dataframe(&df, columns)?;
        log::info!(
            "Loaded {} facility records ({} rows skipped)",
            table.records.len(),
            table.skipped_rows
        );
        Ok(table)
    }

    /// Convert a loaded DataFrame to typed records, dropping and counting
    /// rows that lack a facility name or category label.
    pub fn from_dataframe(df: &DataFrame, columns: &ColumnMap) -> Result<Self> {
        let names = str_column(df, columns.name)?;
        let categories = str_column(df, columns.category)?;
        let cities = opt_str_column(df, columns.city);
        let countries = opt_str_column(df, columns.country);
        let products = opt_str_column(df, columns.product_type);
        let workers = numeric_column(df, columns.workers);
        let female = numeric_column(df, columns.female_pct);
        let migrant = numeric_column(df, columns.migrant_pct);

        let mut records = Vec::with_capacity(df.height());
        let mut skipped_rows = 0usize;

        for i in 0..df.height() {
            let name = names.get(i).map(str::trim).filter(|s| !s.is_empty());
            let category = categories.get(i).map(str::trim).filter(|s| !s.is_empty());

            let (Some(name), Some(category)) = (name, category) else {
                skipped_rows += 1;
                continue;
            };

            records.push(FacilityRecord {
                name: name.to_string(),
                category: category.to_string(),
                city: trimmed(&cities, i),
                country: trimmed(&countries, i),
                worker_count: workers.as_ref().and_then(|c| c.get(i)),
                female_worker_pct: female.as_ref().and_then(|c| c.get(i)),
                migrant_worker_pct: migrant.as_ref().and_then(|c| c.get(i)),
                product_type: trimmed(&products, i),
                coordinates: None,
            });
        }

        Ok(Self {
            records,
            skipped_rows,
        })
    }

    /// Split the table into the two disjoint groups a map run works on.
    pub fn partition(
        &self,
        filter_a: &CategoryFilter,
        filter_b: &CategoryFilter,
    ) -> (Vec<FacilityRecord>, Vec<FacilityRecord>) {
        let group_a: Vec<_> = self
            .records
            .iter()
            .filter(|r| filter_a.matches(r))
            .cloned()
            .collect();
        let group_b: Vec<_> = self
            .records
            .iter()
            .filter(|r| filter_b.matches(r))
            .cloned()
            .collect();
        (group_a, group_b)
    }
}

fn str_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked> {
    df.column(name)
        .with_context(|| format!("Column '{}' not found", name))?
        .str()
        .with_context(|| format!("Column '{}' is not string type", name))
}

fn opt_str_column<'a>(df: &'a DataFrame, name: &str) -> Option<&'a StringChunked> {
    df.column(name).ok().and_then(|c| c.str().ok())
}

/// Numeric accessor tolerating integer-typed worker counts.
fn numeric_column(df: &DataFrame, name: &str) -> Option<Float64Chunked> {
    df.column(name).ok().and_then(|c| {
        if let Ok(f) = c.f64() {
            return Some(f.clone());
        }
        if let Ok(i) = c.i64() {
            let cast = i.cast(&DataType::Float64).ok()?;
            return Some(cast.f64().ok()?.clone());
        }
        None
    })
}

fn trimmed(col: &Option<&StringChunked>, i: usize) -> Option<String> {
    col.as_ref()
        .and_then(|c| c.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}
