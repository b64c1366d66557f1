//! Typed errors for the designed-fatal conditions
//!
//! Almost everything in the pipelines degrades gracefully (unresolved rows are
//! counted and skipped, bad documents get their own error entry). The variants
//! here are the few conditions that abort a run on purpose.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtlasError {
    /// A category group lost every record to failed coordinate resolution.
    /// Producing a map without markers would hide the data loss.
    #[error("no facilities with resolved coordinates in group '{0}'")]
    NoResolvedFacilities(String),

    /// A category filter matched nothing in the source table.
    #[error("no facilities matched filter '{0}'")]
    EmptyPartition(String),

    /// The filing corpus directory held no loadable extraction results.
    #[error("no extracted documents found under {}", .0.display())]
    NoDocuments(PathBuf),
}
