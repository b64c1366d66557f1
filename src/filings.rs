//! Filing Corpus Loading
//!
//! Reads the per-year directory of extraction results (one
//! `*_extracted.json` per source document; the extractors themselves live
//! outside this crate) and assembles the text blob the keyword scan runs
//! over. A malformed document gets an error entry in its own result row and
//! never aborts the batch.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Shape of one extraction result file. Older extractors wrote the text
/// under `sample_text`; both spellings are accepted.
#[derive(Debug, Deserialize)]
struct ExtractedFile {
    text: Option<String>,
    sample_text: Option<String>,
}

/// Per-document outcome carried into the report.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentEntry {
    pub file: String,
    pub characters: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The loaded corpus: per-document entries plus the combined analysis text.
#[derive(Debug)]
pub struct FilingCorpus {
    pub documents: Vec<DocumentEntry>,
    pub text: String,
}

impl FilingCorpus {
    pub fn loaded_count(&self) -> usize {
        self.documents.iter().filter(|d| d.error.is_none()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.documents.iter().filter(|d| d.error.is_some()).count()
    }
}

/// Load every `*_extracted.json` under `dir`, in file-name order.
pub fn load_corpus(dir: &Path) -> Result<FilingCorpus> {
    log::info!("Loading extracted documents from: {}", dir.display());

    let mut names: Vec<String> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read corpus directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with("_extracted.json"))
        .collect();
    names.sort();

    let mut documents = Vec::with_capacity(names.len());
    let mut text = String::new();

    for name in names {
        match load_document(&dir.join(&name)) {
            Ok(doc_text) => {
                documents.push(DocumentEntry {
                    file: name.clone(),
                    characters: doc_text.len(),
                    error: None,
                });
                text.push_str(&format!("\n\n=== {} ===\n", name));
                text.push_str(&doc_text);
            }
            Err(e) => {
                log::warn!("Skipping {}: {:#}", name, e);
                documents.push(DocumentEntry {
                    file: name,
                    characters: 0,
                    error: Some(format!("{:#}", e)),
                });
            }
        }
    }

    log::info!(
        "Loaded {} documents ({} failed), {} characters of text",
        documents.iter().filter(|d| d.error.is_none()).count(),
        documents.iter().filter(|d| d.error.is_some()).count(),
        text.len()
    );

    Ok(FilingCorpus { documents, text })
}

fn load_document(path: &Path) -> Result<String> {
    let contents = fs::read_to_string(path).context("unreadable file")?;
    let parsed: ExtractedFile = serde_json::from_str(&contents).context("invalid JSON")?;
    parsed
        .text
        .or(parsed.sample_text)
        .filter(|t| !t.trim().is_empty())
        .context("no text content")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corpus_loads_good_documents_and_records_bad_ones() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a_extracted.json"),
            r#"{"text": "revenue grew"}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("b_extracted.json"),
            r#"{"sample_text": "supply chain pressure"}"#,
        )
        .unwrap();
        fs::write(dir.path().join("c_extracted.json"), "not json at all").unwrap();
        fs::write(dir.path().join("ignored.txt"), "other file").unwrap();

        let corpus = load_corpus(dir.path()).unwrap();
        assert_eq!(corpus.documents.len(), 3);
        assert_eq!(corpus.loaded_count(), 2);
        assert_eq!(corpus.failed_count(), 1);
        assert!(corpus.text.contains("=== a_extracted.json ==="));
        assert!(corpus.text.contains("revenue grew"));
        assert!(corpus.text.contains("supply chain pressure"));

        let failed = corpus.documents.iter().find(|d| d.error.is_some()).unwrap();
        assert_eq!(failed.file, "c_extracted.json");
    }

    #[test]
    fn empty_text_field_counts_as_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("empty_extracted.json"), r#"{"text": "  "}"#).unwrap();
        let corpus = load_corpus(dir.path()).unwrap();
        assert_eq!(corpus.loaded_count(), 0);
        assert_eq!(corpus.failed_count(), 1);
    }
}
