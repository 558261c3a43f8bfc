//! JSON file persistence for a [`Collection`].
//!
//! On-disk shape: a single object keyed by a dense zero-based index, each
//! value holding the original id and text:
//!
//! ```json
//! {"0": {"id": "1344871407654731777", "text": "..."}, "1": {...}}
//! ```
//!
//! The index only exists on disk. Loading keys records by their `id` again
//! and restores the saved order.

use crate::collection::{Collection, PostRecord};
use crate::error::CorpusError;
use indexmap::IndexMap;
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

pub const JSON_EXTENSION: &str = "json";

/// Where a collection is saved to and loaded from.
pub trait CorpusStore {
    /// Write a snapshot of `collection`, returning the path written.
    fn save(&self, collection: &Collection) -> Result<PathBuf, CorpusError>;

    /// Read the records of the last snapshot, in saved order.
    fn load(&self) -> Result<Vec<PostRecord>, CorpusError>;
}

#[derive(Serialize)]
struct StoredRecord<'a> {
    id: &'a str,
    text: &'a str,
}

/// Serialize a collection into the positional on-disk document.
pub fn encode(collection: &Collection) -> serde_json::Result<String> {
    let document: IndexMap<String, StoredRecord<'_>> = collection
        .entries()
        .enumerate()
        .map(|(index, (id, text))| (index.to_string(), StoredRecord { id, text }))
        .collect();

    serde_json::to_string_pretty(&document)
}

/// Parse a positional document back into records ordered by index.
///
/// Keys must be non-negative integers and every record needs string `id` and
/// `text` fields; anything else is rejected rather than coerced.
pub fn decode(raw: &str, path: &Path) -> Result<Vec<PostRecord>, CorpusError> {
    let document: IndexMap<String, serde_json::Value> = serde_json::from_str(raw)
        .map_err(|e| CorpusError::persistence(path, format!("invalid JSON: {}", e)))?;

    let mut indexed = Vec::with_capacity(document.len());
    for (key, value) in document {
        let index: usize = key.parse().map_err(|_| {
            CorpusError::persistence(path, format!("key '{}' is not a record index", key))
        })?;
        let record: PostRecord = serde_json::from_value(value)
            .map_err(|e| CorpusError::persistence(path, format!("record {}: {}", key, e)))?;
        indexed.push((index, record));
    }

    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, record)| record).collect())
}

/// Append `.json` unless the path already ends in it.
pub fn with_json_suffix(path: impl Into<PathBuf>) -> PathBuf {
    let path = path.into();
    if path.extension().is_some_and(|ext| ext == JSON_EXTENSION) {
        return path;
    }
    let mut name: OsString = path.into_os_string();
    name.push(".");
    name.push(JSON_EXTENSION);
    PathBuf::from(name)
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: with_json_suffix(path),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomically(&self, contents: &str) -> std::io::Result<()> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let mut temp_file = NamedTempFile::new_in(parent)?;
        {
            let mut writer = BufWriter::new(temp_file.as_file_mut());
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp_file.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl CorpusStore for JsonFileStore {
    fn save(&self, collection: &Collection) -> Result<PathBuf, CorpusError> {
        let contents = encode(collection)
            .map_err(|e| CorpusError::persistence(&self.path, e.to_string()))?;

        self.write_atomically(&contents)
            .map_err(|e| CorpusError::persistence(&self.path, format!("write failed: {}", e)))?;

        info!("Saved {} posts to {}", collection.len(), self.path.display());
        Ok(self.path.clone())
    }

    fn load(&self) -> Result<Vec<PostRecord>, CorpusError> {
        let raw = fs::read_to_string(&self.path)
            .map_err(|e| CorpusError::persistence(&self.path, format!("read failed: {}", e)))?;

        let records = decode(&raw, &self.path)?;
        info!("Loaded {} posts from {}", records.len(), self.path.display());
        Ok(records)
    }
}
