/// Record Store
///
/// Read-only, load-at-startup collections of records. `RecordStore` is the
/// seam the tool handlers depend on; `JsonStore` is the in-memory backend
/// loaded from a JSON array (a file on disk or the bundled default dataset).

pub mod records;

use std::collections::HashSet;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::core::error::{DataLoadError, LookupError};
use crate::matcher::{self, Filters, Match, Query};
use records::{CodeRecord, ProductRecord, Record};

/// Default building code dataset compiled into the binary.
pub const BUNDLED_CODES: &str = include_str!("../../data/codes.json");

/// Default product dataset compiled into the binary.
pub const BUNDLED_PRODUCTS: &str = include_str!("../../data/products.json");

/// Read-only access to a loaded record collection.
pub trait RecordStore<R: Record>: Send + Sync {
    /// All records, in load order.
    fn records(&self) -> &[R];

    fn search<F: Filters<R>>(&self, query: &Query<F>) -> Vec<Match<'_, R>> {
        matcher::search(self.records(), query)
    }

    fn get_by_reference(&self, reference: &str) -> Result<&R, LookupError> {
        matcher::get_by_reference(self.records(), reference)
    }
}

/// In-memory store deserialized from a JSON array.
#[derive(Debug, Clone)]
pub struct JsonStore<R> {
    records: Vec<R>,
}

impl<R: Record + DeserializeOwned> JsonStore<R> {
    /// Load records from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataLoadError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| DataLoadError::Missing {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw, &path.display().to_string())
    }

    /// Parse records from JSON text. `origin` names the source in errors.
    pub fn from_json(raw: &str, origin: &str) -> Result<Self, DataLoadError> {
        let records: Vec<R> = serde_json::from_str(raw).map_err(|source| DataLoadError::Malformed {
            origin: origin.to_string(),
            source,
        })?;
        Self::from_records(records, origin)
    }

    /// Wrap already-built records, enforcing unique non-empty ids.
    pub fn from_records(records: Vec<R>, origin: &str) -> Result<Self, DataLoadError> {
        let mut seen = HashSet::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            if record.id().trim().is_empty() {
                return Err(DataLoadError::EmptyId {
                    origin: origin.to_string(),
                    index,
                });
            }
            if !seen.insert(record.id()) {
                return Err(DataLoadError::DuplicateId {
                    origin: origin.to_string(),
                    id: record.id().to_string(),
                });
            }
        }
        tracing::debug!(origin, count = records.len(), "dataset loaded");
        Ok(Self { records })
    }
}

impl<R: Record + Send + Sync> RecordStore<R> for JsonStore<R> {
    fn records(&self) -> &[R] {
        &self.records
    }
}

pub type CodeStore = JsonStore<CodeRecord>;
pub type ProductStore = JsonStore<ProductRecord>;

/// Load from `path` when given, otherwise from the bundled JSON text.
pub fn load_or_bundled<R>(path: Option<&str>, bundled: &str, name: &str) -> Result<JsonStore<R>, DataLoadError>
where
    R: Record + DeserializeOwned,
{
    match path {
        Some(path) if !path.trim().is_empty() => {
            tracing::info!(dataset = name, path, "loading dataset from file");
            JsonStore::load(path)
        }
        _ => {
            tracing::info!(dataset = name, "loading bundled dataset");
            JsonStore::from_json(bundled, &format!("bundled {}", name))
        }
    }
}
