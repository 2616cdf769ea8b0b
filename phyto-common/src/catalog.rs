//! Read-only plant catalog
//!
//! The catalog is loaded once at startup and shared by reference. Entries are
//! handed out as `Arc<CatalogEntry>` so identification results can point at
//! them without copying.

use crate::plant::CatalogEntry;
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Catalog bundled with the crate
const BUNDLED_CATALOG: &str = include_str!("../data/catalog.json");

/// Fixed, read-only list of catalog entries queryable by id
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<Arc<CatalogEntry>>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    /// Parse the catalog embedded at build time
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_CATALOG)
    }

    /// Parse a catalog from a JSON array of entries
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)
            .map_err(|e| Error::Catalog(format!("Failed to parse catalog: {}", e)))?;
        Self::from_entries(entries)
    }

    /// Build a catalog from entries, rejecting duplicate ids
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(entries.len());
        let mut shared = Vec::with_capacity(entries.len());

        for (index, entry) in entries.into_iter().enumerate() {
            if by_id.insert(entry.id.clone(), index).is_some() {
                return Err(Error::Catalog(format!("Duplicate catalog id: {}", entry.id)));
            }
            shared.push(Arc::new(entry));
        }

        debug!(entries = shared.len(), "Catalog loaded");

        Ok(Self {
            entries: shared,
            by_id,
        })
    }

    /// Look up an entry by its identifier
    pub fn get(&self, id: &str) -> Option<Arc<CatalogEntry>> {
        self.by_id.get(id).map(|&i| Arc::clone(&self.entries[i]))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// All entries in source order
    pub fn entries(&self) -> &[Arc<CatalogEntry>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
