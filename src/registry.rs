use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{info, warn};

use crate::core::collection::Collection;
use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::stats::CollectionStats;
use crate::core::types::{DocId, Document, FieldValue};
use crate::schema::schema::Schema;
use crate::search::query::SearchQuery;
use crate::search::results::SearchResults;
use crate::storage::layout::StorageLayout;

/// Process-level stats: when the registry came up plus one entry per
/// collection, the payload behind a `/stats` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryStats {
    pub started_at: DateTime<Utc>,
    pub uptime_secs: u64,
    pub collections: BTreeMap<String, CollectionStats>,
}

/// Named directory of collections with write-through persistence: every
/// successful mutation is followed by a snapshot save for that collection,
/// and `open` restores every snapshot found in the data directory.
pub struct Registry {
    layout: StorageLayout,
    started_at: DateTime<Utc>,
    collections: RwLock<HashMap<String, Arc<RwLock<Collection>>>>,
}

impl Registry {
    /// Open the data directory and load every collection snapshot in it.
    /// A snapshot that fails to load is skipped with a warning rather than
    /// taking the whole registry down.
    pub fn open(config: &Config) -> Result<Self> {
        let layout = StorageLayout::new(config.data_dir.clone(), &config.snapshot_extension)?;
        let mut collections = HashMap::new();

        for name in layout.collection_names()? {
            let path = layout.snapshot_path(&name);
            match Collection::load(&path) {
                Ok(collection) => {
                    info!(collection = %name, docs = collection.doc_count(), "collection loaded");
                    collections.insert(name, Arc::new(RwLock::new(collection)));
                }
                Err(err) => {
                    warn!(collection = %name, error = %err, "skipping unreadable snapshot");
                }
            }
        }

        Ok(Registry {
            layout,
            started_at: Utc::now(),
            collections: RwLock::new(collections),
        })
    }

    /// Create an empty collection and persist its initial snapshot.
    pub fn create(&self, name: &str, schema: Schema) -> Result<()> {
        let mut collections = self.collections.write();
        if collections.contains_key(name) {
            return Err(Error::new(
                ErrorKind::DuplicateId,
                format!("collection '{}' already exists", name),
            ));
        }

        let collection = Collection::new(schema);
        collection.save(&self.layout.snapshot_path(name))?;
        collections.insert(name.to_string(), Arc::new(RwLock::new(collection)));
        info!(collection = %name, "collection created");
        Ok(())
    }

    /// Drop a collection and its snapshot file. Returns `false` when the
    /// name is unknown.
    pub fn drop_collection(&self, name: &str) -> Result<bool> {
        let mut collections = self.collections.write();
        if collections.remove(name).is_none() {
            return Ok(false);
        }
        let path = self.layout.snapshot_path(name);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        info!(collection = %name, "collection dropped");
        Ok(true)
    }

    pub fn get(&self, name: &str) -> Option<Arc<RwLock<Collection>>> {
        self.collections.read().get(name).cloned()
    }

    /// Collection names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn stats(&self) -> RegistryStats {
        let collections = self
            .collections
            .read()
            .iter()
            .map(|(name, collection)| (name.clone(), collection.read().stats()))
            .collect();
        RegistryStats {
            started_at: self.started_at,
            uptime_secs: (Utc::now() - self.started_at).num_seconds().max(0) as u64,
            collections,
        }
    }

    /// Add a document to a named collection, then persist it.
    pub fn add_document(
        &self,
        name: &str,
        fields: BTreeMap<String, FieldValue>,
        id: Option<String>,
    ) -> Result<DocId> {
        let collection = self.require(name)?;
        let mut guard = collection.write();
        let doc_id = guard.add(fields, id)?;
        guard.save(&self.layout.snapshot_path(name))?;
        Ok(doc_id)
    }

    /// Update a document in a named collection, persisting on success.
    pub fn update_document(
        &self,
        name: &str,
        id: &str,
        partial: BTreeMap<String, FieldValue>,
    ) -> Result<bool> {
        let collection = self.require(name)?;
        let mut guard = collection.write();
        if !guard.update(id, partial)? {
            return Ok(false);
        }
        guard.save(&self.layout.snapshot_path(name))?;
        Ok(true)
    }

    /// Delete a document from a named collection, persisting on success.
    pub fn delete_document(&self, name: &str, id: &str) -> Result<bool> {
        let collection = self.require(name)?;
        let mut guard = collection.write();
        if !guard.delete(id) {
            return Ok(false);
        }
        guard.save(&self.layout.snapshot_path(name))?;
        Ok(true)
    }

    pub fn get_document(&self, name: &str, id: &str) -> Result<Option<Document>> {
        let collection = self.require(name)?;
        let guard = collection.read();
        Ok(guard.get_document(id).cloned())
    }

    pub fn search(&self, name: &str, query: &SearchQuery) -> Result<SearchResults> {
        let collection = self.require(name)?;
        let guard = collection.read();
        Ok(guard.search(query))
    }

    fn require(&self, name: &str) -> Result<Arc<RwLock<Collection>>> {
        self.get(name).ok_or_else(|| {
            Error::new(
                ErrorKind::NotFound,
                format!("collection '{}' not found", name),
            )
        })
    }
}
