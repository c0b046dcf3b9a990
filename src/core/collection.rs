use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use tracing::{debug, info};
use uuid::Uuid;

use crate::analysis::tokenizer::{StandardTokenizer, Tokenizer};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::stats::CollectionStats;
use crate::core::types::{DocId, Document, FieldValue};
use crate::index::facet::FacetIndex;
use crate::index::inverted::InvertedIndex;
use crate::index::numeric::NumericIndex;
use crate::index::posting::{Posting, PostingList};
use crate::index::store::DocumentStore;
use crate::index::trie::Trie;
use crate::schema::schema::{FieldType, Schema};
use crate::scoring::scorer::Bm25Scorer;
use crate::search::executor::QueryExecutor;
use crate::search::query::SearchQuery;
use crate::search::results::SearchResults;
use crate::storage::snapshot::{self, SnapshotImage};

/// One independent search engine instance built from a fixed schema.
///
/// Token positions are document-global: the counter runs across all schema
/// text fields in declaration order without gaps, so phrase matches may
/// cross field boundaries.
pub struct Collection {
    schema: Schema,
    tokenizer: Box<dyn Tokenizer>,
    store: DocumentStore,
    inverted: InvertedIndex,
    trie: Trie,
    facets: FacetIndex,
    numerics: NumericIndex,
    scorer: Bm25Scorer,
}

impl Collection {
    pub fn new(schema: Schema) -> Self {
        Collection {
            schema,
            tokenizer: Box::new(StandardTokenizer),
            store: DocumentStore::new(),
            inverted: InvertedIndex::new(),
            trie: Trie::new(),
            facets: FacetIndex::new(),
            numerics: NumericIndex::new(),
            scorer: Bm25Scorer::default(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn doc_count(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn stats(&self) -> CollectionStats {
        CollectionStats {
            doc_count: self.store.len(),
            total_doc_length: self.store.total_len(),
            avg_doc_length: self.store.avg_len(),
            vocabulary_size: self.trie.len(),
            facet_field_count: self.facets.field_count(),
            tokenizer: self.tokenizer.name().to_string(),
        }
    }

    /// Index a document. A missing id gets a fresh UUID; an id already in
    /// the store fails with `DuplicateId`. The duplicate check is the only
    /// fallible step, so a failed `add` leaves no partial state behind.
    pub fn add(
        &mut self,
        fields: BTreeMap<String, FieldValue>,
        id: Option<String>,
    ) -> Result<DocId> {
        let doc_id = match id {
            Some(id) => DocId::new(id),
            None => DocId::new(Uuid::new_v4().to_string()),
        };
        if self.store.contains(&doc_id) {
            return Err(Error::new(
                ErrorKind::DuplicateId,
                format!("document '{}' already exists", doc_id),
            ));
        }

        let doc = Document::new(doc_id.clone(), fields);
        self.index_document(&doc);
        debug!(id = %doc_id, "document added");
        Ok(doc_id)
    }

    /// Remove a document and every index entry derived from it. Returns
    /// `false` when the id is unknown.
    pub fn delete(&mut self, id: &str) -> bool {
        let doc_id = DocId::new(id);
        let Some(doc) = self.store.remove(&doc_id) else {
            return false;
        };
        self.unindex_document(&doc);
        debug!(id, "document deleted");
        true
    }

    /// Overlay `partial` onto the stored document, then reindex the merged
    /// result under the same id. Deliberately non-incremental. Returns
    /// `false` when the id is unknown.
    pub fn update(&mut self, id: &str, partial: BTreeMap<String, FieldValue>) -> Result<bool> {
        let doc_id = DocId::new(id);
        let Some(existing) = self.store.get(&doc_id) else {
            return Ok(false);
        };

        let mut merged = existing.fields.clone();
        merged.extend(partial);

        self.delete(id);
        self.add(merged, Some(id.to_string()))?;
        Ok(true)
    }

    pub fn get_document(&self, id: &str) -> Option<&Document> {
        self.store.get(&DocId::new(id))
    }

    pub fn search(&self, query: &SearchQuery) -> SearchResults {
        let executor = QueryExecutor {
            schema: &self.schema,
            store: &self.store,
            inverted: &self.inverted,
            trie: &self.trie,
            facets: &self.facets,
            numerics: &self.numerics,
            scorer: &self.scorer,
            tokenizer: self.tokenizer.as_ref(),
        };
        executor.execute(query)
    }

    fn index_document(&mut self, doc: &Document) {
        // Global position counter across text fields, declaration order.
        let mut position: u32 = 0;
        let mut token_positions: HashMap<String, Vec<u32>> = HashMap::new();

        for def in self.schema.fields() {
            let Some(value) = doc.get_field(&def.name) else {
                continue;
            };
            // Values whose runtime type disagrees with the schema are
            // stored but never indexed.
            if !def.accepts(value) {
                continue;
            }

            if def.field_type == FieldType::Text {
                if let Some(text) = value.as_text() {
                    let tokens = self.tokenizer.tokenize(text);
                    let token_count = tokens.len() as u32;
                    for token in tokens {
                        token_positions
                            .entry(token.text)
                            .or_default()
                            .push(position + token.position);
                    }
                    position += token_count;
                }
            }

            if def.facetable {
                self.facets.insert(&def.name, value.clone(), &doc.id);
            }
            if def.sortable {
                if let Some(n) = value.as_number() {
                    self.numerics.insert(&def.name, n, &doc.id);
                }
            }
        }

        for (token, positions) in token_positions {
            self.trie.insert(&token);
            self.inverted.add_posting(
                &token,
                Posting {
                    doc_id: doc.id.clone(),
                    positions,
                },
            );
        }

        self.store.insert(doc.clone(), position);
    }

    fn unindex_document(&mut self, doc: &Document) {
        // The token set suffices: positions go away with the posting.
        let mut tokens: HashSet<String> = HashSet::new();

        for def in self.schema.fields() {
            let Some(value) = doc.get_field(&def.name) else {
                continue;
            };
            if !def.accepts(value) {
                continue;
            }

            if def.field_type == FieldType::Text {
                if let Some(text) = value.as_text() {
                    tokens.extend(self.tokenizer.tokenize(text).into_iter().map(|t| t.text));
                }
            }
            if def.facetable {
                self.facets.remove(&def.name, value, &doc.id);
            }
            if def.sortable {
                self.numerics.remove(&def.name, &doc.id);
            }
        }

        for token in tokens {
            if self.inverted.remove_posting(&token, &doc.id) {
                self.trie.remove(&token);
            }
        }
    }

    /// Persist the whole engine state as one snapshot file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let image = self.to_image();
        snapshot::write(path, &image)?;
        info!(path = %path.display(), docs = image.doc_count, "snapshot written");
        Ok(())
    }

    /// Restore an engine from a snapshot file. BM25 parameters are not
    /// persisted; they reset to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let image = snapshot::read(path)?;
        let collection = Self::from_image(image)?;
        info!(path = %path.display(), docs = collection.doc_count(), "snapshot loaded");
        Ok(collection)
    }

    fn to_image(&self) -> SnapshotImage {
        let mut documents: Vec<(DocId, Document)> = self
            .store
            .iter()
            .map(|(id, doc)| (id.clone(), doc.clone()))
            .collect();
        documents.sort_by(|a, b| a.0.cmp(&b.0));

        let mut lengths: Vec<(DocId, u32)> = self
            .store
            .lengths()
            .map(|(id, len)| (id.clone(), len))
            .collect();
        lengths.sort_by(|a, b| a.0.cmp(&b.0));

        let mut postings: Vec<(String, Vec<(DocId, Vec<u32>)>)> = self
            .inverted
            .iter()
            .map(|(token, list)| {
                let entries = list
                    .iter()
                    .map(|p| (p.doc_id.clone(), p.positions.clone()))
                    .collect();
                (token.to_string(), entries)
            })
            .collect();
        postings.sort_by(|a, b| a.0.cmp(&b.0));

        let facets = self
            .facets
            .iter()
            .map(|(field, values)| {
                let entries = values
                    .iter()
                    .map(|(value, ids)| (value.clone(), ids.iter().cloned().collect()))
                    .collect();
                (field.clone(), entries)
            })
            .collect();

        let numerics = self
            .numerics
            .iter()
            .map(|(field, entries)| (field.clone(), entries.clone()))
            .collect();

        SnapshotImage {
            schema: self.schema.clone(),
            doc_count: self.store.len() as u64,
            total_doc_length: self.store.total_len(),
            documents,
            lengths,
            postings,
            facets,
            numerics,
        }
    }

    fn from_image(image: SnapshotImage) -> Result<Self> {
        if image.doc_count as usize != image.documents.len()
            || image.documents.len() != image.lengths.len()
        {
            return Err(Error::new(
                ErrorKind::Corrupt,
                "document count disagrees with stored entries".to_string(),
            ));
        }

        let mut collection = Collection::new(image.schema);

        let mut lengths: HashMap<DocId, u32> = image.lengths.into_iter().collect();
        for (id, doc) in image.documents {
            if doc.id != id {
                return Err(Error::new(
                    ErrorKind::Corrupt,
                    format!("document entry '{}' carries id '{}'", id, doc.id),
                ));
            }
            let Some(length) = lengths.remove(&id) else {
                return Err(Error::new(
                    ErrorKind::Corrupt,
                    format!("no length entry for document '{}'", id),
                ));
            };
            collection.store.insert(doc, length);
        }
        if collection.store.total_len() != image.total_doc_length {
            return Err(Error::new(
                ErrorKind::Corrupt,
                "total document length disagrees with length entries".to_string(),
            ));
        }

        // Rebuild the trie from the posting tokens: one insert per token.
        for (token, entries) in image.postings {
            let mut list = PostingList::new();
            for (doc_id, positions) in entries {
                list.add(Posting { doc_id, positions });
            }
            if !list.is_empty() {
                collection.trie.insert(&token);
                collection.inverted.add_list(&token, list);
            }
        }

        for (field, entries) in image.facets {
            for (value, ids) in entries {
                for doc_id in ids {
                    collection.facets.insert(&field, value.clone(), &doc_id);
                }
            }
        }

        for (field, entries) in image.numerics {
            for (value, doc_id) in entries {
                collection.numerics.insert(&field, value, &doc_id);
            }
        }

        Ok(collection)
    }
}
