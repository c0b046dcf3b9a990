use std::collections::HashMap;

use crate::core::types::{DocId, Document};

/// Document store plus the length table used for BM25 normalization.
///
/// The running total keeps the average document length O(1).
#[derive(Debug, Default)]
pub struct DocumentStore {
    docs: HashMap<DocId, Document>,
    lengths: HashMap<DocId, u32>,
    total_len: u64,
}

impl DocumentStore {
    pub fn new() -> Self {
        DocumentStore::default()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn contains(&self, doc_id: &DocId) -> bool {
        self.docs.contains_key(doc_id)
    }

    pub fn get(&self, doc_id: &DocId) -> Option<&Document> {
        self.docs.get(doc_id)
    }

    pub fn length(&self, doc_id: &DocId) -> Option<u32> {
        self.lengths.get(doc_id).copied()
    }

    pub fn total_len(&self) -> u64 {
        self.total_len
    }

    pub fn avg_len(&self) -> f64 {
        if self.docs.is_empty() {
            0.0
        } else {
            self.total_len as f64 / self.docs.len() as f64
        }
    }

    pub fn insert(&mut self, doc: Document, length: u32) {
        self.lengths.insert(doc.id.clone(), length);
        self.total_len += length as u64;
        self.docs.insert(doc.id.clone(), doc);
    }

    pub fn remove(&mut self, doc_id: &DocId) -> Option<Document> {
        let doc = self.docs.remove(doc_id)?;
        if let Some(length) = self.lengths.remove(doc_id) {
            self.total_len -= length as u64;
        }
        Some(doc)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DocId, &Document)> {
        self.docs.iter()
    }

    pub fn lengths(&self) -> impl Iterator<Item = (&DocId, u32)> {
        self.lengths.iter().map(|(id, len)| (id, *len))
    }
}
