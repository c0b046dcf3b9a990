use std::collections::{BTreeMap, BTreeSet};

use crate::core::types::{DocId, FieldValue};

/// Facet index: field → raw value → set of document ids.
///
/// Values are compared as raw pre-tokenization values. Empty value sets and
/// empty field maps are garbage-collected on the last removal.
#[derive(Debug, Default)]
pub struct FacetIndex {
    fields: BTreeMap<String, BTreeMap<FieldValue, BTreeSet<DocId>>>,
}

impl FacetIndex {
    pub fn new() -> Self {
        FacetIndex::default()
    }

    pub fn insert(&mut self, field: &str, value: FieldValue, doc_id: &DocId) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .entry(value)
            .or_default()
            .insert(doc_id.clone());
    }

    pub fn remove(&mut self, field: &str, value: &FieldValue, doc_id: &DocId) {
        let Some(values) = self.fields.get_mut(field) else {
            return;
        };
        if let Some(ids) = values.get_mut(value) {
            ids.remove(doc_id);
            if ids.is_empty() {
                values.remove(value);
            }
        }
        if values.is_empty() {
            self.fields.remove(field);
        }
    }

    /// Documents whose raw value for `field` equals `value`.
    pub fn doc_ids(&self, field: &str, value: &FieldValue) -> Option<&BTreeSet<DocId>> {
        self.fields.get(field)?.get(value)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (&String, &BTreeMap<FieldValue, BTreeSet<DocId>>)> {
        self.fields.iter()
    }
}
