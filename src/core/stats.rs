use serde::Serialize;

/// Per-collection counters for monitoring endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionStats {
    pub doc_count: usize,
    pub total_doc_length: u64,
    pub avg_doc_length: f64,
    pub vocabulary_size: usize,
    pub facet_field_count: usize,
    pub tokenizer: String,
}
