use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::types::{DocId, Document};

/// Search results container
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub hits: Vec<Hit>,
    /// Size of the full scored set, not just the returned page.
    pub count: usize,
    /// Facet value counts over the scored set, when facets were requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facets: Option<BTreeMap<String, BTreeMap<String, usize>>>,
    pub elapsed_ms: u64,
}

/// Document with relevance score
#[derive(Debug, Clone, Serialize)]
pub struct Hit {
    pub id: DocId,
    pub score: f64,
    pub document: Document,
}

impl SearchResults {
    pub fn empty(elapsed_ms: u64) -> Self {
        SearchResults {
            hits: Vec::new(),
            count: 0,
            facets: None,
            elapsed_ms,
        }
    }
}
