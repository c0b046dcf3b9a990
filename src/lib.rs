//! findex: a multi-collection full-text search engine.
//!
//! Each [`Collection`] is an independent engine built from a fixed [`Schema`].
//! Text fields are tokenized into a positional inverted index backed by a
//! vocabulary trie (typo-tolerant lookup), facetable fields feed a facet
//! index and sortable numeric fields feed a value-sorted numeric index.
//! Queries run a filter → score → facet-count → paginate pipeline with BM25
//! ranking, fuzzy term expansion and phrase-proximity verification. The whole
//! engine state round-trips through a single snapshot file, and a [`Registry`]
//! owns a directory of named collections with save-on-write persistence.

pub mod core;
pub mod schema;
pub mod analysis;
pub mod index;
pub mod scoring;
pub mod search;
pub mod storage;
pub mod registry;

pub use crate::core::collection::Collection;
pub use crate::core::config::Config;
pub use crate::core::error::{Error, ErrorKind, Result};
pub use crate::core::stats::CollectionStats;
pub use crate::core::types::{DocId, Document, FieldValue};
pub use crate::index::numeric::NumericRange;
pub use crate::registry::{Registry, RegistryStats};
pub use crate::schema::schema::{FieldDefinition, FieldType, Schema};
pub use crate::search::query::{Filter, SearchQuery};
pub use crate::search::results::{Hit, SearchResults};
