pub mod facet;
pub mod inverted;
pub mod numeric;
pub mod posting;
pub mod store;
pub mod trie;
