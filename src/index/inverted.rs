use std::collections::HashMap;

use crate::core::types::DocId;
use crate::index::posting::{Posting, PostingList};

/// Positional inverted index: token → document → ascending position list.
///
/// Entries are created on first use; the caller is told when a token's last
/// posting disappears so the vocabulary trie can be pruned in lockstep.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    postings: HashMap<String, PostingList>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        InvertedIndex::default()
    }

    /// Number of distinct live tokens.
    pub fn token_count(&self) -> usize {
        self.postings.len()
    }

    pub fn contains_token(&self, token: &str) -> bool {
        self.postings.contains_key(token)
    }

    pub fn postings(&self, token: &str) -> Option<&PostingList> {
        self.postings.get(token)
    }

    pub fn add_posting(&mut self, token: &str, posting: Posting) {
        self.postings
            .entry(token.to_string())
            .or_default()
            .add(posting);
    }

    /// Install a prebuilt posting list for a token (snapshot restore path).
    /// Empty lists are discarded to keep the no-empty-entries invariant.
    pub fn add_list(&mut self, token: &str, list: PostingList) {
        if !list.is_empty() {
            self.postings.insert(token.to_string(), list);
        }
    }

    /// Remove one document from a token's posting list. Returns `true` when
    /// that was the last posting and the token entry itself was dropped.
    pub fn remove_posting(&mut self, token: &str, doc_id: &DocId) -> bool {
        let Some(list) = self.postings.get_mut(token) else {
            return false;
        };
        list.remove(doc_id);
        if list.is_empty() {
            self.postings.remove(token);
            return true;
        }
        false
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.postings.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PostingList)> {
        self.postings.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(id: &str, positions: &[u32]) -> Posting {
        Posting {
            doc_id: DocId::new(id),
            positions: positions.to_vec(),
        }
    }

    #[test]
    fn entry_created_on_first_use() {
        let mut index = InvertedIndex::new();
        assert!(!index.contains_token("rust"));
        index.add_posting("rust", posting("a", &[0]));
        assert!(index.contains_token("rust"));
        assert_eq!(index.postings("rust").unwrap().doc_freq(), 1);
    }

    #[test]
    fn last_removal_drops_the_entry() {
        let mut index = InvertedIndex::new();
        index.add_posting("rust", posting("a", &[0]));
        index.add_posting("rust", posting("b", &[4]));

        assert!(!index.remove_posting("rust", &DocId::new("a")));
        assert!(index.remove_posting("rust", &DocId::new("b")));
        assert!(!index.contains_token("rust"));
        assert_eq!(index.token_count(), 0);
    }

    #[test]
    fn removing_from_unknown_token_is_a_noop() {
        let mut index = InvertedIndex::new();
        assert!(!index.remove_posting("ghost", &DocId::new("a")));
    }
}
