use serde::{Deserialize, Serialize};

use crate::core::types::DocId;

/// One document's occurrences of a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    /// Document-global token positions, strictly ascending.
    pub positions: Vec<u32>,
}

impl Posting {
    pub fn term_freq(&self) -> u32 {
        self.positions.len() as u32
    }
}

/// Posting list for a token.
/// Note: Sorted by doc_id for efficient intersection and lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostingList {
    pub postings: Vec<Posting>,
}

impl PostingList {
    pub fn new() -> Self {
        PostingList::default()
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Number of documents containing the token.
    pub fn doc_freq(&self) -> u32 {
        self.postings.len() as u32
    }

    pub fn add(&mut self, posting: Posting) {
        match self
            .postings
            .binary_search_by(|p| p.doc_id.cmp(&posting.doc_id))
        {
            Ok(pos) => self.postings[pos] = posting,
            Err(pos) => self.postings.insert(pos, posting),
        }
    }

    pub fn remove(&mut self, doc_id: &DocId) -> bool {
        match self.postings.binary_search_by(|p| p.doc_id.cmp(doc_id)) {
            Ok(pos) => {
                self.postings.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    pub fn get(&self, doc_id: &DocId) -> Option<&Posting> {
        self.postings
            .binary_search_by(|p| p.doc_id.cmp(doc_id))
            .ok()
            .map(|pos| &self.postings[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Posting> {
        self.postings.iter()
    }

    pub fn doc_ids(&self) -> impl Iterator<Item = &DocId> {
        self.postings.iter().map(|p| &p.doc_id)
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
    fn add_keeps_doc_id_order() {
        let mut list = PostingList::new();
        list.add(posting("b", &[0]));
        list.add(posting("a", &[3]));
        list.add(posting("c", &[1]));

        let ids: Vec<_> = list.doc_ids().map(|d| d.as_str().to_string()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn add_replaces_existing_document() {
        let mut list = PostingList::new();
        list.add(posting("a", &[0]));
        list.add(posting("a", &[2, 5]));
        assert_eq!(list.doc_freq(), 1);
        assert_eq!(list.get(&DocId::new("a")).unwrap().positions, [2, 5]);
    }

    #[test]
    fn remove_reports_membership() {
        let mut list = PostingList::new();
        list.add(posting("a", &[0]));
        assert!(list.remove(&DocId::new("a")));
        assert!(!list.remove(&DocId::new("a")));
        assert!(list.is_empty());
    }
}
