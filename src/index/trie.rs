use std::collections::BTreeMap;

/// A token matched by fuzzy search, with its edit distance from the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyMatch {
    pub token: String,
    pub distance: usize,
}

#[derive(Debug, Default)]
struct TrieNode {
    children: BTreeMap<char, TrieNode>,
    terminal: bool,
}

/// Vocabulary trie over the live token set of the inverted index.
///
/// Fuzzy lookup walks the tree depth-first, carrying one Levenshtein DP row
/// per node; a subtree is abandoned as soon as its row minimum exceeds the
/// distance bound. Enumeration order is tree order and not part of the
/// contract.
#[derive(Debug, Default)]
pub struct Trie {
    root: TrieNode,
    len: usize,
}

impl Trie {
    pub fn new() -> Self {
        Trie::default()
    }

    /// Number of live tokens.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Idempotent insert; marks the final node terminal.
    pub fn insert(&mut self, token: &str) {
        let mut node = &mut self.root;
        for c in token.chars() {
            node = node.children.entry(c).or_default();
        }
        if !node.terminal {
            node.terminal = true;
            self.len += 1;
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        let mut node = &self.root;
        for c in token.chars() {
            match node.children.get(&c) {
                Some(child) => node = child,
                None => return false,
            }
        }
        node.terminal
    }

    /// Clears the token's terminal mark and prunes every node on its path
    /// that is neither terminal nor branching, walking back to the root.
    /// Returns whether the token was present.
    pub fn remove(&mut self, token: &str) -> bool {
        let chars: Vec<char> = token.chars().collect();
        let removed = Self::remove_at(&mut self.root, &chars, 0);
        if removed {
            self.len -= 1;
        }
        removed
    }

    fn remove_at(node: &mut TrieNode, chars: &[char], depth: usize) -> bool {
        if depth == chars.len() {
            if !node.terminal {
                return false;
            }
            node.terminal = false;
            return true;
        }

        let c = chars[depth];
        let Some(child) = node.children.get_mut(&c) else {
            return false;
        };
        let removed = Self::remove_at(child, chars, depth + 1);
        if removed && !child.terminal && child.children.is_empty() {
            node.children.remove(&c);
        }
        removed
    }

    /// All terminal tokens within `max_distance` edits of `query`.
    pub fn search_fuzzy(&self, query: &str, max_distance: usize) -> Vec<FuzzyMatch> {
        let query_chars: Vec<char> = query.chars().collect();
        let mut results = Vec::new();
        let mut prefix = String::new();
        // Row i of the DP table for the empty prefix: pure insertion cost.
        let first_row: Vec<usize> = (0..=query_chars.len()).collect();

        for (&edge, child) in &self.root.children {
            Self::descend(
                child,
                edge,
                &query_chars,
                &first_row,
                max_distance,
                &mut prefix,
                &mut results,
            );
        }
        results
    }

    fn descend(
        node: &TrieNode,
        edge: char,
        query: &[char],
        prev_row: &[usize],
        max_distance: usize,
        prefix: &mut String,
        results: &mut Vec<FuzzyMatch>,
    ) {
        prefix.push(edge);

        // Next DP row from the parent row and the single edge character.
        let mut row = Vec::with_capacity(query.len() + 1);
        row.push(prev_row[0] + 1);
        for j in 1..=query.len() {
            let cost = if query[j - 1] == edge { 0 } else { 1 };
            let value = (row[j - 1] + 1)
                .min(prev_row[j] + 1)
                .min(prev_row[j - 1] + cost);
            row.push(value);
        }

        let distance = row[query.len()];
        if node.terminal && distance <= max_distance {
            results.push(FuzzyMatch {
                token: prefix.clone(),
                distance,
            });
        }

        // The row minimum is a lower bound for every token below this node.
        if row.iter().min().copied().unwrap_or(usize::MAX) <= max_distance {
            for (&next_edge, child) in &node.children {
                Self::descend(child, next_edge, query, &row, max_distance, prefix, results);
            }
        }

        prefix.pop();
    }
}
