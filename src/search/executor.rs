use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Instant;

use tracing::debug;

use crate::analysis::token::Token;
use crate::analysis::tokenizer::Tokenizer;
use crate::core::types::DocId;
use crate::index::facet::FacetIndex;
use crate::index::inverted::InvertedIndex;
use crate::index::numeric::NumericIndex;
use crate::index::store::DocumentStore;
use crate::index::trie::{FuzzyMatch, Trie};
use crate::schema::schema::Schema;
use crate::scoring::scorer::Scorer;
use crate::search::query::{Filter, SearchQuery};
use crate::search::results::{Hit, SearchResults};

/// Score multiplier for verified phrase matches.
const PHRASE_BONUS: f64 = 1.5;

/// Borrowed view over one collection's indexes, executing the
/// filter → score → facet-count → paginate pipeline.
pub struct QueryExecutor<'a> {
    pub schema: &'a Schema,
    pub store: &'a DocumentStore,
    pub inverted: &'a InvertedIndex,
    pub trie: &'a Trie,
    pub facets: &'a FacetIndex,
    pub numerics: &'a NumericIndex,
    pub scorer: &'a dyn Scorer,
    pub tokenizer: &'a dyn Tokenizer,
}

impl QueryExecutor<'_> {
    pub fn execute(&self, query: &SearchQuery) -> SearchResults {
        let start = Instant::now();

        // Stage 1: filters. `None` is the unrestricted sentinel.
        let allowed = match self.filter_stage(&query.filters) {
            Ok(allowed) => allowed,
            // A filter intersection came up empty: nothing can match.
            Err(()) => return SearchResults::empty(elapsed_ms(start)),
        };

        // Stage 2: scoring, three disjoint branches by query text.
        let scores = if is_phrase(&query.q) {
            self.score_phrase(&query.q, &allowed)
        } else if !query.q.is_empty() {
            self.score_terms(&query.q, query.tolerance, &allowed)
        } else {
            match &allowed {
                // Filter-only query: every allowed document, uniform score.
                Some(ids) => ids.iter().map(|id| (id.clone(), 1.0)).collect(),
                // Empty query with no filters never matches everything.
                None => HashMap::new(),
            }
        };

        let mut ranked: Vec<(DocId, f64)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        // Stage 3: facet counts over the full scored set.
        let facets = if query.facets.is_empty() {
            None
        } else {
            Some(self.facet_stage(&query.facets, &ranked))
        };

        let count = ranked.len();
        let hits = ranked
            .into_iter()
            .take(query.limit)
            .filter_map(|(id, score)| {
                self.store.get(&id).map(|doc| Hit {
                    id,
                    score,
                    document: doc.clone(),
                })
            })
            .collect();

        debug!(q = %query.q, count, "query executed");
        SearchResults {
            hits,
            count,
            facets,
            elapsed_ms: elapsed_ms(start),
        }
    }

    /// Intersect the per-field filter sets. `Ok(None)` means unrestricted;
    /// `Err(())` signals a provably empty result.
    fn filter_stage(
        &self,
        filters: &BTreeMap<String, Filter>,
    ) -> Result<Option<BTreeSet<DocId>>, ()> {
        let mut allowed: Option<BTreeSet<DocId>> = None;

        for (field, filter) in filters {
            // Fields outside the schema are ignored.
            if self.schema.get(field).is_none() {
                continue;
            }

            let set = match filter {
                // A range object without recognized bounds is ignored.
                Filter::Range(range) if range.is_unbounded() => continue,
                Filter::Range(range) => self.numerics.range(field, range),
                Filter::Term(value) => self
                    .facets
                    .doc_ids(field, value)
                    .cloned()
                    .unwrap_or_default(),
            };

            allowed = Some(match allowed {
                None => set,
                Some(prev) => prev.intersection(&set).cloned().collect(),
            });
            if allowed.as_ref().is_some_and(|ids| ids.is_empty()) {
                return Err(());
            }
        }

        Ok(allowed)
    }

    fn score_terms(
        &self,
        q: &str,
        tolerance: usize,
        allowed: &Option<BTreeSet<DocId>>,
    ) -> HashMap<DocId, f64> {
        let mut scores: HashMap<DocId, f64> = HashMap::new();
        let total_docs = self.store.len();
        let avg_len = self.store.avg_len();

        for query_token in self.tokenizer.tokenize(q) {
            let query_len = query_token.text.chars().count();

            for matched in self.matching_tokens(&query_token.text, tolerance) {
                let Some(list) = self.inverted.postings(&matched.token) else {
                    continue;
                };
                let idf = self.scorer.idf(total_docs, list.doc_freq());
                let penalty = if matched.distance == 0 {
                    1.0
                } else {
                    1.0 - matched.distance as f64 / query_len as f64
                };

                for posting in list.iter() {
                    if !is_allowed(allowed, &posting.doc_id) {
                        continue;
                    }
                    let Some(doc_len) = self.store.length(&posting.doc_id) else {
                        continue;
                    };
                    let contribution =
                        self.scorer.score(idf, posting.term_freq(), doc_len, avg_len) * penalty;
                    *scores.entry(posting.doc_id.clone()).or_insert(0.0) += contribution;
                }
            }
        }

        scores
    }

    /// Index tokens matching one query token. An exact vocabulary hit
    /// preempts fuzzy expansion regardless of tolerance.
    fn matching_tokens(&self, token: &str, tolerance: usize) -> Vec<FuzzyMatch> {
        if self.inverted.contains_token(token) {
            return vec![FuzzyMatch {
                token: token.to_string(),
                distance: 0,
            }];
        }
        if tolerance > 0 {
            self.trie.search_fuzzy(token, tolerance)
        } else {
            Vec::new()
        }
    }

    fn score_phrase(&self, q: &str, allowed: &Option<BTreeSet<DocId>>) -> HashMap<DocId, f64> {
        let inner = &q[1..q.len() - 1];
        let tokens = self.tokenizer.tokenize(inner);
        let mut scores = HashMap::new();
        if tokens.is_empty() {
            return scores;
        }

        // Candidate set: documents containing every phrase token.
        let mut candidates: Option<BTreeSet<DocId>> = None;
        for token in &tokens {
            let Some(list) = self.inverted.postings(&token.text) else {
                return scores;
            };
            let ids: BTreeSet<DocId> = list.doc_ids().cloned().collect();
            candidates = Some(match candidates {
                None => ids,
                Some(prev) => prev.intersection(&ids).cloned().collect(),
            });
        }

        let total_docs = self.store.len();
        let avg_len = self.store.avg_len();

        for doc_id in candidates.unwrap_or_default() {
            if !is_allowed(allowed, &doc_id) {
                continue;
            }
            if !self.phrase_matches(&tokens, &doc_id) {
                continue;
            }
            let Some(doc_len) = self.store.length(&doc_id) else {
                continue;
            };

            let mut score = 0.0;
            for token in &tokens {
                let Some(list) = self.inverted.postings(&token.text) else {
                    continue;
                };
                let Some(posting) = list.get(&doc_id) else {
                    continue;
                };
                let idf = self.scorer.idf(total_docs, list.doc_freq());
                score += self.scorer.score(idf, posting.term_freq(), doc_len, avg_len);
            }
            scores.insert(doc_id, score * PHRASE_BONUS);
        }

        scores
    }

    /// True when the phrase tokens occur at strictly consecutive positions
    /// in the document, in the given order.
    fn phrase_matches(&self, tokens: &[Token], doc_id: &DocId) -> bool {
        let mut position_lists = Vec::with_capacity(tokens.len());
        for token in tokens {
            let Some(positions) = self
                .inverted
                .postings(&token.text)
                .and_then(|list| list.get(doc_id))
                .map(|posting| &posting.positions)
            else {
                return false;
            };
            position_lists.push(positions);
        }

        position_lists[0].iter().any(|&start| {
            position_lists[1..]
                .iter()
                .enumerate()
                .all(|(offset, positions)| {
                    positions.binary_search(&(start + offset as u32 + 1)).is_ok()
                })
        })
    }

    fn facet_stage(
        &self,
        fields: &[String],
        ranked: &[(DocId, f64)],
    ) -> BTreeMap<String, BTreeMap<String, usize>> {
        let mut out = BTreeMap::new();
        for field in fields {
            // Requested fields with no facet entries are silently skipped.
            if !self.facets.contains_field(field) {
                continue;
            }
            let mut counts: BTreeMap<String, usize> = BTreeMap::new();
            for (doc_id, _) in ranked {
                let Some(value) = self
                    .store
                    .get(doc_id)
                    .and_then(|doc| doc.get_field(field))
                else {
                    continue;
                };
                *counts.entry(value.to_string()).or_insert(0) += 1;
            }
            out.insert(field.clone(), counts);
        }
        out
    }
}

/// Phrase queries are quoted and longer than the bare quote pair.
fn is_phrase(q: &str) -> bool {
    q.len() > 2 && q.starts_with('"') && q.ends_with('"')
}

fn is_allowed(allowed: &Option<BTreeSet<DocId>>, doc_id: &DocId) -> bool {
    match allowed {
        None => true,
        Some(ids) => ids.contains(doc_id),
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
