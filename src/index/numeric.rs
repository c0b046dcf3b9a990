use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::core::types::DocId;

/// Bounds of a numeric range filter. All provided bounds must hold at once;
/// a range with no bounds matches nothing and is ignored by the query
/// pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub gte: Option<f64>,
    pub gt: Option<f64>,
    pub lte: Option<f64>,
    pub lt: Option<f64>,
}

impl NumericRange {
    pub fn is_unbounded(&self) -> bool {
        self.gte.is_none() && self.gt.is_none() && self.lte.is_none() && self.lt.is_none()
    }

    fn below_lower(&self, value: f64) -> bool {
        if let Some(gte) = self.gte {
            if value < gte {
                return true;
            }
        }
        if let Some(gt) = self.gt {
            if value <= gt {
                return true;
            }
        }
        false
    }

    fn above_upper(&self, value: f64) -> bool {
        if let Some(lte) = self.lte {
            if value > lte {
                return true;
            }
        }
        if let Some(lt) = self.lt {
            if value >= lt {
                return true;
            }
        }
        false
    }

    pub fn contains(&self, value: f64) -> bool {
        !self.below_lower(value) && !self.above_upper(value)
    }
}

/// Numeric index: sortable field → list of `(value, doc id)` kept sorted
/// ascending by value. Ties keep insertion order.
#[derive(Debug, Default)]
pub struct NumericIndex {
    fields: BTreeMap<String, Vec<(f64, DocId)>>,
}

impl NumericIndex {
    pub fn new() -> Self {
        NumericIndex::default()
    }

    /// Sorted insertion: the new pair lands after every entry with an equal
    /// or smaller value.
    pub fn insert(&mut self, field: &str, value: f64, doc_id: &DocId) {
        let entries = self.fields.entry(field.to_string()).or_default();
        let at = entries
            .partition_point(|(v, _)| v.total_cmp(&value) != std::cmp::Ordering::Greater);
        entries.insert(at, (value, doc_id.clone()));
    }

    /// Remove every entry for `doc_id`. Returns whether anything was removed.
    pub fn remove(&mut self, field: &str, doc_id: &DocId) -> bool {
        let Some(entries) = self.fields.get_mut(field) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|(_, id)| id != doc_id);
        let removed = entries.len() < before;
        if entries.is_empty() {
            self.fields.remove(field);
        }
        removed
    }

    /// Document ids whose value satisfies every bound of `range`. The scan
    /// starts at the first in-bounds entry and stops once the cursor passes
    /// the upper bound.
    pub fn range(&self, field: &str, range: &NumericRange) -> BTreeSet<DocId> {
        let mut out = BTreeSet::new();
        let Some(entries) = self.fields.get(field) else {
            return out;
        };
        let start = entries.partition_point(|(v, _)| range.below_lower(*v));
        for (value, doc_id) in &entries[start..] {
            if range.above_upper(*value) {
                break;
            }
            out.insert(doc_id.clone());
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<(f64, DocId)>)> {
        self.fields.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(set: &BTreeSet<DocId>) -> Vec<&str> {
        set.iter().map(|d| d.as_str()).collect()
    }

    #[test]
    fn insertion_keeps_value_order() {
        let mut index = NumericIndex::new();
        index.insert("price", 30.0, &DocId::new("c"));
        index.insert("price", 10.0, &DocId::new("a"));
        index.insert("price", 20.0, &DocId::new("b"));

        let all = index.range(
            "price",
            &NumericRange {
                gte: Some(f64::MIN),
                ..NumericRange::default()
            },
        );
        assert_eq!(ids(&all), ["a", "b", "c"]);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut index = NumericIndex::new();
        index.insert("price", 10.0, &DocId::new("first"));
        index.insert("price", 10.0, &DocId::new("second"));

        let entries = index.fields.get("price").unwrap();
        assert_eq!(entries[0].1.as_str(), "first");
        assert_eq!(entries[1].1.as_str(), "second");
    }

    #[test]
    fn range_bounds_combine() {
        let mut index = NumericIndex::new();
        for (id, price) in [("a", 10.0), ("b", 20.0), ("c", 30.0), ("d", 40.0)] {
            index.insert("price", price, &DocId::new(id));
        }

        let range = NumericRange {
            gte: Some(15.0),
            lt: Some(40.0),
            ..NumericRange::default()
        };
        assert_eq!(ids(&index.range("price", &range)), ["b", "c"]);

        let exclusive = NumericRange {
            gt: Some(10.0),
            lte: Some(30.0),
            ..NumericRange::default()
        };
        assert_eq!(ids(&index.range("price", &exclusive)), ["b", "c"]);
    }

    #[test]
    fn range_on_unknown_field_is_empty() {
        let index = NumericIndex::new();
        let range = NumericRange {
            gte: Some(0.0),
            ..NumericRange::default()
        };
        assert!(index.range("missing", &range).is_empty());
    }

    #[test]
    fn remove_is_by_doc_identity() {
        let mut index = NumericIndex::new();
        index.insert("price", 10.0, &DocId::new("a"));
        index.insert("price", 10.0, &DocId::new("b"));

        assert!(index.remove("price", &DocId::new("a")));
        assert!(!index.remove("price", &DocId::new("a")));

        let range = NumericRange {
            lte: Some(100.0),
            ..NumericRange::default()
        };
        assert_eq!(ids(&index.range("price", &range)), ["b"]);
    }
}
