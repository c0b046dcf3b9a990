use std::collections::BTreeMap;

use serde::de::{Deserialize, Deserializer};

use crate::core::types::FieldValue;
use crate::index::numeric::NumericRange;

/// Per-field filter: exact-equality membership or a numeric range.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Term(FieldValue),
    Range(NumericRange),
}

impl Filter {
    pub fn term(value: FieldValue) -> Self {
        Filter::Term(value)
    }

    pub fn range(range: NumericRange) -> Self {
        Filter::Range(range)
    }
}

// JSON objects become ranges, keeping only the recognized bound keys; every
// scalar becomes a term filter. An object without recognized bounds parses
// as an unbounded range, which the filter stage ignores.
impl<'de> Deserialize<'de> for Filter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        match &value {
            serde_json::Value::Object(map) => {
                let mut range = NumericRange::default();
                for (key, bound) in map {
                    let Some(number) = bound.as_f64() else {
                        continue;
                    };
                    match key.as_str() {
                        "gte" => range.gte = Some(number),
                        "gt" => range.gt = Some(number),
                        "lte" => range.lte = Some(number),
                        "lt" => range.lt = Some(number),
                        _ => {}
                    }
                }
                Ok(Filter::Range(range))
            }
            other => FieldValue::from_json(other)
                .map(Filter::Term)
                .ok_or_else(|| serde::de::Error::custom("unsupported filter value")),
        }
    }
}

/// A search request against one collection.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    /// Query text. Wrapping in double quotes switches to phrase matching.
    pub q: String,
    /// Maximum edit distance for fuzzy term expansion; 0 disables it.
    pub tolerance: usize,
    /// Page size for the returned hits.
    pub limit: usize,
    /// Facetable fields to count over the scored result set.
    pub facets: Vec<String>,
    /// Per-field filters applied before scoring.
    pub filters: BTreeMap<String, Filter>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        SearchQuery {
            q: String::new(),
            tolerance: 0,
            limit: 10,
            facets: Vec::new(),
            filters: BTreeMap::new(),
        }
    }
}

impl SearchQuery {
    pub fn new(q: impl Into<String>) -> Self {
        SearchQuery {
            q: q.into(),
            ..SearchQuery::default()
        }
    }

    pub fn with_tolerance(mut self, tolerance: usize) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_facets(mut self, facets: &[&str]) -> Self {
        self.facets = facets.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_filter(mut self, field: &str, filter: Filter) -> Self {
        self.filters.insert(field.to_string(), filter);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_term_and_range_filters() {
        let query: SearchQuery = serde_json::from_value(serde_json::json!({
            "q": "laptop",
            "tolerance": 1,
            "filters": {
                "brand": "Apple",
                "price": {"gte": 100, "lt": 500},
            },
            "facets": ["brand"],
        }))
        .unwrap();

        assert_eq!(query.q, "laptop");
        assert_eq!(query.limit, 10);
        assert_eq!(
            query.filters["brand"],
            Filter::Term(FieldValue::Text("Apple".into()))
        );
        assert_eq!(
            query.filters["price"],
            Filter::Range(NumericRange {
                gte: Some(100.0),
                lt: Some(500.0),
                ..NumericRange::default()
            })
        );
    }

    #[test]
    fn object_without_bounds_parses_as_unbounded_range() {
        let filter: Filter =
            serde_json::from_value(serde_json::json!({"around": 10})).unwrap();
        match filter {
            Filter::Range(range) => assert!(range.is_unbounded()),
            Filter::Term(_) => panic!("expected a range"),
        }
    }
}
