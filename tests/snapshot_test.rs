//! Snapshot persistence: a save → load round-trip must answer every query
//! exactly like the engine it was taken from.

use std::collections::BTreeMap;

use findex::{
    Collection, FieldDefinition, FieldValue, Filter, NumericRange, Schema, SearchQuery,
    SearchResults,
};
use tempfile::TempDir;

fn catalog_schema() -> Schema {
    Schema::new()
        .with_field(FieldDefinition::text("title"))
        .unwrap()
        .with_field(FieldDefinition::text("body"))
        .unwrap()
        .with_field(FieldDefinition::text("brand").facetable())
        .unwrap()
        .with_field(FieldDefinition::number("price").sortable())
        .unwrap()
        .with_field(FieldDefinition::boolean("in_stock").facetable())
        .unwrap()
}

fn build_catalog() -> Collection {
    let words = [
        "laptop", "phone", "tablet", "camera", "drone", "monitor", "keyboard", "mouse",
        "charger", "adapter", "portable", "wireless", "gaming", "compact", "premium",
    ];
    let brands = ["Acme", "Globex", "Initech", "Umbrella"];

    let mut collection = Collection::new(catalog_schema());
    for i in 0..100 {
        let title = format!(
            "{} {} {}",
            words[i % words.len()],
            words[(i * 7 + 3) % words.len()],
            words[(i * 13 + 5) % words.len()],
        );
        let body = format!(
            "the {} is a {} device for everyday use",
            words[i % words.len()],
            words[(i * 3 + 1) % words.len()],
        );
        let fields = BTreeMap::from([
            ("title".to_string(), FieldValue::Text(title)),
            ("body".to_string(), FieldValue::Text(body)),
            (
                "brand".to_string(),
                FieldValue::Text(brands[i % brands.len()].to_string()),
            ),
            ("price".to_string(), FieldValue::Number((i as f64) * 3.5)),
            ("in_stock".to_string(), FieldValue::Boolean(i % 3 == 0)),
        ]);
        collection.add(fields, Some(format!("doc-{:03}", i))).unwrap();
    }
    collection
}

fn reference_queries() -> Vec<SearchQuery> {
    vec![
        SearchQuery::new("laptop"),
        SearchQuery::new("laptop portable"),
        SearchQuery::new("laptpo").with_tolerance(1),
        SearchQuery::new("wireles").with_tolerance(2),
        SearchQuery::new("\"everyday use\""),
        SearchQuery::new("device").with_limit(50),
        SearchQuery::new("device").with_facets(&["brand", "in_stock"]),
        SearchQuery::new("camera").with_filter(
            "price",
            Filter::range(NumericRange {
                gte: Some(50.0),
                lt: Some(300.0),
                ..NumericRange::default()
            }),
        ),
        SearchQuery::new("").with_filter(
            "price",
            Filter::range(NumericRange {
                lte: Some(35.0),
                ..NumericRange::default()
            }),
        ),
        SearchQuery::new("monitor")
            .with_filter("brand", Filter::term(FieldValue::Text("Acme".into())))
            .with_facets(&["brand"]),
    ]
}

fn assert_equivalent(a: &SearchResults, b: &SearchResults) {
    assert_eq!(a.count, b.count);
    assert_eq!(a.hits.len(), b.hits.len());
    for (left, right) in a.hits.iter().zip(&b.hits) {
        assert_eq!(left.id, right.id);
        assert!(
            (left.score - right.score).abs() < 1e-9,
            "score drift for {}: {} vs {}",
            left.id,
            left.score,
            right.score
        );
        assert_eq!(left.document, right.document);
    }
    assert_eq!(a.facets, b.facets);
}

#[test]
fn round_trip_preserves_every_query_result() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("catalog.index.bin");

    let original = build_catalog();
    original.save(&path).unwrap();
    let restored = Collection::load(&path).unwrap();

    assert_eq!(original.doc_count(), restored.doc_count());
    for query in reference_queries() {
        assert_equivalent(&original.search(&query), &restored.search(&query));
    }
}

#[test]
fn round_trip_survives_mutations_before_save() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("catalog.index.bin");

    let mut original = build_catalog();
    for i in (0..100).step_by(7) {
        assert!(original.delete(&format!("doc-{:03}", i)));
    }
    for i in (1..50).step_by(11) {
        original
            .update(
                &format!("doc-{:03}", i),
                BTreeMap::from([(
                    "title".to_string(),
                    FieldValue::Text(format!("refurbished unit {}", i)),
                )]),
            )
            .unwrap();
    }

    original.save(&path).unwrap();
    let restored = Collection::load(&path).unwrap();

    for query in reference_queries() {
        assert_equivalent(&original.search(&query), &restored.search(&query));
    }
    assert_equivalent(
        &original.search(&SearchQuery::new("refurbished")),
        &restored.search(&SearchQuery::new("refurbished")),
    );
}

#[test]
fn snapshot_bytes_are_deterministic() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("a.index.bin");
    let second = dir.path().join("b.index.bin");

    let collection = build_catalog();
    collection.save(&first).unwrap();
    collection.save(&second).unwrap();

    let bytes_a = std::fs::read(&first).unwrap();
    let bytes_b = std::fs::read(&second).unwrap();
    assert_eq!(bytes_a, bytes_b);
}

#[test]
fn loaded_engine_accepts_further_writes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("catalog.index.bin");

    let original = build_catalog();
    original.save(&path).unwrap();

    let mut restored = Collection::load(&path).unwrap();
    restored
        .add(
            BTreeMap::from([(
                "title".to_string(),
                FieldValue::Text("brand new arrival".into()),
            )]),
            Some("fresh".into()),
        )
        .unwrap();

    let results = restored.search(&SearchQuery::new("arrival"));
    assert_eq!(results.count, 1);
    assert_eq!(restored.doc_count(), 101);
}
