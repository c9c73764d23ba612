use dpp_view::{
    COMPACT_LIMIT, CompositionItem, JsonSchema, Palette, ParsedProperty, compute_composition,
    generate_tabs, parse_schema,
};
use proptest::prelude::*;
use serde_json::{Map, Value};

fn item() -> impl Strategy<Value = CompositionItem> {
    ("[a-z]{1,8}", 0.0f64..1_000_000.0).prop_map(|(name, value)| CompositionItem::new(name, value))
}

fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        (-1e6f64..1e6).prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::String),
    ]
}

/// Arbitrary payload whose keys overlap the fixture schema's.
fn json_value() -> impl Strategy<Value = Value> {
    let key = prop_oneof![
        Just("metadata".to_string()),
        Just("identification".to_string()),
        Just("type".to_string()),
        Just("content".to_string()),
        Just("children".to_string()),
        Just("label".to_string()),
        Just("materials".to_string()),
        Just("materialComposition".to_string()),
        Just("additionalData".to_string()),
        "[a-z]{1,6}",
    ]
    .boxed();
    json_leaf().prop_recursive(4, 48, 6, move |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            proptest::collection::vec((key.clone(), inner), 0..6)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

fn assert_pruned(property: &ParsedProperty) -> Result<(), TestCaseError> {
    prop_assert!(!property.value.is_null(), "null value at {}", property.key);
    for child in &property.children {
        assert_pruned(child)?;
    }
    Ok(())
}

proptest! {
    /// Shares of a positive total always add up to 100%.
    #[test]
    fn percentages_sum_to_hundred(items in proptest::collection::vec(item(), 1..20)) {
        let composition = compute_composition(&items, false, &Palette::default());
        prop_assume!(composition.total > 0.0);
        let sum: f64 = composition.slices.iter().map(|s| s.percentage).sum();
        prop_assert!((sum - 100.0).abs() < 1e-6, "sum was {}", sum);

        let last = composition.slices.last().map_or(0.0, |s| s.arc_end);
        prop_assert!((last - 360.0).abs() < 1e-6);
    }

    /// Slices are ordered by descending share and arcs are contiguous.
    #[test]
    fn slices_are_sorted_and_contiguous(items in proptest::collection::vec(item(), 0..20)) {
        let composition = compute_composition(&items, false, &Palette::default());
        prop_assert_eq!(composition.slices.len(), items.len());
        for pair in composition.slices.windows(2) {
            prop_assert!(pair[0].percentage >= pair[1].percentage);
            prop_assert_eq!(pair[0].arc_end, pair[1].arc_start);
        }
    }

    /// Compact mode lists the top slices and counts the rest.
    #[test]
    fn compact_truncates(items in proptest::collection::vec(item(), 0..20)) {
        let composition = compute_composition(&items, true, &Palette::default());
        prop_assert_eq!(composition.slices.len(), items.len().min(COMPACT_LIMIT));
        prop_assert_eq!(composition.remainder, items.len().saturating_sub(COMPACT_LIMIT));
    }

    /// No parsed property ever carries a null value.
    #[test]
    fn parsed_trees_are_pruned(data in json_value()) {
        let schema: JsonSchema = include_str!("fixtures/passport.schema.json")
            .parse()
            .expect("fixture schema is valid JSON");
        for property in parse_schema(&schema, &data) {
            assert_pruned(&property)?;
        }
        for tab in generate_tabs(&schema, &data) {
            prop_assert!(!tab.properties.is_empty());
            for property in &tab.properties {
                assert_pruned(property)?;
            }
        }
    }

    /// Any JSON document lowers to a schema that parses without panicking.
    #[test]
    fn arbitrary_schemas_are_tolerated(schema in json_value(), data in json_value()) {
        let schema = JsonSchema::from_value(&schema);
        let first = parse_schema(&schema, &data);
        prop_assert_eq!(first, parse_schema(&schema, &data));
    }
}
