//! Composition chart as a custom renderer

use serde_json::Value;

use crate::composition::{CompositionItem, Palette, compute_composition};
use crate::model::ParsedProperty;
use crate::parser::identifier_label;
use crate::render::{CustomContent, CustomRenderer};

/// Renders a list of records (for example material shares) as a composition chart
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionRenderer {
    pub palette: Palette,
    pub compact: bool,
    /// Fields tried for an item's name.
    pub name_fields: Vec<String>,
    /// Fields tried, in order, for an item's numeric share.
    pub value_fields: Vec<String>,
    /// Field holding the list when the value is a content wrapper.
    pub content_field: String,
}

const NAME_FIELDS: &[&str] = &["name", "id", "type", "key", "title", "label"];
const VALUE_FIELDS: &[&str] = &["value", "concentration", "percentage", "weight", "amount"];

impl Default for CompositionRenderer {
    fn default() -> Self {
        let strings =
            |values: &[&str]| -> Vec<String> { values.iter().map(|s| s.to_string()).collect() };
        Self {
            palette: Palette::default(),
            compact: false,
            name_fields: strings(NAME_FIELDS),
            value_fields: strings(VALUE_FIELDS),
            content_field: "content".to_string(),
        }
    }
}

impl CompositionRenderer {
    pub fn new(palette: Palette, compact: bool) -> Self {
        Self {
            palette,
            compact,
            ..Self::default()
        }
    }

    /// Chart items from a property value. Records without a numeric share are skipped.
    pub fn items(&self, value: &Value) -> Vec<CompositionItem> {
        let entries = match value {
            Value::Array(entries) => entries,
            Value::Object(record) => match record.get(&self.content_field) {
                Some(Value::Array(entries)) => entries,
                _ => return Vec::new(),
            },
            _ => return Vec::new(),
        };

        entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let share = self
                    .value_fields
                    .iter()
                    .find_map(|field| numeric(entry.get(field)?))?;
                let name = identifier_label(entry, &self.name_fields)
                    .unwrap_or_else(|| format!("Item {}", index + 1));
                Some(CompositionItem::new(name, share))
            })
            .collect()
    }
}

impl CustomRenderer for CompositionRenderer {
    fn render(&self, property: &ParsedProperty, _data: &Value) -> CustomContent {
        let items = self.items(&property.value);
        CustomContent::Composition(compute_composition(&items, self.compact, &self.palette))
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_items_from_records() {
        let renderer = CompositionRenderer::default();
        let items = renderer.items(&json!([
            {"name": "Steel", "value": 60},
            {"id": {"name": "Copper"}, "concentration": "30 %"},
            {"unit": "kg"},
            {"percentage": 10.0}
        ]));
        assert_eq!(
            items,
            vec![
                CompositionItem::new("Steel", 60.0),
                CompositionItem::new("Copper", 30.0),
                CompositionItem::new("Item 4", 10.0),
            ]
        );
    }

    #[test]
    fn test_items_from_content_wrapper() {
        let renderer = CompositionRenderer::default();
        let items = renderer.items(&json!({
            "applicable": true,
            "content": [{"name": "Lithium", "weight": 2}]
        }));
        assert_eq!(items, vec![CompositionItem::new("Lithium", 2.0)]);
        assert!(renderer.items(&json!("scalar")).is_empty());
        assert!(renderer.items(&json!({"content": 1})).is_empty());
    }

    #[test]
    fn test_render_composition() {
        let renderer = CompositionRenderer::new(Palette::default(), true);
        let property = ParsedProperty::inferred(
            "materialComposition",
            json!([
                {"name": "a", "value": 10},
                {"name": "b", "value": 20},
                {"name": "c", "value": 30},
                {"name": "d", "value": 40}
            ]),
        );
        match renderer.render(&property, &Value::Null) {
            CustomContent::Composition(composition) => {
                assert_eq!(composition.total, 100.0);
                assert_eq!(composition.slices.len(), 3);
                assert_eq!(composition.remainder, 1);
                assert_eq!(composition.slices[0].item.name, "d");
            }
            other => panic!("Expected Composition, got: {other:?}"),
        }
    }
}
