//! Display decisions for parsed properties
//!
//! [`Renderer`] walks a parsed property tree depth-first and decides, per
//! node and in this order:
//!
//! 1. a registered [`CustomRenderer`] for the key takes over,
//! 2. numeric metric-like properties with a known maximum become progress metrics,
//! 3. properties with children become expandable groups,
//! 4. everything else is a labeled value card.
//!
//! Expand/collapse state is passed in as an [`ExpandState`], so rendering
//! is a pure function of the tree and that state.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::trace;

use crate::composition::Composition;
use crate::config::RenderConfig;
use crate::format::format_value;
use crate::model::{ParsedProperty, PropertyType};

/// Path of keys from the rendered root, joined by `/`.
pub type NodeId = String;

fn child_id(parent: &str, key: &str) -> NodeId {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}/{key}")
    }
}

/// Caller-owned expand/collapse state
///
/// Groups at depth 0 start expanded and deeper groups start collapsed,
/// unless overridden.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandState {
    overrides: HashMap<NodeId, bool>,
}

impl ExpandState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, id: &str, depth: usize) -> bool {
        self.overrides.get(id).copied().unwrap_or(depth == 0)
    }

    pub fn set(&mut self, id: impl Into<NodeId>, expanded: bool) {
        self.overrides.insert(id.into(), expanded);
    }

    /// Flip a node and return its new state.
    pub fn toggle(&mut self, id: &str, depth: usize) -> bool {
        let expanded = !self.is_expanded(id, depth);
        self.set(id, expanded);
        expanded
    }

    /// Forget all overrides.
    pub fn reset(&mut self) {
        self.overrides.clear();
    }
}

/// Output of a custom renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum CustomContent {
    Composition(Composition),
    Text(String),
    Value(Value),
}

/// Renders a property in place of the standard dispatch
pub trait CustomRenderer: Send + Sync {
    /// `data` is the full passport payload.
    fn render(&self, property: &ParsedProperty, data: &Value) -> CustomContent;
}

impl<F> CustomRenderer for F
where
    F: Fn(&ParsedProperty, &Value) -> CustomContent + Send + Sync,
{
    fn render(&self, property: &ParsedProperty, data: &Value) -> CustomContent {
        self(property, data)
    }
}

/// Custom renderers keyed by property key
#[derive(Default)]
pub struct CustomRenderers {
    entries: IndexMap<String, Box<dyn CustomRenderer>>,
}

impl std::fmt::Debug for CustomRenderers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

impl CustomRenderers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        key: impl Into<String>,
        renderer: impl CustomRenderer + 'static,
    ) -> &mut Self {
        self.entries.insert(key.into(), Box::new(renderer));
        self
    }

    /// Exact key first, then a case-insensitive match.
    pub fn lookup(&self, key: &str) -> Option<(&str, &dyn CustomRenderer)> {
        self.entries
            .get_key_value(key)
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(key))
            })
            .map(|(name, renderer)| (name.as_str(), renderer.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Tier {
    Normal,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalarCard {
    pub id: NodeId,
    pub key: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_id: Option<String>,
    pub required: bool,
    #[serde(rename = "valueType")]
    pub ty: PropertyType,
    pub value: Value,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressMetric {
    pub id: NodeId,
    pub key: String,
    pub label: String,
    pub value: f64,
    pub max: f64,
    /// `min(value / max, 1) * 100`
    pub percentage: f64,
    pub unit: String,
    pub tier: Tier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupLayout {
    /// All children are leaves, shown as a flat card grid.
    Grid,
    Nested,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupNode {
    pub id: NodeId,
    pub key: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_id: Option<String>,
    pub depth: usize,
    pub expanded: bool,
    pub layout: GroupLayout,
    pub child_count: usize,
    /// Empty while collapsed.
    pub children: Vec<RenderNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomNode {
    pub id: NodeId,
    pub key: String,
    pub label: String,
    /// Registry key of the renderer that produced this node.
    pub renderer: String,
    pub content: CustomContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RenderNode {
    Scalar(ScalarCard),
    Progress(ProgressMetric),
    Group(GroupNode),
    Custom(CustomNode),
}

impl RenderNode {
    pub fn id(&self) -> &str {
        match self {
            RenderNode::Scalar(card) => &card.id,
            RenderNode::Progress(metric) => &metric.id,
            RenderNode::Group(group) => &group.id,
            RenderNode::Custom(custom) => &custom.id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            RenderNode::Scalar(card) => &card.label,
            RenderNode::Progress(metric) => &metric.label,
            RenderNode::Group(group) => &group.label,
            RenderNode::Custom(custom) => &custom.label,
        }
    }
}

pub struct Renderer<'a> {
    config: &'a RenderConfig,
    custom: &'a CustomRenderers,
}

impl<'a> Renderer<'a> {
    pub fn new(config: &'a RenderConfig, custom: &'a CustomRenderers) -> Self {
        Self { config, custom }
    }

    /// Render one sibling group at `depth`.
    pub fn render(
        &self,
        properties: &[ParsedProperty],
        depth: usize,
        state: &ExpandState,
        data: &Value,
    ) -> Vec<RenderNode> {
        self.render_level(properties, depth, "", state, data)
    }

    fn render_level(
        &self,
        properties: &[ParsedProperty],
        depth: usize,
        parent: &str,
        state: &ExpandState,
        data: &Value,
    ) -> Vec<RenderNode> {
        properties
            .iter()
            .map(|property| self.render_node(property, depth, parent, state, data))
            .collect()
    }

    fn render_node(
        &self,
        property: &ParsedProperty,
        depth: usize,
        parent: &str,
        state: &ExpandState,
        data: &Value,
    ) -> RenderNode {
        let id = child_id(parent, &property.key);

        if let Some((name, renderer)) = self.custom.lookup(&property.key) {
            trace!(key = %property.key, renderer = name, "custom renderer");
            return RenderNode::Custom(CustomNode {
                content: renderer.render(property, data),
                renderer: name.to_string(),
                key: property.key.clone(),
                label: property.label.clone(),
                id,
            });
        }

        if let Some(metric) = self.progress(&id, property) {
            return RenderNode::Progress(metric);
        }

        if !property.children.is_empty() {
            let expanded = state.is_expanded(&id, depth);
            let layout = if property.children.iter().all(ParsedProperty::is_leaf) {
                GroupLayout::Grid
            } else {
                GroupLayout::Nested
            };
            let children = if expanded {
                self.render_level(&property.children, depth + 1, &id, state, data)
            } else {
                Vec::new()
            };
            return RenderNode::Group(GroupNode {
                key: property.key.clone(),
                label: property.label.clone(),
                description: property.description.clone(),
                semantic_id: property.semantic_id.clone(),
                depth,
                expanded,
                layout,
                child_count: property.children.len(),
                children,
                id,
            });
        }

        RenderNode::Scalar(ScalarCard {
            key: property.key.clone(),
            label: property.label.clone(),
            description: property.description.clone(),
            semantic_id: property.semantic_id.clone(),
            required: property.is_required,
            ty: property.ty,
            value: property.value.clone(),
            display: format_value(&property.value, property.ty),
            id,
        })
    }

    fn progress(&self, id: &str, property: &ParsedProperty) -> Option<ProgressMetric> {
        let rules = &self.config.metrics;
        if !property.ty.is_numeric() || !rules.is_candidate(&property.key, &property.label) {
            return None;
        }
        let max = rules.maximum(&property.key)?;
        let value = property.value.as_f64()?;
        let ratio = value / max;
        Some(ProgressMetric {
            id: id.to_string(),
            key: property.key.clone(),
            label: property.label.clone(),
            value,
            max,
            percentage: ratio.min(1.0) * 100.0,
            unit: rules.unit(&property.key).to_string(),
            tier: if ratio > rules.warning_ratio {
                Tier::Warning
            } else {
                Tier::Normal
            },
        })
    }
}

/// Render with the default configuration and all groups in their default state.
pub fn render_properties(
    properties: &[ParsedProperty],
    depth: usize,
    custom: &CustomRenderers,
    data: &Value,
) -> Vec<RenderNode> {
    let config = RenderConfig::default();
    Renderer::new(&config, custom).render(properties, depth, &ExpandState::default(), data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn number(key: &str, value: Value) -> ParsedProperty {
        let mut property = ParsedProperty::inferred(key, value);
        property.ty = PropertyType::Number;
        property
    }

    fn group(key: &str, children: Vec<ParsedProperty>) -> ParsedProperty {
        let mut property = ParsedProperty::inferred(key, json!({}));
        property.children = children;
        property
    }

    fn render(properties: &[ParsedProperty]) -> Vec<RenderNode> {
        render_properties(properties, 0, &CustomRenderers::new(), &Value::Null)
    }

    #[test]
    fn test_cycles_progress() {
        let nodes = render(&[number("chargeCycles", json!(4500))]);
        match &nodes[0] {
            RenderNode::Progress(metric) => {
                assert_eq!(metric.max, 5000.0);
                assert_eq!(metric.percentage, 90.0);
                assert_eq!(metric.unit, "");
                assert_eq!(metric.tier, Tier::Warning);
            }
            other => panic!("Expected Progress, got: {other:?}"),
        }
    }

    #[test]
    fn test_health_progress_is_clamped() {
        let nodes = render(&[number("stateOfHealth", json!(120))]);
        match &nodes[0] {
            RenderNode::Progress(metric) => {
                assert_eq!(metric.percentage, 100.0);
                assert_eq!(metric.unit, "%");
                assert_eq!(metric.tier, Tier::Warning);
            }
            other => panic!("Expected Progress, got: {other:?}"),
        }

        let nodes = render(&[number("remainingCapacity", json!(40))]);
        match &nodes[0] {
            RenderNode::Progress(metric) => {
                assert_eq!(metric.percentage, 40.0);
                assert_eq!(metric.tier, Tier::Normal);
            }
            other => panic!("Expected Progress, got: {other:?}"),
        }
    }

    #[test]
    fn test_metric_without_maximum_falls_through() {
        let nodes = render(&[number("usageCount", json!(12))]);
        assert!(matches!(&nodes[0], RenderNode::Scalar(card) if card.display == "12"));
    }

    #[test]
    fn test_non_numeric_metric_is_scalar() {
        let nodes = render(&[ParsedProperty::inferred("healthStatus", json!("good"))]);
        assert!(matches!(&nodes[0], RenderNode::Scalar(_)));
    }

    #[test]
    fn test_keyword_in_label_only() {
        let mut property = number("soh", json!(50));
        property.label = "Battery Health".to_string();
        // keyword in the label makes it a candidate, but the maximum comes from the key
        let nodes = render(&[property]);
        assert!(matches!(&nodes[0], RenderNode::Scalar(_)));
    }

    #[test]
    fn test_group_default_expansion() {
        let tree = vec![group(
            "outer",
            vec![
                group("inner", vec![ParsedProperty::inferred("leaf", json!("x"))]),
                ParsedProperty::inferred("flat", json!(1)),
            ],
        )];
        let nodes = render(&tree);
        let RenderNode::Group(outer) = &nodes[0] else {
            panic!("Expected Group");
        };
        assert!(outer.expanded);
        assert_eq!(outer.layout, GroupLayout::Nested);
        assert_eq!(outer.children.len(), 2);

        let RenderNode::Group(inner) = &outer.children[0] else {
            panic!("Expected Group");
        };
        assert_eq!(inner.id, "outer/inner");
        assert_eq!(inner.depth, 1);
        assert!(!inner.expanded);
        assert_eq!(inner.layout, GroupLayout::Grid);
        assert_eq!(inner.child_count, 1);
        assert!(inner.children.is_empty());
    }

    #[test]
    fn test_expand_state_overrides() {
        let leaf = ParsedProperty::inferred("leaf", json!("x"));
        let tree = vec![group("outer", vec![group("inner", vec![leaf])])];
        let mut state = ExpandState::new();
        assert!(state.toggle("outer/inner", 1));
        state.set("outer", false);

        let config = RenderConfig::default();
        let custom = CustomRenderers::new();
        let renderer = Renderer::new(&config, &custom);

        let nodes = renderer.render(&tree, 0, &state, &Value::Null);
        let RenderNode::Group(outer) = &nodes[0] else {
            panic!("Expected Group");
        };
        assert!(!outer.expanded);
        assert!(outer.children.is_empty());

        state.set("outer", true);
        let nodes = renderer.render(&tree, 0, &state, &Value::Null);
        let RenderNode::Group(outer) = &nodes[0] else {
            panic!("Expected Group");
        };
        let RenderNode::Group(inner) = &outer.children[0] else {
            panic!("Expected Group");
        };
        assert!(inner.expanded);
        assert_eq!(inner.children[0].id(), "outer/inner/leaf");

        state.reset();
        assert!(!state.is_expanded("outer/inner", 1));
    }

    #[test]
    fn test_scalar_card() {
        let mut property = ParsedProperty::inferred("recyclable", json!(true));
        property.is_required = true;
        property.description = Some("Whether the product is recyclable".to_string());
        let nodes = render(&[property]);
        match &nodes[0] {
            RenderNode::Scalar(card) => {
                assert_eq!(card.label, "Recyclable");
                assert_eq!(card.display, "Yes");
                assert!(card.required);
                assert_eq!(card.ty, PropertyType::Boolean);
            }
            other => panic!("Expected Scalar, got: {other:?}"),
        }
    }

    #[test]
    fn test_custom_renderer_case_insensitive() {
        let mut custom = CustomRenderers::new();
        custom.register("materialcomposition", |property: &ParsedProperty, data: &Value| {
            CustomContent::Text(format!("{} of {}", property.key, data["id"]))
        });

        let nodes = render_properties(
            &[group(
                "materialComposition",
                vec![ParsedProperty::inferred("a", json!(1))],
            )],
            0,
            &custom,
            &json!({"id": 7}),
        );
        match &nodes[0] {
            RenderNode::Custom(node) => {
                assert_eq!(node.renderer, "materialcomposition");
                assert_eq!(
                    node.content,
                    CustomContent::Text("materialComposition of 7".to_string())
                );
            }
            other => panic!("Expected Custom, got: {other:?}"),
        }
    }

    #[test]
    fn test_custom_renderer_exact_match_wins() {
        let mut custom = CustomRenderers::new();
        custom
            .register("Weight", |_: &ParsedProperty, _: &Value| {
                CustomContent::Text("upper".to_string())
            })
            .register("weight", |_: &ParsedProperty, _: &Value| {
                CustomContent::Text("exact".to_string())
            });
        assert_eq!(custom.len(), 2);

        let nodes = render_properties(
            &[number("weight", json!(1))],
            0,
            &custom,
            &Value::Null,
        );
        assert!(matches!(
            &nodes[0],
            RenderNode::Custom(node) if node.content == CustomContent::Text("exact".to_string())
        ));
    }

    #[test]
    fn test_custom_renderer_miss_falls_through() {
        let mut custom = CustomRenderers::new();
        let miss = |_: &ParsedProperty, _: &Value| CustomContent::Value(Value::Null);
        custom.register("other", miss);
        let nodes = render_properties(&[number("weight", json!(1))], 0, &custom, &Value::Null);
        assert!(matches!(&nodes[0], RenderNode::Scalar(_)));
    }

    #[test]
    fn test_serialized_shape() {
        let nodes = render(&[number("chargeCycles", json!(1000))]);
        assert_eq!(
            serde_json::to_value(&nodes[0]).unwrap(),
            json!({
                "kind": "progress",
                "id": "chargeCycles",
                "key": "chargeCycles",
                "label": "Charge Cycles",
                "value": 1000.0,
                "max": 5000.0,
                "percentage": 20.0,
                "unit": "",
                "tier": "normal"
            })
        );
    }
}
