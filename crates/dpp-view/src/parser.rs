//! Schema and data co-traversal
//!
//! The parser walks a passport schema and its payload side by side and
//! produces [`ParsedProperty`] trees. It never fails: missing data is
//! pruned, unresolved references become childless objects, and shape
//! mismatches fall back to the runtime type of the data.

use std::collections::HashSet;

use dpp_schema::{JsonSchema, ResolvedNode, SchemaNode, SchemaResolver};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, trace};

use crate::config::ParserConfig;
use crate::model::{ParsedProperty, PropertyType, TabDefinition, title_case};

/// How the items of an object array are labeled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemLabels {
    /// The item's own label field, else `Item N`.
    LabelField,
    /// First identifier-like field, else `Item N`.
    Identifier,
}

/// The content list of a content wrapper, already parsed
#[derive(Debug, Clone, PartialEq)]
pub struct UnwrappedContent {
    /// The inner content array.
    pub value: Value,
    pub children: Vec<ParsedProperty>,
}

pub struct Parser<'a> {
    schema: &'a JsonSchema,
    resolver: SchemaResolver<'a>,
    config: &'a ParserConfig,
}

impl<'a> Parser<'a> {
    pub fn new(schema: &'a JsonSchema, config: &'a ParserConfig) -> Self {
        Self {
            schema,
            resolver: SchemaResolver::with_prefix(schema, &config.ref_prefix),
            config,
        }
    }

    pub fn resolver(&self) -> &SchemaResolver<'a> {
        &self.resolver
    }

    /// Parse every top-level schema property against `data`.
    pub fn parse_schema(&self, data: &Value) -> Vec<ParsedProperty> {
        let root = self.resolver.resolve(&self.schema.root);
        match root.properties() {
            Some(properties) => self.parse_properties(properties, data, root.required()),
            None => Vec::new(),
        }
    }

    /// One tab per top-level schema property that yields at least one property.
    pub fn generate_tabs(&self, data: &Value) -> Vec<TabDefinition> {
        let root = self.resolver.resolve(&self.schema.root);
        let Some(properties) = root.properties() else {
            return Vec::new();
        };

        properties
            .iter()
            .filter_map(|(key, node)| {
                let value = data.get(key).filter(|v| !v.is_null())?;
                let mut parsed = self
                    .parse_property(key, node, value, root.required())
                    .children;
                if parsed.is_empty() {
                    parsed = synthesize(key, value);
                }
                if parsed.is_empty() {
                    trace!(tab = %key, "skipping empty tab");
                    return None;
                }
                Some(TabDefinition {
                    id: key.clone(),
                    label: title_case(key),
                    properties: parsed,
                })
            })
            .collect()
    }

    /// Parse a sibling group. Properties without data are dropped.
    pub fn parse_properties(
        &self,
        properties: &'a IndexMap<String, SchemaNode>,
        data: &Value,
        required: &[String],
    ) -> Vec<ParsedProperty> {
        let Some(record) = data.as_object() else {
            return Vec::new();
        };
        properties
            .iter()
            .filter_map(|(key, node)| {
                let value = record.get(key).filter(|v| !v.is_null())?;
                Some(self.parse_property(key, node, value, required))
            })
            .collect()
    }

    /// Parse one property. `required` belongs to the enclosing schema node.
    pub fn parse_property(
        &self,
        key: &str,
        node: &'a SchemaNode,
        value: &Value,
        required: &[String],
    ) -> ParsedProperty {
        let resolved = self.resolver.resolve(node);
        let target = resolved.node();
        let bare = bare_key(key);

        let mut property = ParsedProperty {
            key: key.to_string(),
            label: title_case(bare),
            description: node
                .metadata
                .description
                .clone()
                .or_else(|| target.and_then(|t| t.metadata.description.clone())),
            semantic_id: node
                .semantic_id
                .clone()
                .or_else(|| target.and_then(|t| t.semantic_id.clone())),
            ty: display_type(resolved, value),
            value: value.clone(),
            is_required: required.iter().any(|name| name == bare),
            enum_values: node
                .enum_values
                .clone()
                .or_else(|| target.and_then(|t| t.enum_values.clone())),
            children: Vec::new(),
        };

        match (resolved, value) {
            (ResolvedNode::Object { .. }, Value::Object(_)) => {
                if let Some(unwrapped) = self.unwrap_content_wrapper(resolved, key, value) {
                    trace!(key, "unwrapped content wrapper");
                    property.ty = PropertyType::Array;
                    property.value = unwrapped.value;
                    property.children = unwrapped.children;
                } else if let Some(properties) = resolved.properties() {
                    property.children =
                        self.parse_properties(properties, value, resolved.required());
                }
            }
            (ResolvedNode::Array { .. }, Value::Array(entries)) => {
                property.children =
                    self.parse_array(resolved.items(), entries, key, ItemLabels::LabelField);
            }
            (ResolvedNode::UnresolvedRef { reference }, _) => {
                debug!(key, reference, "property with unresolved schema");
            }
            _ => {}
        }

        property
    }

    /// Recognize a `{..., content: [...]}` wrapper around a list of records.
    ///
    /// Applies only when the value carries a `content` array and the schema
    /// declares `content` as an array of objects. Items without declared
    /// properties are read from the data.
    pub fn unwrap_content_wrapper(
        &self,
        resolved: ResolvedNode<'a>,
        key: &str,
        value: &Value,
    ) -> Option<UnwrappedContent> {
        let field = self.config.content_field.as_str();
        let entries = value.as_object()?.get(field)?.as_array()?;
        let content_node = resolved.properties()?.get(field)?;

        let content = self.resolver.resolve(content_node);
        let items = content.items()?;
        if !matches!(self.resolver.resolve(items), ResolvedNode::Object { .. }) {
            return None;
        }

        Some(UnwrappedContent {
            value: Value::Array(entries.clone()),
            children: self.parse_array(Some(items), entries, key, ItemLabels::Identifier),
        })
    }

    fn parse_array(
        &self,
        items: Option<&'a SchemaNode>,
        entries: &[Value],
        key: &str,
        labels: ItemLabels,
    ) -> Vec<ParsedProperty> {
        if entries.is_empty() {
            return Vec::new();
        }

        let item_schema = items.map(|node| self.resolver.resolve(node));
        let Some(item_schema @ ResolvedNode::Object { node }) = item_schema else {
            return primitive_items(key, entries);
        };

        let recursive = item_schema.properties().is_some()
            && entries.iter().any(|e| self.has_recursive_children(e));
        if let [single] = entries
            && !recursive
            && single.is_object()
        {
            return self.item_fields(item_schema, single);
        }

        entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.is_null())
            .map(|(index, entry)| {
                let item_key = format!("{key}[{index}]");
                if !entry.is_object() {
                    let mut item = ParsedProperty::inferred(item_key, entry.clone());
                    item.label = default_item_label(index);
                    return item;
                }

                let mut fields = self.item_fields(item_schema, entry);
                if recursive && self.has_recursive_children(entry) {
                    self.flatten_recursive_children(&mut fields);
                }

                ParsedProperty {
                    label: self.item_label(entry, index, labels),
                    key: item_key,
                    description: node.metadata.description.clone(),
                    semantic_id: node.semantic_id.clone(),
                    ty: PropertyType::Object,
                    value: entry.clone(),
                    is_required: false,
                    enum_values: None,
                    children: fields,
                }
            })
            .collect()
    }

    /// Fields of one record item. Without declared properties they are
    /// typed from the data.
    fn item_fields(&self, schema: ResolvedNode<'a>, entry: &Value) -> Vec<ParsedProperty> {
        match schema.properties() {
            Some(properties) => self.parse_properties(properties, entry, schema.required()),
            None => inferred_fields(entry),
        }
    }

    fn has_recursive_children(&self, entry: &Value) -> bool {
        entry
            .get(&self.config.recursive_children_field)
            .is_some_and(Value::is_array)
    }

    /// Replace the parsed `children` field by its own children, so nested
    /// items appear one level below their parent item.
    fn flatten_recursive_children(&self, fields: &mut Vec<ParsedProperty>) {
        let field = self.config.recursive_children_field.as_str();
        if let Some(position) = fields.iter().position(|f| f.key == field) {
            let nested = fields.remove(position);
            fields.extend(nested.children);
        }
    }

    fn item_label(&self, entry: &Value, index: usize, labels: ItemLabels) -> String {
        let label = match labels {
            ItemLabels::LabelField => entry
                .get(&self.config.item_label_field)
                .and_then(Value::as_str)
                .map(str::to_string),
            ItemLabels::Identifier => identifier_label(entry, &self.config.identifier_fields),
        };
        label.unwrap_or_else(|| default_item_label(index))
    }
}

/// Best-effort identifier for a record: the first of `fields` holding a
/// string or number, looking one level into nested records.
pub fn identifier_label(entry: &Value, fields: &[String]) -> Option<String> {
    let record = entry.as_object()?;
    let direct = |record: &serde_json::Map<String, Value>| {
        fields.iter().find_map(|field| match record.get(field)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    };
    direct(record).or_else(|| {
        fields.iter().find_map(|field| match record.get(field)? {
            Value::Object(nested) => direct(nested),
            _ => None,
        })
    })
}

fn default_item_label(index: usize) -> String {
    format!("Item {}", index + 1)
}

/// Last segment of a possibly path-prefixed key.
fn bare_key(key: &str) -> &str {
    key.rsplit('.').next().unwrap_or(key)
}

/// Declared type, or the runtime type when schema and data disagree in shape.
fn display_type(resolved: ResolvedNode<'_>, value: &Value) -> PropertyType {
    let runtime = PropertyType::of_value(value);
    match PropertyType::from_schema(resolved.schema_type()) {
        Some(declared) if declared.is_structured() || runtime.is_structured() => {
            if declared == runtime {
                declared
            } else {
                trace!(
                    declared = declared.as_str(),
                    runtime = runtime.as_str(),
                    "schema and data shapes differ"
                );
                runtime
            }
        }
        Some(declared) => declared,
        None => runtime,
    }
}

/// Children for arrays whose items are not described as records.
///
/// A scalar item is keyed by its text. A key already taken by a sibling
/// gets the first free index suffix.
fn primitive_items(key: &str, entries: &[Value]) -> Vec<ParsedProperty> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| !entry.is_null())
        .map(|(index, entry)| match entry {
            Value::Object(_) | Value::Array(_) => {
                let item_key = claim_key(&mut seen, format!("{key}[{index}]"), index);
                let mut item = ParsedProperty::inferred(item_key, entry.clone());
                item.label = default_item_label(index);
                item
            }
            scalar => {
                let text = scalar_text(scalar);
                ParsedProperty {
                    key: claim_key(&mut seen, text.clone(), index),
                    label: text,
                    description: None,
                    semantic_id: None,
                    ty: match scalar {
                        Value::Number(_) => PropertyType::Number,
                        Value::Bool(_) => PropertyType::Boolean,
                        _ => PropertyType::String,
                    },
                    value: scalar.clone(),
                    is_required: false,
                    enum_values: None,
                    children: Vec::new(),
                }
            }
        })
        .collect()
}

/// `candidate`, or `candidate[n]` for the first `n >= index` not yet taken.
fn claim_key(seen: &mut HashSet<String>, candidate: String, index: usize) -> String {
    if seen.insert(candidate.clone()) {
        return candidate;
    }
    let mut n = index;
    loop {
        let key = format!("{candidate}[{n}]");
        if seen.insert(key.clone()) {
            return key;
        }
        n += 1;
    }
}

/// Schema-less fields of a record, typed from their values.
fn inferred_fields(entry: &Value) -> Vec<ParsedProperty> {
    let Some(record) = entry.as_object() else {
        return Vec::new();
    };
    record
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| ParsedProperty::inferred(k.clone(), v.clone()))
        .collect()
}

/// Text form of a scalar. Integral floats print without a fraction.
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Flat properties for a tab whose schema yielded nothing.
fn synthesize(key: &str, value: &Value) -> Vec<ParsedProperty> {
    match value {
        Value::Null => Vec::new(),
        Value::Object(_) => inferred_fields(value),
        Value::Array(entries) => entries
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .map(|(index, v)| {
                let mut item = ParsedProperty::inferred(index.to_string(), v.clone());
                item.label = default_item_label(index);
                item
            })
            .collect(),
        scalar => vec![ParsedProperty::inferred(key, scalar.clone())],
    }
}

/// Parse with the default configuration.
pub fn parse_schema(schema: &JsonSchema, data: &Value) -> Vec<ParsedProperty> {
    let config = ParserConfig::default();
    Parser::new(schema, &config).parse_schema(data)
}

/// Generate tabs with the default configuration.
pub fn generate_tabs(schema: &JsonSchema, data: &Value) -> Vec<TabDefinition> {
    let config = ParserConfig::default();
    Parser::new(schema, &config).generate_tabs(data)
}
