//! JSON Schema representation for passport schemas
//!
//! Passport schemas are generated from aspect models and carry vendor
//! extensions, nullable multi-valued `type` fields, and a flat
//! `components.schemas` dictionary for `$ref` targets. This model keeps only
//! the fields the passport views consume and lowers every other shape
//! leniently: a field with an unexpected JSON type is treated as absent.

use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::SchemaError;

/// Extension key holding the semantic identifier of a schema node.
pub const DEFAULT_SEMANTIC_ID_KEY: &str = "x-samm-aspect-model-urn";

/// Primitive JSON Schema type names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
}

impl SchemaType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "object" => Some(Self::Object),
            "array" => Some(Self::Array),
            "null" => Some(Self::Null),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Null => "null",
        }
    }
}

/// The `type` keyword, either a single name or a list of alternatives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeDecl {
    Single(SchemaType),
    Multiple(Vec<SchemaType>),
}

impl TypeDecl {
    /// The type used for display.
    ///
    /// For alternatives such as `["string", "null"]` this is the first
    /// non-null entry. A declaration consisting only of `null` yields `Null`.
    pub fn primary(&self) -> Option<SchemaType> {
        match self {
            TypeDecl::Single(ty) => Some(*ty),
            TypeDecl::Multiple(types) => types
                .iter()
                .copied()
                .find(|ty| *ty != SchemaType::Null)
                .or_else(|| types.first().copied()),
        }
    }

    fn lower(value: &Value) -> Option<Self> {
        match value {
            Value::String(name) => SchemaType::from_name(name).map(TypeDecl::Single),
            Value::Array(names) => {
                let types: Vec<SchemaType> = names
                    .iter()
                    .filter_map(Value::as_str)
                    .filter_map(SchemaType::from_name)
                    .collect();
                (!types.is_empty()).then_some(TypeDecl::Multiple(types))
            }
            _ => None,
        }
    }
}

/// Common metadata fields
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One property definition
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaNode {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_decl: Option<TypeDecl>,

    #[serde(flatten)]
    pub metadata: SchemaMetadata,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaNode>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,

    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    /// Value of the semantic-id extension, if present.
    #[serde(skip)]
    pub semantic_id: Option<String>,
}

impl SchemaNode {
    /// Lower a JSON value into a schema node.
    ///
    /// Non-object values (including boolean schemas) produce an empty node.
    pub fn from_value(value: &Value, semantic_id_key: &str) -> Self {
        match value {
            Value::Object(map) => Self::from_map(map, semantic_id_key),
            _ => Self::default(),
        }
    }

    fn from_map(map: &Map<String, Value>, semantic_id_key: &str) -> Self {
        let string = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);

        let properties = map
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| lower_map(props, semantic_id_key))
            .unwrap_or_default();

        let items = map
            .get("items")
            .filter(|items| items.is_object())
            .map(|items| Box::new(Self::from_value(items, semantic_id_key)));

        let required = map
            .get("required")
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        SchemaNode {
            reference: string("$ref"),
            type_decl: map.get("type").and_then(TypeDecl::lower),
            metadata: SchemaMetadata {
                title: string("title"),
                description: string("description"),
            },
            properties,
            items,
            enum_values: map.get("enum").and_then(Value::as_array).cloned(),
            required,
            semantic_id: string(semantic_id_key),
        }
    }

    /// The declared primary type, ignoring `$ref`.
    pub fn declared_type(&self) -> Option<SchemaType> {
        self.type_decl.as_ref().and_then(TypeDecl::primary)
    }

    pub fn is_required(&self, key: &str) -> bool {
        self.required.iter().any(|name| name == key)
    }
}

fn lower_map(map: &Map<String, Value>, semantic_id_key: &str) -> IndexMap<String, SchemaNode> {
    map.iter()
        .map(|(key, value)| {
            let node = SchemaNode::from_value(value, semantic_id_key);
            (key.clone(), node)
        })
        .collect()
}

/// A complete passport schema: the root node plus its component dictionary
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JsonSchema {
    pub root: SchemaNode,
    /// Named `$ref` targets from `components.schemas`, `$defs` and `definitions`.
    pub components: IndexMap<String, SchemaNode>,
}

impl JsonSchema {
    /// Lower a JSON value using the default semantic-id extension key.
    pub fn from_value(value: &Value) -> Self {
        Self::from_value_with(value, DEFAULT_SEMANTIC_ID_KEY)
    }

    /// Lower a JSON value, reading semantic ids from `semantic_id_key`.
    ///
    /// This never fails. Definitions found under `$defs` and `definitions`
    /// are merged into the component dictionary after `components.schemas`.
    pub fn from_value_with(value: &Value, semantic_id_key: &str) -> Self {
        let root = SchemaNode::from_value(value, semantic_id_key);
        let mut components = IndexMap::new();

        if let Some(map) = value.as_object() {
            let sources = [
                map.get("components")
                    .and_then(|c| c.get("schemas"))
                    .and_then(Value::as_object),
                map.get("$defs").and_then(Value::as_object),
                map.get("definitions").and_then(Value::as_object),
            ];
            for source in sources.into_iter().flatten() {
                for (name, node) in lower_map(source, semantic_id_key) {
                    components.entry(name).or_insert(node);
                }
            }
        }

        JsonSchema { root, components }
    }

    pub fn component(&self, name: &str) -> Option<&SchemaNode> {
        self.components.get(name)
    }
}

impl FromStr for JsonSchema {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: Value = serde_json::from_str(s)?;
        Ok(Self::from_value(&value))
    }
}
