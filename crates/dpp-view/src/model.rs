//! Parsed passport data

use convert_case::{Boundary, Converter, Pattern};
use dpp_schema::SchemaType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Display type of a parsed property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
}

impl PropertyType {
    /// Map a schema type. `null` has no display type.
    pub fn from_schema(ty: SchemaType) -> Option<Self> {
        match ty {
            SchemaType::String => Some(Self::String),
            SchemaType::Number => Some(Self::Number),
            SchemaType::Integer => Some(Self::Integer),
            SchemaType::Boolean => Some(Self::Boolean),
            SchemaType::Object => Some(Self::Object),
            SchemaType::Array => Some(Self::Array),
            SchemaType::Null => None,
        }
    }

    /// The runtime type of a data value.
    pub fn of_value(value: &Value) -> Self {
        match value {
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
            Value::String(_) | Value::Null => Self::String,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Number | Self::Integer)
    }

    pub fn is_structured(self) -> bool {
        matches!(self, Self::Object | Self::Array)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }
}

/// One schema-aligned data point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedProperty {
    /// Unique among siblings.
    pub key: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_id: Option<String>,
    #[serde(rename = "type")]
    pub ty: PropertyType,
    /// Never `null`.
    pub value: Value,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(default)]
    pub children: Vec<ParsedProperty>,
}

impl ParsedProperty {
    /// A schema-less property typed from the value itself.
    pub fn inferred(key: impl Into<String>, value: Value) -> Self {
        let key = key.into();
        ParsedProperty {
            label: title_case(&key),
            key,
            description: None,
            semantic_id: None,
            ty: PropertyType::of_value(&value),
            value,
            is_required: false,
            enum_values: None,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Visit this property and all of its descendants, depth-first.
    pub fn visit(&self, f: &mut impl FnMut(&ParsedProperty)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }

    pub fn find_child(&self, key: &str) -> Option<&ParsedProperty> {
        self.children.iter().find(|child| child.key == key)
    }
}

/// One top-level section of a passport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabDefinition {
    pub id: String,
    pub label: String,
    pub properties: Vec<ParsedProperty>,
}

/// Human-readable label for a property key.
///
/// `manufacturerPartId` becomes `Manufacturer Part Id`, `product_name`
/// becomes `Product Name`. Acronyms keep their capitals and digits stay
/// attached to the word before them, so `partInstanceID` becomes
/// `Part Instance ID` and `co2Footprint` becomes `Co2 Footprint`.
pub fn title_case(key: &str) -> String {
    Converter::new()
        .remove_boundaries(&[
            Boundary::LowerDigit,
            Boundary::UpperDigit,
            Boundary::DigitLower,
        ])
        .set_pattern(Pattern::Custom(capitalize_words))
        .set_delim(" ")
        .convert(key)
}

/// Uppercase the first letter of each word, leaving the rest as written.
fn capitalize_words(words: &[&str]) -> Vec<String> {
    words
        .iter()
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect()
}
