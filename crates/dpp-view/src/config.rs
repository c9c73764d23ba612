use dpp_schema::{DEFAULT_REF_PREFIX, DEFAULT_SEMANTIC_ID_KEY, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParserConfig {
    /// Prefix stripped from `$ref` pointers.
    pub ref_prefix: String,
    /// Schema extension key carrying the semantic id.
    pub semantic_id_key: String,
    /// Fields tried, in order, to label items of an unwrapped content list.
    pub identifier_fields: Vec<String>,
    /// Field holding an explicit label for array items.
    pub item_label_field: String,
    /// Field marking recursively nested items.
    pub recursive_children_field: String,
    /// Field holding the list inside a content wrapper.
    pub content_field: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            ref_prefix: DEFAULT_REF_PREFIX.to_string(),
            semantic_id_key: DEFAULT_SEMANTIC_ID_KEY.to_string(),
            identifier_fields: strings(&["name", "id", "type", "key", "title", "label"]),
            item_label_field: "label".to_string(),
            recursive_children_field: "children".to_string(),
            content_field: "content".to_string(),
        }
    }
}

impl ParserConfig {
    /// Lower a raw schema value with this configuration's semantic-id key.
    pub fn lower_schema(&self, value: &Value) -> JsonSchema {
        JsonSchema::from_value_with(value, &self.semantic_id_key)
    }
}

/// Upper bound for a family of metric keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricMaximum {
    /// Substrings of the lowercased key that select this maximum.
    pub markers: Vec<String>,
    pub max: f64,
}

/// Rules deciding which numeric properties render as progress metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MetricRules {
    /// A numeric property is a metric candidate if its key or label contains one of these.
    pub keywords: Vec<String>,
    /// Checked in order against the key; the first match wins.
    pub maxima: Vec<MetricMaximum>,
    /// Keys containing one of these are shown with a `%` unit.
    pub percent_markers: Vec<String>,
    /// Ratios above this are shown in the warning tier.
    pub warning_ratio: f64,
}

impl Default for MetricRules {
    fn default() -> Self {
        Self {
            keywords: strings(&["cycles", "capacity", "health", "level", "count", "usage"]),
            maxima: vec![
                MetricMaximum {
                    markers: strings(&["cycles"]),
                    max: 5000.0,
                },
                MetricMaximum {
                    markers: strings(&["capacity", "health"]),
                    max: 100.0,
                },
            ],
            percent_markers: strings(&["percentage", "health"]),
            warning_ratio: 0.8,
        }
    }
}

impl MetricRules {
    pub fn is_candidate(&self, key: &str, label: &str) -> bool {
        let key = key.to_lowercase();
        let label = label.to_lowercase();
        self.keywords
            .iter()
            .any(|keyword| key.contains(keyword.as_str()) || label.contains(keyword.as_str()))
    }

    pub fn maximum(&self, key: &str) -> Option<f64> {
        let key = key.to_lowercase();
        self.maxima
            .iter()
            .find(|rule| rule.markers.iter().any(|m| key.contains(m.as_str())))
            .map(|rule| rule.max)
    }

    pub fn unit(&self, key: &str) -> &'static str {
        let key = key.to_lowercase();
        if self.percent_markers.iter().any(|m| key.contains(m)) {
            "%"
        } else {
            ""
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    pub metrics: MetricRules,
    /// Show only the largest composition shares.
    pub compact_composition: bool,
}
