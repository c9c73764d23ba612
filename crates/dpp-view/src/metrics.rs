//! Headline figures for the passport summary header
//!
//! Metrics are looked up at fixed JSON Pointer paths in the payload, not
//! through the schema. Paths that are absent or `null` are skipped.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Post-processing applied to a metric value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricTransform {
    #[default]
    Raw,
    /// Drop the time-of-day part of a date-time string.
    DateOnly,
    /// Read `value` and `unit` from a footprint record. Plain numbers pass through.
    Footprint,
}

impl MetricTransform {
    fn apply(self, value: &Value) -> Option<(Value, Option<String>)> {
        match self {
            MetricTransform::Raw => Some((value.clone(), None)),
            MetricTransform::DateOnly => match value {
                Value::String(date) => {
                    let day = date.split('T').next().unwrap_or(date);
                    Some((Value::String(day.to_string()), None))
                }
                other => Some((other.clone(), None)),
            },
            MetricTransform::Footprint => match value {
                Value::Object(record) => {
                    let figure = record.get("value").filter(|v| !v.is_null())?;
                    let unit = record
                        .get("unit")
                        .and_then(Value::as_str)
                        .map(str::to_string);
                    Some((figure.clone(), unit))
                }
                Value::Number(_) => Some((value.clone(), None)),
                _ => None,
            },
        }
    }
}

/// Where to find one headline figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSpec {
    pub category: String,
    pub label: String,
    /// JSON Pointers tried in order; the first usable hit wins.
    pub pointers: Vec<String>,
    #[serde(default)]
    pub transform: MetricTransform,
    /// Unit shown when the value itself carries none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl MetricSpec {
    pub fn new(category: &str, label: &str, pointers: &[&str]) -> Self {
        Self {
            category: category.to_string(),
            label: label.to_string(),
            pointers: pointers.iter().map(|p| p.to_string()).collect(),
            transform: MetricTransform::Raw,
            unit: None,
        }
    }

    pub fn with_transform(mut self, transform: MetricTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }

    /// The built-in headline table.
    pub fn defaults() -> Vec<MetricSpec> {
        vec![
            MetricSpec::new(
                "identification",
                "Product Name",
                &["/identification/type/nameAtManufacturer"],
            ),
            MetricSpec::new(
                "identification",
                "Part Type",
                &["/identification/type/manufacturerPartId"],
            ),
            MetricSpec::new(
                "operation",
                "Manufacturer",
                &["/operation/manufacturer/manufacturer"],
            ),
            MetricSpec::new(
                "operation",
                "Manufacturing Date",
                &["/operation/manufacturer/manufacturingDate"],
            ),
            MetricSpec::new("metadata", "Version", &["/metadata/version"]),
            MetricSpec::new("metadata", "Issue Date", &["/metadata/issueDate"])
                .with_transform(MetricTransform::DateOnly),
            MetricSpec::new(
                "sustainability",
                "Carbon Footprint",
                &[
                    "/sustainability/productFootprint/carbon/0",
                    "/sustainability/carbonFootprint",
                ],
            )
            .with_transform(MetricTransform::Footprint),
            MetricSpec::new(
                "additionalInformation",
                "Warranty",
                &["/additionalInformation/warrantyPeriod"],
            )
            .with_unit("months"),
        ]
    }

    pub fn extract(&self, data: &Value) -> Option<Metric> {
        let (value, unit) = self.pointers.iter().find_map(|pointer| {
            let hit = data.pointer(pointer).filter(|v| !v.is_null())?;
            self.transform.apply(hit)
        })?;
        Some(Metric {
            category: self.category.clone(),
            label: self.label.clone(),
            value,
            unit: unit.or_else(|| self.unit.clone()),
        })
    }
}

/// One extracted headline figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub category: String,
    pub label: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Extract the built-in headline metrics.
pub fn extract_metrics(data: &Value) -> Vec<Metric> {
    extract_metrics_with(data, &MetricSpec::defaults())
}

pub fn extract_metrics_with(data: &Value, specs: &[MetricSpec]) -> Vec<Metric> {
    specs.iter().filter_map(|spec| spec.extract(data)).collect()
}
