#![doc = include_str!("../README.md")]

mod chart;
mod composition;
mod config;
mod format;
mod metrics;
mod model;
mod parser;
pub mod render;

pub use chart::CompositionRenderer;
pub use composition::{
    COMPACT_LIMIT, Composition, CompositionItem, CompositionSlice, Palette, compute_composition,
};
pub use config::{MetricMaximum, MetricRules, ParserConfig, RenderConfig};
pub use dpp_schema::JsonSchema;
pub use format::format_value;
pub use metrics::{Metric, MetricSpec, MetricTransform, extract_metrics, extract_metrics_with};
pub use model::{ParsedProperty, PropertyType, TabDefinition, title_case};
pub use parser::{Parser, UnwrappedContent, generate_tabs, identifier_label, parse_schema};
pub use render::{
    CustomContent, CustomRenderer, CustomRenderers, ExpandState, NodeId, RenderNode, Renderer,
    render_properties,
};
