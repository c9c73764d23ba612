//! Plain-text outline of a render tree

use dpp_view::render::{CustomNode, GroupNode, ProgressMetric, Tier};
use dpp_view::{CustomContent, PropertyType, RenderNode, format_value};
use serde_json::Value;

const BRANCH: &str = "\u{251C}\u{2500}\u{2500} ";
const LAST: &str = "\u{2514}\u{2500}\u{2500} ";
const VERTICAL: &str = "\u{2502}   ";
const SPACE: &str = "    ";

const BAR_WIDTH: usize = 10;
const BAR_FILLED: char = '\u{2588}';
const BAR_EMPTY: char = '\u{2591}';

/// Render `nodes` below a title line, one node per line.
pub fn outline(title: &str, nodes: &[RenderNode]) -> String {
    let mut out = String::new();
    out.push_str(title);
    out.push('\n');
    write_level(&mut out, nodes, &mut Vec::new());
    out
}

/// `is_last[d]` tells whether the ancestor at depth `d` is the last of its siblings.
fn write_level(out: &mut String, nodes: &[RenderNode], is_last: &mut Vec<bool>) {
    for (index, node) in nodes.iter().enumerate() {
        is_last.push(index + 1 == nodes.len());
        write_line(out, is_last, &node_text(node));
        match node {
            RenderNode::Group(group) => write_level(out, &group.children, is_last),
            RenderNode::Custom(custom) => write_lines(out, &custom_details(custom), is_last),
            RenderNode::Scalar(_) | RenderNode::Progress(_) => {}
        }
        is_last.pop();
    }
}

fn write_lines(out: &mut String, lines: &[String], is_last: &mut Vec<bool>) {
    for (index, line) in lines.iter().enumerate() {
        is_last.push(index + 1 == lines.len());
        write_line(out, is_last, line);
        is_last.pop();
    }
}

fn write_line(out: &mut String, is_last: &[bool], text: &str) {
    if let Some((current, ancestors)) = is_last.split_last() {
        for last in ancestors {
            out.push_str(if *last { SPACE } else { VERTICAL });
        }
        out.push_str(if *current { LAST } else { BRANCH });
    }
    out.push_str(text);
    out.push('\n');
}

fn node_text(node: &RenderNode) -> String {
    match node {
        RenderNode::Scalar(card) => format!("{}: {}", card.label, card.display),
        RenderNode::Progress(metric) => progress_text(metric),
        RenderNode::Group(group) => group_text(group),
        RenderNode::Custom(custom) => match &custom.content {
            CustomContent::Composition(_) => custom.label.clone(),
            CustomContent::Text(text) => format!("{}: {text}", custom.label),
            CustomContent::Value(value) => format!("{}: {value}", custom.label),
        },
    }
}

fn group_text(group: &GroupNode) -> String {
    if group.expanded {
        format!("\u{25BE} {}", group.label)
    } else {
        format!("\u{25B8} {} ({})", group.label, group.child_count)
    }
}

fn progress_text(metric: &ProgressMetric) -> String {
    let filled = ((metric.percentage / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    let bar: String = std::iter::repeat_n(BAR_FILLED, filled)
        .chain(std::iter::repeat_n(BAR_EMPTY, BAR_WIDTH - filled))
        .collect();
    let mut text = format!(
        "{} [{bar}] {} / {}{}",
        metric.label,
        number(metric.value),
        number(metric.max),
        metric.unit
    );
    if metric.tier == Tier::Warning {
        text.push_str(" (high)");
    }
    text
}

fn custom_details(custom: &CustomNode) -> Vec<String> {
    let CustomContent::Composition(composition) = &custom.content else {
        return Vec::new();
    };
    composition
        .slices
        .iter()
        .map(|slice| {
            let share = number(slice.percentage);
            format!("{}: {share}%", slice.item.name)
        })
        .chain(composition.remainder_label())
        .collect()
}

fn number(value: f64) -> String {
    format_value(&Value::from(value), PropertyType::Number)
}
