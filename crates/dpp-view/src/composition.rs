//! Percentage shares and pie-chart geometry for composition charts

use serde::{Deserialize, Serialize};

/// Number of slices listed individually in compact mode.
pub const COMPACT_LIMIT: usize = 3;

/// Color used when the palette is empty.
const FALLBACK_COLOR: &str = "#9e9e9e";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionItem {
    pub name: String,
    pub value: f64,
}

impl CompositionItem {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Slice colors, assigned by item position and cycled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette(pub Vec<String>);

impl Default for Palette {
    fn default() -> Self {
        Palette(
            [
                "#1976d2", "#388e3c", "#f57c00", "#7b1fa2", "#c2185b", "#0097a7", "#fbc02d",
                "#5d4037",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        )
    }
}

impl Palette {
    pub fn color(&self, index: usize) -> &str {
        if self.0.is_empty() {
            FALLBACK_COLOR
        } else {
            &self.0[index % self.0.len()]
        }
    }
}

/// One item with its share and arc, angles in degrees clockwise from 12 o'clock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionSlice {
    pub item: CompositionItem,
    pub percentage: f64,
    pub color: String,
    pub arc_start: f64,
    pub arc_end: f64,
    /// The arc sweeps more than half the circle.
    pub large_arc: bool,
}

impl CompositionSlice {
    pub fn sweep(&self) -> f64 {
        self.arc_end - self.arc_start
    }

    /// SVG path for this slice of a pie centered at `(cx, cy)`.
    pub fn arc_path(&self, cx: f64, cy: f64, radius: f64) -> String {
        let sweep = self.sweep();
        if sweep <= 0.0 {
            return String::new();
        }
        if sweep >= 360.0 - 1e-9 {
            // a single arc cannot start and end at the same point
            return format!(
                "M {cx} {top} A {radius} {radius} 0 1 1 {cx} {bottom} A {radius} {radius} 0 1 1 {cx} {top} Z",
                top = cy - radius,
                bottom = cy + radius,
            );
        }
        let (x1, y1) = point_on_circle(cx, cy, radius, self.arc_start);
        let (x2, y2) = point_on_circle(cx, cy, radius, self.arc_end);
        format!(
            "M {cx} {cy} L {x1:.3} {y1:.3} A {radius} {radius} 0 {large} 1 {x2:.3} {y2:.3} Z",
            large = u8::from(self.large_arc),
        )
    }
}

fn point_on_circle(cx: f64, cy: f64, radius: f64, degrees: f64) -> (f64, f64) {
    let radians = (degrees - 90.0).to_radians();
    (cx + radius * radians.cos(), cy + radius * radians.sin())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    /// Sorted by descending percentage.
    pub slices: Vec<CompositionSlice>,
    /// Slices left out in compact mode.
    pub remainder: usize,
    pub total: f64,
}

impl Composition {
    pub fn remainder_label(&self) -> Option<String> {
        if self.remainder == 0 {
            return None;
        }
        Some(format!("+{} more", self.remainder))
    }
}

/// Compute shares and arcs.
///
/// Non-finite and negative values count as zero. When the total is zero
/// every share is 0% and every arc is empty.
pub fn compute_composition(
    items: &[CompositionItem],
    compact: bool,
    palette: &Palette,
) -> Composition {
    let weights: Vec<f64> = items
        .iter()
        .map(|item| {
            if item.value.is_finite() && item.value > 0.0 {
                item.value
            } else {
                0.0
            }
        })
        .collect();
    let total: f64 = weights.iter().sum();

    let mut ranked: Vec<(usize, f64)> = weights
        .iter()
        .enumerate()
        .map(|(index, weight)| {
            let share = if total > 0.0 && total.is_finite() {
                weight / total * 100.0
            } else {
                0.0
            };
            (index, share)
        })
        .collect();
    // stable: ties keep input order
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut cumulative = 0.0;
    let mut slices: Vec<CompositionSlice> = ranked
        .into_iter()
        .map(|(index, percentage)| {
            let start = cumulative;
            cumulative += percentage;
            CompositionSlice {
                item: items[index].clone(),
                percentage,
                color: palette.color(index).to_string(),
                arc_start: start * 3.6,
                arc_end: cumulative * 3.6,
                large_arc: percentage > 50.0,
            }
        })
        .collect();

    let mut remainder = 0;
    if compact && slices.len() > COMPACT_LIMIT {
        remainder = slices.len() - COMPACT_LIMIT;
        slices.truncate(COMPACT_LIMIT);
    }

    Composition {
        slices,
        remainder,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(values: &[(&str, f64)]) -> Vec<CompositionItem> {
        values
            .iter()
            .map(|(name, value)| CompositionItem::new(*name, *value))
            .collect()
    }

    #[test]
    fn test_arc_angles() {
        let composition = compute_composition(
            &items(&[("B", 25.0), ("A", 75.0)]),
            false,
            &Palette::default(),
        );
        let names: Vec<&str> = composition
            .slices
            .iter()
            .map(|s| s.item.name.as_str())
            .collect();
        assert_eq!(names, ["A", "B"]);

        let a = &composition.slices[0];
        assert_eq!(a.percentage, 75.0);
        assert_eq!((a.arc_start, a.arc_end), (0.0, 270.0));
        assert!(a.large_arc);

        let b = &composition.slices[1];
        assert_eq!((b.arc_start, b.arc_end), (270.0, 360.0));
        assert_eq!(b.sweep(), 90.0);
        assert!(!b.large_arc);
    }

    #[test]
    fn test_colors_follow_input_order() {
        let palette = Palette(vec!["red".into(), "green".into()]);
        let composition = compute_composition(
            &items(&[("a", 1.0), ("b", 5.0), ("c", 3.0)]),
            false,
            &palette,
        );
        let colors: Vec<&str> = composition
            .slices
            .iter()
            .map(|s| s.color.as_str())
            .collect();
        // sorted b, c, a at input positions 1, 2, 0
        assert_eq!(colors, ["green", "red", "red"]);
    }

    #[test]
    fn test_empty_palette_uses_fallback() {
        let composition = compute_composition(&items(&[("a", 1.0)]), false, &Palette(Vec::new()));
        assert_eq!(composition.slices[0].color, FALLBACK_COLOR);
    }

    #[test]
    fn test_compact_keeps_top_three() {
        let values = [("a", 1.0), ("b", 2.0), ("c", 3.0), ("d", 4.0), ("e", 5.0)];
        let composition = compute_composition(&items(&values), true, &Palette::default());
        assert_eq!(composition.slices.len(), 3);
        assert_eq!(composition.remainder, 2);
        assert_eq!(composition.remainder_label().as_deref(), Some("+2 more"));
        assert_eq!(composition.slices[0].item.name, "e");
    }

    #[test]
    fn test_compact_with_few_items() {
        let composition = compute_composition(
            &items(&[("a", 1.0), ("b", 2.0)]),
            true,
            &Palette::default(),
        );
        assert_eq!(composition.slices.len(), 2);
        assert_eq!(composition.remainder, 0);
        assert_eq!(composition.remainder_label(), None);
    }

    #[test]
    fn test_zero_total_is_all_zero() {
        let composition = compute_composition(
            &items(&[("a", 0.0), ("b", 0.0)]),
            false,
            &Palette::default(),
        );
        assert_eq!(composition.total, 0.0);
        for slice in &composition.slices {
            assert_eq!(slice.percentage, 0.0);
            assert_eq!(slice.sweep(), 0.0);
            assert!(!slice.large_arc);
            assert_eq!(slice.arc_path(50.0, 50.0, 40.0), "");
        }
    }

    #[test]
    fn test_invalid_values_count_as_zero() {
        let composition = compute_composition(
            &items(&[("nan", f64::NAN), ("neg", -5.0), ("ok", 10.0)]),
            false,
            &Palette::default(),
        );
        assert_eq!(composition.total, 10.0);
        assert_eq!(composition.slices[0].item.name, "ok");
        assert_eq!(composition.slices[0].percentage, 100.0);
    }

    #[test]
    fn test_empty_items() {
        let composition = compute_composition(&[], true, &Palette::default());
        assert!(composition.slices.is_empty());
        assert_eq!(composition.remainder, 0);
    }

    #[test]
    fn test_arc_path() {
        let composition = compute_composition(
            &items(&[("a", 75.0), ("b", 25.0)]),
            false,
            &Palette::default(),
        );
        assert_eq!(
            composition.slices[0].arc_path(50.0, 50.0, 40.0),
            "M 50 50 L 50.000 10.000 A 40 40 0 1 1 10.000 50.000 Z"
        );
        assert_eq!(
            composition.slices[1].arc_path(50.0, 50.0, 40.0),
            "M 50 50 L 10.000 50.000 A 40 40 0 0 1 50.000 10.000 Z"
        );
    }

    #[test]
    fn test_full_circle_path() {
        let composition = compute_composition(&items(&[("a", 3.0)]), false, &Palette::default());
        assert_eq!(
            composition.slices[0].arc_path(50.0, 50.0, 40.0),
            "M 50 10 A 40 40 0 1 1 50 90 A 40 40 0 1 1 50 10 Z"
        );
    }
}
