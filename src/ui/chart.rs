//! Dependency-free charts rendered as inline markup.

use serde::{Deserialize, Serialize};

use super::markup::escape_html;

/// One bar in a bar chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

impl ChartPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Horizontal bar chart; each bar is scaled against the largest value.
pub fn bar_chart(data: &[ChartPoint]) -> String {
    let max = data
        .iter()
        .map(|point| point.value)
        .fold(f64::NEG_INFINITY, f64::max);

    data.iter()
        .map(|point| {
            let width = if max.is_finite() && max > 0.0 {
                point.value / max * 100.0
            } else {
                0.0
            };
            format!(
                concat!(
                    r#"<div style="margin-bottom: 12px;">"#,
                    r#"<div style="display: flex; justify-content: space-between; margin-bottom: 4px;">"#,
                    r#"<span style="font-size: 14px; font-weight: 500;">{}</span>"#,
                    r#"<span style="font-size: 14px; color: #6B7280;">{}</span>"#,
                    r#"</div>"#,
                    r#"<div class="progress-bar"><div class="progress-fill" style="width: {}%;"></div></div>"#,
                    r#"</div>"#
                ),
                escape_html(&point.label),
                point.value,
                width
            )
        })
        .collect()
}

/// Polyline coordinates in a 100x100 box, y growing downward.
///
/// A flat series is drawn along the bottom; a single value sits at x = 0.
pub fn sparkline_points(data: &[f64]) -> Vec<(f64, f64)> {
    let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = data.iter().copied().fold(f64::INFINITY, f64::min);
    let range = if max - min == 0.0 { 1.0 } else { max - min };
    let last = data.len().saturating_sub(1).max(1) as f64;

    data.iter()
        .enumerate()
        .map(|(index, value)| {
            let x = index as f64 / last * 100.0;
            let y = 100.0 - (value - min) / range * 100.0;
            (x, y)
        })
        .collect()
}

/// Small trend line as an inline SVG
pub fn sparkline(data: &[f64]) -> String {
    let points = sparkline_points(data)
        .iter()
        .map(|(x, y)| format!("{},{}", x, y))
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        concat!(
            r#"<svg width="100%" height="60" style="display: block;">"#,
            r##"<polyline points="{}" fill="none" stroke="#182B49" stroke-width="2" "##,
            r#"style="vector-effect: non-scaling-stroke;"/>"#,
            r#"</svg>"#
        ),
        points
    )
}
