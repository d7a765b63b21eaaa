//! Axis range, reference lines and colours a bar-chart renderer draws
//! around a finalized series

use serde::Serialize;

use super::ChartPoint;
use crate::config::Settings;
use crate::stats::median;

/// Vertical reference line at a multiple of the median
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceLine {
    pub position: f64,
    pub label: String,
}

/// Horizontal error bar, drawn away from zero only
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ErrorBar {
    pub left: f64,
    pub right: f64,
}

/// Everything besides the bars themselves
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartGuides {
    pub x_min: f64,
    pub x_max: f64,
    pub reference_lines: Vec<ReferenceLine>,
    pub colors: Vec<String>,
    pub error_bars: Vec<ErrorBar>,
}

/// Rounding scale for reference-line labels: `10^(3 - round(log10 v))`, at least 10
pub fn find_round(v: f64) -> f64 {
    let r = 10f64.powf(-v.log10().round() + 3.0);
    if r.is_finite() && r >= 10.0 {
        r
    } else {
        10.0
    }
}

fn rounded(v: f64, scale: f64) -> f64 {
    (v * scale).round() / scale
}

/// Compute guides for a series; an empty series yields an empty frame
pub fn chart_guides(series: &[ChartPoint], settings: &Settings) -> ChartGuides {
    let values: Vec<f64> = series.iter().map(|p| p.value).collect();
    let reach: Vec<f64> = series
        .iter()
        .map(|p| if p.value >= 0.0 { p.value + p.dev } else { p.value - p.dev })
        .collect();

    let hi = reach.iter().copied().fold(0.0_f64, f64::max);
    let lo = reach.iter().copied().fold(0.0_f64, f64::min);

    let mut reference_lines = Vec::new();
    let m = median(&values);
    if m.is_finite() {
        let v_max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let v_min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let scale = find_round(v_max);
        let at = rounded(m, scale);
        reference_lines.push(ReferenceLine {
            position: at,
            label: format!("M({})", at),
        });
        for (factor, label) in [(3.0, "3xM"), (10.0, "10xM")] {
            let x = m * factor;
            if x < v_max && x > v_min {
                reference_lines.push(ReferenceLine {
                    position: rounded(x, scale),
                    label: label.to_string(),
                });
            }
        }
    }

    let colors = series
        .iter()
        .map(|p| bar_color(p.color_idx, &settings.bar_colors))
        .collect();

    let error_bars = series
        .iter()
        .map(|p| {
            if p.value > 0.0 {
                ErrorBar { left: 0.0, right: p.dev }
            } else {
                ErrorBar { left: p.dev, right: 0.0 }
            }
        })
        .collect();

    ChartGuides {
        x_min: lo * 1.1,
        x_max: hi * 1.1,
        reference_lines,
        colors,
        error_bars,
    }
}

/// Palette colour for a colour bucket, cycling through the palette
pub fn bar_color(color_idx: i64, palette: &[String]) -> String {
    if palette.is_empty() {
        return String::new();
    }
    palette[color_idx.rem_euclid(palette.len() as i64) as usize].clone()
}
