//! Chart and table series built from expression values and factor assignments

mod aggregate;
mod guides;

pub use aggregate::{aggregate_chart_series, aggregate_reporters, ChartPoint};
pub use guides::{bar_color, chart_guides, find_round, ChartGuides, ErrorBar, ReferenceLine};
