//! Merging expression values with factor assignments into chart series

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::{display_name, ExpressionTable, FactorAssignment};
use crate::error::{DatasetError, Result};
use crate::stats::mean_with_deviation;

/// Finalized point of a chart series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub name: String,
    pub order_idx: i64,
    pub color_idx: i64,
    /// Sample value, or the rounded mean of merged replicates
    pub value: f64,
    /// Population standard deviation of merged replicates, 0 for single samples
    pub dev: f64,
}

/// Value of a point while replicates are folded into it
#[derive(Debug, Clone, PartialEq)]
enum PointValue {
    Single(f64),
    Replicates(Vec<f64>),
}

struct PendingPoint {
    name: String,
    order_idx: i64,
    color_idx: i64,
    value: PointValue,
}

impl PendingPoint {
    fn new(assignment: &FactorAssignment, value: f64) -> Self {
        Self {
            name: assignment.name.clone(),
            order_idx: assignment.order_idx,
            color_idx: assignment.color_idx,
            value: PointValue::Single(value),
        }
    }

    fn absorb(&mut self, value: f64) {
        self.value = match std::mem::replace(&mut self.value, PointValue::Replicates(Vec::new())) {
            PointValue::Single(first) => PointValue::Replicates(vec![first, value]),
            PointValue::Replicates(mut values) => {
                values.push(value);
                PointValue::Replicates(values)
            }
        };
    }

    fn finalize(self) -> ChartPoint {
        let (value, dev) = match self.value {
            PointValue::Single(v) => (v, 0.0),
            PointValue::Replicates(values) => mean_with_deviation(&values),
        };
        ChartPoint {
            name: display_name(&self.name).to_string(),
            order_idx: self.order_idx,
            color_idx: self.color_idx,
            value,
            dev,
        }
    }
}

/// Pair values with their samples' assignments and fold replicates
///
/// Points come out sorted by `order_idx` descending; samples sharing an
/// `order_idx` merge into one point carrying the first one's name and
/// colour, with value `round(mean, 2)` and dev `round(std_dev, 3)`.
pub fn aggregate_chart_series(values: &[f64], assignments: &[FactorAssignment]) -> Result<Vec<ChartPoint>> {
    if values.len() != assignments.len() {
        return Err(DatasetError::DimensionMismatch {
            expected: format!("{} values (one per sample)", assignments.len()),
            got: format!("{} values", values.len()),
        });
    }

    let mut paired: Vec<(&FactorAssignment, f64)> = assignments.iter().zip(values.iter().copied()).collect();
    // stable: equal order_idx keep input order
    paired.sort_by(|a, b| b.0.order_idx.cmp(&a.0.order_idx));

    let mut series = Vec::new();
    let mut pending: Option<PendingPoint> = None;
    for (assignment, value) in paired {
        match pending.as_mut() {
            Some(p) if p.order_idx == assignment.order_idx => p.absorb(value),
            _ => {
                if let Some(done) = pending.take() {
                    series.push(done.finalize());
                }
                pending = Some(PendingPoint::new(assignment, value));
            }
        }
    }
    if let Some(done) = pending {
        series.push(done.finalize());
    }

    Ok(series)
}

/// One series per reporter, keyed by reporter id
pub fn aggregate_reporters(
    table: &ExpressionTable,
    reporters: &[String],
    assignments: &[FactorAssignment],
) -> Result<BTreeMap<String, Vec<ChartPoint>>> {
    reporters
        .iter()
        .map(|r| {
            let values = table.reporter_values(r)?.to_vec();
            Ok((r.clone(), aggregate_chart_series(&values, assignments)?))
        })
        .collect()
}
