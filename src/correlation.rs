//! Pearson correlation of one reporter against a reporter x sample matrix

use ndarray::parallel::prelude::*;
use ndarray::{ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::annotation::GeneAnnotation;
use crate::config::Settings;
use crate::data::ExpressionTable;
use crate::error::{DatasetError, Result};
use crate::stats::round_to;

/// Reporter correlated with the query, resolved to its gene when known
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    /// Gene id, empty when the reporter is unannotated
    pub id: String,
    pub reporter: String,
    /// Gene symbol, empty when the reporter is unannotated
    pub symbol: String,
    /// Correlation rounded to 4 decimals
    pub value: f64,
}

/// Refuse datasets too wide for an interactive correlation query
pub fn correlation_usable(sample_count: usize, settings: &Settings) -> Result<()> {
    if sample_count > settings.max_samples_for_correlation {
        return Err(DatasetError::InvalidInput {
            reason: format!(
                "Dataset has {} samples; correlation is limited to {}",
                sample_count, settings.max_samples_for_correlation
            ),
        });
    }
    Ok(())
}

/// Pearson correlation of `v` with every row of `m`
///
/// Rows (or `v`) without variance yield NaN.
pub fn pearson_against(v: ArrayView1<'_, f64>, m: ArrayView2<'_, f64>) -> Vec<f64> {
    let n = v.len() as f64;
    let v_mean = v.sum() / n;
    let v_centered = v.mapv(|x| x - v_mean);
    let v_ss = v_centered.dot(&v_centered);

    m.axis_iter(Axis(0))
        .into_par_iter()
        .map(|row| {
            let row_mean = row.sum() / n;
            let row_centered = row.mapv(|x| x - row_mean);
            let den = (v_ss * row_centered.dot(&row_centered)).sqrt();
            if den == 0.0 {
                f64::NAN
            } else {
                v_centered.dot(&row_centered) / den
            }
        })
        .collect()
}

/// Reporters correlating with `reporter_id` above `min_corr`, best first
///
/// The query reporter itself is part of the matrix and is returned like any
/// other row. Ties keep matrix order.
pub fn correlate(
    reporter_id: &str,
    matrix: ArrayView2<'_, f64>,
    reporters: &[String],
    min_corr: f64,
    annotation: &dyn GeneAnnotation,
) -> Result<Vec<CorrelationResult>> {
    if reporters.len() != matrix.nrows() {
        return Err(DatasetError::DimensionMismatch {
            expected: format!("{} reporter IDs", matrix.nrows()),
            got: format!("{} reporter IDs", reporters.len()),
        });
    }
    let idx = reporters
        .iter()
        .position(|r| r == reporter_id)
        .ok_or_else(|| DatasetError::NotFound {
            what: format!("reporter '{}' in correlation matrix", reporter_id),
        })?;

    let corr = pearson_against(matrix.row(idx), matrix);

    let mut kept: Vec<(usize, f64)> = corr
        .into_iter()
        .enumerate()
        .filter(|(_, c)| *c > min_corr)
        .collect();
    kept.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    log::debug!("{} reporters correlate with {} above {}", kept.len(), reporter_id, min_corr);

    let names: Vec<String> = kept.iter().map(|&(i, _)| reporters[i].clone()).collect();
    let resolved = annotation.resolve_reporters(&names)?;

    Ok(names
        .into_iter()
        .zip(kept)
        .zip(resolved)
        .map(|((reporter, (_, value)), gene)| {
            let (id, symbol) = gene.map(|g| (g.gene_id, g.symbol)).unwrap_or_default();
            CorrelationResult {
                id,
                reporter,
                symbol,
                value: round_to(value, 4),
            }
        })
        .collect())
}

/// [`correlate`] over an expression table
pub fn correlate_table(
    reporter_id: &str,
    table: &ExpressionTable,
    min_corr: f64,
    annotation: &dyn GeneAnnotation,
) -> Result<Vec<CorrelationResult>> {
    correlate(reporter_id, table.values(), table.reporters(), min_corr, annotation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::AnnotationTable;
    use ndarray::array;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_perfect_scale_correlates_to_one() {
        let m = array![[1.0, 2.0, 3.0, 4.0], [2.0, 4.0, 6.0, 8.0]];
        let results = correlate("A", m.view(), &ids(&["A", "B"]), 0.9, &AnnotationTable::new()).unwrap();

        let b = results.iter().find(|r| r.reporter == "B").unwrap();
        assert_eq!(b.value, 1.0);
        assert_eq!(b.id, "");
        assert_eq!(b.symbol, "");
    }

    #[test]
    fn test_threshold_and_ordering() {
        let m = array![
            [1.0, 2.0, 3.0, 4.0],
            [4.0, 3.0, 2.0, 1.0],
            [1.0, 2.0, 3.0, 5.0],
            [1.0, 1.0, 1.0, 1.0],
        ];
        let mut annotation = AnnotationTable::new();
        annotation.insert("C", "780", "DDR1", None);

        let results = correlate("A", m.view(), &ids(&["A", "B", "C", "D"]), 0.5, &annotation).unwrap();
        let order: Vec<&str> = results.iter().map(|r| r.reporter.as_str()).collect();
        // B is anti-correlated, D has no variance
        assert_eq!(order, vec!["A", "C"]);
        assert_eq!(results[1].symbol, "DDR1");
        assert_eq!(results[1].value, 0.9827);
    }

    #[test]
    fn test_strictly_greater_than_threshold() {
        let m = array![[1.0, 2.0, 3.0], [2.0, 4.0, 6.0]];
        let results = correlate("A", m.view(), &ids(&["A", "B"]), 1.0, &AnnotationTable::new()).unwrap();
        // both rows correlate exactly 1.0, which is not above 1.0
        assert!(results.is_empty());
    }

    #[test]
    fn test_missing_reporter() {
        let m = array![[1.0, 2.0]];
        let err = correlate("Z", m.view(), &ids(&["A"]), 0.9, &AnnotationTable::new()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_pearson_zero_variance_is_nan() {
        let m = array![[1.0, 2.0, 3.0], [5.0, 5.0, 5.0]];
        let r = pearson_against(m.row(0), m.view());
        assert!((r[0] - 1.0).abs() < 1e-12);
        assert!(r[1].is_nan());
    }

    #[test]
    fn test_pearson_keeps_row_order() {
        let v = array![1.0, 2.0, 3.0];
        let m = ndarray::Array2::from_shape_fn((200, 3), |(i, j)| if i % 2 == 0 { j as f64 } else { -(j as f64) });
        let r = pearson_against(v.view(), m.view());
        assert_eq!(r.len(), 200);
        for (i, c) in r.iter().enumerate() {
            let expected = if i % 2 == 0 { 1.0 } else { -1.0 };
            assert!((c - expected).abs() < 1e-12, "row {}", i);
        }
    }

    #[test]
    fn test_correlation_usable() {
        let settings = Settings::default();
        assert!(correlation_usable(10, &settings).is_ok());
        assert!(matches!(
            correlation_usable(settings.max_samples_for_correlation + 1, &settings),
            Err(DatasetError::InvalidInput { .. })
        ));
    }
}
