//! Reporter x sample expression table

use std::collections::{HashMap, HashSet};

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use crate::error::{DatasetError, Result};

/// Canonical name of the reporter-id column
pub const REPORTER_COLUMN: &str = "REPORTERS";

/// Expression values indexed by reporter (rows) and sample column (columns)
#[derive(Debug, Clone)]
pub struct ExpressionTable {
    /// Values (reporters x samples)
    values: Array2<f64>,
    /// Reporter identifiers, unique
    reporters: Vec<String>,
    /// Sample column identifiers, in column order
    samples: Vec<String>,
}

impl ExpressionTable {
    /// Create a table, checking shape and reporter uniqueness
    pub fn new(values: Array2<f64>, reporters: Vec<String>, samples: Vec<String>) -> Result<Self> {
        let (n_reporters, n_samples) = values.dim();

        if reporters.len() != n_reporters {
            return Err(DatasetError::DimensionMismatch {
                expected: format!("{} reporter IDs", n_reporters),
                got: format!("{} reporter IDs", reporters.len()),
            });
        }

        if samples.len() != n_samples {
            return Err(DatasetError::DimensionMismatch {
                expected: format!("{} sample columns", n_samples),
                got: format!("{} sample columns", samples.len()),
            });
        }

        let mut seen = HashSet::with_capacity(reporters.len());
        for id in &reporters {
            if !seen.insert(id.as_str()) {
                return Err(DatasetError::InvalidInput {
                    reason: format!("Duplicate reporter ID '{}'", id),
                });
            }
        }

        Ok(Self {
            values,
            reporters,
            samples,
        })
    }

    /// Build from row-major rows, one per reporter
    pub fn from_rows(reporters: Vec<String>, samples: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_samples = samples.len();
        let mut values = Array2::zeros((rows.len(), n_samples));
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n_samples {
                return Err(DatasetError::DimensionMismatch {
                    expected: format!("{} values for reporter {}", n_samples, reporters.get(i).map(String::as_str).unwrap_or("?")),
                    got: format!("{} values", row.len()),
                });
            }
            for (j, &v) in row.iter().enumerate() {
                values[[i, j]] = v;
            }
        }
        Self::new(values, reporters, samples)
    }

    /// Number of reporters
    pub fn n_reporters(&self) -> usize {
        self.values.nrows()
    }

    /// Number of sample columns
    pub fn n_samples(&self) -> usize {
        self.values.ncols()
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn reporters(&self) -> &[String] {
        &self.reporters
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    /// Row index of a reporter
    pub fn reporter_index(&self, reporter: &str) -> Option<usize> {
        self.reporters.iter().position(|r| r == reporter)
    }

    /// Values of one reporter across all samples, in column order
    pub fn reporter_values(&self, reporter: &str) -> Result<ArrayView1<'_, f64>> {
        self.reporter_index(reporter)
            .map(|i| self.values.row(i))
            .ok_or_else(|| DatasetError::NotFound {
                what: format!("reporter '{}'", reporter),
            })
    }

    /// Copy of the table with reporters and sample columns sorted lexicographically
    pub fn sorted(&self) -> Result<Self> {
        let mut row_order: Vec<usize> = (0..self.n_reporters()).collect();
        row_order.sort_by(|&a, &b| self.reporters[a].cmp(&self.reporters[b]));
        let mut col_order: Vec<usize> = (0..self.n_samples()).collect();
        col_order.sort_by(|&a, &b| self.samples[a].cmp(&self.samples[b]));

        let values = self
            .values
            .select(Axis(0), &row_order)
            .select(Axis(1), &col_order);
        let reporters = row_order.iter().map(|&i| self.reporters[i].clone()).collect();
        let samples = col_order.iter().map(|&j| self.samples[j].clone()).collect();

        Self::new(values, reporters, samples)
    }

    /// Merge tables side by side on reporter id, keeping only reporters
    /// present in every table. Reporter order follows the first table.
    pub fn inner_join(tables: &[ExpressionTable]) -> Result<Self> {
        let first = tables.first().ok_or_else(|| DatasetError::EmptyData {
            reason: "No tables to merge".to_string(),
        })?;

        let indices: Vec<HashMap<&str, usize>> = tables
            .iter()
            .map(|t| {
                t.reporters
                    .iter()
                    .enumerate()
                    .map(|(i, r)| (r.as_str(), i))
                    .collect()
            })
            .collect();

        let shared: Vec<&String> = first
            .reporters
            .iter()
            .filter(|r| indices.iter().all(|idx| idx.contains_key(r.as_str())))
            .collect();

        let dropped = first.n_reporters() - shared.len();
        if dropped > 0 {
            log::debug!(
                "Inner join dropped {} reporters not measured in every sample",
                dropped
            );
        }

        let samples: Vec<String> = tables.iter().flat_map(|t| t.samples.iter().cloned()).collect();
        let mut values = Array2::zeros((shared.len(), samples.len()));
        for (i, reporter) in shared.iter().enumerate() {
            let mut col = 0;
            for (table, idx) in tables.iter().zip(indices.iter()) {
                let row = table.values.row(idx[reporter.as_str()]);
                for &v in row.iter() {
                    values[[i, col]] = v;
                    col += 1;
                }
            }
        }

        Self::new(values, shared.into_iter().cloned().collect(), samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_duplicate_reporter_rejected() {
        let result = ExpressionTable::new(array![[1.0], [2.0]], ids(&["A", "A"]), ids(&["S1"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_dimension_mismatch() {
        let result = ExpressionTable::new(array![[1.0, 2.0]], ids(&["A"]), ids(&["S1"]));
        assert!(matches!(result, Err(DatasetError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_sorted_orders_rows_and_columns() {
        let table = ExpressionTable::new(
            array![[1.0, 2.0], [3.0, 4.0]],
            ids(&["B", "A"]),
            ids(&["S2", "S1"]),
        )
        .unwrap();

        let sorted = table.sorted().unwrap();
        assert_eq!(sorted.reporters(), &ids(&["A", "B"])[..]);
        assert_eq!(sorted.samples(), &ids(&["S1", "S2"])[..]);
        assert_eq!(sorted.values()[[0, 0]], 4.0);
        assert_eq!(sorted.values()[[1, 1]], 1.0);
    }

    #[test]
    fn test_inner_join_keeps_shared_reporters() {
        let a = ExpressionTable::new(
            array![[1.0], [2.0], [3.0]],
            ids(&["A", "B", "C"]),
            ids(&["S1"]),
        )
        .unwrap();
        let b = ExpressionTable::new(
            array![[4.0], [5.0], [6.0]],
            ids(&["A", "B", "D"]),
            ids(&["S2"]),
        )
        .unwrap();

        let merged = ExpressionTable::inner_join(&[a, b]).unwrap();
        assert_eq!(merged.reporters(), &ids(&["A", "B"])[..]);
        assert_eq!(merged.samples(), &ids(&["S1", "S2"])[..]);
        assert_eq!(merged.reporter_values("B").unwrap().to_vec(), vec![2.0, 5.0]);
    }

    #[test]
    fn test_reporter_values_not_found() {
        let table = ExpressionTable::new(array![[1.0]], ids(&["A"]), ids(&["S1"])).unwrap();
        let err = table.reporter_values("Z").unwrap_err();
        assert!(err.is_not_found());
    }
}
