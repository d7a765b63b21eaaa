//! Reconciling parsed data columns with sample metadata records
//!
//! Data files and sample records are produced independently. Alignment
//! sorts the table and reorders the records so that record `i` describes
//! column `i`. Every column must resolve to exactly one record.

use super::{ExpressionTable, SampleMetadata};
use crate::error::{DatasetError, Result};
use crate::parse::ParsedExperiment;

/// Strategy deciding whether a sample record describes a data column
pub trait SampleMatcher {
    /// Record describes the data column
    fn matches_column(&self, sample: &SampleMetadata, column: &str) -> bool;

    /// Record belongs to the given platform (array design)
    fn matches_platform(&self, sample: &SampleMetadata, platform: &str) -> bool;
}

/// Matches when the record's concatenated annotations contain the column
/// name (or platform accession) as a substring
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl SampleMatcher for SubstringMatcher {
    fn matches_column(&self, sample: &SampleMetadata, column: &str) -> bool {
        sample.search_text().contains(column)
    }

    fn matches_platform(&self, sample: &SampleMetadata, platform: &str) -> bool {
        sample.search_text().contains(platform)
    }
}

/// Expression table whose columns line up with `samples`
#[derive(Debug, Clone)]
pub struct AlignedExperiment {
    pub table: ExpressionTable,
    pub samples: Vec<SampleMetadata>,
}

/// Sort the table by reporter and sample column, then pick for each column
/// the single record that matches it
pub fn sort_and_align(
    table: &ExpressionTable,
    samples: &[SampleMetadata],
    matcher: &dyn SampleMatcher,
) -> Result<AlignedExperiment> {
    let table = table.sorted()?;
    let mut aligned = Vec::with_capacity(table.n_samples());

    for column in table.samples() {
        let candidates: Vec<&SampleMetadata> = samples
            .iter()
            .filter(|s| matcher.matches_column(s, column))
            .collect();
        if candidates.len() != 1 {
            return Err(DatasetError::Alignment {
                column: column.clone(),
                matches: candidates.iter().map(|s| s.raw_id.clone()).collect(),
            });
        }
        aligned.push(candidates[0].clone());
    }

    if aligned.len() < samples.len() {
        log::debug!(
            "{} sample records have no data column",
            samples.len() - aligned.len()
        );
    }

    Ok(AlignedExperiment {
        table,
        samples: aligned,
    })
}

/// Reconcile parsed tables with the sample metadata of one platform
///
/// Per-sample tables must hold exactly one value column. Tables whose column
/// matches no record of `platform` belong to another platform of the same
/// experiment and are dropped. The rest are inner-joined on reporter id, so a
/// reporter missing from any retained sample is dropped.
pub fn align_samples(
    parsed: ParsedExperiment,
    samples: &[SampleMetadata],
    platform: &str,
    matcher: &dyn SampleMatcher,
) -> Result<AlignedExperiment> {
    let tables = match parsed {
        ParsedExperiment::Combined(table) => return sort_and_align(&table, samples, matcher),
        ParsedExperiment::PerSample(tables) => tables,
    };

    if let Some(bad) = tables.iter().find(|t| t.n_samples() != 1) {
        return Err(DatasetError::MultiColumnSampleFile {
            file: bad.samples().first().cloned().unwrap_or_default(),
            columns: bad.n_samples(),
        });
    }

    let mut kept_tables = Vec::new();
    let mut kept_samples: Vec<usize> = Vec::new();
    for table in tables {
        let column = &table.samples()[0];
        let matched: Vec<usize> = samples
            .iter()
            .enumerate()
            .filter(|(_, s)| matcher.matches_platform(s, platform) && matcher.matches_column(s, column))
            .map(|(i, _)| i)
            .collect();
        if matched.is_empty() {
            log::debug!("Column '{}' has no sample record on platform {}, dropped", column, platform);
            continue;
        }
        for i in matched {
            if !kept_samples.contains(&i) {
                kept_samples.push(i);
            }
        }
        kept_tables.push(table);
    }

    if kept_tables.is_empty() {
        return Err(DatasetError::EmptyData {
            reason: format!("No data columns match samples of platform {}", platform),
        });
    }
    log::info!("  {} sample files kept for platform {}", kept_tables.len(), platform);

    let merged = ExpressionTable::inner_join(&kept_tables)?;
    let records: Vec<SampleMetadata> = kept_samples.iter().map(|&i| samples[i].clone()).collect();
    sort_and_align(&merged, &records, matcher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn single(column: &str, reporters: &[&str], values: Vec<f64>) -> ExpressionTable {
        let n = values.len();
        ExpressionTable::new(
            ndarray::Array2::from_shape_vec((n, 1), values).unwrap(),
            ids(reporters),
            vec![column.to_string()],
        )
        .unwrap()
    }

    fn sample(raw_id: &str, platform: &str) -> SampleMetadata {
        let mut s = SampleMetadata::new(raw_id);
        s.attributes.insert("Array Design REF".to_string(), platform.to_string());
        s
    }

    #[test]
    fn test_combined_table_reorders_records() {
        let table = ExpressionTable::new(
            array![[1.0, 2.0], [3.0, 4.0]],
            ids(&["R2", "R1"]),
            ids(&["S2", "S1"]),
        )
        .unwrap();
        let samples = vec![sample("S2 brain", "A-1"), sample("S1 liver", "A-1")];

        let aligned =
            align_samples(ParsedExperiment::Combined(table), &samples, "A-1", &SubstringMatcher).unwrap();
        assert_eq!(aligned.table.samples(), &ids(&["S1", "S2"])[..]);
        assert_eq!(aligned.table.reporters(), &ids(&["R1", "R2"])[..]);
        assert_eq!(aligned.samples[0].raw_id, "S1 liver");
        assert_eq!(aligned.samples[1].raw_id, "S2 brain");
        assert_eq!(aligned.table.values()[[0, 0]], 4.0);
    }

    #[test]
    fn test_ambiguous_column_is_error() {
        let table = ExpressionTable::new(array![[1.0]], ids(&["R1"]), ids(&["S1"])).unwrap();
        let samples = vec![sample("S1 liver", "A-1"), sample("S10 brain", "A-1")];

        match align_samples(ParsedExperiment::Combined(table), &samples, "A-1", &SubstringMatcher) {
            Err(DatasetError::Alignment { column, matches }) => {
                assert_eq!(column, "S1");
                assert_eq!(matches, vec!["S1 liver", "S10 brain"]);
            }
            other => panic!("expected Alignment error, got {:?}", other),
        }
    }

    #[test]
    fn test_unmatched_column_is_error() {
        let table = ExpressionTable::new(array![[1.0]], ids(&["R1"]), ids(&["S9"])).unwrap();
        let samples = vec![sample("S1 liver", "A-1")];
        let err = sort_and_align(&table, &samples, &SubstringMatcher).unwrap_err();
        assert!(matches!(err, DatasetError::Alignment { ref matches, .. } if matches.is_empty()));
    }

    #[test]
    fn test_per_sample_inner_join_and_platform_filter() {
        let tables = vec![
            single("GSM2", &["A", "B", "D"], vec![4.0, 5.0, 6.0]),
            single("GSM1", &["A", "B", "C"], vec![1.0, 2.0, 3.0]),
            single("GSM3", &["A", "B"], vec![7.0, 8.0]),
        ];
        let samples = vec![
            sample("GSM1 liver", "A-AFFY-44"),
            sample("GSM2 brain", "A-AFFY-44"),
            sample("GSM3 heart", "A-AFFY-45"),
        ];

        let aligned =
            align_samples(ParsedExperiment::PerSample(tables), &samples, "A-AFFY-44", &SubstringMatcher)
                .unwrap();
        assert_eq!(aligned.table.reporters(), &ids(&["A", "B"])[..]);
        assert_eq!(aligned.table.samples(), &ids(&["GSM1", "GSM2"])[..]);
        assert_eq!(aligned.samples.len(), 2);
        assert_eq!(aligned.samples[0].raw_id, "GSM1 liver");
        assert_eq!(aligned.table.reporter_values("B").unwrap().to_vec(), vec![2.0, 5.0]);
    }

    #[test]
    fn test_multi_column_sample_table_rejected() {
        let table = ExpressionTable::new(array![[1.0, 0.5]], ids(&["A"]), ids(&["GSM1", "GSM1.P"])).unwrap();
        let err = align_samples(
            ParsedExperiment::PerSample(vec![table]),
            &[sample("GSM1", "A-1")],
            "A-1",
            &SubstringMatcher,
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::MultiColumnSampleFile { columns: 2, .. }));
    }

    #[test]
    fn test_no_table_on_platform() {
        let tables = vec![single("GSM1", &["A"], vec![1.0])];
        let err = align_samples(
            ParsedExperiment::PerSample(tables),
            &[sample("GSM1", "A-2")],
            "A-1",
            &SubstringMatcher,
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::EmptyData { .. }));
    }
}
