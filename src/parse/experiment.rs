//! Reading processed experiment data files into expression tables
//!
//! Candidate layouts are probed in order; the first whose header check
//! accepts the files parses them. A layout that does not apply reports
//! `LayoutOutcome::NoMatch` so that "try the next one" and "this file is
//! broken" stay distinguishable.

use crate::data::{align_samples, AlignedExperiment, ExpressionTable, SampleMatcher, SampleMetadata, SubstringMatcher};
use crate::error::{DatasetError, Result};

use super::dialect::{check_dialect, header_tokens};

/// One fully buffered processed-data file
#[derive(Debug, Clone)]
pub struct RawDataFile {
    /// Sample or file identifier the content was stored under
    pub id: String,
    /// Whole file content
    pub content: String,
}

impl RawDataFile {
    pub fn new(id: &str, content: &str) -> Self {
        Self {
            id: id.to_string(),
            content: content.to_string(),
        }
    }

    /// First line of the file (empty for an empty file)
    pub fn header_line(&self) -> &str {
        self.content.lines().next().unwrap_or_default()
    }

    /// Sample column name: identifier up to the first `_`, else up to the first `.`
    pub fn sample_column_name(&self) -> &str {
        let cut = if self.id.contains('_') { '_' } else { '.' };
        self.id.split(cut).next().unwrap_or(&self.id)
    }

    /// Non-blank lines after `skip` header lines, with 1-based line numbers
    fn data_lines(&self, skip: usize) -> impl Iterator<Item = (usize, &str)> {
        self.content
            .lines()
            .enumerate()
            .skip(skip)
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| (i + 1, line))
    }
}

/// Tables produced by a layout before they are reconciled with sample metadata
#[derive(Debug, Clone)]
pub enum ParsedExperiment {
    /// A single file holding every sample as a column
    Combined(ExpressionTable),
    /// One table per sample file
    PerSample(Vec<ExpressionTable>),
}

/// Result of probing one layout
#[derive(Debug)]
pub enum LayoutOutcome {
    Parsed(ParsedExperiment),
    NoMatch,
}

/// A header predicate paired with the parser for files it accepts
#[derive(Clone, Copy)]
pub struct DataLayout {
    pub name: &'static str,
    /// Inspects the header tokens of the first file; only the leading token decides
    pub accepts: fn(&[&str]) -> bool,
    pub parse: fn(&[RawDataFile]) -> Result<ParsedExperiment>,
}

impl DataLayout {
    /// One file with all samples as columns, two header rows
    pub fn combined() -> Self {
        Self {
            name: "combined",
            accepts: |header| matches!(header.first(), Some(&"Scan REF") | Some(&"Hybridization REF")),
            parse: parse_combined,
        }
    }

    /// One file per sample
    pub fn per_sample() -> Self {
        Self {
            name: "per-sample",
            accepts: |header| matches!(header.first(), Some(&"ID_REF") | Some(&"CompositeSequence Identifier")),
            parse: parse_per_sample,
        }
    }

    /// Parse the files if this layout accepts the first file's header
    pub fn probe(&self, files: &[RawDataFile]) -> Result<LayoutOutcome> {
        let first = match files.first() {
            Some(f) => f,
            None => return Ok(LayoutOutcome::NoMatch),
        };
        if !(self.accepts)(&header_tokens(first.header_line())) {
            return Ok(LayoutOutcome::NoMatch);
        }
        log::info!("Experiment data recognized as {} layout", self.name);
        (self.parse)(files).map(LayoutOutcome::Parsed)
    }
}

/// Probes an ordered list of layouts
pub struct ExperimentParser {
    layouts: Vec<DataLayout>,
}

impl Default for ExperimentParser {
    fn default() -> Self {
        Self::new(vec![DataLayout::combined(), DataLayout::per_sample()])
    }
}

impl ExperimentParser {
    pub fn new(layouts: Vec<DataLayout>) -> Self {
        Self { layouts }
    }

    /// Parse with the first layout that accepts the files
    pub fn parse(&self, files: &[RawDataFile]) -> Result<ParsedExperiment> {
        for layout in &self.layouts {
            if let LayoutOutcome::Parsed(parsed) = layout.probe(files)? {
                return Ok(parsed);
            }
        }
        Err(DatasetError::UnrecognizedExperimentData {
            files: files.iter().map(|f| f.id.clone()).collect(),
        })
    }
}

/// Parse experiment files and reconcile them with the sample metadata
/// using the default layouts and substring matching
pub fn parse_experiment(
    files: &[RawDataFile],
    samples: &[SampleMetadata],
    platform: &str,
) -> Result<AlignedExperiment> {
    parse_experiment_with(&ExperimentParser::default(), &SubstringMatcher, files, samples, platform)
}

/// Parse and align with an explicit layout list and matching strategy
pub fn parse_experiment_with(
    parser: &ExperimentParser,
    matcher: &dyn SampleMatcher,
    files: &[RawDataFile],
    samples: &[SampleMetadata],
    platform: &str,
) -> Result<AlignedExperiment> {
    let parsed = parser.parse(files)?;
    align_samples(parsed, samples, platform, matcher)
}

/// Strip surrounding quotes from a field
fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    if s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')))
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Parse one numeric cell; missing-value markers become NaN
fn parse_value(raw: &str, file: &str, line: usize) -> Result<f64> {
    let text = strip_quotes(raw);
    match text {
        "" | "NA" | "NaN" | "nan" | "null" | "NULL" | "N/A" => Ok(f64::NAN),
        _ => text.parse::<f64>().map_err(|_| DatasetError::InvalidValue {
            file: file.to_string(),
            line,
            value: text.to_string(),
        }),
    }
}

/// Read reporter rows, keeping the first `valid_columns` fields of each line
fn read_rows(
    file: &RawDataFile,
    skip: usize,
    valid_columns: usize,
) -> Result<(Vec<String>, Vec<Vec<f64>>)> {
    let mut reporters = Vec::new();
    let mut rows = Vec::new();

    for (line_no, line) in file.data_lines(skip) {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < valid_columns {
            return Err(DatasetError::DimensionMismatch {
                expected: format!("{} columns in '{}' line {}", valid_columns, file.id, line_no),
                got: format!("{} columns", fields.len()),
            });
        }
        reporters.push(strip_quotes(fields[0]).to_string());
        let values = fields[1..valid_columns]
            .iter()
            .map(|v| parse_value(v, &file.id, line_no))
            .collect::<Result<Vec<f64>>>()?;
        rows.push(values);
    }

    if reporters.is_empty() {
        return Err(DatasetError::EmptyData {
            reason: format!("No reporter rows in '{}'", file.id),
        });
    }
    Ok((reporters, rows))
}

fn parse_combined(files: &[RawDataFile]) -> Result<ParsedExperiment> {
    let file = files.first().ok_or_else(|| DatasetError::EmptyData {
        reason: "No data files".to_string(),
    })?;
    if files.len() > 1 {
        log::warn!(
            "Combined layout reads '{}' only; {} other files ignored",
            file.id,
            files.len() - 1
        );
    }

    let descriptor = check_dialect(file.header_line())?;
    let header = header_tokens(file.header_line());
    let samples: Vec<String> = header[1..descriptor.valid_column_count]
        .iter()
        .map(|s| strip_quotes(s).to_string())
        .collect();

    let (reporters, rows) = read_rows(file, descriptor.header_skip_rows, descriptor.valid_column_count)?;
    log::info!("  {} reporters, {} samples", reporters.len(), samples.len());

    ExpressionTable::from_rows(reporters, samples, rows).map(ParsedExperiment::Combined)
}

fn parse_per_sample(files: &[RawDataFile]) -> Result<ParsedExperiment> {
    let mut tables = Vec::with_capacity(files.len());

    for file in files {
        let descriptor = check_dialect(file.header_line())?;
        if descriptor.dialect.is_combined() {
            return Err(DatasetError::InvalidInput {
                reason: format!(
                    "'{}' uses the combined '{}' layout among per-sample files",
                    file.id,
                    descriptor.dialect.token()
                ),
            });
        }

        // reporter and first value column only; call flags and p-values are dropped
        let column = file.sample_column_name();
        let samples = vec![column.to_string()];
        let (reporters, rows) = read_rows(file, descriptor.header_skip_rows, 2)?;
        log::debug!("  {}: {} reporters as column '{}'", file.id, reporters.len(), column);
        tables.push(ExpressionTable::from_rows(reporters, samples, rows)?);
    }

    Ok(ParsedExperiment::PerSample(tables))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_file_skips_two_header_lines() {
        let file = RawDataFile::new(
            "E-MTAB-1169.processed.txt",
            "Hybridization REF\tS2\tS1\nComposite Element REF\tvalue\tvalue\nR2\t3.5\t4.0\nR1\t1.0\t2.0\n",
        );

        let parsed = ExperimentParser::default().parse(&[file]).unwrap();
        let table = match parsed {
            ParsedExperiment::Combined(t) => t,
            other => panic!("expected combined table, got {:?}", other),
        };
        assert_eq!(table.samples(), &["S2".to_string(), "S1".to_string()][..]);
        assert_eq!(table.n_reporters(), 2);
        assert_eq!(table.reporter_values("R1").unwrap().to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_per_sample_files_named_by_identifier() {
        let a = RawDataFile::new("GSM101_sample_table.txt", "ID_REF\tVALUE\nA\t1.5\nB\t2.5\n");
        let b = RawDataFile::new("GSM102.txt", "ID_REF\tVALUE\tABS_CALL\nA\t3.0\tP\nB\tnull\tA\n");

        let parsed = ExperimentParser::default().parse(&[a, b]).unwrap();
        let tables = match parsed {
            ParsedExperiment::PerSample(t) => t,
            other => panic!("expected per-sample tables, got {:?}", other),
        };
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].samples(), &["GSM101".to_string()][..]);
        assert_eq!(tables[1].samples(), &["GSM102".to_string()][..]);
        // call flags are not read as values
        assert_eq!(tables[1].n_samples(), 1);
        assert!(tables[1].reporter_values("B").unwrap()[0].is_nan());
    }

    #[test]
    fn test_per_sample_file_reads_first_value_column_only() {
        let f = RawDataFile::new("GSM7.txt", "ID_REF\tVALUE\tDETECTION P-VALUE\nA\t1\t0.01\nB\t2\t0.5\n");
        let parsed = ExperimentParser::default().parse(&[f]).unwrap();
        match parsed {
            ParsedExperiment::PerSample(t) => {
                assert_eq!(t[0].samples(), &["GSM7".to_string()][..]);
                assert_eq!(t[0].reporter_values("B").unwrap().to_vec(), vec![2.0]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_per_sample_files_with_detection_columns_align() {
        let samples = crate::data::parse_sample_metadata(
            r#"[
            {"GSM1 liver": {"factorvalue": {"organism part": "liver"}, "Array Design REF": "A-AFFY-44"}},
            {"GSM2 brain": {"factorvalue": {"organism part": "brain"}, "Array Design REF": "A-AFFY-44"}}
        ]"#,
        )
        .unwrap();
        let files = [
            RawDataFile::new("GSM1_sample_table.txt", "ID_REF\tVALUE\tDETECTION P-VALUE\nA\t1\t0.01\nB\t2\t0.02\n"),
            RawDataFile::new("GSM2_sample_table.txt", "ID_REF\tVALUE\tDETECTION P-VALUE\nA\t3\t0.03\nB\t4\t0.04\n"),
        ];

        let aligned = parse_experiment(&files, &samples, "A-AFFY-44").unwrap();
        assert_eq!(aligned.table.samples(), &["GSM1".to_string(), "GSM2".to_string()][..]);
        assert_eq!(aligned.table.reporter_values("B").unwrap().to_vec(), vec![2.0, 4.0]);
    }

    #[test]
    fn test_combined_token_outside_first_column_is_no_match() {
        let f = RawDataFile::new("x.txt", "Probe\tScan REF\nA\t1\n");
        assert!(matches!(DataLayout::combined().probe(&[f.clone()]).unwrap(), LayoutOutcome::NoMatch));
        assert!(matches!(
            ExperimentParser::default().parse(&[f]),
            Err(DatasetError::UnrecognizedExperimentData { .. })
        ));
    }

    #[test]
    fn test_unrecognized_experiment_data() {
        let f = RawDataFile::new("x.txt", "Probe\tS1\nA\t1\n");
        match ExperimentParser::default().parse(&[f]) {
            Err(DatasetError::UnrecognizedExperimentData { files }) => assert_eq!(files, vec!["x.txt"]),
            other => panic!("expected UnrecognizedExperimentData, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_value_reports_location() {
        let f = RawDataFile::new("GSM9.txt", "ID_REF\tVALUE\nA\t1\nB\tabc\n");
        match ExperimentParser::default().parse(&[f]) {
            Err(DatasetError::InvalidValue { file, line, value }) => {
                assert_eq!(file, "GSM9.txt");
                assert_eq!(line, 3);
                assert_eq!(value, "abc");
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_layout_list() {
        let only_combined = ExperimentParser::new(vec![DataLayout::combined()]);
        let f = RawDataFile::new("GSM1.txt", "ID_REF\tVALUE\nA\t1\n");
        assert!(only_combined.parse(&[f.clone()]).is_err());
        assert!(matches!(
            DataLayout::per_sample().probe(&[f]).unwrap(),
            LayoutOutcome::Parsed(_)
        ));
    }

    #[test]
    fn test_sample_column_name() {
        assert_eq!(RawDataFile::new("GSM1_a.b", "").sample_column_name(), "GSM1");
        assert_eq!(RawDataFile::new("GSM1.txt", "").sample_column_name(), "GSM1");
        assert_eq!(RawDataFile::new("GSM1", "").sample_column_name(), "GSM1");
    }
}
