//! Tab-delimited reporter x sample matrices
//!
//! First row: `REPORTERS`, then sample column names. Each following row: a
//! reporter id and one value per sample. Missing values are written empty
//! and read back as NaN.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};

use crate::data::{ExpressionTable, REPORTER_COLUMN};
use crate::error::{DatasetError, Result};

fn parse_cell(cell: &str, source: &str, line: usize) -> Result<f64> {
    let cell = cell.trim();
    match cell {
        "" | "NA" | "NaN" | "null" => Ok(f64::NAN),
        _ => cell.parse::<f64>().map_err(|_| DatasetError::InvalidValue {
            file: source.to_string(),
            line,
            value: cell.to_string(),
        }),
    }
}

/// Read a matrix from any reader; `source` names it in errors
pub fn read_matrix_from_reader<R: Read>(reader: R, source: &str) -> Result<ExpressionTable> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(reader);

    let samples: Vec<String> = rdr.headers()?.iter().skip(1).map(|s| s.trim().to_string()).collect();
    if samples.is_empty() {
        return Err(DatasetError::EmptyData {
            reason: format!("No sample columns in {}", source),
        });
    }

    let mut reporters = Vec::new();
    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let line = i + 2;
        let mut cells = record.iter();
        let reporter = cells.next().unwrap_or_default().trim().to_string();
        let row = cells
            .map(|c| parse_cell(c, source, line))
            .collect::<Result<Vec<f64>>>()?;
        reporters.push(reporter);
        rows.push(row);
    }

    if reporters.is_empty() {
        return Err(DatasetError::EmptyData {
            reason: format!("No reporters in {}", source),
        });
    }

    ExpressionTable::from_rows(reporters, samples, rows)
}

/// Read a matrix file
pub fn read_matrix<P: AsRef<Path>>(path: P) -> Result<ExpressionTable> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(DatasetError::NotFound {
            what: format!("matrix {}", path.display()),
        });
    }
    read_matrix_from_reader(File::open(path)?, &path.display().to_string())
}

/// Write a matrix with a `REPORTERS` header
pub fn write_matrix<W: Write>(writer: W, table: &ExpressionTable) -> Result<()> {
    let mut wtr = WriterBuilder::new().delimiter(b'\t').from_writer(writer);

    let mut header = vec![REPORTER_COLUMN.to_string()];
    header.extend(table.samples().iter().cloned());
    wtr.write_record(&header)?;

    for (reporter, row) in table.reporters().iter().zip(table.values().rows()) {
        let mut record = vec![reporter.clone()];
        record.extend(row.iter().map(|v| if v.is_nan() { String::new() } else { v.to_string() }));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_matrix() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "REPORTERS\tGSM1\tGSM2").unwrap();
        writeln!(file, "1007_s_at\t7.5\t8.25").unwrap();
        writeln!(file, "1053_at\tNA\t4").unwrap();

        let table = read_matrix(file.path()).unwrap();
        assert_eq!(table.n_reporters(), 2);
        assert_eq!(table.samples(), &["GSM1".to_string(), "GSM2".to_string()][..]);
        assert_eq!(table.reporter_values("1007_s_at").unwrap().to_vec(), vec![7.5, 8.25]);
        assert!(table.reporter_values("1053_at").unwrap()[0].is_nan());
    }

    #[test]
    fn test_bad_value_names_line() {
        let text = "REPORTERS\tS1\nA\t1\nB\tlow\n";
        match read_matrix_from_reader(text.as_bytes(), "m.tsv") {
            Err(DatasetError::InvalidValue { line, value, .. }) => {
                assert_eq!(line, 3);
                assert_eq!(value, "low");
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_write_then_read_keeps_missing_values() {
        let table = ExpressionTable::from_rows(
            vec!["A".to_string()],
            vec!["S1".to_string(), "S2".to_string()],
            vec![vec![1.5, f64::NAN]],
        )
        .unwrap();
        let mut buf = Vec::new();
        write_matrix(&mut buf, &table).unwrap();
        assert_eq!(String::from_utf8(buf.clone()).unwrap(), "REPORTERS\tS1\tS2\nA\t1.5\t\n");

        let back = read_matrix_from_reader(buf.as_slice(), "buf").unwrap();
        assert!(back.reporter_values("A").unwrap()[1].is_nan());
    }

    #[test]
    fn test_missing_file() {
        assert!(read_matrix("/nonexistent/matrix.tsv").unwrap_err().is_not_found());
    }
}
