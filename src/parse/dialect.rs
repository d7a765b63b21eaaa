//! Recognition of processed-data file layouts from their first header line
//!
//! | leading token                   | skip | value columns kept |
//! |---------------------------------|------|--------------------|
//! | `Scan REF`                      | 2    | all                |
//! | `Hybridization REF`             | 2    | all                |
//! | `ID_REF` + call flag in col 3   | 1    | 2                  |
//! | `ID_REF`                        | 1    | all                |
//! | `CompositeSequence Identifier`  | 1    | 2                  |
//!
//! Anything else is rejected; there is no fallback guess.

use serde::Serialize;

use crate::error::{DatasetError, Result};

/// Third-column labels marking categorical detection calls rather than values
pub const JUNK_CALL_LABELS: [&str; 2] = ["ABS_CALL", "4w50nM-3 call"];

/// Known processed-data layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Dialect {
    /// Combined file, two header rows (E-GEOD-4006 style)
    ScanRef,
    /// Combined file, two header rows (E-MTAB-1169 style)
    HybridizationRef,
    /// One sample per file followed by call-flag columns (E-GEOD-26688 style)
    IdRefWithCalls,
    /// One header row, the common case (E-GEOD-15568 style)
    IdRef,
    /// One sample per file (E-MEXP-3476 style)
    CompositeSequence,
}

impl Dialect {
    /// Leading header token identifying the dialect
    pub fn token(&self) -> &'static str {
        match self {
            Dialect::ScanRef => "Scan REF",
            Dialect::HybridizationRef => "Hybridization REF",
            Dialect::IdRefWithCalls | Dialect::IdRef => "ID_REF",
            Dialect::CompositeSequence => "CompositeSequence Identifier",
        }
    }

    /// Whether files of this dialect hold every sample as a column
    pub fn is_combined(&self) -> bool {
        matches!(self, Dialect::ScanRef | Dialect::HybridizationRef)
    }
}

/// Skip and column rules derived from a header line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DialectDescriptor {
    pub dialect: Dialect,
    /// Lines to skip before data rows start
    pub header_skip_rows: usize,
    /// Leading columns holding usable data (reporter column included)
    pub valid_column_count: usize,
}

/// Split a tab-delimited header line into its tokens, ignoring the line ending
pub fn header_tokens(header_line: &str) -> Vec<&str> {
    header_line.trim_end_matches(['\r', '\n']).split('\t').collect()
}

/// Classify a processed-data file by its first line
pub fn check_dialect(header_line: &str) -> Result<DialectDescriptor> {
    let tokens = header_tokens(header_line);
    let total = tokens.len();
    let first = tokens.first().copied().unwrap_or_default();

    let (dialect, header_skip_rows, valid_column_count) = match first {
        "Scan REF" => (Dialect::ScanRef, 2, total),
        "Hybridization REF" => (Dialect::HybridizationRef, 2, total),
        "ID_REF" if tokens.get(2).is_some_and(|t| JUNK_CALL_LABELS.contains(t)) => {
            (Dialect::IdRefWithCalls, 1, 2)
        }
        "ID_REF" => (Dialect::IdRef, 1, total),
        "CompositeSequence Identifier" => (Dialect::CompositeSequence, 1, 2),
        other => {
            log::error!("Cannot recognize processed data format (leading token '{}')", other);
            return Err(DatasetError::UnrecognizedFormat {
                token: other.to_string(),
            });
        }
    };

    log::debug!(
        "Header '{}': skip {} lines, {} valid columns",
        first,
        header_skip_rows,
        valid_column_count
    );

    Ok(DialectDescriptor {
        dialect,
        header_skip_rows,
        valid_column_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(line: &str) -> (usize, usize) {
        let d = check_dialect(line).unwrap();
        (d.header_skip_rows, d.valid_column_count)
    }

    #[test]
    fn test_two_line_headers() {
        assert_eq!(rules("Scan REF\tS1\tS2\tS3\n"), (2, 4));
        assert_eq!(rules("Hybridization REF\tS1\tS2"), (2, 3));
    }

    #[test]
    fn test_id_ref_with_call_column_truncates() {
        let d = check_dialect("ID_REF\tVALUE\tABS_CALL\tDETECTION P-VALUE\n").unwrap();
        assert_eq!(d.dialect, Dialect::IdRefWithCalls);
        assert_eq!((d.header_skip_rows, d.valid_column_count), (1, 2));
        assert_eq!(rules("ID_REF\tVALUE\t4w50nM-3 call"), (1, 2));
    }

    #[test]
    fn test_plain_id_ref_keeps_all_columns() {
        assert_eq!(rules("ID_REF\tVALUE\r\n"), (1, 2));
        assert_eq!(rules("ID_REF\tVALUE\tDETECTION P-VALUE"), (1, 3));
    }

    #[test]
    fn test_composite_sequence() {
        assert_eq!(rules("CompositeSequence Identifier\tvalue\tother"), (1, 2));
    }

    #[test]
    fn test_unknown_token_is_error() {
        match check_dialect("Reporter\tS1") {
            Err(DatasetError::UnrecognizedFormat { token }) => assert_eq!(token, "Reporter"),
            other => panic!("expected UnrecognizedFormat, got {:?}", other),
        }
        assert!(check_dialect("").is_err());
        // token must lead the line
        assert!(check_dialect("S1\tID_REF").is_err());
    }
}
