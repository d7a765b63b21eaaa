//! Gene annotation lookup: reporter <-> gene id / symbol / taxonomy

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Gene a reporter resolves to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReporterAnnotation {
    pub reporter: String,
    pub gene_id: String,
    pub symbol: String,
}

/// External gene-annotation service
///
/// Implementations backed by a remote service report failures as
/// `DatasetError::Upstream`; retry policy belongs to the caller.
pub trait GeneAnnotation {
    /// Reporters measuring a gene; `None` when the gene is unknown
    fn reporters_for_gene(&self, gene_id: &str) -> Result<Option<Vec<String>>>;

    /// Batch resolution, one entry per requested reporter in request order
    fn resolve_reporters(&self, reporters: &[String]) -> Result<Vec<Option<ReporterAnnotation>>>;

    /// NCBI taxonomy id of the gene's species
    fn taxonomy_id(&self, gene_id: &str) -> Result<Option<u32>>;
}

#[derive(Debug, Deserialize)]
struct AnnotationRow {
    reporter: String,
    gene_id: String,
    symbol: String,
    #[serde(default)]
    taxid: Option<u32>,
}

/// In-memory annotation loaded from a tab-delimited table with columns
/// `reporter, gene_id, symbol[, taxid]`
#[derive(Debug, Clone, Default)]
pub struct AnnotationTable {
    by_reporter: HashMap<String, (String, String)>,
    by_gene: HashMap<String, Vec<String>>,
    taxa: HashMap<String, u32>,
}

impl AnnotationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one reporter -> gene mapping; the first mapping of a reporter wins
    pub fn insert(&mut self, reporter: &str, gene_id: &str, symbol: &str, taxid: Option<u32>) {
        self.by_reporter
            .entry(reporter.to_string())
            .or_insert_with(|| (gene_id.to_string(), symbol.to_string()));
        let reporters = self.by_gene.entry(gene_id.to_string()).or_default();
        if !reporters.iter().any(|r| r == reporter) {
            reporters.push(reporter.to_string());
        }
        if let Some(t) = taxid {
            self.taxa.insert(gene_id.to_string(), t);
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut table = Self::new();
        for row in rdr.deserialize() {
            let row: AnnotationRow = row?;
            table.insert(&row.reporter, &row.gene_id, &row.symbol, row.taxid);
        }
        log::debug!(
            "Loaded annotation for {} reporters, {} genes",
            table.by_reporter.len(),
            table.by_gene.len()
        );
        Ok(table)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(File::open(path)?)
    }
}

impl GeneAnnotation for AnnotationTable {
    fn reporters_for_gene(&self, gene_id: &str) -> Result<Option<Vec<String>>> {
        Ok(self.by_gene.get(gene_id).cloned())
    }

    fn resolve_reporters(&self, reporters: &[String]) -> Result<Vec<Option<ReporterAnnotation>>> {
        Ok(reporters
            .iter()
            .map(|r| {
                self.by_reporter.get(r).map(|(gene_id, symbol)| ReporterAnnotation {
                    reporter: r.clone(),
                    gene_id: gene_id.clone(),
                    symbol: symbol.clone(),
                })
            })
            .collect())
    }

    fn taxonomy_id(&self, gene_id: &str) -> Result<Option<u32>> {
        Ok(self.taxa.get(gene_id).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "reporter\tgene_id\tsymbol\ttaxid\n\
        1007_s_at\t780\tDDR1\t9606\n\
        1053_at\t5982\tRFC2\t9606\n\
        201909_at\t780\tDDR1\n";

    #[test]
    fn test_reporters_for_gene() {
        let table = AnnotationTable::from_reader(TABLE.as_bytes()).unwrap();
        assert_eq!(
            table.reporters_for_gene("780").unwrap(),
            Some(vec!["1007_s_at".to_string(), "201909_at".to_string()])
        );
        assert_eq!(table.reporters_for_gene("1").unwrap(), None);
    }

    #[test]
    fn test_resolve_keeps_request_order_and_gaps() {
        let table = AnnotationTable::from_reader(TABLE.as_bytes()).unwrap();
        let resolved = table
            .resolve_reporters(&["1053_at".to_string(), "AFFX-x".to_string()])
            .unwrap();
        assert_eq!(resolved[0].as_ref().unwrap().symbol, "RFC2");
        assert!(resolved[1].is_none());
    }

    #[test]
    fn test_taxonomy_id() {
        let table = AnnotationTable::from_reader(TABLE.as_bytes()).unwrap();
        assert_eq!(table.taxonomy_id("5982").unwrap(), Some(9606));
        assert_eq!(table.taxonomy_id("0").unwrap(), None);
    }
}
