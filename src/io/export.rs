//! Writers for the tabular and JSON shapes served to the front end

use std::collections::BTreeMap;
use std::io::Write;

use csv::WriterBuilder;
use serde::Serialize;

use crate::chart::{ChartGuides, ChartPoint};
use crate::correlation::CorrelationResult;
use crate::data::{display_name, ExpressionTable};
use crate::error::{DatasetError, Result};

fn cell(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else {
        v.to_string()
    }
}

/// Sample-by-reporter table: header `Samples,<reporter...>`, one row per
/// sample labelled with its display name
pub fn write_sample_table<W: Write>(
    writer: W,
    table: &ExpressionTable,
    names: &[String],
    reporters: &[String],
) -> Result<()> {
    if names.len() != table.n_samples() {
        return Err(DatasetError::DimensionMismatch {
            expected: format!("{} sample names", table.n_samples()),
            got: format!("{} sample names", names.len()),
        });
    }
    let rows = reporters
        .iter()
        .map(|r| table.reporter_values(r))
        .collect::<Result<Vec<_>>>()?;

    let mut wtr = WriterBuilder::new().from_writer(writer);
    let mut header = vec!["Samples".to_string()];
    header.extend(reporters.iter().cloned());
    wtr.write_record(&header)?;

    for (j, name) in names.iter().enumerate() {
        let mut record = vec![display_name(name).to_string()];
        record.extend(rows.iter().map(|row| cell(row[j])));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct SeriesDocument<'a> {
    faceted_values: &'a BTreeMap<String, Vec<ChartPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    guides: Option<&'a BTreeMap<String, ChartGuides>>,
}

/// Chart series keyed by reporter under `faceted_values`, with optional guides
pub fn write_series_json<W: Write>(
    writer: W,
    faceted: &BTreeMap<String, Vec<ChartPoint>>,
    guides: Option<&BTreeMap<String, ChartGuides>>,
) -> Result<()> {
    let doc = SeriesDocument {
        faceted_values: faceted,
        guides,
    };
    serde_json::to_writer_pretty(writer, &doc)?;
    Ok(())
}

fn point_record(p: &ChartPoint) -> [String; 5] {
    [
        p.name.clone(),
        p.order_idx.to_string(),
        p.color_idx.to_string(),
        cell(p.value),
        cell(p.dev),
    ]
}

/// One series as CSV: `name,order_idx,color_idx,value,dev`
pub fn write_series_csv<W: Write>(writer: W, series: &[ChartPoint]) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(["name", "order_idx", "color_idx", "value", "dev"])?;
    for point in series {
        wtr.write_record(&point_record(point))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Several series as one CSV with a leading `reporter` column
pub fn write_faceted_csv<W: Write>(writer: W, faceted: &BTreeMap<String, Vec<ChartPoint>>) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(["reporter", "name", "order_idx", "color_idx", "value", "dev"])?;
    for (reporter, series) in faceted {
        for p in series {
            let mut record = vec![reporter.clone()];
            record.extend(point_record(p));
            wtr.write_record(&record)?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Correlation results as a JSON array
pub fn write_correlation_json<W: Write>(writer: W, results: &[CorrelationResult]) -> Result<()> {
    serde_json::to_writer_pretty(writer, results)?;
    Ok(())
}

/// Correlation results as CSV: `id,reporter,symbol,value`
pub fn write_correlation_csv<W: Write>(writer: W, results: &[CorrelationResult]) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(["id", "reporter", "symbol", "value"])?;
    for r in results {
        wtr.write_record(&[r.id.clone(), r.reporter.clone(), r.symbol.clone(), cell(r.value)])?;
    }
    wtr.flush()?;
    Ok(())
}
