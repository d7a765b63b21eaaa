//! biogps_dataset: expression datasets for BioGPS
//!
//! Parses processed microarray data files in their several layouts,
//! reconciles data columns with sample metadata, derives display order and
//! colour groups from sample factors, and aggregates per-reporter chart
//! series. A separate path ranks reporters by Pearson correlation against a
//! stored reporter matrix.
//!
//! # Example
//!
//! ```ignore
//! use biogps_dataset::prelude::*;
//!
//! let files = load_data_files("E-GEOD-15568/A-AFFY-44")?;
//! let samples = read_sample_metadata("samples.json")?;
//! let aligned = parse_experiment(&files, &samples, "A-AFFY-44")?;
//!
//! let query = FactorQuery::grouped("organism part").collapsed(true);
//! let assignments = build_factor_assignments(&aligned.samples, &query)?;
//! let series = aggregate_reporters(&aligned.table, &["1007_s_at".to_string()], &assignments)?;
//! ```

pub mod annotation;
pub mod chart;
pub mod checker;
pub mod cli;
pub mod config;
pub mod correlation;
pub mod data;
pub mod error;
pub mod io;
pub mod parse;
pub mod stats;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::annotation::{AnnotationTable, GeneAnnotation, ReporterAnnotation};
    pub use crate::chart::{aggregate_chart_series, aggregate_reporters, chart_guides, ChartGuides, ChartPoint};
    pub use crate::checker::{check_experiment, check_processed, ExperimentCheck, ProcessedCheck};
    pub use crate::config::Settings;
    pub use crate::correlation::{correlate, correlate_table, correlation_usable, CorrelationResult};
    pub use crate::data::{
        build_factor_assignments, display_name, factor_levels, read_sample_metadata, sample_names,
        write_sample_metadata, AlignedExperiment, ExpressionTable, FactorAssignment, FactorLevels, FactorQuery,
        SampleMetadata,
    };
    pub use crate::error::{DatasetError, Result};
    pub use crate::io::{
        load_data_files, read_experiment_platforms, read_matrix, write_correlation_csv, write_correlation_json,
        write_faceted_csv, write_matrix, write_sample_table, write_series_csv, write_series_json,
    };
    pub use crate::parse::{check_dialect, parse_experiment, RawDataFile};
}
