//! Processed-data dialects and experiment file parsing

mod dialect;
mod experiment;

pub use dialect::{check_dialect, header_tokens, Dialect, DialectDescriptor, JUNK_CALL_LABELS};
pub use experiment::{
    parse_experiment, parse_experiment_with, DataLayout, ExperimentParser, LayoutOutcome,
    ParsedExperiment, RawDataFile,
};
