//! Expression tables, sample metadata and their reconciliation

mod align;
mod expression;
mod factors;
mod sample;

pub use align::{align_samples, sort_and_align, AlignedExperiment, SampleMatcher, SubstringMatcher};
pub use expression::{ExpressionTable, REPORTER_COLUMN};
pub use factors::{
    build_factor_assignments, display_name, factor_levels, sample_names, FactorAssignment,
    FactorLevels, FactorQuery, NOT_SPECIFIED,
};
pub use sample::{parse_sample_metadata, read_sample_metadata, write_sample_metadata, SampleMetadata};
