//! Input/Output: raw data files, experiment info, reporter matrices and exports

mod experiment_info;
mod export;
mod files;
mod matrix;

pub use experiment_info::{experiment_platforms, read_experiment_platforms};
pub use export::{
    write_correlation_csv, write_correlation_json, write_faceted_csv, write_sample_table, write_series_csv,
    write_series_json,
};
pub use files::{list_processed_files, load_data_files, PROCESSED_PREFIX};
pub use matrix::{read_matrix, read_matrix_from_reader, write_matrix};
