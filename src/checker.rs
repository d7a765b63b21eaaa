//! Pre-flight check of a downloaded experiment before it is parsed
//!
//! Layout on disk: `<dir>/experiment` holds the experiment description and
//! `<dir>/<platform>/processed_*` the processed-data files of each platform.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Serialize;

use crate::error::{DatasetError, Result};
use crate::io::{list_processed_files, read_experiment_platforms};
use crate::parse::{check_dialect, DialectDescriptor};

/// Header summary of a platform's processed-data files
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedCheck {
    pub platform: String,
    pub files: usize,
    /// Descriptor of the last file checked
    pub last: DialectDescriptor,
    /// Value columns across all files, reporter columns excluded
    pub value_columns: usize,
}

/// Outcome of checking one experiment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentCheck {
    pub accession: String,
    pub platforms: Vec<String>,
    pub processed: ProcessedCheck,
}

fn first_line(path: &Path) -> Result<String> {
    let mut line = String::new();
    BufReader::new(File::open(path)?).read_line(&mut line)?;
    Ok(line)
}

/// Run the dialect check over every processed file of `<dir>/<platform>/`
///
/// Stops at the first file whose header is not recognized.
pub fn check_processed<P: AsRef<Path>>(dir: P, platform: &str) -> Result<ProcessedCheck> {
    let platform_dir = dir.as_ref().join(platform);
    let files = list_processed_files(&platform_dir)?;

    let mut last = None;
    let mut value_columns = 0;
    for path in &files {
        let descriptor = check_dialect(&first_line(path)?).map_err(|e| {
            log::error!("{}: {}", path.display(), e);
            e
        })?;
        value_columns += descriptor.valid_column_count - 1;
        last = Some(descriptor);
    }

    let last = last.ok_or_else(|| DatasetError::EmptyData {
        reason: format!("No processed files in {}", platform_dir.display()),
    })?;
    log::info!(
        "{} processed files on {}, {} value columns",
        files.len(),
        platform,
        value_columns
    );

    Ok(ProcessedCheck {
        platform: platform.to_string(),
        files: files.len(),
        last,
        value_columns,
    })
}

/// Resolve the experiment's platform and check its processed files
///
/// Without an explicit platform the experiment must have exactly one.
pub fn check_experiment<P: AsRef<Path>>(dir: P, accession: &str, platform: Option<&str>) -> Result<ExperimentCheck> {
    let dir = dir.as_ref();
    log::info!("--- check experiment {} ---", accession);

    if !dir.is_dir() {
        return Err(DatasetError::NotFound {
            what: format!("experiment directory {}", dir.display()),
        });
    }
    let platforms = read_experiment_platforms(dir.join("experiment"), accession)?;

    let platform = match platform {
        Some(p) => p.to_string(),
        None => match platforms.as_slice() {
            [only] => only.clone(),
            [] => {
                return Err(DatasetError::EmptyData {
                    reason: format!("Experiment {} lists no platform", accession),
                })
            }
            _ => {
                return Err(DatasetError::InvalidInput {
                    reason: format!(
                        "Experiment {} has platforms {}; specify one",
                        accession,
                        platforms.join(", ")
                    ),
                })
            }
        },
    };

    let processed = check_processed(dir, &platform)?;
    Ok(ExperimentCheck {
        accession: accession.to_string(),
        platforms,
        processed,
    })
}
