//! Loading processed-data files from an experiment platform directory

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DatasetError, Result};
use crate::parse::RawDataFile;

/// File-name prefix of processed-data files
pub const PROCESSED_PREFIX: &str = "processed_";

/// Processed-data files in `dir`, sorted by file name
pub fn list_processed_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(DatasetError::NotFound {
            what: format!("directory {}", dir.display()),
        });
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_processed = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(PROCESSED_PREFIX));
        if is_processed && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Read every processed-data file in `dir` into memory
///
/// File ids drop the `processed_` prefix so that the remainder names the
/// sample (`processed_GSM1_sample_table.txt` -> `GSM1_sample_table.txt`).
pub fn load_data_files<P: AsRef<Path>>(dir: P) -> Result<Vec<RawDataFile>> {
    let paths = list_processed_files(&dir)?;
    if paths.is_empty() {
        return Err(DatasetError::EmptyData {
            reason: format!("No {}* files in {}", PROCESSED_PREFIX, dir.as_ref().display()),
        });
    }

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = fs::read(&path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let id = name.strip_prefix(PROCESSED_PREFIX).unwrap_or(name);
        files.push(RawDataFile::new(id, &String::from_utf8_lossy(&bytes)));
    }
    log::info!("Loaded {} data files from {}", files.len(), dir.as_ref().display());
    Ok(files)
}
