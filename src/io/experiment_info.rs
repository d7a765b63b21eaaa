//! Platform (array design) accessions from an experiment description
//!
//! The description is JSON shaped like
//! `{"experiments": {"total": n, "experiment": <record or [records]>}}`,
//! where each record's `arraydesign` is itself one object or a list.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{DatasetError, Result};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExperimentInfo {
    experiments: Experiments,
}

#[derive(Debug, Deserialize)]
struct Experiments {
    #[serde(default)]
    total: u64,
    experiment: OneOrMany<ExperimentRecord>,
}

#[derive(Debug, Deserialize)]
struct ExperimentRecord {
    #[serde(default)]
    accession: String,
    arraydesign: OneOrMany<ArrayDesign>,
}

#[derive(Debug, Deserialize)]
struct ArrayDesign {
    accession: String,
}

/// Platform accessions of `accession`, in listed order
///
/// When the description holds several experiments, the one whose accession
/// matches is used.
pub fn experiment_platforms(json: &str, accession: &str) -> Result<Vec<String>> {
    let info: ExperimentInfo = serde_json::from_str(json)?;
    let total = info.experiments.total;
    let mut records = info.experiments.experiment.into_vec();

    let record = if total > 1 || records.len() > 1 {
        let pos = records
            .iter()
            .position(|r| r.accession == accession)
            .ok_or_else(|| DatasetError::NotFound {
                what: format!("experiment {} in experiment description", accession),
            })?;
        records.swap_remove(pos)
    } else {
        records.pop().ok_or_else(|| DatasetError::EmptyData {
            reason: "Experiment description lists no experiment".to_string(),
        })?
    };

    Ok(record
        .arraydesign
        .into_vec()
        .into_iter()
        .map(|a| a.accession)
        .collect())
}

/// [`experiment_platforms`] over a description file
pub fn read_experiment_platforms<P: AsRef<Path>>(path: P, accession: &str) -> Result<Vec<String>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(DatasetError::NotFound {
            what: format!("experiment description {}", path.display()),
        });
    }
    experiment_platforms(&fs::read_to_string(path)?, accession)
}
