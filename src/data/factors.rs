//! Display ordering, colour grouping and naming derived from sample factors

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use super::SampleMetadata;
use crate::error::{DatasetError, Result};

/// Placeholder level that always sorts last in the factor catalog
pub const NOT_SPECIFIED: &str = "not specified";

/// Display position, colour bucket and label of one sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactorAssignment {
    pub order_idx: i64,
    pub color_idx: i64,
    pub name: String,
}

/// How samples should be grouped and labelled
#[derive(Debug, Clone, Default)]
pub struct FactorQuery {
    /// Factor whose value defines colour buckets and ordering
    pub group: Option<String>,
    /// Merge replicates sharing a group value into one point
    pub collapse: bool,
    /// Factor whose value labels each sample instead of its raw id
    pub naming: Option<String>,
}

impl FactorQuery {
    pub fn grouped(group: &str) -> Self {
        Self {
            group: Some(group.to_string()),
            ..Self::default()
        }
    }

    pub fn collapsed(mut self, collapse: bool) -> Self {
        self.collapse = collapse;
        self
    }

    pub fn named_by(mut self, naming: &str) -> Self {
        self.naming = Some(naming.to_string());
        self
    }
}

/// Strip the conventional `" 1"` replicate suffix from a display name
pub fn display_name(name: &str) -> &str {
    name.strip_suffix(" 1").unwrap_or(name)
}

/// Per-sample labels: raw ids, or each sample's value of the naming factor
pub fn sample_names(samples: &[SampleMetadata], naming: Option<&str>) -> Result<Vec<String>> {
    samples
        .iter()
        .map(|s| match naming {
            Some(key) => s.factor(key).map(str::to_string),
            None => Ok(s.raw_id.clone()),
        })
        .collect()
}

/// Assign display order, colour bucket and name to every sample
///
/// Without a group, preset `order_idx`/`color_idx` are used when a sample
/// carries both; other samples get a running 1-based position.
///
/// With a group, colour buckets number distinct group values by first
/// appearance. Order is `rank * n_samples + offset`, where `rank` is the
/// position of the group value among the sorted distinct values and
/// `offset` counts earlier replicates of the same value. An offset never
/// reaches `n_samples`, so groups cannot overlap. When collapsing, the
/// offset is omitted so replicates share one order index and are named by
/// their group value.
pub fn build_factor_assignments(
    samples: &[SampleMetadata],
    query: &FactorQuery,
) -> Result<Vec<FactorAssignment>> {
    let group = match &query.group {
        Some(group) => group,
        None => {
            let names = sample_names(samples, query.naming.as_deref())?;
            let mut position = 0;
            return Ok(samples
                .iter()
                .zip(names)
                .map(|(s, name)| {
                    let (order_idx, color_idx) = s.preset_indices().unwrap_or_else(|| {
                        position += 1;
                        (position, position)
                    });
                    FactorAssignment {
                        order_idx,
                        color_idx,
                        name,
                    }
                })
                .collect());
        }
    };

    let values: Vec<&str> = samples
        .iter()
        .map(|s| s.factor(group))
        .collect::<Result<_>>()?;

    let mut first_seen: Vec<&str> = Vec::new();
    for v in &values {
        if !first_seen.contains(v) {
            first_seen.push(*v);
        }
    }
    let ranks: HashMap<&str, i64> = values
        .iter()
        .copied()
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .enumerate()
        .map(|(rank, v)| (v, rank as i64))
        .collect();

    let names = if query.collapse {
        values.iter().map(|v| v.to_string()).collect()
    } else {
        sample_names(samples, query.naming.as_deref())?
    };

    let interval = samples.len() as i64;
    let mut replicates: HashMap<&str, i64> = HashMap::new();
    let assignments = values
        .iter()
        .zip(names)
        .map(|(v, name)| {
            let mut order_idx = ranks[v] * interval;
            if !query.collapse {
                let seen = replicates.entry(*v).or_insert(0);
                order_idx += *seen;
                *seen += 1;
            }
            let color_idx = first_seen.iter().position(|f| f == v).unwrap_or_default() as i64;
            FactorAssignment {
                order_idx,
                color_idx,
                name,
            }
        })
        .collect();

    Ok(assignments)
}

/// Distinct values of one factor across the samples
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactorLevels {
    pub factor: String,
    pub levels: Vec<String>,
}

/// Factors that distinguish samples, with their sorted levels
///
/// Factors with a single level are left out. Levels sort case-insensitively
/// with `"not specified"` last. Factors listed in `popular` come after the
/// others; each class is alphabetical.
pub fn factor_levels(samples: &[SampleMetadata], popular: &[String]) -> Result<Vec<FactorLevels>> {
    let mut by_factor: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for s in samples {
        for (k, v) in &s.factor_values {
            by_factor.entry(k.as_str()).or_default().insert(v.as_str());
        }
    }

    let mut catalog: Vec<FactorLevels> = by_factor
        .into_iter()
        .filter(|(_, levels)| levels.len() > 1)
        .map(|(factor, levels)| {
            let mut levels: Vec<String> = levels.into_iter().map(str::to_string).collect();
            levels.sort_by_key(|l| l.to_lowercase());
            if let Some(p) = levels.iter().position(|l| l == NOT_SPECIFIED) {
                let unspecified = levels.remove(p);
                levels.push(unspecified);
            }
            FactorLevels {
                factor: factor.to_string(),
                levels,
            }
        })
        .collect();

    if catalog.is_empty() {
        return Err(DatasetError::NotFound {
            what: "factors with more than one level".to_string(),
        });
    }

    catalog.sort_by_key(|f| popular.contains(&f.factor));
    Ok(catalog)
}
