//! Deployment settings shared by the chart, catalog and correlation paths

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Bar colours cycled by `color_idx`
pub const DEFAULT_BAR_COLORS: [&str; 10] = [
    "#4D4D4D", "#5DA5DA", "#FAA43A", "#60BD68", "#F17CB0", "#B2912F", "#B276B2", "#DECF3F",
    "#F15854", "#1F78B4",
];

/// Site settings, loaded from JSON with per-key defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Hex colour palette, indexed by `color_idx` modulo its length
    pub bar_colors: Vec<String>,
    /// Datasets with more samples than this are not offered correlation
    pub max_samples_for_correlation: usize,
    /// Factor keys listed after the others in the factor-level catalog
    pub popular_factors: Vec<String>,
    /// Threshold used when no minimum correlation is supplied
    pub default_min_correlation: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bar_colors: DEFAULT_BAR_COLORS.iter().map(|c| c.to_string()).collect(),
            max_samples_for_correlation: 1000,
            popular_factors: vec![
                "cell type".to_string(),
                "organism part".to_string(),
                "disease".to_string(),
                "treatment".to_string(),
                "time".to_string(),
            ],
            default_min_correlation: 0.9,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file; absent keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Load from `path` if given, otherwise the defaults
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => {
                log::debug!("Loading settings from: {}", p);
                Self::from_file(p)
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partial_settings_keep_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"max_samples_for_correlation": 200}}"#).unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.max_samples_for_correlation, 200);
        assert_eq!(settings.bar_colors.len(), DEFAULT_BAR_COLORS.len());
        assert_eq!(settings.default_min_correlation, 0.9);
    }

    #[test]
    fn test_load_without_path_is_default() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.max_samples_for_correlation, 1000);
    }
}
