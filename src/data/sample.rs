//! Per-sample factor metadata
//!
//! On the wire each sample is a single-key object: the key is the sample's
//! raw identifier and the value holds its annotations, e.g.
//!
//! ```json
//! {"GSM1 liver 1": {"factorvalue": {"organism part": "liver"},
//!                   "comment": {"Sample_title": "liver rep 1"},
//!                   "order_idx": 3, "color_idx": 1}}
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DatasetError, Result};

/// Annotation block nested under the raw sample identifier
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SampleFields {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    factorvalue: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    comment: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    order_idx: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color_idx: Option<i64>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

/// Metadata for one biological sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HashMap<String, SampleFields>", into = "HashMap<String, SampleFields>")]
pub struct SampleMetadata {
    /// Raw sample name/identifier
    pub raw_id: String,
    /// Factor name -> factor value
    pub factor_values: BTreeMap<String, String>,
    /// Free-form comments (titles, descriptions)
    pub comments: BTreeMap<String, String>,
    /// Preset display position
    pub order_idx: Option<i64>,
    /// Preset colour bucket
    pub color_idx: Option<i64>,
    /// Any other scalar annotations carried by the source record
    pub attributes: BTreeMap<String, String>,
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn texts(map: BTreeMap<String, Value>) -> BTreeMap<String, String> {
    map.into_iter().map(|(k, v)| (k, value_text(&v))).collect()
}

impl TryFrom<HashMap<String, SampleFields>> for SampleMetadata {
    type Error = String;

    fn try_from(map: HashMap<String, SampleFields>) -> std::result::Result<Self, Self::Error> {
        if map.len() != 1 {
            return Err(format!(
                "sample record must have exactly one top-level key, found {}",
                map.len()
            ));
        }
        let (raw_id, fields) = map
            .into_iter()
            .next()
            .ok_or_else(|| "empty sample record".to_string())?;

        Ok(Self {
            raw_id,
            factor_values: texts(fields.factorvalue),
            comments: texts(fields.comment),
            order_idx: fields.order_idx,
            color_idx: fields.color_idx,
            attributes: texts(fields.extra),
        })
    }
}

impl From<SampleMetadata> for HashMap<String, SampleFields> {
    fn from(sample: SampleMetadata) -> Self {
        let strings = |m: BTreeMap<String, String>| -> BTreeMap<String, Value> {
            m.into_iter().map(|(k, v)| (k, Value::String(v))).collect()
        };
        let fields = SampleFields {
            factorvalue: strings(sample.factor_values),
            comment: strings(sample.comments),
            order_idx: sample.order_idx,
            color_idx: sample.color_idx,
            extra: strings(sample.attributes),
        };
        HashMap::from([(sample.raw_id, fields)])
    }
}

impl SampleMetadata {
    /// Sample with only a raw identifier
    pub fn new(raw_id: &str) -> Self {
        Self {
            raw_id: raw_id.to_string(),
            factor_values: BTreeMap::new(),
            comments: BTreeMap::new(),
            order_idx: None,
            color_idx: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Add a factor value (builder style)
    pub fn with_factor(mut self, name: &str, value: &str) -> Self {
        self.factor_values.insert(name.to_string(), value.to_string());
        self
    }

    /// Add a comment (builder style)
    pub fn with_comment(mut self, name: &str, value: &str) -> Self {
        self.comments.insert(name.to_string(), value.to_string());
        self
    }

    /// Set preset display and colour indices (builder style)
    pub fn with_indices(mut self, order_idx: i64, color_idx: i64) -> Self {
        self.order_idx = Some(order_idx);
        self.color_idx = Some(color_idx);
        self
    }

    /// Value of a factor, or `MissingKey` naming this sample
    pub fn factor(&self, key: &str) -> Result<&str> {
        self.factor_values
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| DatasetError::MissingKey {
                key: key.to_string(),
                sample: self.raw_id.clone(),
            })
    }

    /// Preset (order_idx, color_idx), only when both are present
    pub fn preset_indices(&self) -> Option<(i64, i64)> {
        self.order_idx.zip(self.color_idx)
    }

    /// Every textual annotation of the record concatenated, used for
    /// matching data columns and platform accessions against the record
    pub fn search_text(&self) -> String {
        let mut text = self.raw_id.clone();
        for v in self
            .factor_values
            .values()
            .chain(self.comments.values())
            .chain(self.attributes.values())
        {
            text.push_str(v);
        }
        text
    }
}

/// Decode the ordered sample list from JSON text
pub fn parse_sample_metadata(json: &str) -> Result<Vec<SampleMetadata>> {
    let samples: Vec<SampleMetadata> = serde_json::from_str(json)?;
    if samples.is_empty() {
        return Err(DatasetError::EmptyData {
            reason: "No samples found in metadata".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for s in &samples {
        if !seen.insert(s.raw_id.as_str()) {
            log::warn!("Duplicate sample ID detected: '{}'", s.raw_id);
        }
    }
    Ok(samples)
}

/// Read the ordered sample list from a JSON file
pub fn read_sample_metadata<P: AsRef<Path>>(path: P) -> Result<Vec<SampleMetadata>> {
    let text = fs::read_to_string(path)?;
    parse_sample_metadata(&text)
}

/// Write samples back in the nested wire shape
pub fn write_sample_metadata<P: AsRef<Path>>(path: P, samples: &[SampleMetadata]) -> Result<()> {
    let text = serde_json::to_string_pretty(samples)?;
    fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &str = r#"[
        {"GSM1 liver 1": {"factorvalue": {"organism part": "liver", "age": 4},
                          "comment": {"Sample_title": "liver A"},
                          "order_idx": 2, "color_idx": 1,
                          "Array Design REF": "A-AFFY-44"}},
        {"GSM2 brain 1": {"factorvalue": {"organism part": "brain"}}}
    ]"#;

    #[test]
    fn test_parse_nested_shape() {
        let samples = parse_sample_metadata(SAMPLES).unwrap();
        assert_eq!(samples.len(), 2);

        let liver = &samples[0];
        assert_eq!(liver.raw_id, "GSM1 liver 1");
        assert_eq!(liver.factor("organism part").unwrap(), "liver");
        assert_eq!(liver.factor("age").unwrap(), "4");
        assert_eq!(liver.preset_indices(), Some((2, 1)));
        assert_eq!(liver.attributes["Array Design REF"], "A-AFFY-44");

        assert_eq!(samples[1].preset_indices(), None);
    }

    #[test]
    fn test_missing_factor_names_sample() {
        let samples = parse_sample_metadata(SAMPLES).unwrap();
        match samples[1].factor("age") {
            Err(DatasetError::MissingKey { key, sample }) => {
                assert_eq!(key, "age");
                assert_eq!(sample, "GSM2 brain 1");
            }
            other => panic!("expected MissingKey, got {:?}", other),
        }
    }

    #[test]
    fn test_record_with_two_keys_rejected() {
        let json = r#"[{"a": {}, "b": {}}]"#;
        assert!(parse_sample_metadata(json).is_err());
    }

    #[test]
    fn test_search_text_includes_annotations() {
        let samples = parse_sample_metadata(SAMPLES).unwrap();
        let text = samples[0].search_text();
        assert!(text.contains("GSM1"));
        assert!(text.contains("A-AFFY-44"));
        assert!(text.contains("liver A"));
    }

    #[test]
    fn test_serialize_round_trips_wire_shape() {
        let sample = SampleMetadata::new("S1").with_factor("tissue", "liver").with_indices(1, 0);
        let json = serde_json::to_string(&vec![sample.clone()]).unwrap();
        assert!(json.starts_with(r#"[{"S1":"#));
        let back = parse_sample_metadata(&json).unwrap();
        assert_eq!(back[0], sample);
    }
}
