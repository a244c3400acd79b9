//! Raw annotator records as they arrive on the wire.
//!
//! Every field is optional so a missing key is reported as a validation
//! error by the span factory instead of a serde failure. Unknown keys
//! (`Id`, `Category`, `Traits`, ...) are ignored.

use serde::{Deserialize, Serialize};

/// Label the secondary tagger emits for tokens outside any entity
pub const OUTSIDE_LABEL: &str = "O";

/// Record from the primary annotator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrimaryRecord {
    #[serde(rename = "BeginOffset", skip_serializing_if = "Option::is_none")]
    pub begin_offset: Option<i64>,

    #[serde(rename = "EndOffset", skip_serializing_if = "Option::is_none")]
    pub end_offset: Option<i64>,

    #[serde(rename = "Score", skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    #[serde(rename = "Type", skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,

    #[serde(rename = "Text", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl PrimaryRecord {
    pub fn new(
        begin_offset: i64,
        end_offset: i64,
        score: f64,
        entity_type: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            begin_offset: Some(begin_offset),
            end_offset: Some(end_offset),
            score: Some(score),
            entity_type: Some(entity_type.into()),
            text: Some(text.into()),
        }
    }
}

/// Record from the secondary annotator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecondaryRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl SecondaryRecord {
    pub fn new(
        start: i64,
        stop: i64,
        confidence: f64,
        label: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            start: Some(start),
            stop: Some(stop),
            confidence: Some(confidence),
            label: Some(label.into()),
            text: Some(text.into()),
        }
    }

    /// Tokens tagged exactly `O` carry no entity
    pub fn is_outside(&self) -> bool {
        self.label.as_deref() == Some(OUTSIDE_LABEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_record_ignores_extra_keys() {
        let json = r#"{
            "Id": 0,
            "BeginOffset": 33,
            "EndOffset": 35,
            "Score": 0.98,
            "Text": "48",
            "Category": "PROTECTED_HEALTH_INFORMATION",
            "Type": "AGE",
            "Traits": []
        }"#;
        let record: PrimaryRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record, PrimaryRecord::new(33, 35, 0.98, "AGE", "48"));
    }

    #[test]
    fn test_secondary_record_missing_field_is_none() {
        let json = r#"{"start": 15, "stop": 29, "text": "John Smith Jr.", "label": "PROVIDER_NAME"}"#;
        let record: SecondaryRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.start, Some(15));
        assert!(record.confidence.is_none());
    }

    #[test]
    fn test_outside_label() {
        assert!(SecondaryRecord::new(0, 3, 0.9, "O", "the").is_outside());
        assert!(!SecondaryRecord::new(0, 3, 0.9, "o", "the").is_outside());
        assert!(!SecondaryRecord::new(0, 3, 0.9, "WARD", "the").is_outside());
        assert!(!SecondaryRecord::default().is_outside());
    }
}
