//! Annotator Adapter Integration Tests
//!
//! Tests for loading saved annotator output from disk and assembling merge
//! requests from it.

use std::io::Write;

use phimerge::adapters::{gather, load_request};
use phimerge::{Annotator, AnnotatorOutput, JsonFileAnnotator, MergeEngine, Origin};
use tempfile::{NamedTempFile, TempDir};

const TEXT: &str = "His phone number is (555) 867-5309.";

fn write_json(body: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", body).unwrap();
    file
}

fn primary_file() -> NamedTempFile {
    write_json(
        r#"[{"Id": 0, "BeginOffset": 20, "EndOffset": 34, "Score": 0.96,
             "Text": "(555) 867-5309", "Category": "PROTECTED_HEALTH_INFORMATION",
             "Type": "PHONE_OR_FAX", "Traits": []}]"#,
    )
}

fn secondary_file() -> NamedTempFile {
    write_json(
        r#"[{"start": 0, "stop": 3, "confidence": 0.99, "label": "O", "text": "His"},
            {"start": 26, "stop": 34, "confidence": 0.04, "label": "PHONE_NUMBER", "text": "867-5309"}]"#,
    )
}

#[tokio::test]
async fn test_file_annotator_reads_records() {
    let file = primary_file();
    let annotator = JsonFileAnnotator::primary(file.path());

    assert_eq!(annotator.origin(), Origin::Primary);
    match annotator.annotate(TEXT).await.unwrap() {
        AnnotatorOutput::Primary(records) => {
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].entity_type.as_deref(), Some("PHONE_OR_FAX"));
        }
        other => panic!("Expected primary records, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_file_reports_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("absent.json");
    let annotator = JsonFileAnnotator::secondary(&path);

    let err = annotator.annotate(TEXT).await.unwrap_err();
    assert!(err.to_string().contains("absent.json"));
}

#[tokio::test]
async fn test_malformed_records_rejected() {
    let file = write_json(r#"{"start": 0}"#);
    let annotator = JsonFileAnnotator::secondary(file.path());

    let err = annotator.annotate(TEXT).await.unwrap_err();
    assert!(err.to_string().contains("Failed to parse secondary records"));
}

#[tokio::test]
async fn test_gather_and_merge() {
    let primary = primary_file();
    let secondary = secondary_file();

    let request = gather(
        TEXT.to_string(),
        &JsonFileAnnotator::primary(primary.path()),
        &JsonFileAnnotator::secondary(secondary.path()),
    )
    .await
    .unwrap();
    assert_eq!(request.primary.len(), 1);
    assert_eq!(request.secondary.len(), 2);

    let merged = MergeEngine::default().run(&request).unwrap();
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].entity_type(), "PHONE_NUMBER");
    assert_eq!(merged[0].text(), "867-5309");
}

#[tokio::test]
async fn test_gather_rejects_swapped_annotators() {
    let primary = primary_file();
    let secondary = secondary_file();

    let result = gather(
        TEXT.to_string(),
        &JsonFileAnnotator::secondary(secondary.path()),
        &JsonFileAnnotator::primary(primary.path()),
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_load_request_file() {
    let file = write_json(
        r#"{"extract_text": "His phone number is (555) 867-5309.",
            "primary": [{"BeginOffset": 20, "EndOffset": 34, "Score": 0.96,
                         "Type": "PHONE_OR_FAX", "Text": "(555) 867-5309"}],
            "annotation_by_source": true}"#,
    );

    let request = load_request(file.path()).await.unwrap();
    assert!(request.secondary.is_empty());
    assert!(request.annotation_by_source);

    let value = MergeEngine::default().process(&request).unwrap();
    let spans = value.as_array().unwrap();
    assert_eq!(spans[0]["type"], "PHONE_OR_FAX");
    assert_eq!(spans[0]["source_annotations"][0]["origin"], "primary");
}
