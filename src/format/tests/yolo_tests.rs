//! Tests for the YOLO export.

use std::collections::HashMap;

use crate::format::{ClassConfig, FormatError, VideoInfo, WarningSeverity, YoloExporter};
use crate::format::frame_basename;
use crate::model::{AnnotationBox, AnnotationCollection, AnnotationEntry, Rect};

fn classes() -> ClassConfig {
    ClassConfig::new(["person", "car", "level"])
}

fn videos() -> HashMap<String, VideoInfo> {
    [("street.mp4".to_string(), VideoInfo::new(640, 480, 30.0))]
        .into_iter()
        .collect()
}

/// Create a test collection with one annotated frame per video.
fn create_collection() -> AnnotationCollection {
    vec![
        AnnotationEntry::new("street.mp4", 1.5)
            .with_box(AnnotationBox::bbox(
                Rect::new(100.0, 120.0, 80.0, 200.0),
                "person",
            ))
            .with_box(AnnotationBox::bbox(
                Rect::new(300.0, 200.0, 150.0, 100.0),
                "bicycle",
            ))
            .with_box(AnnotationBox::water_level(240.0, "level")),
        AnnotationEntry::new("unknown.mp4", 2.0)
            .with_box(AnnotationBox::bbox(Rect::new(0.0, 0.0, 10.0, 10.0), "car")),
    ]
    .into()
}

#[test]
fn test_class_config_parsing() {
    let config = ClassConfig::from_json(r#"{"names": ["person", "car"]}"#).unwrap();
    assert_eq!(config.class_id("car"), Some(1));
    assert_eq!(config.class_id("truck"), None);

    assert!(matches!(
        ClassConfig::from_json(r#"{"classes": ["person"]}"#),
        Err(FormatError::InvalidFormat { .. })
    ));
    assert!(matches!(
        ClassConfig::from_json("not json"),
        Err(FormatError::Json(_))
    ));
}

#[test]
fn test_frame_basename() {
    assert_eq!(frame_basename("clip.mp4", 3.25), "clip_3_25");
    assert_eq!(frame_basename("clip.mp4", 1.5), "clip_1_50");
    assert_eq!(frame_basename("dir/clip.mov", 0.0), "clip_0_0");
}

#[test]
fn test_frame_number() {
    let info = VideoInfo::new(640, 480, 30.0);
    assert_eq!(info.frame_number(1.5), 45);
    assert_eq!(info.frame_number(0.0), 0);
}

#[test]
fn test_label_lines_normalization() {
    let exporter = YoloExporter::new(classes());
    let collection = create_collection();
    let mut warnings = Vec::new();

    let lines = exporter.label_lines(
        &collection.entries()[0],
        &VideoInfo::new(640, 480, 30.0),
        &mut warnings,
    );

    assert_eq!(
        lines,
        vec![
            "0 0.218750 0.458333 0.125000 0.416667".to_string(),
            "2 0.500000 0.500000 1.000000 0.001000".to_string(),
        ]
    );
    assert_eq!(warnings.len(), 1, "bicycle is not a known class");
    assert_eq!(warnings[0].severity, WarningSeverity::Warning);
    assert_eq!(warnings[0].video, "street.mp4");
}

#[test]
fn test_export_writes_label_files() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = YoloExporter::new(classes());

    let result = exporter
        .export(&create_collection(), &videos(), dir.path())
        .unwrap();

    assert_eq!(result.frames_exported, 1);
    assert_eq!(result.annotations_exported, 2);
    assert!(result.has_errors(), "unknown.mp4 has no frame size");
    let skipped: Vec<&str> = result
        .warnings
        .iter()
        .filter(|w| w.severity == WarningSeverity::Error)
        .map(|w| w.video.as_str())
        .collect();
    assert_eq!(skipped, vec!["unknown.mp4"]);
    assert_eq!(result.frames.len(), 1);
    assert_eq!(result.frames[0].frame_number, 45);
    assert_eq!(result.frames[0].image_name, "street_1_50.jpg");

    let label_file = dir.path().join("labels/street_1_50.txt");
    assert_eq!(result.files_created, vec![label_file.clone()]);
    let content = std::fs::read_to_string(label_file).unwrap();
    assert_eq!(content.lines().count(), 2);
    assert!(dir.path().join("images").is_dir());
}

#[test]
fn test_export_skips_repeated_frames_and_empty_labels() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = YoloExporter::new(classes());
    let entry = AnnotationEntry::new("street.mp4", 4.0)
        .with_box(AnnotationBox::bbox(Rect::new(0.0, 0.0, 64.0, 48.0), "car"));
    let unlabeled = AnnotationEntry::new("street.mp4", 6.0)
        .with_box(AnnotationBox::bbox(Rect::new(0.0, 0.0, 64.0, 48.0), "tree"));
    let collection: AnnotationCollection = vec![entry.clone(), entry, unlabeled].into();

    let result = exporter.export(&collection, &videos(), dir.path()).unwrap();

    assert_eq!(result.frames_exported, 2);
    assert_eq!(result.annotations_exported, 1);
    assert_eq!(result.files_created.len(), 1);
    assert!(!dir.path().join("labels/street_6_0.txt").exists());
    assert!(result.has_warnings());
    assert!(!result.has_errors());
}
