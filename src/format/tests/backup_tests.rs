//! Tests for annotation backups.

use crate::format::backup_annotations;

#[test]
fn test_backup_copies_file() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("annotations.json");
    std::fs::write(&source, "[]").unwrap();

    let backup_dir = dir.path().join("backups/annotations");
    let copy = backup_annotations(&source, &backup_dir).unwrap().unwrap();

    assert!(copy.starts_with(&backup_dir));
    let name = copy.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("annotations_") && name.ends_with(".json"));
    // annotations_YYYYmmdd_HHMMSS.json
    assert_eq!(name.len(), "annotations_".len() + 15 + ".json".len());
    assert_eq!(std::fs::read_to_string(copy).unwrap(), "[]");
}

#[test]
fn test_backup_missing_source() {
    let dir = tempfile::tempdir().unwrap();
    let result = backup_annotations(&dir.path().join("missing.json"), dir.path()).unwrap();
    assert!(result.is_none());
}
