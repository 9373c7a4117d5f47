use super::record::DatasetRecord;
use super::writer::{dataset_files, load_records, DatasetWriter};
use super::DatasetError;
use crate::logic::features::{resolve_base, StudentRecord};
use crate::logic::synthetic::generate;
use serde_json::json;
use std::fs;
use tempfile::tempdir;

fn sample_record() -> DatasetRecord {
    DatasetRecord::new(
        1.0,
        StudentRecord::from_pairs([("GPA", json!(3.4)), ("Attendance", json!("97%"))]),
    )
}

#[test]
fn test_dataset_append_and_read() {
    let dir = tempdir().unwrap();
    let writer = DatasetWriter::new(dir.path()).unwrap();

    writer.append(&sample_record()).unwrap();

    // Should be 1 file ending in jsonl
    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap()).collect();
    assert_eq!(entries.len(), 1);
    let path = entries[0].path();
    assert!(path.extension().unwrap() == "jsonl");

    let content = fs::read_to_string(&path).unwrap();
    let deserialized: DatasetRecord = serde_json::from_str(content.trim()).unwrap();
    assert_eq!(deserialized, sample_record());
    assert!(deserialized.archetype.is_none());
}

#[test]
fn test_small_writes_share_one_file() {
    let dir = tempdir().unwrap();
    let writer = DatasetWriter::new(dir.path()).unwrap();

    writer.append(&sample_record()).unwrap();
    writer.append(&sample_record()).unwrap();

    assert_eq!(dataset_files(dir.path()).unwrap().len(), 1);
    assert_eq!(load_records(dir.path()).unwrap().len(), 2);
}

#[test]
fn test_rotation_creates_new_file() {
    let dir = tempdir().unwrap();
    let writer = DatasetWriter::new(dir.path()).unwrap().with_max_file_size(1);

    writer.append(&sample_record()).unwrap();
    writer.append(&sample_record()).unwrap();
    writer.append(&sample_record()).unwrap();

    assert_eq!(dataset_files(dir.path()).unwrap().len(), 3);
    let (count, _, latest) = writer.get_stats().unwrap();
    assert_eq!(count, 3);
    assert!(latest.starts_with("dataset-"));
    assert_eq!(load_records(dir.path()).unwrap().len(), 3);
}

#[test]
fn test_synthetic_records_reconstruct_to_same_base() {
    let dir = tempdir().unwrap();
    let writer = DatasetWriter::new(dir.path()).unwrap();
    let students = generate(20, 3);
    let records: Vec<DatasetRecord> = students.iter().map(DatasetRecord::from_synthetic).collect();
    assert_eq!(writer.append_all(&records).unwrap(), 20);

    let loaded = load_records(dir.path()).unwrap();
    for (student, record) in students.iter().zip(&loaded) {
        assert_eq!(record.label, student.label);
        assert_eq!(record.archetype, Some(student.archetype));
        let resolved = resolve_base(&record.features);
        assert!(resolved.defaulted.is_empty());
        for (a, b) in resolved.base.values().iter().zip(student.base.values().iter()) {
            assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
        }
    }
}

#[test]
fn test_malformed_line_reports_position() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.jsonl");
    let good = serde_json::to_string(&sample_record()).unwrap();
    fs::write(&path, format!("{}\n\nnot json\n", good)).unwrap();

    match load_records(&path) {
        Err(DatasetError::Malformed { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected malformed error, got {:?}", other.map(|r| r.len())),
    }
}
