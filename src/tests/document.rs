use super::{Document, DocumentError, STAMP_PREFIX};
use chrono::{Local, TimeZone};
use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_open_and_save_round_trip() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "===\nTOP\n===\nText").unwrap();

    let doc = Document::open(file.path()).unwrap();
    assert_eq!(doc.lines(), ["===", "TOP", "===", "Text"]);

    doc.save().unwrap();
    assert_eq!(fs::read_to_string(file.path()).unwrap(), "===\nTOP\n===\nText\n");
}

#[test]
fn test_stamp_prepends_two_lines() {
    let mut doc = Document::from_text("2024-05-06.txt", "===\nA\n===\n");
    assert!(!doc.is_stamped());

    let at = Local.with_ymd_and_hms(2024, 5, 6, 20, 15, 0).unwrap();
    doc.stamp(at);

    assert!(doc.is_stamped());
    assert_eq!(doc.lines().len(), 5);
    assert_eq!(doc.lines()[0], format!("{STAMP_PREFIX} 20:15 06.05.2024"));
    assert_eq!(doc.lines()[1], "");
    assert_eq!(doc.lines()[2], "===");
}

#[test]
fn test_stamp_only_counts_on_first_line() {
    let doc = Document::from_text("x.txt", &format!("\n{STAMP_PREFIX} 10:00 01.01.2024"));
    assert!(!doc.is_stamped());
}

#[test]
fn test_missing_file_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Document::open(dir.path().join("fehlt.txt")).unwrap_err();
    assert!(matches!(err, DocumentError::Read { .. }));
}
