use super::{extract_address, Directory, DirectoryError, DirectoryRecord, MAIL_ATTRIBUTE};
use crate::testing::MemoryDirectory;
use std::collections::HashMap;

fn ids(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(ToString::to_string).collect()
}

#[test]
fn test_extract_address_reads_mail_attribute() {
    let record = DirectoryRecord::with_mail("uid=jdoe,ou=People", "jdoe@example.org");
    assert_eq!(extract_address(&record), Some("jdoe@example.org"));
}

#[test]
fn test_extract_address_without_mail() {
    let mut attrs = HashMap::new();
    attrs.insert("cn".to_string(), vec!["Jane Doe".to_string()]);
    let record = DirectoryRecord {
        dn: "uid=jdoe,ou=People".to_string(),
        attrs,
    };
    assert_eq!(extract_address(&record), None);
}

#[test]
fn test_extract_address_ignores_blank_mail() {
    let mut attrs = HashMap::new();
    attrs.insert(MAIL_ATTRIBUTE.to_string(), vec!["  ".to_string()]);
    let record = DirectoryRecord {
        dn: String::new(),
        attrs,
    };
    assert_eq!(extract_address(&record), None);
}

#[test]
fn test_lookup_keeps_order_and_duplicates() {
    let mut directory = MemoryDirectory::new()
        .with_person("alice", "alice@example.org")
        .with_person("bob", "bob@example.org");

    let entries = directory
        .lookup(&ids(&["bob", "nobody", "alice", "bob"]))
        .unwrap();

    let found: Vec<_> = entries
        .iter()
        .map(|entry| {
            (
                entry.identifier.as_str(),
                entry.record.as_ref().and_then(extract_address),
            )
        })
        .collect();
    assert_eq!(
        found,
        vec![
            ("bob", Some("bob@example.org")),
            ("nobody", None),
            ("alice", Some("alice@example.org")),
            ("bob", Some("bob@example.org")),
        ]
    );
    assert_eq!(directory.searches, ids(&["bob", "nobody", "alice", "bob"]));
}

#[test]
fn test_lookup_takes_first_of_several_records() {
    let mut directory = MemoryDirectory::new().with_records(
        "kim",
        vec![
            DirectoryRecord::with_mail("uid=kim,ou=People", "kim@example.org"),
            DirectoryRecord::with_mail("uid=kim,ou=Alumni", "kim@alumni.example.org"),
        ],
    );

    let entries = directory.lookup(&ids(&["kim"])).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0].record.as_ref().map(|record| record.dn.as_str()),
        Some("uid=kim,ou=People")
    );
}

#[test]
fn test_lookup_of_nothing() {
    let mut directory = MemoryDirectory::new();
    assert!(directory.lookup(&[]).unwrap().is_empty());
    assert!(directory.searches.is_empty());
}

#[test]
fn test_unreachable_directory_fails_fast() {
    let mut directory = MemoryDirectory::offline();
    let err = directory.lookup(&ids(&["alice", "bob"])).unwrap_err();
    assert!(matches!(err, DirectoryError::Unreachable { .. }));
    assert_eq!(directory.searches, ids(&["alice"]));
}
