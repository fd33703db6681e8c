use super::AliasTable;

const DOMAIN: &str = "mathphys.stura.uni-heidelberg.de";

#[test]
fn test_builtin_contains_council_lists() {
    let table = AliasTable::builtin(DOMAIN);
    assert!(table.contains("fachschaft"));
    assert!(table.contains("finanzen"));
    assert!(!table.contains("max"));
    assert_eq!(table.len(), 24);
}

#[test]
fn test_lookup_ignores_case() {
    let table = AliasTable::builtin(DOMAIN);
    assert_eq!(table.greeting_for("FachSchaft"), Some("Liebe Fachschaft"));
    assert_eq!(
        table.address_for("FachSchaft").as_deref(),
        Some("fachschaft@mathphys.stura.uni-heidelberg.de")
    );
}

#[test]
fn test_match_is_exact_not_substring() {
    // "fach" is a prefix of several aliases but not an alias itself
    let table = AliasTable::builtin(DOMAIN);
    assert!(!table.contains("fach"));
    assert_eq!(table.address_for("fach"), None);
    assert_eq!(table.greeting_for("fachschaften"), None);
}

#[test]
fn test_custom_table_uses_given_domain() {
    let table = AliasTable::new([("Vorstand", "Lieber Vorstand")], "example.org");
    assert_eq!(
        table.address_for("vorstand").as_deref(),
        Some("vorstand@example.org")
    );
    assert_eq!(table.domain(), "example.org");
    assert!(!table.is_empty());
}
