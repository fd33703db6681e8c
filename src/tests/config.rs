use super::{Config, ConfigError};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_empty_config_yields_defaults() {
    let config = Config::parse("").unwrap();
    assert_eq!(config.from_address, "simo@mathphys.stura.uni-heidelberg.de");
    assert_eq!(config.subject_prefix, "Gemeinsame Sitzung");
    assert_eq!(config.org_domain, "mathphys.stura.uni-heidelberg.de");
    assert_eq!(config.smtp_port, 587);
    assert_eq!(config.marker_word, "TOP");
    assert_eq!(config.login_attempts, 3);
}

#[test]
fn test_file_overrides_some_fields() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("protocoldude.toml");
    fs::write(
        &path,
        "subject_prefix = \"Fachschaftssitzung\"\nsmtp_port = 2525\n",
    )
    .unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.subject_prefix, "Fachschaftssitzung");
    assert_eq!(config.smtp_port, 2525);
    assert_eq!(config.marker_word, "TOP");
}

#[test]
fn test_explicit_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = Config::load(Some(&dir.path().join("fehlt.toml"))).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("protocoldude.toml");
    fs::write(&path, "smtp_port = \"viele\"\n").unwrap();

    let err = Config::load(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}
