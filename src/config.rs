//! Configuration to adapt the tool to another council while keeping sensible defaults.
//!
//! Specifically, we look for a protocoldude.toml, and if present load settings from there.
//! This provides the sender, subject, directory and mail server, and the heading word.

use facet::Facet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "protocoldude.toml";

#[derive(Debug, thiserror::Error)]
/// The configuration file exists but cannot be used.
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        /// Configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The file is not valid configuration.
    #[error("invalid configuration in {path}: {message}")]
    Parse {
        /// Configuration file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
}

#[derive(Facet, Clone, Debug)]
/// Settings loaded from protocoldude.toml or falling back to defaults.
pub struct Config {
    #[facet(default = "simo@mathphys.stura.uni-heidelberg.de".to_string())]
    /// Sender of every notification.
    pub from_address: String,
    #[facet(default = "Gemeinsame Sitzung".to_string())]
    /// Subject prefix, followed by the section heading.
    pub subject_prefix: String,
    #[facet(default = "mathphys.stura.uni-heidelberg.de".to_string())]
    /// Domain the alias mailboxes live in.
    pub org_domain: String,
    #[facet(default = "ldaps://ldap1.mathphys.stura.uni-heidelberg.de".to_string())]
    /// People directory.
    pub ldap_url: String,
    #[facet(default = "ou=People,dc=mathphys,dc=stura,dc=uni-heidelberg,dc=de".to_string())]
    /// Subtree searched for people.
    pub ldap_base_dn: String,
    #[facet(default = "mail.urz.uni-heidelberg.de".to_string())]
    /// Mail submission server.
    pub smtp_host: String,
    #[facet(default = 587)]
    /// Submission port, spoken with STARTTLS.
    pub smtp_port: u16,
    #[facet(default = "TOP".to_string())]
    /// Word that starts every canonical heading.
    pub marker_word: String,
    #[facet(default = 3)]
    /// How often the operator may retry the mail login.
    pub login_attempts: u32,
}

impl Config {
    /// Loads `path`, or protocoldude.toml when `path` is `None`.
    ///
    /// A missing default file means all defaults; a missing explicit file is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound && !required => String::new(),
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        Self::parse(&contents).map_err(|message| ConfigError::Parse { path, message })
    }

    /// Parses configuration text; empty text yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns the parser's message if `contents` is not valid configuration.
    pub fn parse(contents: &str) -> Result<Self, String> {
        facet_toml::from_str::<Self>(contents).map_err(|err| err.to_string())
    }
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;
