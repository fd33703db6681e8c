//! Directory lookups of mention tokens against the people directory.
//!
//! The directory is an exact-match keyed service: one identifier in, zero or more records out.
//! [`Directory::lookup`] turns that into one entry per requested identifier, keeping input
//! order and duplicates, and taking the first record when several match.
//!
//! An unreachable service is a [`DirectoryError`]; a reachable service that knows nothing
//! about the identifier is a successful lookup with no record.

use ldap3::{ldap_escape, LdapConn, Scope, SearchEntry};
use std::collections::HashMap;
use tracing::debug;

/// Transport or protocol failure reported by a directory backend.
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// Attribute holding a person's mailbox.
pub const MAIL_ATTRIBUTE: &str = "mail";

#[derive(Debug, thiserror::Error)]
/// Systemic directory failure; aborts the resolution pass.
pub enum DirectoryError {
    /// The service could not be reached or the session could not be set up.
    #[error("directory at {url} is unreachable: {source}")]
    Unreachable {
        /// Address of the directory service.
        url: String,
        /// Underlying transport error.
        #[source]
        source: BackendError,
    },
    /// The service answered a query with an error.
    #[error("directory query for {identifier:?} failed: {source}")]
    Query {
        /// Identifier that was being looked up.
        identifier: String,
        /// Underlying protocol error.
        #[source]
        source: BackendError,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Raw attribute record returned by the directory.
pub struct DirectoryRecord {
    /// Distinguished name of the entry.
    pub dn: String,
    /// Attribute name to values, as delivered by the service.
    pub attrs: HashMap<String, Vec<String>>,
}

impl DirectoryRecord {
    #[must_use]
    /// Record with a single mail attribute, handy for static directories.
    pub fn with_mail(dn: impl Into<String>, mail: impl Into<String>) -> Self {
        let mut attrs = HashMap::new();
        attrs.insert(MAIL_ATTRIBUTE.to_string(), vec![mail.into()]);
        Self {
            dn: dn.into(),
            attrs,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Outcome of looking up one identifier.
pub struct DirectoryEntry {
    /// Identifier as requested.
    pub identifier: String,
    /// First matching record, or `None` when nothing matched.
    pub record: Option<DirectoryRecord>,
}

/// Exact-match people directory.
pub trait Directory {
    /// All records whose identifier field equals `identifier`.
    ///
    /// # Errors
    ///
    /// Returns an error when the service is unreachable or rejects the query.
    fn search(&mut self, identifier: &str) -> Result<Vec<DirectoryRecord>, DirectoryError>;

    /// One entry per identifier, in input order, keeping duplicates.
    ///
    /// # Errors
    ///
    /// Fails fast on the first systemic error; no partial result is returned.
    fn lookup(&mut self, identifiers: &[String]) -> Result<Vec<DirectoryEntry>, DirectoryError> {
        identifiers
            .iter()
            .map(|identifier| {
                let record = self.search(identifier)?.into_iter().next();
                Ok(DirectoryEntry {
                    identifier: identifier.clone(),
                    record,
                })
            })
            .collect()
    }
}

#[must_use]
/// Mailbox stored in a record, or `None` for records without one.
pub fn extract_address(record: &DirectoryRecord) -> Option<&str> {
    record
        .attrs
        .get(MAIL_ATTRIBUTE)
        .and_then(|values| values.first())
        .map(String::as_str)
        .filter(|mail| !mail.trim().is_empty())
}

/// LDAP directory keyed on `uid`, connected on first use.
pub struct LdapDirectory {
    url: String,
    base_dn: String,
    conn: Option<LdapConn>,
}

impl LdapDirectory {
    #[must_use]
    /// Directory at `url` searching the subtree below `base_dn`.
    pub fn new(url: impl Into<String>, base_dn: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            base_dn: base_dn.into(),
            conn: None,
        }
    }

    fn connection(&mut self) -> Result<&mut LdapConn, DirectoryError> {
        let conn = match self.conn.take() {
            Some(conn) => conn,
            None => {
                debug!(url = %self.url, "connecting to directory");
                LdapConn::new(&self.url).map_err(|source| DirectoryError::Unreachable {
                    url: self.url.clone(),
                    source: source.into(),
                })?
            }
        };
        Ok(self.conn.insert(conn))
    }
}

impl Directory for LdapDirectory {
    fn search(&mut self, identifier: &str) -> Result<Vec<DirectoryRecord>, DirectoryError> {
        let filter = format!("(uid={})", ldap_escape(identifier));
        let base_dn = self.base_dn.clone();
        let query_error = |source: ldap3::LdapError| DirectoryError::Query {
            identifier: identifier.to_string(),
            source: source.into(),
        };

        let (entries, _) = self
            .connection()?
            .search(&base_dn, Scope::Subtree, &filter, vec![MAIL_ATTRIBUTE])
            .and_then(|result| result.success())
            .map_err(query_error)?;

        debug!(identifier, matches = entries.len(), "directory search");
        Ok(entries
            .into_iter()
            .map(|entry| {
                let entry = SearchEntry::construct(entry);
                DirectoryRecord {
                    dn: entry.dn,
                    attrs: entry.attrs,
                }
            })
            .collect())
    }
}

impl Drop for LdapDirectory {
    fn drop(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            let _ = conn.unbind();
        }
    }
}

#[cfg(test)]
#[path = "tests/directory.rs"]
mod tests;
