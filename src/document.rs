//! The minutes as a sequence of lines, loaded once and written back once per run.
//!
//! After mails have gone out, a two-line stamp is put in front of the document. Finding that
//! stamp on the next run means the minutes were already processed.

use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Start of the stamp line written after a successful send.
pub const STAMP_PREFIX: &str = ":Protocoldude: Mails versandt @";

#[derive(Debug, thiserror::Error)]
/// Failure to read or persist the minutes.
pub enum DocumentError {
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The file could not be written.
    #[error("cannot write {path}: {source}")]
    Write {
        /// File that was written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Minutes file and its lines.
pub struct Document {
    path: PathBuf,
    lines: Vec<String>,
}

impl Document {
    /// Reads the minutes at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read as UTF-8.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DocumentError> {
        let path = path.into();
        let contents = fs::read_to_string(&path).map_err(|source| DocumentError::Read {
            path: path.clone(),
            source,
        })?;
        Ok(Self::from_text(path, &contents))
    }

    #[must_use]
    /// Document to be saved at `path` with the given contents.
    pub fn from_text(path: impl Into<PathBuf>, contents: &str) -> Self {
        Self {
            path: path.into(),
            lines: contents.lines().map(ToString::to_string).collect(),
        }
    }

    #[must_use]
    /// Where the document is saved.
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    /// All lines, without line terminators.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Lines for in-place heading rewrites.
    pub fn lines_mut(&mut self) -> &mut [String] {
        &mut self.lines
    }

    #[must_use]
    /// Whether a previous run already sent mails for these minutes.
    pub fn is_stamped(&self) -> bool {
        self.lines
            .first()
            .is_some_and(|line| line.starts_with(STAMP_PREFIX))
    }

    /// Puts the "mails sent" stamp and a blank line in front of the document.
    pub fn stamp(&mut self, at: DateTime<Local>) {
        let stamp = format!("{STAMP_PREFIX} {}", at.format("%H:%M %d.%m.%Y"));
        self.lines.splice(0..0, [stamp, String::new()]);
    }

    #[must_use]
    /// File contents: every line terminated by a newline.
    pub fn to_text(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }

    /// Writes the document back to its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> Result<(), DocumentError> {
        fs::write(&self.path, self.to_text()).map_err(|source| DocumentError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
#[path = "tests/document.rs"]
mod tests;
