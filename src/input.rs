//! Locating the minutes: local files named after the meeting date, or pads fetched over HTTP.

use crate::document::Document;
use regex::Regex;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::info;

static MINUTES_FILE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^20\d{2}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])\.txt$")
        .expect("file name pattern is valid")
});

/// Suffix that makes a pad serve its plain-text export.
const PAD_EXPORT_SUFFIX: &str = "/export/txt";

#[derive(Debug, thiserror::Error)]
/// Failure to locate or fetch the minutes.
pub enum InputError {
    /// The given path is not an existing file.
    #[error("{0} does not lead to any minutes")]
    NotFound(PathBuf),
    /// Renaming the file failed.
    #[error("cannot rename {from} to {to}: {source}")]
    Rename {
        /// Current file name.
        from: PathBuf,
        /// Requested file name.
        to: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The operator prompt failed or was closed.
    #[error("operator prompt failed: {0}")]
    Prompt(#[from] io::Error),
    /// Downloading the minutes failed.
    #[error("cannot download {url}: {source}")]
    Download {
        /// Requested URL.
        url: String,
        /// HTTP error.
        #[source]
        source: Box<ureq::Error>,
    },
}

#[must_use]
/// Whether `location` should be downloaded rather than opened.
pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

#[must_use]
/// Whether the file name of `path` is a meeting date, `yyyy-mm-dd.txt`.
pub fn is_minutes_file_name(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| MINUTES_FILE_NAME.is_match(name))
}

/// Makes sure `path` exists and is named after the meeting date, asking the operator for a
/// new name and renaming the file until it is.
///
/// # Errors
///
/// Returns an error if the file does not exist, cannot be renamed, or the operator closes the
/// prompt.
pub fn ensure_minutes_file_name<R: BufRead, W: Write>(
    path: &Path,
    reader: &mut R,
    writer: &mut W,
) -> Result<PathBuf, InputError> {
    if !path.is_file() {
        return Err(InputError::NotFound(path.to_path_buf()));
    }

    let mut current = path.to_path_buf();
    while !is_minutes_file_name(&current) {
        writeln!(
            writer,
            "Den Dateinamen {} solltest du in das Datum der Sitzung ändern: yyyy-mm-dd.txt",
            current.display()
        )?;
        write!(writer, "Bitte gib den korrekten Dateinamen an: ")?;
        writer.flush()?;

        let mut answer = String::new();
        if reader.read_line(&mut answer)? == 0 {
            return Err(InputError::Prompt(io::ErrorKind::UnexpectedEof.into()));
        }
        let answer = answer.trim();
        if answer.is_empty() {
            continue;
        }

        let renamed = current.with_file_name(answer);
        fs::rename(&current, &renamed).map_err(|source| InputError::Rename {
            from: current.clone(),
            to: renamed.clone(),
            source,
        })?;
        info!(from = %current.display(), to = %renamed.display(), "renamed minutes");
        current = renamed;
    }
    Ok(current)
}

#[must_use]
/// URL serving the plain text behind `url`.
pub fn export_url(url: &str) -> String {
    if url.contains("pad") && !url.ends_with(PAD_EXPORT_SUFFIX) {
        format!("{}{PAD_EXPORT_SUFFIX}", url.trim_end_matches('/'))
    } else {
        url.to_string()
    }
}

#[must_use]
/// Local file the downloaded minutes are saved to: the last URL segment plus `.txt`.
pub fn local_name(url: &str) -> PathBuf {
    let segment = url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or("protokoll");
    PathBuf::from(format!("{segment}.txt"))
}

/// Downloads the minutes at `url` into a document saved next to the working directory.
///
/// # Errors
///
/// Returns an error if the request fails or the body is not text.
pub fn download(url: &str) -> Result<Document, InputError> {
    let export = export_url(url);
    info!(url = %export, "downloading minutes");
    let download_error = |source: ureq::Error| InputError::Download {
        url: export.clone(),
        source: Box::new(source),
    };

    let mut response = ureq::get(export.as_str()).call().map_err(download_error)?;
    let text = response
        .body_mut()
        .read_to_string()
        .map_err(download_error)?;
    Ok(Document::from_text(local_name(url), &text))
}

#[cfg(test)]
#[path = "tests/input.rs"]
mod tests;
