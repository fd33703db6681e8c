//! Commits the processed minutes to the Subversion working copy.

use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus};
use tracing::{debug, info};

/// Commit message used for new minutes.
pub const COMMIT_MESSAGE: &str = "Protokoll der gemeinsamen Sitzung hinzugefügt";

#[derive(Debug, thiserror::Error)]
/// A version control command could not be run or did not succeed.
pub enum VcsError {
    /// The command could not be started.
    #[error("cannot run `{command}`: {source}")]
    Spawn {
        /// Command line that was attempted.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The command exited unsuccessfully.
    #[error("`{command}` failed with {status}")]
    Failed {
        /// Command line that failed.
        command: String,
        /// Exit status of the command.
        status: ExitStatus,
    },
}

#[derive(Clone, Debug)]
/// Subversion client invocation.
pub struct Svn {
    program: String,
    message: String,
}

impl Default for Svn {
    fn default() -> Self {
        Self::with_program("svn")
    }
}

impl Svn {
    #[must_use]
    /// Client run through `program` instead of `svn` from `PATH`.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            message: COMMIT_MESSAGE.to_string(),
        }
    }

    #[must_use]
    /// Uses `message` for the commit.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Updates the working copy, schedules `path` for addition and commits it.
    ///
    /// # Errors
    ///
    /// Returns the first command that could not be run or failed.
    pub fn commit(&self, path: &Path) -> Result<(), VcsError> {
        self.run([OsStr::new("up")])?;
        self.run([OsStr::new("add"), OsStr::new("--force"), path.as_os_str()])?;
        self.run([
            OsStr::new("commit"),
            OsStr::new("-m"),
            OsStr::new(&self.message),
            path.as_os_str(),
        ])?;
        info!(path = %path.display(), "minutes committed");
        Ok(())
    }

    fn run<'a>(&self, args: impl IntoIterator<Item = &'a OsStr>) -> Result<(), VcsError> {
        let args: Vec<&OsStr> = args.into_iter().collect();
        let command = std::iter::once(self.program.as_str())
            .chain(args.iter().map(|arg| arg.to_str().unwrap_or("?")))
            .collect::<Vec<_>>()
            .join(" ");
        debug!(%command, "running");

        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .map_err(|source| VcsError::Spawn {
                command: command.clone(),
                source,
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(VcsError::Failed { command, status })
        }
    }
}

#[cfg(test)]
#[path = "tests/vcs.rs"]
mod tests;
