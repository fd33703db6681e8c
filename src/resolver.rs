//! Resolution of mention tokens to mailboxes.
//!
//! Each token is tried against, in order:
//!
//! 1. the people directory (authoritative for anything it knows),
//! 2. the alias table (`token@org-domain`),
//! 3. a literal `local@domain` address inside the token, optionally with a display name,
//! 4. the operator, who is asked for a replacement identifier until one resolves or they
//!    answer [`SKIP`].
//!
//! The result keeps a 1:1 correspondence between the input tokens, the display tokens used to
//! greet recipients, and the resolved addresses. A directory outage aborts the whole pass; a
//! token nobody can resolve only ends up in [`Resolution::unresolved`].

use crate::alias::AliasTable;
use crate::directory::{extract_address, Directory, DirectoryError};
use regex::Regex;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::sync::LazyLock;
use tracing::{debug, info, warn};

/// Operator answer that gives up on a token.
pub const SKIP: &str = "q";

static LITERAL_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[^\s<>()\[\],;"']+@[^\s<>()\[\],;"']+"#).expect("address pattern is valid")
});

/// Characters wrapped around addresses and names that are not part of either.
const NAME_PUNCTUATION: &[char] = &['<', '>', '(', ')', '[', ']', ',', ';', '"', '\''];

#[derive(Debug, thiserror::Error)]
/// Failure that aborts a resolution pass.
pub enum ResolveError {
    /// The directory could not be queried.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    /// The operator prompt could not be read or written.
    #[error("operator prompt failed: {0}")]
    Prompt(#[from] io::Error),
}

/// Source of replacement identifiers for tokens nothing else could resolve.
pub trait Prompt {
    /// Asks for a replacement for `token`, mentioned under `heading`.
    ///
    /// Returns `None` once no more answers can be given (for example on end of input), which the
    /// resolver treats like [`SKIP`].
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt channel fails.
    fn ask(&mut self, token: &str, heading: &str) -> io::Result<Option<String>>;
}

/// Prompts on a terminal-like reader/writer pair.
pub struct ConsolePrompt<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    #[must_use]
    /// Prompt reading answers from `reader` and writing questions to `writer`.
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl ConsolePrompt<io::StdinLock<'static>, io::Stdout> {
    #[must_use]
    /// Prompt on the process's standard input and output.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompt for ConsolePrompt<R, W> {
    fn ask(&mut self, token: &str, heading: &str) -> io::Result<Option<String>> {
        writeln!(
            self.writer,
            "\n\"{token}\" aus \"{heading}\" konnte nicht zugeordnet werden."
        )?;
        write!(
            self.writer,
            "Uni-ID oder Verteiler eingeben ('{SKIP}' zum Überspringen): "
        )?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

/// Prompt for unattended runs: skips every token.
pub struct SkipPrompt;

impl Prompt for SkipPrompt {
    fn ask(&mut self, _token: &str, _heading: &str) -> io::Result<Option<String>> {
        Ok(Some(SKIP.to_string()))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Parallel lists produced for one set of tokens.
pub struct Resolution {
    /// Display token for each input token, used to greet the recipient.
    pub tokens: Vec<String>,
    /// Mailbox for each input token, `None` where resolution was given up.
    pub addresses: Vec<Option<String>>,
    /// Original tokens that could not be resolved, in input order.
    pub unresolved: Vec<String>,
}

impl Resolution {
    /// `(display token, address)` for every resolved token, in input order.
    pub fn resolved(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tokens
            .iter()
            .zip(&self.addresses)
            .filter_map(|(token, address)| Some((token.as_str(), address.as_deref()?)))
    }

    fn push(&mut self, token: String, address: Option<String>) {
        self.tokens.push(token);
        self.addresses.push(address);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Address found verbatim inside a token.
pub struct LiteralAddress {
    /// The `local@domain` part.
    pub address: String,
    /// Free text around the address, or the local part when there is none.
    pub display: String,
}

#[must_use]
/// Finds a `local@domain` address anywhere in `token`.
pub fn parse_literal(token: &str) -> Option<LiteralAddress> {
    let found = LITERAL_ADDRESS.find(token)?;
    let address = found.as_str().to_string();

    let rest = format!("{} {}", &token[..found.start()], &token[found.end()..]);
    let display = rest
        .split_whitespace()
        .map(|word| word.trim_matches(NAME_PUNCTUATION))
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let display = if display.is_empty() {
        address
            .split_once('@')
            .map_or_else(|| address.clone(), |(local, _)| local.to_string())
    } else {
        display
    };

    Some(LiteralAddress { address, display })
}

/// Resolves tokens for one pipeline run; directory answers are cached for the run.
pub struct Resolver<'a> {
    aliases: &'a AliasTable,
    directory: &'a mut dyn Directory,
    prompt: &'a mut dyn Prompt,
    cache: HashMap<String, Option<String>>,
}

impl<'a> Resolver<'a> {
    /// Resolver over the given alias table, directory and operator prompt.
    pub fn new(
        aliases: &'a AliasTable,
        directory: &'a mut dyn Directory,
        prompt: &'a mut dyn Prompt,
    ) -> Self {
        Self {
            aliases,
            directory,
            prompt,
            cache: HashMap::new(),
        }
    }

    /// Resolves every token in `tokens`, mentioned in the section titled `heading`.
    ///
    /// The returned lists have the same length and order as `tokens`, even when nothing
    /// resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is unreachable or the operator prompt fails.
    pub fn resolve(
        &mut self,
        tokens: &[String],
        heading: &str,
    ) -> Result<Resolution, ResolveError> {
        let mut resolution = Resolution::default();

        for token in tokens {
            if let Some(address) = self.directory_address(token)? {
                debug!(%token, %address, "resolved via directory");
                resolution.push(token.clone(), Some(address));
            } else if let Some(address) = self.aliases.address_for(token) {
                debug!(%token, %address, "resolved via alias table");
                resolution.push(token.clone(), Some(address));
            } else if let Some(literal) = parse_literal(token) {
                debug!(%token, address = %literal.address, "resolved literal address");
                resolution.push(literal.display, Some(literal.address));
            } else if let Some((replacement, address)) = self.ask_operator(token, heading)? {
                info!(%token, %replacement, %address, "resolved by operator");
                resolution.push(replacement, Some(address));
            } else {
                warn!(%token, %heading, "recipient left unresolved");
                resolution.push(token.clone(), None);
                resolution.unresolved.push(token.clone());
            }
        }

        Ok(resolution)
    }

    /// Directory mailbox for `identifier`, matched lower-cased.
    ///
    /// A record without a mailbox counts as no match.
    fn directory_address(&mut self, identifier: &str) -> Result<Option<String>, DirectoryError> {
        let key = identifier.to_lowercase();
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached.clone());
        }

        let entries = self.directory.lookup(std::slice::from_ref(&key))?;
        let address = entries
            .into_iter()
            .next()
            .and_then(|entry| entry.record)
            .and_then(|record| extract_address(&record).map(ToString::to_string));

        if address.is_none() {
            debug!(%identifier, "no usable directory record");
        }
        self.cache.insert(key, address.clone());
        Ok(address)
    }

    /// Asks the operator until a replacement resolves or they give up.
    fn ask_operator(
        &mut self,
        token: &str,
        heading: &str,
    ) -> Result<Option<(String, String)>, ResolveError> {
        loop {
            let Some(answer) = self.prompt.ask(token, heading)? else {
                return Ok(None);
            };
            let answer = answer.trim();
            if answer == SKIP {
                return Ok(None);
            }
            if answer.is_empty() {
                continue;
            }

            if let Some(address) = self.directory_address(answer)? {
                return Ok(Some((answer.to_string(), address)));
            }
            if let Some(address) = self.aliases.address_for(answer) {
                return Ok(Some((answer.to_string(), address)));
            }
            warn!(%token, replacement = %answer, "replacement did not resolve either");
        }
    }
}

#[cfg(test)]
#[path = "tests/resolver.rs"]
mod tests;
