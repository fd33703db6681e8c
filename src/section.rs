//! Agenda item aggregate: one heading block plus the mentions found below it.
//!
//! A section only owns its line range; the lines themselves belong to the
//! [`Document`](crate::document::Document) and are passed in for each step. Sections move
//! through a fixed sequence of states:
//!
//! ```text
//! Bounded -> TokensExtracted -> Resolved -> Renamed -> Notified
//! ```
//!
//! Repeating a step that has already happened is a no-op; skipping ahead is an error.

use crate::mention;
use crate::resolver::{ResolveError, Resolver};
use crate::segmenter::{Boundary, MARKER};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
/// Progress of a section through the pipeline.
pub enum SectionState {
    /// Line range and heading are known.
    Bounded,
    /// Mentions have been collected from the content.
    TokensExtracted,
    /// Every mention has an address or has been given up on.
    Resolved,
    /// The heading has its canonical numbered form.
    Renamed,
    /// Mails for this section have gone out.
    Notified,
}

impl fmt::Display for SectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bounded => "bounded",
            Self::TokensExtracted => "tokens extracted",
            Self::Resolved => "resolved",
            Self::Renamed => "renamed",
            Self::Notified => "notified",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
/// A section step was attempted before the steps it depends on.
pub enum SectionError {
    /// The section is not yet in the state the step starts from.
    #[error("section {ordinal} is {state}, but this step needs it {required}")]
    OutOfOrder {
        /// Ordinal of the section.
        ordinal: usize,
        /// State the section is in.
        state: SectionState,
        /// State the step starts from.
        required: SectionState,
    },
    /// Resolving the section's mentions failed.
    #[error("section {ordinal}: {source}")]
    Resolve {
        /// Ordinal of the section.
        ordinal: usize,
        /// Underlying resolution failure.
        #[source]
        source: ResolveError,
    },
}

#[must_use]
/// Whether `text` already reads `<word> <number>: ...`, ignoring case.
pub fn is_canonical(word: &str, text: &str) -> bool {
    let text = text.trim_start();
    let Some(head) = text.get(..word.len()) else {
        return false;
    };
    if head.to_lowercase() != word.to_lowercase() {
        return false;
    }

    let rest = &text[word.len()..];
    let number = rest.trim_start();
    if number.len() == rest.len() {
        return false;
    }
    let digits = number.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && number[digits..].starts_with(':')
}

#[must_use]
/// Heading in canonical form, leaving already-numbered headings untouched.
pub fn canonical_heading(word: &str, ordinal: usize, text: &str) -> String {
    if is_canonical(word, text) {
        text.to_string()
    } else {
        format!("{word} {ordinal}: {text}")
    }
}

#[derive(Clone, Debug)]
/// One agenda item and the recipients mentioned in it.
pub struct Section {
    /// 1-based position among all sections.
    pub ordinal: usize,
    /// Line of the opening marker.
    pub start: usize,
    /// Exclusive end line.
    pub end: usize,
    /// Current heading text.
    pub heading_text: String,
    state: SectionState,
    mentions: Vec<String>,
    tokens: Vec<String>,
    addresses: Vec<Option<String>>,
    unresolved: Vec<String>,
}

impl From<Boundary> for Section {
    fn from(boundary: Boundary) -> Self {
        Self {
            ordinal: boundary.ordinal,
            start: boundary.start,
            end: boundary.end,
            heading_text: boundary.heading_text,
            state: SectionState::Bounded,
            mentions: Vec::new(),
            tokens: Vec::new(),
            addresses: Vec::new(),
            unresolved: Vec::new(),
        }
    }
}

impl Section {
    #[must_use]
    /// Where the section is in the pipeline.
    pub fn state(&self) -> SectionState {
        self.state
    }

    #[must_use]
    /// Tokens as written in the minutes.
    pub fn mentions(&self) -> &[String] {
        &self.mentions
    }

    #[must_use]
    /// Display tokens, parallel to [`Section::addresses`].
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    #[must_use]
    /// Resolved mailboxes, `None` for mentions that were given up on.
    pub fn addresses(&self) -> &[Option<String>] {
        &self.addresses
    }

    #[must_use]
    /// Mentions nobody could resolve.
    pub fn unresolved(&self) -> &[String] {
        &self.unresolved
    }

    /// `(display token, address)` for every resolved mention.
    pub fn recipients(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tokens
            .iter()
            .zip(&self.addresses)
            .filter_map(|(token, address)| Some((token.as_str(), address.as_deref()?)))
    }

    #[must_use]
    /// The section's lines of `lines`, clamped to the document.
    pub fn lines<'l>(&self, lines: &'l [String]) -> &'l [String] {
        let end = self.end.min(lines.len());
        &lines[self.start.min(end)..end]
    }

    #[must_use]
    /// The section as it reads in the document.
    pub fn text(&self, lines: &[String]) -> String {
        self.lines(lines).join("\n")
    }

    /// Lines below the heading block.
    #[must_use]
    pub fn body<'l>(&self, lines: &'l [String]) -> &'l [String] {
        let section = self.lines(lines);
        section.get(3..).unwrap_or_default()
    }

    /// Moves from `required` to `next`; `Ok(false)` when `next` was already reached.
    fn advance(&mut self, required: SectionState, next: SectionState) -> Result<bool, SectionError> {
        if self.state >= next {
            return Ok(false);
        }
        if self.state != required {
            return Err(SectionError::OutOfOrder {
                ordinal: self.ordinal,
                state: self.state,
                required,
            });
        }
        self.state = next;
        Ok(true)
    }

    /// Collects the distinct mentions in the section's lines.
    ///
    /// # Errors
    ///
    /// Never fails for a fresh section; see [`SectionError::OutOfOrder`].
    pub fn extract_tokens(&mut self, lines: &[String]) -> Result<&[String], SectionError> {
        if self.advance(SectionState::Bounded, SectionState::TokensExtracted)? {
            self.mentions = mention::extract(self.lines(lines));
        }
        Ok(&self.mentions)
    }

    /// Resolves the extracted mentions.
    ///
    /// # Errors
    ///
    /// Returns an error if tokens were not extracted yet or resolution aborts.
    pub fn resolve(&mut self, resolver: &mut Resolver<'_>) -> Result<(), SectionError> {
        if self.state >= SectionState::Resolved {
            return Ok(());
        }
        if self.state != SectionState::TokensExtracted {
            return Err(SectionError::OutOfOrder {
                ordinal: self.ordinal,
                state: self.state,
                required: SectionState::TokensExtracted,
            });
        }

        let resolution = resolver
            .resolve(&self.mentions, &self.heading_text)
            .map_err(|source| SectionError::Resolve {
                ordinal: self.ordinal,
                source,
            })?;
        self.tokens = resolution.tokens;
        self.addresses = resolution.addresses;
        self.unresolved = resolution.unresolved;
        self.state = SectionState::Resolved;
        Ok(())
    }

    /// Gives the heading its canonical `<word> <ordinal>: <text>` form and rewrites the heading
    /// block in `lines`, sizing both marker lines to the heading.
    ///
    /// # Errors
    ///
    /// Returns an error if the section is not resolved yet.
    pub fn rename(&mut self, lines: &mut [String], word: &str) -> Result<(), SectionError> {
        if !self.advance(SectionState::Resolved, SectionState::Renamed)? {
            return Ok(());
        }

        self.heading_text = canonical_heading(word, self.ordinal, &self.heading_text);
        let rule = "=".repeat(self.heading_text.chars().count().max(MARKER.len()));
        let block = [rule.clone(), self.heading_text.clone(), rule];
        for (line, replacement) in lines.iter_mut().skip(self.start).zip(block) {
            *line = replacement;
        }
        Ok(())
    }

    /// Records that the section's mails have been sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the section was not renamed yet.
    pub fn mark_notified(&mut self) -> Result<(), SectionError> {
        self.advance(SectionState::Renamed, SectionState::Notified)
            .map(|_| ())
    }
}

#[cfg(test)]
#[path = "tests/section.rs"]
mod tests;
