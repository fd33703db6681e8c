//! Markdown rendering of processed minutes.
//!
//! Each section becomes a second-level heading followed by its body; mentions are set in bold
//! so the rendered minutes show who was notified.

use crate::mention;
use std::fmt::Write;

#[derive(Clone, Debug, PartialEq, Eq)]
/// One section as seen by the renderer.
pub struct OutlineEntry<'a> {
    /// Section ordinal.
    pub ordinal: usize,
    /// Canonical heading.
    pub heading: &'a str,
    /// Lines below the heading block.
    pub body: &'a [String],
}

#[must_use]
/// Renders `entries` under a top-level `title`.
pub fn render_markdown(title: &str, entries: &[OutlineEntry<'_>]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {title}");

    for entry in entries {
        let _ = writeln!(out, "\n## {}\n", entry.heading);

        let body: Vec<String> = entry
            .body
            .iter()
            .map(|line| mention::emphasize(line).into_owned())
            .collect();
        let body = body.join("\n");
        let body = body.trim();
        if !body.is_empty() {
            let _ = writeln!(out, "{body}");
        }
    }

    out
}

#[must_use]
/// Table of contents: one line per `(ordinal, heading)`.
pub fn render_contents(headings: &[(usize, &str)]) -> String {
    headings.iter().fold(String::new(), |mut out, (ordinal, heading)| {
        let _ = writeln!(out, "{ordinal}. {heading}");
        out
    })
}

#[cfg(test)]
#[path = "tests/template.rs"]
mod tests;
