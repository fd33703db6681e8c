//! Splits the minutes into agenda items bounded by `===` marker lines.
//!
//! A boundary is a heading line sandwiched between two marker lines:
//!
//! ```text
//! ===
//! Heading
//! ===
//! ```
//!
//! Every line index whose line and the line two below both start with the marker opens a
//! section. Sections run up to (not including) the line just before the next opening marker;
//! the last one runs to the end of the document.

/// Prefix shared by both marker lines of a heading block.
pub const MARKER: &str = "===";

#[derive(Clone, Debug, PartialEq, Eq)]
/// Position and heading of one agenda item, before any resolution work.
pub struct Boundary {
    /// 1-based position among all sections.
    pub ordinal: usize,
    /// Line of the opening marker.
    pub start: usize,
    /// Exclusive end line of the section.
    pub end: usize,
    /// Heading text as written between the markers.
    pub heading_text: String,
}

#[must_use]
/// Line indices that open a heading block.
pub fn boundary_starts<S: AsRef<str>>(lines: &[S]) -> Vec<usize> {
    if lines.len() < 3 {
        return Vec::new();
    }
    (0..lines.len() - 2)
        .filter(|&i| {
            lines[i].as_ref().starts_with(MARKER) && lines[i + 2].as_ref().starts_with(MARKER)
        })
        .collect()
}

#[must_use]
/// Ordered, non-overlapping sections of `lines`.
///
/// A document without heading blocks has no sections. Overlapping marker runs are not special
/// cased: each index is judged on its own, so `===` lines in a row each open a section.
pub fn segment<S: AsRef<str>>(lines: &[S]) -> Vec<Boundary> {
    let mut starts = boundary_starts(lines);
    // terminal sentinel; `end` is one less, i.e. the document length
    starts.push(lines.len() + 1);

    starts
        .windows(2)
        .enumerate()
        .map(|(k, pair)| Boundary {
            ordinal: k + 1,
            start: pair[0],
            end: pair[1] - 1,
            heading_text: lines[pair[0] + 1].as_ref().to_string(),
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/segmenter.rs"]
mod tests;
