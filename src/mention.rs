//! Mentions of people and lists inside the minutes: `${token}`.

use regex::Regex;
use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::LazyLock;

static MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(.*?)\}").expect("mention pattern is valid"));

#[must_use]
/// Every distinct token mentioned in `lines`, in order of first appearance.
///
/// Matching is non-greedy and does not nest, so `${a} and ${b}` yields `a` and `b`. Tokens are
/// kept exactly as written; blank mentions such as `${}` are ignored.
pub fn extract<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    lines
        .iter()
        .flat_map(|line| MENTION.captures_iter(line.as_ref()))
        .filter_map(|caps| caps.get(1))
        .map(|token| token.as_str().to_string())
        .filter(|token| !token.trim().is_empty())
        .filter(|token| seen.insert(token.clone()))
        .collect()
}

#[must_use]
/// `line` with every `${token}` replaced by `**token**`.
pub fn emphasize(line: &str) -> Cow<'_, str> {
    MENTION.replace_all(line, "**$1**")
}

#[cfg(test)]
#[path = "tests/mention.rs"]
mod tests;
