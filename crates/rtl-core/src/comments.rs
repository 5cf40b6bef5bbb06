//! Setting embedded comments aside while a processor rewrites a value.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static COMMENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("invalid comment regex"));

static PLACEHOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("\u{E000}(\\d+)\u{E001}").expect("invalid placeholder regex"));

/// Comments removed from a value, restorable by index.
///
/// Each comment is replaced by a private-use placeholder that contains no
/// whitespace and no word characters at its edges, so processors see it as
/// an opaque token and never match directional keywords inside it.
#[derive(Debug, Default)]
pub(crate) struct SavedComments {
    comments: Vec<String>,
}

impl SavedComments {
    /// Replace every comment in `value` with a placeholder.
    pub(crate) fn save(value: &str) -> (String, Self) {
        let mut comments = Vec::new();
        let stripped = COMMENT_PATTERN
            .replace_all(value, |caps: &Captures<'_>| {
                let token = format!("\u{E000}{}\u{E001}", comments.len());
                comments.push(caps[0].to_owned());
                token
            })
            .into_owned();
        (stripped, Self { comments })
    }

    /// Put the saved comments back in place of their placeholders.
    pub(crate) fn restore(&self, value: &str) -> String {
        if self.comments.is_empty() {
            return value.to_owned();
        }
        PLACEHOLDER_PATTERN
            .replace_all(value, |caps: &Captures<'_>| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| self.comments.get(index))
                    .map_or_else(|| caps[0].to_owned(), Clone::clone)
            })
            .into_owned()
    }
}
