//! Token-based left/right string substitution.
//!
//! Used to mirror selectors and URL-like at-rule params, and available to
//! processors as a primitive.

use regex::{Captures, Regex, RegexBuilder};
use rtl_config::{Options, StringMapEntry};

/// Matching options for a [`Swap`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwapOptions {
    /// Match tokens regardless of case.
    pub ignore_case: bool,
    /// Match tokens inside words (no word-boundary anchoring).
    pub greedy: bool,
}

/// Simultaneous swap of two tokens.
///
/// Both directions are replaced in one pass, so `left` → `right` never
/// turns back into `left`.
///
/// # Example
///
/// ```
/// use rtl_core::{Swap, SwapOptions};
///
/// let swap = Swap::new("left", "right", SwapOptions::default()).unwrap();
/// assert_eq!(swap.apply(".pull-left > .right"), ".pull-right > .left");
/// assert_eq!(swap.apply(".leftover"), ".leftover");
/// ```
#[derive(Debug, Clone)]
pub struct Swap {
    pattern: Regex,
    first: String,
    second: String,
    first_folded: String,
}

impl Swap {
    /// Compile a swap between `first` and `second`.
    pub fn new(first: &str, second: &str, options: SwapOptions) -> Result<Self, regex::Error> {
        let alternation = format!("{}|{}", regex::escape(first), regex::escape(second));
        let source = if options.greedy {
            alternation
        } else {
            format!(r"\b(?:{alternation})\b")
        };
        let pattern = RegexBuilder::new(&source)
            .case_insensitive(options.ignore_case)
            .build()?;

        Ok(Self {
            pattern,
            first: first.to_owned(),
            second: second.to_owned(),
            first_folded: first.to_lowercase(),
        })
    }

    /// Apply the swap to `text`.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, |caps: &Captures<'_>| {
                if caps[0].to_lowercase() == self.first_folded {
                    self.second.clone()
                } else {
                    self.first.clone()
                }
            })
            .into_owned()
    }
}

/// What kind of text is being mirrored; selects string map entries by scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorTarget {
    Selector,
    Url,
}

#[derive(Debug, Clone)]
struct MirrorEntry {
    source: StringMapEntry,
    swaps: Vec<Swap>,
}

/// Compiled string map.
///
/// Entries apply in ascending priority; within an entry each
/// `search[i]` ↔ `replace[i]` pair is swapped in turn.
#[derive(Debug, Clone)]
pub struct StringMirror {
    entries: Vec<MirrorEntry>,
}

impl StringMirror {
    /// Compile a string map. `greedy` is the default for entries that don't
    /// override it.
    pub fn new(map: &[StringMapEntry], greedy: bool) -> Result<Self, regex::Error> {
        let mut sorted: Vec<&StringMapEntry> = map.iter().collect();
        sorted.sort_by_key(|entry| entry.priority);

        let entries = sorted
            .into_iter()
            .map(|entry| {
                let options = SwapOptions {
                    ignore_case: entry.ignore_case,
                    greedy: entry.greedy.unwrap_or(greedy),
                };
                let swaps = entry
                    .search
                    .iter()
                    .zip(&entry.replace)
                    .map(|(search, replace)| Swap::new(search, replace, options))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(MirrorEntry {
                    source: entry.clone(),
                    swaps,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self { entries })
    }

    /// Compile the string map carried by `options`.
    pub fn from_options(options: &Options) -> Result<Self, regex::Error> {
        Self::new(&options.string_map, options.greedy)
    }

    /// Mirror `text` using every entry whose scope covers `target`.
    #[must_use]
    pub fn apply(&self, text: &str, target: MirrorTarget) -> String {
        let url = target == MirrorTarget::Url;
        let mut result = text.to_owned();

        for entry in &self.entries {
            if !entry.source.applies_to(url) {
                continue;
            }
            for swap in &entry.swaps {
                result = swap.apply(&result);
            }
            if entry.source.exclusive {
                break;
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtl_config::{MapScope, default_string_map};

    fn default_mirror() -> StringMirror {
        StringMirror::new(&default_string_map(), false).unwrap()
    }

    #[test]
    fn test_swap_is_simultaneous() {
        let swap = Swap::new("left", "right", SwapOptions::default()).unwrap();
        assert_eq!(swap.apply("left right left"), "right left right");
    }

    #[test]
    fn test_swap_word_boundaries() {
        let swap = Swap::new("left", "right", SwapOptions::default()).unwrap();
        assert_eq!(swap.apply(".float-left"), ".float-right");
        assert_eq!(swap.apply(".leftish"), ".leftish");

        let greedy = Swap::new(
            "left",
            "right",
            SwapOptions {
                greedy: true,
                ..SwapOptions::default()
            },
        )
        .unwrap();
        assert_eq!(greedy.apply(".leftish"), ".rightish");
    }

    #[test]
    fn test_swap_ignore_case() {
        let swap = Swap::new(
            "ltr",
            "rtl",
            SwapOptions {
                ignore_case: true,
                ..SwapOptions::default()
            },
        )
        .unwrap();
        assert_eq!(swap.apply("LTR"), "rtl");
        assert_eq!(swap.apply("Rtl"), "ltr");
    }

    #[test]
    fn test_swap_escapes_tokens() {
        let swap = Swap::new("a.b", "c", SwapOptions::default()).unwrap();
        assert_eq!(swap.apply("axb a.b"), "axb c");
    }

    #[test]
    fn test_default_map_preserves_case() {
        let mirror = default_mirror();
        assert_eq!(
            mirror.apply(".Left .LEFT .left .ltr", MirrorTarget::Selector),
            ".Right .RIGHT .right .rtl"
        );
    }

    #[test]
    fn test_scope_filtering() {
        let mut prev = StringMapEntry::new("prev-next", &["prev"], &["next"]);
        prev.scope = MapScope::Url;
        let mirror = StringMirror::new(&[prev], false).unwrap();

        assert_eq!(mirror.apply("prev.png", MirrorTarget::Url), "next.png");
        assert_eq!(mirror.apply(".prev", MirrorTarget::Selector), ".prev");
    }

    #[test]
    fn test_priority_and_exclusive() {
        let mut first = StringMapEntry::new("first", &["a"], &["b"]);
        first.priority = 10;
        first.exclusive = true;
        let second = StringMapEntry::new("second", &["c"], &["d"]);

        // Registration order is reversed on purpose; priority decides.
        let mirror = StringMirror::new(&[second, first], false).unwrap();
        assert_eq!(mirror.apply("a c", MirrorTarget::Selector), "b c");
    }
}
