//! String map entries used for selector and URL mirroring.

use serde::{Deserialize, Deserializer};

/// Where a string map entry applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum MapScope {
    /// Selectors and URLs.
    #[serde(rename = "*")]
    All,
    /// URLs and at-rule params only.
    #[serde(rename = "url")]
    Url,
    /// Selectors only.
    #[serde(rename = "selector")]
    Selector,
}

/// One token swap table, e.g. `left` ↔ `right`.
///
/// `search[i]` and `replace[i]` are swapped with each other in a single pass.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StringMapEntry {
    pub name: String,
    /// Entries apply in ascending priority.
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(deserialize_with = "one_or_many")]
    pub search: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub replace: Vec<String>,
    #[serde(default = "default_scope")]
    pub scope: MapScope,
    #[serde(default, alias = "ignoreCase")]
    pub ignore_case: bool,
    /// Overrides the global `greedy` option for this entry.
    #[serde(default)]
    pub greedy: Option<bool>,
    /// Stop applying later entries once this one has applied.
    #[serde(default)]
    pub exclusive: bool,
}

impl StringMapEntry {
    /// Build a case-sensitive entry that applies everywhere.
    #[must_use]
    pub fn new(name: &str, search: &[&str], replace: &[&str]) -> Self {
        Self {
            name: name.to_owned(),
            priority: default_priority(),
            search: search.iter().map(|&s| s.to_owned()).collect(),
            replace: replace.iter().map(|&s| s.to_owned()).collect(),
            scope: MapScope::All,
            ignore_case: false,
            greedy: None,
            exclusive: false,
        }
    }

    /// Whether the entry applies to selectors (`url == false`) or URLs.
    #[must_use]
    pub fn applies_to(&self, url: bool) -> bool {
        match self.scope {
            MapScope::All => true,
            MapScope::Url => url,
            MapScope::Selector => !url,
        }
    }
}

/// The built-in `left-right` and `ltr-rtl` entries.
#[must_use]
pub fn default_string_map() -> Vec<StringMapEntry> {
    vec![
        StringMapEntry::new(
            "left-right",
            &["left", "Left", "LEFT"],
            &["right", "Right", "RIGHT"],
        ),
        StringMapEntry::new("ltr-rtl", &["ltr", "Ltr", "LTR"], &["rtl", "Rtl", "RTL"]),
    ]
}

fn default_priority() -> i32 {
    100
}

fn default_scope() -> MapScope {
    MapScope::All
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_entries() {
        let map = default_string_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map[0].search, vec!["left", "Left", "LEFT"]);
        assert_eq!(map[1].replace, vec!["rtl", "Rtl", "RTL"]);
        assert!(map.iter().all(|entry| entry.priority == 100));
    }

    #[test]
    fn test_scope() {
        let mut entry = StringMapEntry::new("x", &["a"], &["b"]);
        assert!(entry.applies_to(true));
        assert!(entry.applies_to(false));

        entry.scope = MapScope::Url;
        assert!(entry.applies_to(true));
        assert!(!entry.applies_to(false));

        entry.scope = MapScope::Selector;
        assert!(!entry.applies_to(true));
        assert!(entry.applies_to(false));
    }

    #[test]
    fn test_deserialize_single_strings() {
        let entry: StringMapEntry = serde_json::from_str(
            r#"{"name": "prev-next", "search": "prev", "replace": "next", "scope": "url", "ignoreCase": true}"#,
        )
        .unwrap();

        assert_eq!(entry.search, vec!["prev"]);
        assert_eq!(entry.replace, vec!["next"]);
        assert_eq!(entry.scope, MapScope::Url);
        assert!(entry.ignore_case);
        assert_eq!(entry.priority, 100);
    }
}
