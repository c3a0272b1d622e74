use crate::errors::{SearchParsingError, SearchResult};
use indexmap::IndexMap;
use regex::Regex;

/// Turns user-typed names into canonical labels.
pub trait LabelResolver: Send + Sync {
    fn resolve(&self, raw: &str) -> SearchResult<String>;
}

impl<F> LabelResolver for F
where
    F: Fn(&str) -> SearchResult<String> + Send + Sync,
{
    fn resolve(&self, raw: &str) -> SearchResult<String> {
        self(raw)
    }
}

/// Fixed nickname table, built once and shared read-only.
///
/// Keys are matched case-insensitively after the input has had unicode minus
/// signs turned into `-` and any other non-ASCII character dropped. Inputs
/// that already look like a label (per `label_pattern`) pass through as typed.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    aliases: IndexMap<String, String>,
    label_pattern: Option<Regex>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// `pattern` must match the whole input for it to count as a label.
    pub fn with_label_pattern(mut self, pattern: Regex) -> Self {
        self.label_pattern = Some(pattern);
        self
    }

    pub fn insert(&mut self, alias: &str, label: impl Into<String>) {
        self.aliases.insert(alias.to_lowercase(), label.into());
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn is_label(&self, s: &str) -> bool {
        self.label_pattern
            .as_ref()
            .and_then(|re| re.find(s))
            .is_some_and(|m| m.start() == 0 && m.end() == s.len())
    }
}

pub fn normalize_label_input(raw: &str) -> String {
    raw.chars()
        .map(|c| if c == '\u{2212}' { '-' } else { c })
        .filter(char::is_ascii)
        .collect()
}

impl LabelResolver for AliasTable {
    fn resolve(&self, raw: &str) -> SearchResult<String> {
        let normalized = normalize_label_input(raw);
        if normalized.is_empty() {
            return Err(SearchParsingError::Resolution(
                "Entry was left blank. You need to enter a label or a known name.".to_string(),
            ));
        }
        if let Some(label) = self.aliases.get(&normalized.to_lowercase()) {
            return Ok(label.clone());
        }
        if self.is_label(&normalized) {
            return Ok(normalized);
        }
        Err(SearchParsingError::Resolution(
            "It is not a valid label or a known name.".to_string(),
        ))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for AliasTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = AliasTable::new();
        for (alias, label) in iter {
            table.insert(alias.as_ref(), label);
        }
        table
    }
}
