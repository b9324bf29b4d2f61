use std::fmt;
use std::hash::{Hash, Hasher};

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::parsing::{Span, render_annotation};

/// Free-form annotation metadata: string keys to string values.
///
/// Keeps insertion order so rendering is deterministic, but equality and
/// hashing ignore it.
#[derive(Debug, Clone, Default)]
pub struct Meta {
    pairs: Vec<(String, String)>,
}

impl Meta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn sorted(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<_> = self.iter().collect();
        pairs.sort_unstable();
        pairs
    }
}

impl PartialEq for Meta {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.sorted() == other.sorted()
    }
}

impl Eq for Meta {}

impl Hash for Meta {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sorted().hash(state);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Meta {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut meta = Meta::new();
        for (k, v) in iter {
            meta.insert(k, v);
        }
        meta
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Meta {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl Serialize for Meta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Suggestions handed to [`AnnotatedText::annotate`](crate::AnnotatedText::annotate).
///
/// Normalized once into an ordered list with [`SuggestionValue::into_vec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionValue {
    /// Exactly one replacement.
    Single(String),
    /// No good replacement exists; rendered as `NO_SUGGESTIONS`.
    NoSuggestions,
    /// Ranked replacements, best first.
    Multiple(Vec<String>),
}

impl SuggestionValue {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            SuggestionValue::Single(s) => vec![s],
            SuggestionValue::NoSuggestions => vec![],
            SuggestionValue::Multiple(v) => v,
        }
    }
}

impl From<&str> for SuggestionValue {
    fn from(s: &str) -> Self {
        SuggestionValue::Single(s.to_string())
    }
}

impl From<String> for SuggestionValue {
    fn from(s: String) -> Self {
        SuggestionValue::Single(s)
    }
}

impl<T: Into<SuggestionValue>> From<Option<T>> for SuggestionValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SuggestionValue::NoSuggestions, Into::into)
    }
}

impl From<Vec<String>> for SuggestionValue {
    fn from(v: Vec<String>) -> Self {
        SuggestionValue::Multiple(v)
    }
}

impl From<Vec<&str>> for SuggestionValue {
    fn from(v: Vec<&str>) -> Self {
        SuggestionValue::Multiple(v.into_iter().map(String::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for SuggestionValue {
    fn from(v: [&str; N]) -> Self {
        SuggestionValue::Multiple(v.into_iter().map(String::from).collect())
    }
}

/// A single correction candidate anchored to `[start, end)` of the original text.
///
/// `source_text` is a snapshot of the annotated slice taken when the
/// annotation was created; the owning store keeps it in sync when offsets move.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Annotation {
    start: usize,
    end: usize,
    source_text: String,
    suggestions: Vec<String>,
    meta: Meta,
}

impl Annotation {
    pub fn new(
        start: usize,
        end: usize,
        source_text: impl Into<String>,
        suggestions: Vec<String>,
        meta: Meta,
    ) -> Self {
        Self {
            start,
            end,
            source_text: source_text.into(),
            suggestions,
            meta,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// The first suggestion, or `None` if there are none.
    pub fn top_suggestion(&self) -> Option<&str> {
        self.suggestions.first().map(String::as_str)
    }

    /// Suggestion at `level`, if this annotation has that many.
    pub fn suggestion(&self, level: usize) -> Option<&str> {
        self.suggestions.get(level).map(String::as_str)
    }

    pub fn to_markup(&self, with_meta: bool) -> String {
        render_annotation(self, with_meta)
    }

    /// Moves both offsets by `delta` characters.
    pub(crate) fn shift(&mut self, delta: isize) {
        self.start = self.start.saturating_add_signed(delta);
        self.end = self.end.saturating_add_signed(delta);
    }
}

impl PartialEq for Annotation {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start
            && self.end == other.end
            && self.source_text == other.source_text
            && self.suggestions == other.suggestions
            && self.meta == other.meta
    }
}

impl Eq for Annotation {}

impl Hash for Annotation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.start.hash(state);
        self.end.hash(state);
        self.source_text.hash(state);
        self.suggestions.hash(state);
        self.meta.hash(state);
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_markup(true))
    }
}
