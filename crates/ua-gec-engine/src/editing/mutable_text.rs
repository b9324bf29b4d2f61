use std::fmt;

/// Text with a list of pending replacements.
///
/// Edits are `(start, end, replacement)` in character offsets of the source
/// text. They may be added in any order and are applied sorted by
/// `(start, end)`; edits sharing the same span keep the order they were added
/// in. Overlap is not checked here, callers pass disjoint spans.
#[derive(Debug, Clone, Default)]
pub struct MutableText {
    text: String,
    edits: Vec<(usize, usize, String)>,
}

impl MutableText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            edits: Vec::new(),
        }
    }

    /// Records a replacement of `[start, end)` with `value`.
    pub fn replace(&mut self, start: usize, end: usize, value: impl Into<String>) {
        self.edits.push((start, end, value.into()));
    }

    /// Commits all pending edits into the source text.
    ///
    /// Offsets of later edits refer to the new text.
    pub fn apply_edits(&mut self) {
        self.text = self.edited_text();
        self.edits.clear();
    }

    /// The text without pending edits applied.
    pub fn source_text(&self) -> &str {
        &self.text
    }

    /// The text with all pending edits applied.
    pub fn edited_text(&self) -> String {
        let mut edits: Vec<&(usize, usize, String)> = self.edits.iter().collect();
        edits.sort_by_key(|(start, end, _)| (*start, *end));

        let bounds = char_boundaries(&self.text);
        let byte_at = |pos: usize| bounds.get(pos).copied().unwrap_or(self.text.len());

        let mut out = String::with_capacity(self.text.len());
        let mut i = 0;
        for (start, end, value) in edits {
            if *start > i {
                out.push_str(&self.text[byte_at(i)..byte_at(*start)]);
            }
            out.push_str(value);
            i = *end;
        }
        if i < bounds.len() {
            out.push_str(&self.text[byte_at(i)..]);
        }
        out
    }
}

impl fmt::Display for MutableText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.edited_text())
    }
}

/// Byte offset of every character, plus the total length as the final entry.
pub(crate) fn char_boundaries(s: &str) -> Vec<usize> {
    s.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(s.len()))
        .collect()
}

/// Character-indexed slice of `s`; offsets past the end are clamped.
pub(crate) fn char_slice(s: &str, start: usize, end: usize) -> &str {
    let mut indices = s.char_indices().map(|(i, _)| i).chain(std::iter::once(s.len()));
    let from = indices.nth(start).unwrap_or(s.len());
    let to = if end > start {
        indices.nth(end - start - 1).unwrap_or(s.len())
    } else {
        from
    };
    &s[from..to]
}
