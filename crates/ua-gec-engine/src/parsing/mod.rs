//! # Markup Codec
//!
//! Reads and writes the bracketed annotation markup:
//!
//! ```text
//! this {was=>is|will be:::error_type=Grammar} an {anotated=>annotated} text
//! ```
//!
//! ## Modules
//!
//! - **`span`**: `Span` character ranges and the conflict test used by the
//!   annotation store
//! - **`cursor`**: `Cursor` for byte-wise scanning with restore-on-failure
//! - **`escape`**: `\n` escaping of newlines inside annotations
//! - **`markup`**: delimiter constants, the scanner and annotation rendering
//!
//! ## Offsets
//!
//! The scanner works in byte offsets over the markup. Annotations carry
//! character offsets into the *original* text, recovered by subtracting the
//! running difference between each annotation's markup length and the length
//! of the source text it stands for.

pub mod cursor;
pub mod escape;
pub mod markup;
pub mod span;

pub use escape::{escape, unescape};
pub use markup::{Markup, RawAnnotation, render_annotation, scan};
pub use span::{Span, intersects};

use crate::models::{Annotation, Meta};

/// Result of parsing markup: the original text and the annotations on it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMarkup {
    /// Markup with every annotation replaced by its unescaped source text.
    /// Escape sequences outside annotations are kept as written.
    pub text: String,
    /// Annotations in markup order. Overlaps are not checked.
    pub annotations: Vec<Annotation>,
}

/// Parses markup into the original text and its annotations.
///
/// Never fails: anything that does not form a complete annotation is kept as
/// plain text.
pub fn parse_markup(markup: &str) -> ParsedMarkup {
    let raws = scan(markup);
    let mut text = String::with_capacity(markup.len());
    let mut annotations = Vec::with_capacity(raws.len());

    let mut last = 0; // byte offset in markup
    let mut markup_chars = 0; // chars of markup before `last`
    let mut amend = 0; // markup chars not present in the original text

    for raw in raws {
        let gap = &markup[last..raw.full.start];
        text.push_str(gap);
        markup_chars += gap.chars().count();

        let source = unescape(&markup[raw.source.clone()]);
        let source_len = source.chars().count();
        let full_len = markup[raw.full.clone()].chars().count();

        let start = markup_chars - amend;
        let end = start + source_len;
        let suggestions = parse_suggestions(&markup[raw.suggestions.clone()]);
        let meta = raw
            .meta
            .map(|range| parse_meta(&markup[range]))
            .unwrap_or_default();

        text.push_str(&source);
        annotations.push(Annotation::new(start, end, source, suggestions, meta));

        markup_chars += full_len;
        amend += full_len - source_len;
        last = raw.full.end;
    }
    text.push_str(&markup[last..]);

    log::debug!(
        "parsed {} annotations from {} bytes of markup",
        annotations.len(),
        markup.len()
    );

    ParsedMarkup { text, annotations }
}

fn parse_suggestions(raw: &str) -> Vec<String> {
    if raw == Markup::NO_SUGGESTIONS {
        return vec![];
    }
    raw.split(Markup::SEPARATOR)
        .map(|s| unescape(s).into_owned())
        .collect()
}

/// Parses `:::k1=v1:::k2=v2`. A pair without `=` gets an empty value; a
/// repeated key keeps its first position and its last value.
fn parse_meta(raw: &str) -> Meta {
    raw.split(Markup::META)
        .skip(1)
        .map(|pair| {
            let (key, value) = pair.split_once(Markup::KEY_VALUE).unwrap_or((pair, ""));
            (key.to_string(), unescape(value).into_owned())
        })
        .collect()
}
