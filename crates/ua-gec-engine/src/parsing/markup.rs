use std::ops::Range;

use crate::models::Annotation;

use super::{cursor::Cursor, escape::escape};

/// Delimiters of the annotation markup `{SOURCE=>S1|S2:::key=value}`.
pub struct Markup;

impl Markup {
    pub const OPEN: u8 = b'{';
    pub const CLOSE: u8 = b'}';
    pub const ARROW: &'static str = "=>";
    pub const META: &'static str = ":::";
    pub const META_COLON: char = ':';
    pub const SEPARATOR: char = '|';
    pub const KEY_VALUE: char = '=';
    /// Written in place of an empty suggestion list.
    pub const NO_SUGGESTIONS: &'static str = "NO_SUGGESTIONS";
}

/// One annotation as found in markup. All ranges are byte offsets into the
/// scanned string; nothing is unescaped yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAnnotation {
    /// Whole annotation including braces.
    pub full: Range<usize>,
    /// Text between `{` and `=>`.
    pub source: Range<usize>,
    /// Text between `=>` and the metadata block (or the closing brace).
    pub suggestions: Range<usize>,
    /// Metadata block starting at its first `:::`, if present.
    pub meta: Option<Range<usize>>,
}

/// Finds every annotation in `s`, left to right, without overlaps.
///
/// Text that looks like the start of an annotation but does not complete one
/// (a stray `{`, a missing `=>` or `}`) is left alone as plain text.
pub fn scan(s: &str) -> Vec<RawAnnotation> {
    let mut cur = Cursor::new(s);
    let mut out = vec![];

    while !cur.eof() {
        if let Some(raw) = try_parse_annotation(&mut cur) {
            out.push(raw);
            continue;
        }
        cur.bump_char();
    }

    out
}

/// Attempts to parse an annotation starting at the current position.
///
/// The source part runs up to the next `{` and is split at the *last* `=>`
/// for which the rest of the annotation parses, falling back to earlier
/// arrows. On failure, cursor position is restored.
fn try_parse_annotation(cur: &mut Cursor<'_>) -> Option<RawAnnotation> {
    if cur.peek() != Some(Markup::OPEN) {
        return None;
    }

    let saved = cur.clone();
    let start = cur.pos();
    cur.bump(); // {
    let source_start = cur.pos();
    let source_limit = cur.find(Markup::OPEN).unwrap_or(cur.s.len());

    let arrows: Vec<usize> = cur.s[source_start..source_limit]
        .match_indices(Markup::ARROW)
        .map(|(off, _)| source_start + off)
        .collect();

    for &arrow in arrows.iter().rev() {
        cur.seek(arrow + Markup::ARROW.len());
        if let Some((suggestions, meta)) = parse_tail(cur) {
            return Some(RawAnnotation {
                full: start..cur.pos(),
                source: source_start..arrow,
                suggestions,
                meta,
            });
        }
    }

    *cur = saved;
    None
}

/// Parses `SUGGESTIONS [META] }` after the arrow, leaving the cursor past the
/// closing brace.
///
/// The suggestion part is matched as short as possible: at every position a
/// metadata block is tried first, then the closing brace, and only then is the
/// suggestion text extended by one character. A `:::` followed by a fourth
/// colon is therefore not a metadata delimiter, and the leading colons end up
/// in the suggestion (`{.=>::::key=v}` has suggestion `:`). Suggestions never
/// span a newline.
fn parse_tail(cur: &mut Cursor<'_>) -> Option<(Range<usize>, Option<Range<usize>>)> {
    let suggestions_start = cur.pos();

    loop {
        let here = cur.pos();
        if let Some(close) = meta_block_close(cur) {
            cur.seek(close + 1);
            return Some((suggestions_start..here, Some(here..close)));
        }
        if cur.peek() == Some(Markup::CLOSE) {
            cur.bump(); // }
            return Some((suggestions_start..here, None));
        }
        match cur.peek_char() {
            None | Some('\n') => return None,
            Some(_) => {
                cur.bump_char();
            }
        }
    }
}

/// If a metadata block starts at the cursor, returns the byte position of the
/// brace that closes it.
///
/// A block is `:::` plus one character that is not a colon, then everything up
/// to the next `}`.
fn meta_block_close(cur: &Cursor<'_>) -> Option<usize> {
    if !cur.starts_with(Markup::META.as_bytes()) {
        return None;
    }
    let mut probe = cur.clone();
    probe.seek(cur.pos() + Markup::META.len());
    match probe.bump_char() {
        None | Some(Markup::META_COLON) => None,
        Some(_) => probe.find(Markup::CLOSE),
    }
}

/// Renders one annotation as markup, optionally with its metadata.
pub fn render_annotation(annotation: &Annotation, with_meta: bool) -> String {
    let mut out = String::new();
    out.push(Markup::OPEN as char);
    out.push_str(&escape(annotation.source_text()));
    out.push_str(Markup::ARROW);

    if annotation.suggestions().is_empty() {
        out.push_str(Markup::NO_SUGGESTIONS);
    } else {
        for (i, suggestion) in annotation.suggestions().iter().enumerate() {
            if i > 0 {
                out.push(Markup::SEPARATOR);
            }
            out.push_str(&escape(suggestion));
        }
    }

    if with_meta {
        for (key, value) in annotation.meta().iter() {
            out.push_str(Markup::META);
            out.push_str(key);
            out.push(Markup::KEY_VALUE);
            out.push_str(&escape(value));
        }
    }

    out.push(Markup::CLOSE as char);
    out
}
