use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::editing::mutable_text::{MutableText, char_slice};
use crate::error::AnnotationError;
use crate::models::{Annotation, Meta, SuggestionValue};
use crate::parsing::{ParsedMarkup, intersects, parse_markup, unescape};

/// Text together with the correction annotations made on it.
///
/// Holds the original text and a list of annotations whose offsets always
/// point into that text. Built by parsing markup (annotations are taken as
/// written) or from plain text plus [`annotate`](Self::annotate) calls, which
/// refuse overlapping spans.
///
/// ```rust
/// # use ua_gec_engine::{AnnotatedText, Meta};
/// let mut text = AnnotatedText::new("the red fox");
/// text.annotate(4, 7, ["brown", "white"], Meta::new()).unwrap();
/// assert_eq!(text.annotated_text(true), "the {red=>brown|white} fox");
/// assert_eq!(text.corrected_text(1), "the white fox");
/// ```
#[derive(Debug, Clone)]
pub struct AnnotatedText {
    /// Original text. Escape sequences outside annotations stay literal.
    text: String,
    annotations: Vec<Annotation>,
}

impl AnnotatedText {
    /// Parses markup. Plain text is markup without annotations.
    pub fn new(markup: &str) -> Self {
        let ParsedMarkup { text, annotations } = parse_markup(markup);
        Self { text, annotations }
    }

    /// Parses markup from raw bytes, which must be UTF-8 text.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AnnotationError> {
        let markup = std::str::from_utf8(bytes).map_err(|e| {
            AnnotationError::TypeMismatch(format!("markup must be UTF-8 text: {e}"))
        })?;
        Ok(Self::new(markup))
    }

    /// Joins annotated texts with `separator` between them, like
    /// `separator.join(...)` on plain strings.
    pub fn join<'a>(separator: &str, texts: impl IntoIterator<Item = &'a AnnotatedText>) -> Self {
        let markup = texts
            .into_iter()
            .map(|t| t.annotated_text(true))
            .collect::<Vec<_>>()
            .join(separator);
        Self::new(&markup)
    }

    /// Annotates `[start, end)` as corrected to `value`.
    ///
    /// Fails with [`AnnotationError::InvalidSpan`] if the span is reversed or
    /// runs past the text, and with [`AnnotationError::OverlapConflict`] if it
    /// conflicts with an existing annotation. Nothing changes on failure.
    pub fn annotate(
        &mut self,
        start: usize,
        end: usize,
        value: impl Into<SuggestionValue>,
        meta: impl Into<Meta>,
    ) -> Result<(), AnnotationError> {
        let len = self.text.chars().count();
        if start > end || end > len {
            return Err(AnnotationError::InvalidSpan { start, end, len });
        }

        let conflicts = self.overlaps(start, end);
        if conflicts > 0 {
            log::debug!("rejected annotation ({start}, {end}): {conflicts} overlapping");
            return Err(AnnotationError::OverlapConflict {
                start,
                end,
                conflicts,
            });
        }

        let source = char_slice(&self.text, start, end);
        self.annotations.push(Annotation::new(
            start,
            end,
            source,
            value.into().into_vec(),
            meta.into(),
        ));
        Ok(())
    }

    /// Number of existing annotations `[start, end)` conflicts with.
    ///
    /// Besides span conflicts, a zero-length span conflicts with a zero-length
    /// annotation at the same point.
    fn overlaps(&self, start: usize, end: usize) -> usize {
        self.annotations
            .iter()
            .filter(|ann| {
                intersects(&[ann.span()], start, end).is_some()
                    || (start == end && ann.start() == ann.end() && start == ann.start())
            })
            .count()
    }

    /// All annotations, in the order they were added or parsed.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Cursor over the annotations that tolerates removing or applying the
    /// annotation it just returned.
    ///
    /// ```rust
    /// # use ua_gec_engine::AnnotatedText;
    /// let mut text = AnnotatedText::new("{1=>One} {2=>Two} {3=>Three}");
    /// let mut cursor = text.iter_annotations();
    /// let mut i = 0;
    /// while let Some(ann) = cursor.next(&text) {
    ///     if i == 0 {
    ///         text.apply_correction(&ann, 0).unwrap();
    ///     } else {
    ///         text.remove(&ann).unwrap();
    ///     }
    ///     i += 1;
    /// }
    /// assert_eq!(text.annotated_text(true), "One 2 3");
    /// ```
    pub fn iter_annotations(&self) -> AnnotationCursor {
        AnnotationCursor::new(self.annotations.len())
    }

    /// The annotation covering character `pos`, i.e. `start <= pos < end`.
    /// Zero-length annotations are never returned.
    pub fn annotation_at(&self, pos: usize) -> Option<&Annotation> {
        self.annotations
            .iter()
            .find(|ann| ann.start() <= pos && pos < ann.end())
    }

    /// The annotation spanning exactly `[start, end)`, zero-length included.
    pub fn annotation_at_span(&self, start: usize, end: usize) -> Option<&Annotation> {
        self.annotations
            .iter()
            .find(|ann| ann.start() == start && ann.end() == end)
    }

    /// Removes `annotation`, reverting its span to the original text.
    pub fn remove(&mut self, annotation: &Annotation) -> Result<Annotation, AnnotationError> {
        let index = self.position(annotation)?;
        Ok(self.annotations.remove(index))
    }

    /// Removes `annotation` and writes its suggestion at `level` into the
    /// original text (the source text itself if it has no suggestions).
    ///
    /// Annotations after the edited span are shifted by the change in length.
    /// Fails without changing anything if the annotation is not present or has
    /// no suggestion at `level`.
    pub fn apply_correction(
        &mut self,
        annotation: &Annotation,
        level: usize,
    ) -> Result<(), AnnotationError> {
        let index = self.position(annotation)?;
        let replacement = if annotation.suggestions().is_empty() {
            annotation.source_text()
        } else {
            annotation
                .suggestion(level)
                .ok_or(AnnotationError::LevelOutOfRange {
                    level,
                    available: annotation.suggestions().len(),
                })?
        };

        let mut text = MutableText::new(std::mem::take(&mut self.text));
        text.replace(annotation.start(), annotation.end(), replacement);
        self.text = text.edited_text();

        let resolved = self.annotations.remove(index);
        let delta = replacement.chars().count() as isize
            - resolved.source_text().chars().count() as isize;
        for ann in &mut self.annotations {
            if ann.start() >= resolved.end() {
                ann.shift(delta);
            }
        }

        log::debug!(
            "applied correction at ({}, {}), shifted by {delta}",
            resolved.start(),
            resolved.end()
        );
        Ok(())
    }

    fn position(&self, annotation: &Annotation) -> Result<usize, AnnotationError> {
        self.annotations
            .iter()
            .position(|ann| ann == annotation)
            .ok_or_else(|| AnnotationError::NotFound(annotation.to_string()))
    }

    /// The original text with escape sequences resolved.
    pub fn original_text(&self) -> String {
        unescape(&self.text).into_owned()
    }

    /// The text with every annotation replaced by its suggestion at `level`.
    ///
    /// Annotations with fewer suggestions than `level + 1`, including those
    /// with none, keep their original text.
    pub fn corrected_text(&self, level: usize) -> String {
        let mut text = MutableText::new(self.text.as_str());
        for ann in &self.annotations {
            if let Some(suggestion) = ann.suggestion(level) {
                text.replace(ann.start(), ann.end(), suggestion);
            }
        }
        unescape(&text.edited_text()).into_owned()
    }

    /// Renders the text back into markup, with or without metadata.
    pub fn annotated_text(&self, with_meta: bool) -> String {
        let mut text = MutableText::new(self.text.as_str());
        for ann in &self.annotations {
            text.replace(ann.start(), ann.end(), ann.to_markup(with_meta));
        }
        text.edited_text()
    }
}

impl fmt::Display for AnnotatedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.annotated_text(true))
    }
}

impl FromStr for AnnotatedText {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for AnnotatedText {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Two texts are equal when their original texts match and they carry the
/// same annotations, in any order.
impl PartialEq for AnnotatedText {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
            && self.annotations.len() == other.annotations.len()
            && other
                .annotations
                .iter()
                .all(|ann| self.annotation_at_span(ann.start(), ann.end()) == Some(ann))
    }
}

/// Walks the annotations of an [`AnnotatedText`] by index.
///
/// Before each step the cursor re-reads the number of annotations, so removing
/// or applying the annotation it just returned does not skip the next one.
/// Other mutations during the walk are not supported. Once exhausted it stays
/// exhausted.
#[derive(Debug, Clone)]
pub struct AnnotationCursor {
    index: usize,
    seen_len: usize,
    started: bool,
    done: bool,
}

impl AnnotationCursor {
    fn new(len: usize) -> Self {
        Self {
            index: 0,
            seen_len: len,
            started: false,
            done: false,
        }
    }

    /// Returns the next annotation of `text`, or `None` at the end.
    pub fn next(&mut self, text: &AnnotatedText) -> Option<Annotation> {
        if self.done {
            return None;
        }
        let len = text.annotations.len();
        if self.started {
            let step = 1 + len as isize - self.seen_len as isize;
            self.index = self.index.saturating_add_signed(step);
        }
        self.started = true;
        self.seen_len = len;

        match text.annotations.get(self.index) {
            Some(ann) => Some(ann.clone()),
            None => {
                self.done = true;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn annotate_plain_text() {
        let mut text = AnnotatedText::new("helo world!");
        text.annotate(0, 4, "Hello", [("key", "value")]).unwrap();
        assert_eq!(text.annotated_text(true), "{helo=>Hello:::key=value} world!");
        assert_eq!(text.annotated_text(false), "{helo=>Hello} world!");
    }

    #[test]
    fn annotate_rejects_reversed_span() {
        let mut text = AnnotatedText::new("hello");
        let err = text.annotate(3, 1, "x", Meta::new()).unwrap_err();
        assert!(matches!(err, AnnotationError::InvalidSpan { start: 3, end: 1, .. }));
        assert!(text.annotations().is_empty());
    }

    #[test]
    fn annotate_rejects_span_past_end() {
        let mut text = AnnotatedText::new("hello");
        let err = text.annotate(3, 9, "x", Meta::new()).unwrap_err();
        assert!(matches!(err, AnnotationError::InvalidSpan { len: 5, .. }));
    }

    #[test]
    fn annotate_source_uses_characters() {
        let mut text = AnnotatedText::new("Я йду");
        text.annotate(2, 5, "іду", Meta::new()).unwrap();
        assert_eq!(text.annotations()[0].source_text(), "йду");
        assert_eq!(text.annotated_text(true), "Я {йду=>іду}");
    }

    #[test]
    fn duplicate_insertion_point_is_rejected() {
        let mut text = AnnotatedText::new("ab");
        text.annotate(1, 1, "x", Meta::new()).unwrap();
        let err = text.annotate(1, 1, "y", Meta::new()).unwrap_err();
        assert!(matches!(err, AnnotationError::OverlapConflict { conflicts: 1, .. }));
    }

    #[test]
    fn insertion_at_annotation_edge_is_allowed() {
        let mut text = AnnotatedText::new("abcd");
        text.annotate(1, 3, "X", Meta::new()).unwrap();
        text.annotate(1, 1, "<", Meta::new()).unwrap();
        text.annotate(3, 3, ">", Meta::new()).unwrap();
        assert_eq!(text.annotated_text(false), "a{=><}{bc=>X}{=>>}d");
        assert_eq!(text.corrected_text(0), "a<X>d");
    }

    #[test]
    fn apply_correction_keeps_insertion_before_span() {
        let mut text = AnnotatedText::new("{=>Oh, }{helo=>Hello} {wrld=>world}");
        let ann = text.annotations()[1].clone();
        text.apply_correction(&ann, 0).unwrap();
        assert_eq!(text.annotated_text(true), "{=>Oh, }Hello {wrld=>world}");
        assert_eq!(text.corrected_text(0), "Oh, Hello world");
    }

    #[test]
    fn apply_correction_level_out_of_range_is_atomic() {
        let mut text = AnnotatedText::new("{helo=>Hello} world");
        let ann = text.annotations()[0].clone();
        let err = text.apply_correction(&ann, 3).unwrap_err();
        assert_eq!(err, AnnotationError::LevelOutOfRange { level: 3, available: 1 });
        assert_eq!(text.annotated_text(true), "{helo=>Hello} world");
    }

    #[test]
    fn apply_correction_on_second_level() {
        let mut text = AnnotatedText::new("{helo=>Hello|hola} {x=>y}");
        let ann = text.annotations()[0].clone();
        text.apply_correction(&ann, 1).unwrap();
        assert_eq!(text.annotated_text(true), "hola {x=>y}");
        assert_eq!(text.annotations()[0].start(), 5);
    }

    #[test]
    fn cursor_is_not_restartable() {
        let text = AnnotatedText::new("{a=>b}");
        let mut cursor = text.iter_annotations();
        assert!(cursor.next(&text).is_some());
        assert!(cursor.next(&text).is_none());
        assert!(cursor.next(&text).is_none());
    }

    #[test]
    fn cursor_over_empty_text() {
        let text = AnnotatedText::new("plain");
        let mut cursor = text.iter_annotations();
        assert!(cursor.next(&text).is_none());
    }
}
