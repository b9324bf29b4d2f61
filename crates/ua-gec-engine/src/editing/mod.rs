//! # Editing
//!
//! - **`mutable_text`**: `MutableText`, a string plus pending replacements
//!   applied in span order
//! - **`annotated_text`**: `AnnotatedText`, the store that owns the original
//!   text and its annotations, and `AnnotationCursor` for walking annotations
//!   while resolving them
//!
//! Every edit to the original text goes through `MutableText`, and every
//! annotation that lies after an edited span is shifted in the same call, so
//! `source_text == original[start..end]` holds between calls.

pub mod annotated_text;
pub mod mutable_text;

pub use annotated_text::{AnnotatedText, AnnotationCursor};
pub use mutable_text::MutableText;
