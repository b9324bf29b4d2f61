pub mod editing;
pub mod error;
pub mod io;
pub mod models;
pub mod parsing;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use editing::{AnnotatedText, AnnotationCursor, MutableText};
pub use error::AnnotationError;
pub use models::{Annotation, Meta, SuggestionValue};
pub use parsing::{ParsedMarkup, Span, parse_markup};
