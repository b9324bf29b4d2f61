pub mod annotation;

pub use annotation::{Annotation, Meta, SuggestionValue};
