use thiserror::Error;

/// Errors raised by [`AnnotatedText`](crate::AnnotatedText) operations.
///
/// Every failing operation leaves the store exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationError {
    #[error("Invalid span ({start}, {end}) for text of length {len}")]
    InvalidSpan { start: usize, end: usize, len: usize },

    #[error("Overlap detected: positions ({start}, {end}) with {conflicts} existing annotations")]
    OverlapConflict {
        start: usize,
        end: usize,
        conflicts: usize,
    },

    #[error("{0} is not in the list")]
    NotFound(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Suggestion level {level} is out of range ({available} suggestions)")]
    LevelOutOfRange { level: usize, available: usize },
}
