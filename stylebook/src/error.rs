//! Unified error types for stylebook.
//!
//! Only two things can fail in this crate: a caller handing the library
//! unusable input, and the external embedding service. Everything on the
//! retrieval path (similarity, selection) degrades instead of failing.

use crate::embedding::EmbeddingError;

/// Result type alias for stylebook operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for stylebook.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Input rejected before it reached the library (e.g. blank exemplar text).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The embedding collaborator failed.
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),
}

impl Error {
    /// Create an invalid input error with a message.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Returns `true` if this error was caused by rejected caller input.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_helper() {
        let err = Error::invalid_input("exemplar text is blank");
        assert!(err.is_invalid_input());
        assert_eq!(err.to_string(), "invalid input: exemplar text is blank");
    }

    #[test]
    fn test_embedding_conversion() {
        let err: Error = EmbeddingError::EmptyEmbedding.into();
        assert!(matches!(err, Error::Embedding(_)));
        assert!(!err.is_invalid_input());
    }
}
