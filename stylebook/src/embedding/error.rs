//! Error types for the embedding collaborator.

/// Errors returned by an [`Embedder`](super::Embedder).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EmbeddingError {
    /// The provider rejected the request or returned an error payload.
    #[error("[{provider}] {message}")]
    Provider {
        /// Provider identifier (e.g., `"ollama"`).
        provider: &'static str,
        /// Human-readable error description.
        message: String,
    },

    /// The provider answered but returned no vector.
    #[error("provider returned an empty embedding")]
    EmptyEmbedding,

    /// The provider response could not be decoded.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport error.
    #[cfg(feature = "ollama")]
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl EmbeddingError {
    /// Creates a [`Provider`](Self::Provider) error for the given provider.
    #[must_use]
    pub fn provider(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Provider {
            provider,
            message: message.into(),
        }
    }
}
