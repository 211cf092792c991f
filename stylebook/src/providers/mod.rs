//! Embedding providers.

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "ollama")]
pub use ollama::{
    DEFAULT_EMBEDDING_MODEL, OLLAMA_API_BASE_URL, OllamaEmbedder, OllamaEmbedderBuilder,
};
