//! Commonly used items.

pub use crate::embedding::{Embedder, EmbeddingError, SharedEmbedder};
pub use crate::error::{Error, Result};
pub use crate::guide::StyleGuide;
pub use crate::library::{StyleExemplar, StyleLibrary};
pub use crate::retrieval::{DiverseRetriever, SelectionParams};
pub use crate::vector::cosine_similarity;

#[cfg(feature = "ollama")]
pub use crate::providers::OllamaEmbedder;
