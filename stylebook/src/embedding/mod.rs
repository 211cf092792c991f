//! The embedding service boundary.
//!
//! Stylebook never computes embeddings itself. Whatever produces them (a local
//! model server, a hosted API, a test double) implements [`Embedder`] and is
//! handed to the [`StyleGuide`](crate::guide::StyleGuide) explicitly.

mod error;

pub use error::EmbeddingError;

use async_trait::async_trait;

/// Turns text into a fixed-length embedding vector.
///
/// Implementations must return vectors of the same length for every input
/// within one deployment; vectors of other lengths are treated as irrelevant
/// at retrieval time rather than rejected.
#[async_trait]
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement the `Embedder` trait",
    label = "this type cannot be used to embed style exemplars",
    note = "implement `Embedder` to connect an embedding model"
)]
pub trait Embedder: Send + Sync {
    /// Embeds a single piece of text.
    async fn embed(&self, text: &str) -> Result<Vec<f64>, EmbeddingError>;
}

/// A shared, reference-counted embedder.
pub type SharedEmbedder = std::sync::Arc<dyn Embedder>;
