//! Style guidance for post generation.
//!
//! [`StyleGuide`] wires a [`StyleLibrary`], an
//! [`Embedder`](crate::embedding::Embedder) and a [`DiverseRetriever`] together. Each piece is passed in explicitly, so
//! several guides (one per user profile, say) can coexist and tests can swap
//! in a fake embedder.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stylebook::prelude::*;
//!
//! let guide = StyleGuide::new(Arc::new(StyleLibrary::new()), Arc::new(embedder));
//! guide.add_post("Thrilled to announce our Series A!").await?;
//!
//! let query = StyleGuide::compose_query("Share Achievement", "We hit 10k users");
//! let exemplars = guide.relevant_posts(&query).await?;
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::embedding::{EmbeddingError, SharedEmbedder};
use crate::error::Result;
use crate::library::{StyleExemplar, StyleLibrary, validate_text};
use crate::retrieval::{DiverseRetriever, SelectionParams};

/// Retrieves style exemplars for generation requests.
#[derive(Clone)]
pub struct StyleGuide {
    library: Arc<StyleLibrary>,
    embedder: SharedEmbedder,
    retriever: DiverseRetriever,
}

impl std::fmt::Debug for StyleGuide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StyleGuide")
            .field("library_len", &self.library.len())
            .field("retriever", &self.retriever)
            .finish_non_exhaustive()
    }
}

impl StyleGuide {
    /// Create a guide with default selection parameters.
    #[must_use]
    pub fn new(library: Arc<StyleLibrary>, embedder: SharedEmbedder) -> Self {
        Self {
            library,
            embedder,
            retriever: DiverseRetriever::default(),
        }
    }

    /// Replace the selection parameters.
    #[must_use]
    pub fn with_params(mut self, params: SelectionParams) -> Self {
        self.retriever = DiverseRetriever::new(params);
        self
    }

    /// The underlying library.
    #[must_use]
    pub const fn library(&self) -> &Arc<StyleLibrary> {
        &self.library
    }

    /// The retriever used by [`relevant_posts`](Self::relevant_posts).
    #[must_use]
    pub const fn retriever(&self) -> &DiverseRetriever {
        &self.retriever
    }

    /// Builds the retrieval query for a post goal and its details.
    #[must_use]
    pub fn compose_query(goal: &str, details: &str) -> String {
        format!("Goal: {goal}, Details: {details}")
    }

    /// Embeds `text` and appends it to the library.
    ///
    /// Blank text is rejected before the embedder is called.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`](crate::Error::InvalidInput) for blank
    /// text and [`Error::Embedding`](crate::Error::Embedding) if the embedder
    /// fails or returns an empty vector.
    pub async fn add_post(&self, text: &str) -> Result<usize> {
        validate_text(text)?;

        let embedding = self.embedder.embed(text).await?;
        if embedding.is_empty() {
            return Err(EmbeddingError::EmptyEmbedding.into());
        }
        self.library.append(text, embedding)
    }

    /// Removes the post at `index`; out-of-range indices are ignored.
    pub fn remove_post(&self, index: usize) -> bool {
        self.library.remove_at(index).is_some()
    }

    /// Returns the texts of the exemplars selected for `query`, in selection order.
    ///
    /// The query is only embedded when the library has entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Embedding`](crate::Error::Embedding) if embedding the query fails.
    pub async fn relevant_posts(&self, query: &str) -> Result<Vec<String>> {
        if self.library.is_empty() {
            debug!("style library is empty, skipping retrieval");
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;
        let snapshot = self.library.snapshot();
        let selected = self.retriever.select(&query_embedding, &snapshot);
        debug!(
            library_len = snapshot.len(),
            selected = selected.len(),
            "selected style exemplars"
        );
        Ok(selected
            .into_iter()
            .map(StyleExemplar::into_text)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::embedding::Embedder;
    use crate::error::Error;

    /// Maps known texts to fixed vectors and counts calls.
    #[derive(Debug, Default)]
    struct TableEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for TableEmbedder {
        async fn embed(&self, text: &str) -> std::result::Result<Vec<f64>, EmbeddingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match text {
                "A" | "query" => Ok(vec![1.0, 0.0]),
                "B" => Ok(vec![0.9, 0.1]),
                "C" => Ok(vec![0.0, 1.0]),
                "hollow" => Ok(Vec::new()),
                _ => Err(EmbeddingError::provider("table", format!("unknown text {text:?}"))),
            }
        }
    }

    fn guide(embedder: &Arc<TableEmbedder>) -> StyleGuide {
        StyleGuide::new(Arc::new(StyleLibrary::new()), Arc::clone(embedder) as SharedEmbedder)
    }

    #[tokio::test]
    async fn test_add_post_embeds_and_appends() {
        let embedder = Arc::new(TableEmbedder::default());
        let guide = guide(&embedder);

        assert_eq!(guide.add_post("A").await.unwrap(), 0);
        assert_eq!(guide.add_post("B").await.unwrap(), 1);
        assert_eq!(guide.library().len(), 2);
        assert_eq!(guide.library().get(1).unwrap().embedding(), &[0.9, 0.1]);
    }

    #[tokio::test]
    async fn test_add_post_rejects_blank_without_embedding() {
        let embedder = Arc::new(TableEmbedder::default());
        let guide = guide(&embedder);

        let err = guide.add_post("  ").await.unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
        assert!(guide.library().is_empty());
    }

    #[tokio::test]
    async fn test_add_post_surfaces_embedding_failures() {
        let embedder = Arc::new(TableEmbedder::default());
        let guide = guide(&embedder);

        let err = guide.add_post("unknown").await.unwrap_err();
        assert!(matches!(err, Error::Embedding(EmbeddingError::Provider { .. })));

        let err = guide.add_post("hollow").await.unwrap_err();
        assert!(matches!(err, Error::Embedding(EmbeddingError::EmptyEmbedding)));
        assert!(guide.library().is_empty());
    }

    #[tokio::test]
    async fn test_relevant_posts_on_empty_library_skips_embedding() {
        let embedder = Arc::new(TableEmbedder::default());
        let guide = guide(&embedder);

        assert!(guide.relevant_posts("query").await.unwrap().is_empty());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_relevant_posts_uses_mmr() {
        let embedder = Arc::new(TableEmbedder::default());
        let guide = guide(&embedder).with_params(SelectionParams::new(0.5, 2));
        for text in ["A", "B", "C"] {
            guide.add_post(text).await.unwrap();
        }

        let posts = guide.relevant_posts("query").await.unwrap();
        assert_eq!(posts, vec!["A", "C"]);
    }

    #[tokio::test]
    async fn test_remove_post() {
        let embedder = Arc::new(TableEmbedder::default());
        let guide = guide(&embedder);
        guide.add_post("A").await.unwrap();

        assert!(!guide.remove_post(3));
        assert!(guide.remove_post(0));
        assert!(guide.library().is_empty());
    }

    #[test]
    fn test_compose_query() {
        assert_eq!(
            StyleGuide::compose_query("Ask Question", "Which CI do you use?"),
            "Goal: Ask Question, Details: Which CI do you use?"
        );
    }
}
