//! Ollama embedding provider.
//!
//! Calls the `/api/embed` endpoint of a local or remote Ollama server.
//!
//! # Example
//!
//! ```rust,ignore
//! use stylebook::providers::OllamaEmbedder;
//!
//! let embedder = OllamaEmbedder::builder()
//!     .base_url("http://192.168.1.100:11434")
//!     .model("nomic-embed-text")
//!     .build()?;
//! let vector = embedder.embed("Shipped our first release today!").await?;
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::embedding::{Embedder, EmbeddingError};

/// Default Ollama API base URL (local server).
pub const OLLAMA_API_BASE_URL: &str = "http://localhost:11434";

/// Default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";

const PROVIDER: &str = "ollama";

/// [`Embedder`] backed by an Ollama server.
#[derive(Clone)]
pub struct OllamaEmbedder {
    http_client: reqwest::Client,
    base_url: Arc<str>,
    model: Arc<str>,
}

impl std::fmt::Debug for OllamaEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaEmbedder")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OllamaEmbedder {
    /// Create a new embedder builder.
    #[must_use]
    pub fn builder() -> OllamaEmbedderBuilder {
        OllamaEmbedderBuilder::default()
    }

    /// The server this embedder talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The embedding model identifier.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/api/embed", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f64>>,
}

impl EmbedResponse {
    fn into_first(self) -> Result<Vec<f64>, EmbeddingError> {
        self.embeddings
            .into_iter()
            .next()
            .filter(|v| !v.is_empty())
            .ok_or(EmbeddingError::EmptyEmbedding)
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f64>, EmbeddingError> {
        let request = EmbedRequest {
            model: &self.model,
            input: text,
        };

        let response = self
            .http_client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(EmbeddingError::provider(
                PROVIDER,
                format!("status {status}: {body}"),
            ));
        }

        let vector = serde_json::from_str::<EmbedResponse>(&body)?.into_first()?;
        debug!(model = %self.model, ndims = vector.len(), "embedded text");
        Ok(vector)
    }
}

/// Builder for [`OllamaEmbedder`].
#[derive(Debug, Default)]
pub struct OllamaEmbedderBuilder {
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

impl OllamaEmbedderBuilder {
    /// Set a custom base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the embedding model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the request timeout in seconds. Default is no timeout.
    #[must_use]
    pub const fn timeout_secs(mut self, timeout: u64) -> Self {
        self.timeout_secs = Some(timeout);
        self
    }

    /// Build the embedder.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn build(self) -> Result<OllamaEmbedder, EmbeddingError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(timeout));
        }

        Ok(OllamaEmbedder {
            http_client: builder.build()?,
            base_url: self
                .base_url
                .unwrap_or_else(|| OLLAMA_API_BASE_URL.to_owned())
                .into(),
            model: self
                .model
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_owned())
                .into(),
        })
    }
}
