#![cfg_attr(docsrs, feature(doc_cfg))]
//! Stylebook selects few-shot style exemplars from a personal library of posts.
//!
//! Each exemplar is stored with an embedding produced by an external model.
//! Given a query embedding, [`DiverseRetriever`] picks a small set of
//! exemplars that are relevant to the query yet different from each other
//! (Maximal Marginal Relevance), ready to be quoted as style guidance in a
//! generation prompt.
//!
//! - [`vector`]: cosine similarity with a zero-on-mismatch policy.
//! - [`library`]: the thread-safe, insertion-ordered exemplar store.
//! - [`retrieval`]: MMR selection.
//! - [`guide`]: glue between the library, an [`embedding::Embedder`] and the retriever.

pub mod embedding;
pub mod error;
pub mod guide;
pub mod library;
pub mod prelude;
pub mod providers;
pub mod retrieval;
pub mod vector;

pub use embedding::{Embedder, EmbeddingError};
pub use error::{Error, Result};
pub use guide::StyleGuide;
pub use library::{StyleExemplar, StyleLibrary};
pub use retrieval::{DiverseRetriever, SelectionParams};
pub use vector::cosine_similarity;
