//! The style library: an ordered collection of user posts and their embeddings.
//!
//! [`StyleLibrary`] is safe to share between threads. Every mutation happens
//! under a single write lock and [`StyleLibrary::snapshot`] copies the contents
//! under the read lock, so a reader never sees a half-applied append or remove.
//! Snapshots are owned by the caller and are unaffected by later mutations.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// A single stored post and the embedding it was indexed with.
///
/// Exemplars are immutable: replacing one means removing it and appending a
/// new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleExemplar {
    text: String,
    embedding: Vec<f64>,
}

impl StyleExemplar {
    /// Creates an exemplar from a post and its embedding.
    #[must_use]
    pub fn new(text: impl Into<String>, embedding: Vec<f64>) -> Self {
        Self {
            text: text.into(),
            embedding,
        }
    }

    /// The verbatim post text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The embedding vector.
    #[must_use]
    pub fn embedding(&self) -> &[f64] {
        &self.embedding
    }

    /// Returns the dimensionality of the embedding vector.
    #[inline]
    #[must_use]
    pub const fn ndims(&self) -> usize {
        self.embedding.len()
    }

    /// Consumes the exemplar, returning its text.
    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }
}

/// Ordered, thread-safe store of [`StyleExemplar`]s.
///
/// Insertion order is kept for display and removal by index only; it has no
/// effect on retrieval ranking.
#[derive(Debug, Default)]
pub struct StyleLibrary {
    exemplars: RwLock<Vec<StyleExemplar>>,
}

impl StyleLibrary {
    /// Creates an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a library from previously stored exemplars, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if any exemplar has blank text.
    pub fn from_exemplars(exemplars: impl IntoIterator<Item = StyleExemplar>) -> Result<Self> {
        let exemplars = exemplars
            .into_iter()
            .enumerate()
            .map(|(index, exemplar)| {
                validate_text(&exemplar.text)
                    .map(|()| exemplar)
                    .map_err(|_| Error::invalid_input(format!("exemplar {index} has blank text")))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(len = exemplars.len(), "restored style library");
        Ok(Self {
            exemplars: RwLock::new(exemplars),
        })
    }

    /// Appends a post with its caller-supplied embedding.
    ///
    /// Returns the position the exemplar was stored at.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `text` is empty or whitespace-only;
    /// the library is left unchanged.
    pub fn append(&self, text: impl Into<String>, embedding: Vec<f64>) -> Result<usize> {
        let text = text.into();
        validate_text(&text)?;

        let mut exemplars = self.write();
        let index = exemplars.len();
        debug!(index, ndims = embedding.len(), "appending style exemplar");
        exemplars.push(StyleExemplar::new(text, embedding));
        Ok(index)
    }

    /// Removes the exemplar at `index`.
    ///
    /// An out-of-range index is a no-op returning `None`, the same outcome as
    /// filtering the library by position.
    pub fn remove_at(&self, index: usize) -> Option<StyleExemplar> {
        let mut exemplars = self.write();
        if index >= exemplars.len() {
            debug!(index, len = exemplars.len(), "remove index out of range, ignoring");
            return None;
        }
        debug!(index, "removing style exemplar");
        Some(exemplars.remove(index))
    }

    /// Returns an owned copy of the current contents in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<StyleExemplar> {
        self.read().clone()
    }

    /// Returns the exemplar at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<StyleExemplar> {
        self.read().get(index).cloned()
    }

    /// Returns the texts of all exemplars in insertion order.
    #[must_use]
    pub fn texts(&self) -> Vec<String> {
        self.read().iter().map(|e| e.text.clone()).collect()
    }

    /// Number of stored exemplars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` if the library holds no exemplars.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Removes every exemplar.
    pub fn clear(&self) {
        self.write().clear();
    }

    // A panic while holding the lock cannot leave the Vec half-mutated (each
    // mutation is one push/remove/clear), so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, Vec<StyleExemplar>> {
        self.exemplars.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<StyleExemplar>> {
        self.exemplars.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clone for StyleLibrary {
    fn clone(&self) -> Self {
        Self {
            exemplars: RwLock::new(self.snapshot()),
        }
    }
}

pub(crate) fn validate_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(Error::invalid_input("exemplar text must not be blank"));
    }
    Ok(())
}
