//! JSON file persistence for a style library.
//!
//! The file holds an array of `{"text": .., "embedding": [..]}` objects in
//! library order.

use std::path::{Path, PathBuf};

use stylebook::{StyleExemplar, StyleLibrary};
use tracing::debug;

/// Error type for library file operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// IO error.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// The file decoded but its contents were rejected by the library.
    #[error("library: {0}")]
    Library(#[from] stylebook::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// A style library stored as a JSON file.
#[derive(Debug, Clone)]
pub struct LibraryFile {
    path: PathBuf,
}

impl LibraryFile {
    /// Create a library file handle for the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The default location (`~/.stylebook/library.json`).
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs_next::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".stylebook")
            .join("library.json")
    }

    /// The file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the library. A missing file is an empty library.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be inspected or read, the file
    /// cannot be decoded, or it holds an exemplar with blank text.
    pub async fn load(&self) -> StorageResult<StyleLibrary> {
        if !tokio::fs::try_exists(&self.path).await? {
            debug!(path = %self.path.display(), "library file missing, starting empty");
            return Ok(StyleLibrary::new());
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        let exemplars: Vec<StyleExemplar> = serde_json::from_str(&content)?;
        let library = StyleLibrary::from_exemplars(exemplars)?;
        debug!(path = %self.path.display(), len = library.len(), "loaded library");
        Ok(library)
    }

    /// Save the library, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self, library: &StyleLibrary) -> StorageResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(&library.snapshot())?;
        tokio::fs::write(&self.path, content).await?;
        debug!(path = %self.path.display(), len = library.len(), "saved library");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_fs::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_empty_library() {
        let dir = TempDir::new().unwrap();
        let file = LibraryFile::new(dir.path().join("absent.json"));
        assert!(file.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_keeps_order() {
        let dir = TempDir::new().unwrap();
        let file = LibraryFile::new(dir.path().join("nested").join("library.json"));

        let library = StyleLibrary::new();
        library.append("first", vec![1.0, 0.0]).unwrap();
        library.append("second", vec![0.0, 1.0]).unwrap();
        file.save(&library).await.unwrap();

        let loaded = file.load().await.unwrap();
        assert_eq!(loaded.texts(), vec!["first", "second"]);
        assert_eq!(loaded.get(1).unwrap().embedding(), &[0.0, 1.0]);
    }

    #[tokio::test]
    async fn test_load_rejects_blank_exemplar() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");
        std::fs::write(&path, r#"[{"text": "  ", "embedding": [1.0]}]"#).unwrap();

        let err = LibraryFile::new(path).load().await.unwrap_err();
        assert!(matches!(err, StorageError::Library(_)));
    }

    #[tokio::test]
    async fn test_load_surfaces_unreachable_path() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let err = LibraryFile::new(blocker.join("library.json"))
            .load()
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
    }

    #[tokio::test]
    async fn test_load_rejects_malformed_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = LibraryFile::new(path).load().await.unwrap_err();
        assert!(matches!(err, StorageError::Json(_)));
    }
}
