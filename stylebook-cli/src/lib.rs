//! Command-line access to a stylebook style library.
//!
//! The library lives in a JSON file; embeddings come from an Ollama server
//! unless passed explicitly.

pub mod cli;
pub mod storage;

pub use cli::{Args, Command, EmbeddingArg, run};
pub use storage::{LibraryFile, StorageError};
