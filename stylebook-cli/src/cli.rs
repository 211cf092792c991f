//! Command-line arguments and command execution.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use stylebook::providers::{DEFAULT_EMBEDDING_MODEL, OLLAMA_API_BASE_URL, OllamaEmbedder};
use stylebook::retrieval::{DEFAULT_K, DEFAULT_LAMBDA};
use stylebook::{SelectionParams, StyleExemplar, StyleGuide, StyleLibrary};
use tracing::info;

use crate::storage::LibraryFile;

/// Stylebook - manage a style library and pick diverse few-shot exemplars
#[derive(Parser, Debug)]
#[command(name = "stylebook")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Library file (JSON)
    #[arg(short, long, env = "STYLEBOOK_LIBRARY", global = true)]
    pub library: Option<PathBuf>,

    /// Ollama server URL used for embeddings
    #[arg(long, env = "OLLAMA_HOST", default_value = OLLAMA_API_BASE_URL, global = true)]
    pub ollama_url: String,

    /// Embedding model name
    #[arg(short, long, env = "STYLEBOOK_EMBED_MODEL", default_value = DEFAULT_EMBEDDING_MODEL, global = true)]
    pub model: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Library commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List stored posts with their index
    List,
    /// Add a post to the library
    Add {
        /// Post text
        text: String,
        /// Use this embedding (JSON array) instead of calling the embedding model
        #[arg(long, value_parser = parse_embedding)]
        embedding: Option<EmbeddingArg>,
    },
    /// Remove the post at an index (out-of-range indices are ignored)
    Remove {
        /// Position as shown by `list`
        #[arg(allow_negative_numbers = true)]
        index: i64,
    },
    /// Select diverse exemplars for a query
    Select {
        /// Query text to embed
        #[arg(required_unless_present = "embedding")]
        query: Option<String>,
        /// Use this query embedding (JSON array) instead of embedding the query text
        #[arg(long, value_parser = parse_embedding, conflicts_with = "query")]
        embedding: Option<EmbeddingArg>,
        /// Relevance/diversity trade-off (1 = relevance only, 0 = diversity only)
        #[arg(long, default_value_t = DEFAULT_LAMBDA, allow_negative_numbers = true)]
        lambda: f64,
        /// Number of exemplars to return
        #[arg(short, default_value_t = DEFAULT_K)]
        k: usize,
    },
}

/// An embedding passed on the command line as a JSON array.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingArg(pub Vec<f64>);

fn parse_embedding(raw: &str) -> Result<EmbeddingArg, String> {
    serde_json::from_str(raw)
        .map(EmbeddingArg)
        .map_err(|e| format!("expected a JSON array of numbers: {e}"))
}

impl Args {
    /// The library file path, falling back to the default location.
    #[must_use]
    pub fn library_file(&self) -> LibraryFile {
        LibraryFile::new(
            self.library
                .clone()
                .unwrap_or_else(LibraryFile::default_path),
        )
    }

    fn embedder(&self) -> anyhow::Result<OllamaEmbedder> {
        Ok(OllamaEmbedder::builder()
            .base_url(&self.ollama_url)
            .model(&self.model)
            .build()?)
    }
}

/// Runs the parsed command, writing user-facing output to `out`.
///
/// # Errors
///
/// Returns an error if the library file cannot be read or written, the
/// embedding call fails, or the post text is blank.
pub async fn run(args: &Args, out: &mut impl Write) -> anyhow::Result<()> {
    let file = args.library_file();
    let library = file.load().await?;

    match &args.command {
        Command::List => {
            if library.is_empty() {
                writeln!(out, "library is empty")?;
            }
            for (index, text) in library.texts().iter().enumerate() {
                writeln!(out, "[{index}] {text}")?;
            }
        }
        Command::Add { text, embedding } => {
            let library = Arc::new(library);
            let index = match embedding {
                Some(embedding) => library.append(text.as_str(), embedding.0.clone())?,
                None => {
                    StyleGuide::new(Arc::clone(&library), Arc::new(args.embedder()?))
                        .add_post(text)
                        .await?
                }
            };
            file.save(&library).await?;
            info!(index, path = %file.path().display(), "added post");
            writeln!(out, "added [{index}]")?;
        }
        Command::Remove { index } => {
            let removed = usize::try_from(*index)
                .ok()
                .and_then(|i| library.remove_at(i));
            match removed {
                Some(exemplar) => {
                    file.save(&library).await?;
                    writeln!(out, "removed [{index}] {}", exemplar.text())?;
                }
                None => writeln!(out, "no post at index {index}, library unchanged")?,
            }
        }
        Command::Select {
            query,
            embedding,
            lambda,
            k,
        } => {
            let params = SelectionParams::new(*lambda, *k);
            let texts = match (embedding, query) {
                (Some(embedding), _) => select_with_embedding(&library, &embedding.0, params),
                (None, Some(query)) => {
                    let guide = StyleGuide::new(Arc::new(library), Arc::new(args.embedder()?))
                        .with_params(params);
                    guide.relevant_posts(query).await?
                }
                (None, None) => anyhow::bail!("either a query or --embedding is required"),
            };
            for (rank, text) in texts.iter().enumerate() {
                writeln!(out, "{}. {text}", rank + 1)?;
            }
        }
    }

    Ok(())
}

fn select_with_embedding(
    library: &StyleLibrary,
    embedding: &[f64],
    params: SelectionParams,
) -> Vec<String> {
    stylebook::retrieval::select(embedding, &library.snapshot(), params)
        .into_iter()
        .map(StyleExemplar::into_text)
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_fs::TempDir;

    use super::*;

    fn args(dir: &TempDir, command: &[&str]) -> Args {
        let library = dir.path().join("library.json");
        let mut argv = vec!["stylebook", "--library", library.to_str().unwrap()];
        argv.extend_from_slice(command);
        Args::try_parse_from(argv).unwrap()
    }

    async fn run_to_string(args: &Args) -> String {
        let mut out = Vec::new();
        run(args, &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_add_list_select_remove() {
        let dir = TempDir::new().unwrap();
        for (text, embedding) in [("A", "[1,0]"), ("B", "[0.9,0.1]"), ("C", "[0,1]")] {
            let output = run_to_string(&args(&dir, &["add", text, "--embedding", embedding])).await;
            assert!(output.starts_with("added ["));
        }

        let listing = run_to_string(&args(&dir, &["list"])).await;
        assert_eq!(listing, "[0] A\n[1] B\n[2] C\n");

        let selection = run_to_string(&args(
            &dir,
            &["select", "--embedding", "[1,0]", "--lambda", "0.5", "-k", "2"],
        ))
        .await;
        assert_eq!(selection, "1. A\n2. C\n");

        let removed = run_to_string(&args(&dir, &["remove", "1"])).await;
        assert_eq!(removed, "removed [1] B\n");
        assert_eq!(run_to_string(&args(&dir, &["list"])).await, "[0] A\n[1] C\n");
    }

    #[tokio::test]
    async fn test_remove_out_of_range_is_noop() {
        let dir = TempDir::new().unwrap();
        run_to_string(&args(&dir, &["add", "only", "--embedding", "[1,0]"])).await;

        for index in ["-1", "1", "99"] {
            let output = run_to_string(&args(&dir, &["remove", index])).await;
            assert!(output.contains("library unchanged"));
        }
        assert_eq!(run_to_string(&args(&dir, &["list"])).await, "[0] only\n");
    }

    #[tokio::test]
    async fn test_add_blank_text_fails() {
        let dir = TempDir::new().unwrap();
        let args = args(&dir, &["add", "   ", "--embedding", "[1,0]"]);
        let err = run(&args, &mut Vec::new()).await.unwrap_err();
        assert!(err.to_string().contains("invalid input"));
        assert!(!dir.path().join("library.json").exists());
    }

    #[tokio::test]
    async fn test_select_on_empty_library() {
        let dir = TempDir::new().unwrap();
        let output = run_to_string(&args(&dir, &["select", "--embedding", "[1,0]"])).await;
        assert!(output.is_empty());
    }

    #[test]
    fn test_embedding_argument_parsing() {
        assert_eq!(
            parse_embedding("[0.5, -1, 2e-3]").unwrap(),
            EmbeddingArg(vec![0.5, -1.0, 0.002])
        );
        assert!(parse_embedding("0.5, 1").is_err());
    }

    #[test]
    fn test_select_requires_query_or_embedding() {
        assert!(Args::try_parse_from(["stylebook", "select"]).is_err());
        assert!(Args::try_parse_from(["stylebook", "select", "hello", "--embedding", "[1]"]).is_err());
        let parsed = Args::try_parse_from(["stylebook", "select", "hello"]).unwrap();
        assert!(matches!(
            parsed.command,
            Command::Select { lambda, k, .. } if lambda == DEFAULT_LAMBDA && k == DEFAULT_K
        ));
    }
}
