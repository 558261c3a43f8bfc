use std::path::PathBuf;
use thiserror::Error;

/// Boxed adapter failure carried inside [`CorpusError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the corpus core to its callers.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// No stopword set / translation source registered for this tag.
    #[error("unsupported language: '{0}'")]
    UnsupportedLanguage(String),

    #[error("post not found: {0}")]
    NotFound(String),

    /// The translator failed on a single entry; the batch was rolled back.
    #[error("translation failed for post {id}: {source}")]
    Translation {
        id: String,
        #[source]
        source: BoxError,
    },

    #[error("corpus file {}: {message}", path.display())]
    Persistence { path: PathBuf, message: String },

    /// The ingestion source could not be reached at all. Individual ids that
    /// simply do not resolve are not errors.
    #[error("ingestion failed: {0}")]
    Ingestion(#[source] BoxError),
}

impl CorpusError {
    pub(crate) fn persistence(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        CorpusError::Persistence {
            path: path.into(),
            message: message.into(),
        }
    }
}
