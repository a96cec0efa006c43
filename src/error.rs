use std::path::PathBuf;

/// Failure to produce embeddings.
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    #[error("embedding request to {url} failed: {message}")]
    Http { url: String, message: String },

    #[error("embedding response was malformed: {0}")]
    Shape(String),

    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    Dimension { expected: usize, got: usize },
}

/// Failure to load the clause taxonomy. Always fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum TaxonomyError {
    #[error("cannot read taxonomy {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse taxonomy: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("taxonomy has no usable clauses")]
    Empty,

    #[error("cannot embed taxonomy: {0}")]
    Embedding(#[from] EmbedError),
}
