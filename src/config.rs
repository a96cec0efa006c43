use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

use crate::classify::embed::{Embedder, OllamaEmbedder, TokenHashEmbedder};
use crate::classify::taxonomy::Taxonomy;
use crate::classify::{ClauseClassifier, DEFAULT_CLAUSE};
use crate::error::{EmbedError, TaxonomyError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderKind {
    Hash,
    Ollama,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub db_path: PathBuf,
    pub taxonomy_path: PathBuf,
    pub embedder: EmbedderKind,
    pub ollama_host: String,
    pub ollama_model: String,
    pub default_clause: String,
    pub embed_timeout_secs: u64,
}

fn with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("db_path", "data/carx.sqlite")?
        .set_default("taxonomy_path", "data/clauses.json")?
        .set_default("embedder", "hash")?
        .set_default("ollama_host", "http://localhost:11434")?
        .set_default("ollama_model", "nomic-embed-text")?
        .set_default("default_clause", DEFAULT_CLAUSE)?
        .set_default("embed_timeout_secs", 30_i64)
}

impl Settings {
    /// Defaults, then `carx.toml` if present, then `CARX_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        with_defaults()?
            .add_source(File::with_name("carx").required(false))
            .add_source(Environment::with_prefix("CARX"))
            .build()?
            .try_deserialize()
    }

    pub fn defaults() -> Result<Self, ConfigError> {
        with_defaults()?.build()?.try_deserialize()
    }

    pub fn build_embedder(&self) -> Result<Arc<dyn Embedder>, EmbedError> {
        let embedder: Arc<dyn Embedder> = match self.embedder {
            EmbedderKind::Hash => Arc::new(TokenHashEmbedder::default()),
            EmbedderKind::Ollama => Arc::new(OllamaEmbedder::new(
                &self.ollama_host,
                &self.ollama_model,
                Duration::from_secs(self.embed_timeout_secs),
            )?),
        };
        Ok(embedder)
    }

    /// Load the taxonomy and embed it with the configured backend.
    pub fn build_classifier(&self) -> Result<ClauseClassifier, TaxonomyError> {
        let taxonomy = Taxonomy::load(&self.taxonomy_path)?;
        let classifier = ClauseClassifier::new(taxonomy, self.build_embedder()?)?;
        Ok(classifier.with_default_clause(self.default_clause.clone()))
    }
}
