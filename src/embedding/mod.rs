//! Embedding generation via external embedding services.
//!
//! The same backend instance serves both the indexing and the query path,
//! so every vector in a collection comes from one embedding function.

mod ollama;
mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Embedding server error: {status} - {message}")]
    Server { status: u16, message: String },

    #[error("Embedding response was empty")]
    EmptyResponse,

    #[error("Unknown embedding provider: {0}")]
    UnknownProvider(String),
}

pub type Result<T> = std::result::Result<T, EmbeddingError>;

/// Configuration for embedding generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Provider: "openai", "ollama", or "lmstudio"
    pub provider: String,
    /// Model identifier (e.g., "nomic-embed-text")
    pub model: String,
    /// Dimensions of the embedding vectors
    pub dimensions: u32,
    /// Optional API key (for OpenAI)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Optional base URL (for Ollama/LM Studio)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
            api_key: None,
            base_url: None,
        }
    }
}

/// An embedding function reachable over HTTP.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Identity of the embedding function. Persisted with each collection
    /// and checked on every write and query to that collection.
    fn model(&self) -> &str;

    /// Embed a batch of texts, one vector per input, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text.
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        if vectors.is_empty() {
            return Err(EmbeddingError::EmptyResponse);
        }
        Ok(vectors.remove(0))
    }
}

/// Construct the backend named by the configuration.
pub fn backend_from_config(config: &EmbeddingConfig) -> Result<Box<dyn EmbeddingBackend>> {
    match config.provider.as_str() {
        "openai" | "lmstudio" => Ok(Box::new(openai::OpenAiEmbedder::new(config)?)),
        "ollama" => Ok(Box::new(ollama::OllamaEmbedder::new(config)?)),
        other => Err(EmbeddingError::UnknownProvider(other.to_string())),
    }
}
