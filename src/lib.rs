//! Retrieval-augmented document question-answering service.
//!
//! Documents are parsed, chunked, embedded, and stored in per-document
//! collections of a persistent vector index; questions are answered by
//! retrieving the nearest chunks and handing them, with the question, to
//! a hosted generative model.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

pub mod config;
pub mod embedding;
pub mod genai;
pub mod ingest;
pub mod parser;
pub mod rag;
pub mod server;

use config::AppConfig;
use embedding::{backend_from_config, EmbeddingBackend, EmbeddingError};
use genai::{GeminiClient, GenAiError};
use rag::{VectorIndex, VectorIndexError};

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Failed to open vector index: {0}")]
    Index(#[from] VectorIndexError),

    #[error("Invalid embedding configuration: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Failed to build generative client: {0}")]
    GenAi(#[from] GenAiError),
}

/// Process-scoped resources, constructed once at startup and injected
/// into request handlers.
pub struct AppState {
    pub config: AppConfig,
    pub index: Mutex<VectorIndex>,
    pub embedder: Arc<dyn EmbeddingBackend>,
    pub genai: GeminiClient,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, StartupError> {
        let index = VectorIndex::new(config.index_db_path())?;
        let embedder: Arc<dyn EmbeddingBackend> = Arc::from(backend_from_config(&config.embedding)?);
        let genai = GeminiClient::new(&config.genai)?;

        log::info!(
            "Index at {:?}, embedding via {} ({}), generation via {}",
            index.db_path(),
            config.embedding.provider,
            embedder.model(),
            genai.model()
        );

        Ok(Self {
            config,
            index: Mutex::new(index),
            embedder,
            genai,
        })
    }
}
