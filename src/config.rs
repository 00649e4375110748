//! Service configuration.
//!
//! Loaded from a TOML file (`docqa.toml` next to the binary, or the path
//! in `DOCQA_CONFIG`), with environment overrides for secrets. A missing
//! file falls back to defaults so the service can start with a local
//! Ollama embedder out of the box.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::embedding::EmbeddingConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// Directory holding the embedding index database
    pub data_dir: PathBuf,
    /// Allowed CORS origins
    pub cors_origins: Vec<String>,
    pub embedding: EmbeddingConfig,
    pub genai: GenAiConfig,
    pub retrieval: RetrievalConfig,
}

/// Generative model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenAiConfig {
    /// Model identifier (e.g., "gemini-2.0-flash")
    pub model: String,
    /// API key; usually supplied via `GEMINI_API_KEY`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Override for the API endpoint (testing)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for GenAiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            api_key: None,
            base_url: None,
        }
    }
}

/// Retrieval fan-out settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Chunks retrieved for a single-document question
    pub k: usize,
    /// Chunks retrieved per document for multi-document questions
    pub k_per_doc: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            k: crate::rag::retriever::DEFAULT_K,
            k_per_doc: crate::rag::retriever::DEFAULT_K_PER_DOC,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".to_string(),
            data_dir: default_data_dir(),
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
                "http://localhost:8088".to_string(),
                "http://127.0.0.1:8088".to_string(),
                "http://localhost:8080".to_string(),
                "http://127.0.0.1:8000".to_string(),
            ],
            embedding: EmbeddingConfig::default(),
            genai: GenAiConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("docqa"))
        .unwrap_or_else(|| PathBuf::from("./docqa-data"))
}

impl AppConfig {
    /// Load configuration from disk plus environment overrides.
    pub fn load() -> Result<Self> {
        let path = std::env::var("DOCQA_CONFIG").unwrap_or_else(|_| "docqa.toml".to_string());

        let mut config = if std::path::Path::new(&path).exists() {
            let raw = std::fs::read_to_string(&path)?;
            toml::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?
        } else {
            log::info!("No config file at {}, using defaults", path);
            AppConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Environment variables take precedence over file values. Secrets
    /// are expected to arrive this way rather than living in the file.
    fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var("DOCQA_BIND_ADDRESS") {
            self.bind_address = addr;
        }
        if let Ok(dir) = std::env::var("DOCQA_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            self.genai.api_key = Some(key);
        }
        if let Ok(key) = std::env::var("DOCQA_EMBEDDING_API_KEY") {
            self.embedding.api_key = Some(key);
        }
    }

    /// Path of the embedding index database.
    pub fn index_db_path(&self) -> PathBuf {
        self.data_dir.join("index.db")
    }
}
