//! Data models for retrieval operations.

use serde::{Deserialize, Serialize};

/// Metadata stored alongside a chunk in the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Position of the chunk within its document
    pub chunk_index: u32,
}

/// A bounded-length substring of a document, the unit of embedding and
/// retrieval. Immutable once created; a document's chunk set is written
/// exactly once, at indexing time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Identifier derived from the document identity and the ordinal
    pub id: String,
    /// The document this chunk belongs to
    pub document_id: String,
    /// Zero-based position within the document
    pub chunk_index: u32,
    /// The text content of the chunk
    pub content: String,
}

impl Chunk {
    /// Create a chunk with its deterministic identifier.
    pub fn new(document_id: &str, chunk_index: u32, content: String) -> Self {
        Self {
            id: chunk_id(document_id, chunk_index),
            document_id: document_id.to_string(),
            chunk_index,
            content,
        }
    }

    pub fn metadata(&self) -> ChunkMetadata {
        ChunkMetadata {
            chunk_index: self.chunk_index,
        }
    }
}

/// Deterministic chunk identifier: document identity plus ordinal.
pub fn chunk_id(document_id: &str, chunk_index: u32) -> String {
    format!("{}/chunk_{}", document_id, chunk_index)
}

/// A retrieval hit with its derived similarity score. Transient,
/// per-request data; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedContext {
    /// The matched chunk text
    pub content: String,
    /// The document the chunk came from
    pub document_id: String,
    /// Stored chunk metadata
    pub metadata: ChunkMetadata,
    /// Similarity in [0, 1], derived from cosine distance
    pub similarity: f32,
    /// Human-readable source label (multi-document retrieval only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}
