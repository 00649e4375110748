//! Persistent embedding index backed by SQLite.
//!
//! One named collection per document identifier, all stored in a single
//! on-disk database that survives restarts. Nearest-neighbor search is
//! brute-force cosine distance over the collection's rows.

use std::path::PathBuf;

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use super::models::Chunk;

#[derive(Error, Debug)]
pub enum VectorIndexError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Embedder mismatch: collection was indexed with '{expected}', got '{actual}'")]
    EmbedderMismatch { expected: String, actual: String },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: u32, actual: u32 },

    #[error("Chunk count ({chunks}) doesn't match embedding count ({embeddings})")]
    CountMismatch { chunks: usize, embeddings: usize },
}

pub type Result<T> = std::result::Result<T, VectorIndexError>;

/// A chunk returned by a nearest-neighbor query, with its cosine distance
/// to the query vector (0 = identical direction, 2 = opposite).
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk_id: String,
    pub chunk_index: u32,
    pub content: String,
    pub distance: f32,
}

/// A stored chunk row in ordinal order, for summaries and debugging.
#[derive(Debug, Clone)]
pub struct StoredChunk {
    pub chunk_id: String,
    pub chunk_index: u32,
    pub content: String,
}

/// Per-collection entry in a listing.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CollectionInfo {
    pub document_id: String,
    pub chunk_count: u64,
}

/// Embedding index over per-document collections.
pub struct VectorIndex {
    conn: Connection,
    db_path: PathBuf,
}

impl VectorIndex {
    /// Open (or create) the index database at the given path.
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&db_path)?;

        conn.execute_batch(
            r#"
            -- One collection per document, recording the embedder identity
            -- it was built with
            CREATE TABLE IF NOT EXISTS collections (
                document_id TEXT PRIMARY KEY,
                model TEXT NOT NULL,
                dimensions INTEGER NOT NULL,
                created_at TEXT DEFAULT CURRENT_TIMESTAMP
            );

            -- Chunk text and metadata
            CREATE TABLE IF NOT EXISTS chunks (
                id TEXT PRIMARY KEY,
                document_id TEXT NOT NULL,
                chunk_index INTEGER NOT NULL,
                content TEXT NOT NULL,
                metadata TEXT,
                created_at TEXT DEFAULT CURRENT_TIMESTAMP
            );

            -- Embeddings as little-endian f32 blobs
            CREATE TABLE IF NOT EXISTS embeddings (
                chunk_id TEXT PRIMARY KEY,
                embedding BLOB NOT NULL,
                dimensions INTEGER NOT NULL,
                FOREIGN KEY (chunk_id) REFERENCES chunks(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_chunks_document_id ON chunks(document_id);
            "#,
        )?;

        Ok(Self { conn, db_path })
    }

    /// The embedder identity a collection was created with, if it exists.
    fn collection_embedder(&self, document_id: &str) -> Result<Option<(String, u32)>> {
        let row = self
            .conn
            .query_row(
                "SELECT model, dimensions FROM collections WHERE document_id = ?1",
                params![document_id],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?)),
            )
            .optional()?;
        Ok(row)
    }

    /// Guard against mixing embedding functions within one collection.
    fn check_embedder(
        &self,
        document_id: &str,
        model: &str,
        dimensions: u32,
    ) -> Result<Option<()>> {
        match self.collection_embedder(document_id)? {
            None => Ok(None),
            Some((stored_model, stored_dims)) => {
                if stored_model != model {
                    return Err(VectorIndexError::EmbedderMismatch {
                        expected: stored_model,
                        actual: model.to_string(),
                    });
                }
                if stored_dims != dimensions {
                    return Err(VectorIndexError::DimensionMismatch {
                        expected: stored_dims,
                        actual: dimensions,
                    });
                }
                Ok(Some(()))
            }
        }
    }

    /// Write a document's chunks and their embeddings in one transaction,
    /// creating the collection if absent.
    pub fn insert_chunks(
        &mut self,
        document_id: &str,
        model: &str,
        chunks: &[Chunk],
        embeddings: &[Vec<f32>],
    ) -> Result<usize> {
        if chunks.len() != embeddings.len() {
            return Err(VectorIndexError::CountMismatch {
                chunks: chunks.len(),
                embeddings: embeddings.len(),
            });
        }

        let dimensions = embeddings.first().map(|e| e.len() as u32).unwrap_or(0);
        for embedding in embeddings {
            if embedding.len() as u32 != dimensions {
                return Err(VectorIndexError::DimensionMismatch {
                    expected: dimensions,
                    actual: embedding.len() as u32,
                });
            }
        }

        self.check_embedder(document_id, model, dimensions)?;

        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT OR IGNORE INTO collections (document_id, model, dimensions) VALUES (?1, ?2, ?3)",
            params![document_id, model, dimensions],
        )?;

        for (chunk, embedding) in chunks.iter().zip(embeddings.iter()) {
            let metadata_json = serde_json::to_string(&chunk.metadata())?;

            tx.execute(
                "INSERT INTO chunks (id, document_id, chunk_index, content, metadata) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    chunk.id,
                    document_id,
                    chunk.chunk_index,
                    chunk.content,
                    metadata_json,
                ],
            )?;

            let embedding_bytes: Vec<u8> =
                embedding.iter().flat_map(|f| f.to_le_bytes()).collect();

            tx.execute(
                "INSERT INTO embeddings (chunk_id, embedding, dimensions) VALUES (?1, ?2, ?3)",
                params![chunk.id, embedding_bytes, embedding.len() as i64],
            )?;
        }

        tx.commit()?;

        log::info!(
            "Indexed {} chunks into collection {}",
            chunks.len(),
            document_id
        );
        Ok(chunks.len())
    }

    /// Nearest-neighbor search within one collection.
    ///
    /// Returns up to `k` chunks ordered by ascending cosine distance. A
    /// collection that does not exist or holds no entries yields an empty
    /// result, not an error: that is the normal "nothing indexed yet"
    /// condition. Querying an existing collection with a different
    /// embedder identity than it was built with is rejected.
    pub fn query(
        &self,
        document_id: &str,
        model: &str,
        query_embedding: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        if self
            .check_embedder(document_id, model, query_embedding.len() as u32)?
            .is_none()
        {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(
            r#"
            SELECT c.id, c.chunk_index, c.content, e.embedding
            FROM chunks c
            JOIN embeddings e ON c.id = e.chunk_id
            WHERE c.document_id = ?1
            "#,
        )?;

        let rows = stmt
            .query_map(params![document_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, u32>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Vec<u8>>(3)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut scored: Vec<ScoredChunk> = rows
            .into_iter()
            .map(|(chunk_id, chunk_index, content, embedding_bytes)| {
                let embedding = deserialize_embedding(&embedding_bytes);
                let distance = 1.0 - cosine_similarity(query_embedding, &embedding);
                ScoredChunk {
                    chunk_id,
                    chunk_index,
                    content,
                    distance,
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);

        Ok(scored)
    }

    /// All stored chunks for a document, in ordinal order.
    pub fn get_chunks(&self, document_id: &str) -> Result<Vec<StoredChunk>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, chunk_index, content FROM chunks WHERE document_id = ?1 ORDER BY chunk_index",
        )?;

        let rows = stmt
            .query_map(params![document_id], |row| {
                Ok(StoredChunk {
                    chunk_id: row.get(0)?,
                    chunk_index: row.get(1)?,
                    content: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    /// Number of chunks stored for a document.
    pub fn count(&self, document_id: &str) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM chunks WHERE document_id = ?1",
            params![document_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// List every collection with its chunk count.
    pub fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT col.document_id, COUNT(c.id)
            FROM collections col
            LEFT JOIN chunks c ON c.document_id = col.document_id
            GROUP BY col.document_id
            ORDER BY col.created_at
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(CollectionInfo {
                    document_id: row.get(0)?,
                    chunk_count: row.get::<_, i64>(1)? as u64,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    /// Path of the backing database file.
    pub fn db_path(&self) -> &PathBuf {
        &self.db_path
    }
}

/// Deserialize an embedding from its little-endian blob form.
fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Cosine similarity between two vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot_product = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;

    for (x, y) in a.iter().zip(b.iter()) {
        dot_product += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denominator = (norm_a * norm_b).sqrt();
    if denominator == 0.0 {
        return 0.0;
    }

    dot_product / denominator
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = "test-embedder";

    fn open_index(dir: &tempfile::TempDir) -> VectorIndex {
        VectorIndex::new(dir.path().join("index.db")).unwrap()
    }

    fn chunks_for(document_id: &str, texts: &[&str]) -> Vec<Chunk> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Chunk::new(document_id, i as u32, t.to_string()))
            .collect()
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_deserialize_embedding() {
        let values = vec![1.0f32, 2.0, 3.0];
        let bytes: Vec<u8> = values.iter().flat_map(|f| f.to_le_bytes()).collect();
        assert_eq!(deserialize_embedding(&bytes), values);
    }

    #[test]
    fn test_query_orders_by_distance() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = open_index(&dir);

        let chunks = chunks_for("doc", &["north", "east", "northeast"]);
        let embeddings = vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![0.7, 0.7],
        ];
        index.insert_chunks("doc", MODEL, &chunks, &embeddings).unwrap();

        let results = index.query("doc", MODEL, &[1.0, 0.0], 3).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].content, "north");
        assert_eq!(results[1].content, "northeast");
        assert_eq!(results[2].content, "east");
        assert!(results[0].distance <= results[1].distance);
        assert!(results[1].distance <= results[2].distance);
    }

    #[test]
    fn test_query_caps_at_collection_size() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = open_index(&dir);

        let chunks = chunks_for("doc", &["only"]);
        index
            .insert_chunks("doc", MODEL, &chunks, &[vec![1.0, 0.0]])
            .unwrap();

        let results = index.query("doc", MODEL, &[1.0, 0.0], 10).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_query_missing_collection_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let index = open_index(&dir);

        let results = index.query("never-indexed", MODEL, &[1.0, 0.0], 5).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_collections_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = open_index(&dir);

        index
            .insert_chunks("doc-a", MODEL, &chunks_for("doc-a", &["alpha"]), &[vec![1.0, 0.0]])
            .unwrap();
        index
            .insert_chunks("doc-b", MODEL, &chunks_for("doc-b", &["beta"]), &[vec![0.0, 1.0]])
            .unwrap();

        let results = index.query("doc-a", MODEL, &[0.0, 1.0], 10).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content, "alpha");

        assert_eq!(index.count("doc-a").unwrap(), 1);
        assert_eq!(index.count("doc-b").unwrap(), 1);
        assert_eq!(index.list_collections().unwrap().len(), 2);
    }

    #[test]
    fn test_count_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = open_index(&dir);

        let err = index
            .insert_chunks("doc", MODEL, &chunks_for("doc", &["a", "b"]), &[vec![1.0]])
            .unwrap_err();
        assert!(matches!(err, VectorIndexError::CountMismatch { .. }));
    }

    #[test]
    fn test_embedder_mismatch_guarded() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = open_index(&dir);

        index
            .insert_chunks("doc", MODEL, &chunks_for("doc", &["a"]), &[vec![1.0, 0.0]])
            .unwrap();

        let err = index
            .query("doc", "other-model", &[1.0, 0.0], 5)
            .unwrap_err();
        assert!(matches!(err, VectorIndexError::EmbedderMismatch { .. }));

        let err = index.query("doc", MODEL, &[1.0, 0.0, 0.0], 5).unwrap_err();
        assert!(matches!(err, VectorIndexError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_get_chunks_in_ordinal_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = open_index(&dir);

        let chunks = chunks_for("doc", &["zero", "one", "two"]);
        let embeddings = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]];
        index.insert_chunks("doc", MODEL, &chunks, &embeddings).unwrap();

        let stored = index.get_chunks("doc").unwrap();
        let contents: Vec<_> = stored.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["zero", "one", "two"]);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("index.db");

        {
            let mut index = VectorIndex::new(db_path.clone()).unwrap();
            index
                .insert_chunks("doc", MODEL, &chunks_for("doc", &["kept"]), &[vec![1.0, 0.0]])
                .unwrap();
        }

        let index = VectorIndex::new(db_path).unwrap();
        let results = index.query("doc", MODEL, &[1.0, 0.0], 1).unwrap();
        assert_eq!(results[0].content, "kept");
    }
}
