//! Document ingestion pipeline: parse, chunk, embed, store.

use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::embedding::{EmbeddingBackend, EmbeddingError};
use crate::parser::{self, ParseError};
use crate::rag::chunker;
use crate::rag::{Chunk, VectorIndex, VectorIndexError};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Database error during indexing: {0}")]
    Index(#[from] VectorIndexError),

    #[error("Embedding error during indexing: {0}")]
    Embedding(#[from] EmbeddingError),
}

pub type Result<T> = std::result::Result<T, IngestError>;

/// Outcome of a successful ingestion.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    /// Freshly generated identity; never reused, even for identical bytes
    pub document_id: String,
    pub total_chunks: usize,
}

/// Parse a file and split it into chunk texts.
///
/// Fails with `EmptyDocument` when nothing chunkable was extracted, so a
/// stored collection is never empty.
pub fn prepare(data: &[u8], filename: &str) -> Result<Vec<String>> {
    let extension = file_extension(filename);
    let text = parser::parse(data, &extension)?;

    let chunks = chunker::chunk_text(&text);
    if chunks.is_empty() {
        return Err(ParseError::EmptyDocument.into());
    }

    log::info!("Prepared {} chunks from {}", chunks.len(), filename);
    Ok(chunks)
}

/// Embed chunk texts and store them under a new document identity.
pub async fn store(
    index: &Mutex<VectorIndex>,
    embedder: &dyn EmbeddingBackend,
    chunk_texts: Vec<String>,
) -> Result<IngestOutcome> {
    let document_id = Uuid::new_v4().to_string();

    let chunks: Vec<Chunk> = chunk_texts
        .into_iter()
        .enumerate()
        .map(|(i, content)| Chunk::new(&document_id, i as u32, content))
        .collect();

    let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();

    // Embed before taking the index lock so a slow embedding service
    // never blocks concurrent readers.
    let embeddings = embedder.embed(&texts).await?;

    let total_chunks = {
        let mut index = index.lock().await;
        index.insert_chunks(&document_id, embedder.model(), &chunks, &embeddings)?
    };

    Ok(IngestOutcome {
        document_id,
        total_chunks,
    })
}

/// Full pipeline: parse, chunk, embed, store.
pub async fn ingest_document(
    index: &Mutex<VectorIndex>,
    embedder: &dyn EmbeddingBackend,
    data: &[u8],
    filename: &str,
) -> Result<IngestOutcome> {
    let chunk_texts = prepare(data, filename)?;
    store(index, embedder, chunk_texts).await
}

/// File extension of a name, without the dot; empty when absent.
pub fn file_extension(filename: &str) -> String {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_string()
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use crate::embedding::Result as EmbeddingResult;

    use super::*;

    /// Embeds any text as a deterministic pseudo-vector.
    struct HashEmbedder;

    #[async_trait]
    impl EmbeddingBackend for HashEmbedder {
        fn model(&self) -> &str {
            "hash-embedder"
        }

        async fn embed(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    let sum: u32 = t.bytes().map(u32::from).sum();
                    vec![(sum % 101) as f32, (t.len() % 97) as f32]
                })
                .collect())
        }
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("report.PDF"), "PDF");
        assert_eq!(file_extension("notes.txt"), "txt");
        assert_eq!(file_extension("noext"), "");
        assert_eq!(file_extension("archive.tar.gz"), "gz");
    }

    #[test]
    fn test_prepare_rejects_unsupported() {
        let err = prepare(b"a,b", "table.csv").unwrap_err();
        assert!(matches!(
            err,
            IngestError::Parse(ParseError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_prepare_rejects_empty() {
        let err = prepare(b"   ", "blank.txt").unwrap_err();
        assert!(matches!(err, IngestError::Parse(ParseError::EmptyDocument)));
    }

    #[tokio::test]
    async fn test_ingest_small_txt_is_one_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let index = Mutex::new(VectorIndex::new(dir.path().join("index.db")).unwrap());

        let outcome = ingest_document(&index, &HashEmbedder, b"A. B. C.", "tiny.txt")
            .await
            .unwrap();
        assert_eq!(outcome.total_chunks, 1);

        let stored = index.lock().await.get_chunks(&outcome.document_id).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].content, "A. B. C.");
    }

    #[tokio::test]
    async fn test_reingesting_same_bytes_makes_new_document() {
        let dir = tempfile::tempdir().unwrap();
        let index = Mutex::new(VectorIndex::new(dir.path().join("index.db")).unwrap());

        let data = b"The same file, uploaded twice.";
        let first = ingest_document(&index, &HashEmbedder, data, "dup.txt")
            .await
            .unwrap();
        let second = ingest_document(&index, &HashEmbedder, data, "dup.txt")
            .await
            .unwrap();

        assert_ne!(first.document_id, second.document_id);
        let locked = index.lock().await;
        assert_eq!(locked.count(&first.document_id).unwrap(), 1);
        assert_eq!(locked.count(&second.document_id).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_large_document_indexes_many_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let index = Mutex::new(VectorIndex::new(dir.path().join("index.db")).unwrap());

        let text = "Quarterly results improved across every region. ".repeat(100);
        let outcome = ingest_document(&index, &HashEmbedder, text.as_bytes(), "report.txt")
            .await
            .unwrap();
        assert!(outcome.total_chunks > 1);
        assert_eq!(
            index.lock().await.count(&outcome.document_id).unwrap() as usize,
            outcome.total_chunks
        );
    }
}
