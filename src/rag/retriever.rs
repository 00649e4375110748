//! Retrieval policies over the embedding index.
//!
//! Single-document retrieval returns the top-k nearest chunks with no
//! distance threshold, leaving relevance judgement to the answer model.
//! Multi-document retrieval applies a distance cutoff per result and caps
//! the merged list. These are the only two acceptance rules in the
//! service.

use tokio::sync::Mutex;

use crate::embedding::EmbeddingBackend;

use super::index::VectorIndex;
use super::models::{ChunkMetadata, RetrievedContext};

/// Default number of chunks retrieved for a single-document question.
pub const DEFAULT_K: usize = 5;

/// Default chunks retrieved per document in multi-document questions.
pub const DEFAULT_K_PER_DOC: usize = 3;

/// Multi-document results at or beyond this cosine distance are dropped.
const MULTI_DOC_DISTANCE_CUTOFF: f32 = 1.5;

/// Cap on the merged multi-document result list.
const MULTI_DOC_MAX_RESULTS: usize = 10;

/// Similarity score derived from cosine distance.
///
/// Distance ranges 0 (identical) to 2 (opposite); the score is
/// `1 - distance/2`, clamped to [0, 1]. This is the single normalization
/// used everywhere a score is reported.
pub fn similarity_from_distance(distance: f32) -> f32 {
    (1.0 - distance / 2.0).clamp(0.0, 1.0)
}

/// Retrieve the k nearest chunks of one document.
///
/// A missing or empty collection yields an empty list. Failures embedding
/// the query or reading the collection are logged and also yield an empty
/// list: retrieval problems surface to the caller as "no context found",
/// never as errors.
pub async fn retrieve(
    index: &Mutex<VectorIndex>,
    embedder: &dyn EmbeddingBackend,
    query: &str,
    document_id: &str,
    k: usize,
) -> Vec<RetrievedContext> {
    log::info!("Retrieving context for document {}: {}", document_id, query);

    let query_embedding = match embedder.embed_one(query).await {
        Ok(vector) => vector,
        Err(e) => {
            log::warn!("Failed to embed query: {}", e);
            return Vec::new();
        }
    };

    let scored = {
        let index = index.lock().await;
        match index.query(document_id, embedder.model(), &query_embedding, k) {
            Ok(scored) => scored,
            Err(e) => {
                log::warn!("Error querying collection {}: {}", document_id, e);
                return Vec::new();
            }
        }
    };

    log::info!("Found {} chunks for document {}", scored.len(), document_id);

    scored
        .into_iter()
        .map(|chunk| RetrievedContext {
            content: chunk.content,
            document_id: document_id.to_string(),
            metadata: ChunkMetadata {
                chunk_index: chunk.chunk_index,
            },
            similarity: similarity_from_distance(chunk.distance),
            source: None,
        })
        .collect()
}

/// Retrieve supporting chunks across several documents.
///
/// Each document's collection is queried independently with the same
/// query embedding; results with distance >= 1.5 are dropped, survivors
/// are tagged with their origin, merged, sorted by descending similarity
/// and truncated to the top 10. A failure on one document skips that
/// document without aborting the rest.
pub async fn retrieve_multiple(
    index: &Mutex<VectorIndex>,
    embedder: &dyn EmbeddingBackend,
    query: &str,
    document_ids: &[String],
    k_per_doc: usize,
) -> Vec<RetrievedContext> {
    let query_embedding = match embedder.embed_one(query).await {
        Ok(vector) => vector,
        Err(e) => {
            log::warn!("Failed to embed query: {}", e);
            return Vec::new();
        }
    };

    let mut all_contexts = Vec::new();

    for document_id in document_ids {
        let scored = {
            let index = index.lock().await;
            match index.query(document_id, embedder.model(), &query_embedding, k_per_doc) {
                Ok(scored) => scored,
                Err(e) => {
                    log::warn!("Error searching document {}: {}", document_id, e);
                    continue;
                }
            }
        };

        for (rank, chunk) in scored.into_iter().enumerate() {
            if chunk.distance < MULTI_DOC_DISTANCE_CUTOFF {
                all_contexts.push(RetrievedContext {
                    content: chunk.content,
                    document_id: document_id.clone(),
                    metadata: ChunkMetadata {
                        chunk_index: chunk.chunk_index,
                    },
                    similarity: similarity_from_distance(chunk.distance),
                    source: Some(format!("Document: {} | Chunk: {}", document_id, rank)),
                });
            }
        }
    }

    all_contexts.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    all_contexts.truncate(MULTI_DOC_MAX_RESULTS);

    log::info!(
        "Multi-document retrieval: {} contexts across {} documents",
        all_contexts.len(),
        document_ids.len()
    );

    all_contexts
}
