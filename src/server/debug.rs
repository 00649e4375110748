//! Debug endpoints: raw collection contents and retrieval traces.
//!
//! Diagnostic only; not part of the stable API contract. Failures come
//! back as `{"error": ...}` bodies with a 200 status so they can be read
//! straight from a browser.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::rag::retriever;
use crate::AppState;

const DEFAULT_DEBUG_QUERY: &str = "what is this document about";

#[derive(Deserialize)]
pub struct DebugQuery {
    #[serde(default)]
    pub query: Option<String>,
}

/// `GET /api/v1/debug/document/{id}`: what the index holds for a
/// document.
pub async fn document(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<String>,
) -> Json<Value> {
    let result = {
        let index = state.index.lock().await;
        index.get_chunks(&document_id)
    };

    match result {
        Ok(chunks) => {
            let sample: Vec<&str> = chunks.iter().take(3).map(|c| c.content.as_str()).collect();
            let metadatas: Vec<Value> = chunks
                .iter()
                .take(3)
                .map(|c| json!({ "chunk_index": c.chunk_index }))
                .collect();
            Json(json!({
                "document_id": document_id,
                "total_chunks": chunks.len(),
                "chunks": sample,
                "metadatas": metadatas,
            }))
        }
        Err(e) => Json(json!({ "error": e.to_string(), "document_id": document_id })),
    }
}

/// `GET /api/v1/debug/search/{id}?query=`: raw retrieval trace.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<String>,
    Query(params): Query<DebugQuery>,
) -> Json<Value> {
    let query = params
        .query
        .unwrap_or_else(|| DEFAULT_DEBUG_QUERY.to_string());

    let contexts = retriever::retrieve(
        &state.index,
        state.embedder.as_ref(),
        &query,
        &document_id,
        state.config.retrieval.k,
    )
    .await;

    Json(json!({
        "query": query,
        "document_id": document_id,
        "context_found": contexts.len(),
        "contexts": contexts,
    }))
}

/// `GET /api/v1/debug/retrieve/{id}?query=`: retrieval plus a test
/// generation call over the retrieved context.
pub async fn retrieve(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<String>,
    Query(params): Query<DebugQuery>,
) -> Json<Value> {
    let query = params
        .query
        .unwrap_or_else(|| DEFAULT_DEBUG_QUERY.to_string());

    let contexts = retriever::retrieve(
        &state.index,
        state.embedder.as_ref(),
        &query,
        &document_id,
        state.config.retrieval.k,
    )
    .await;

    if contexts.is_empty() {
        return Json(json!({
            "query": query,
            "document_id": document_id,
            "context_found": 0,
            "error": "No context retrieved",
        }));
    }

    let context_text = contexts
        .iter()
        .map(|c| c.content.as_str())
        .collect::<Vec<_>>()
        .join("\n---\n");

    let test_prompt = format!(
        "Based on this document content, answer: {}\n\nCONTENT:\n{}",
        query, context_text
    );

    match state.genai.generate(&test_prompt).await {
        Ok(llm_answer) => {
            let context_preview = if context_text.chars().count() > 1000 {
                let head: String = context_text.chars().take(1000).collect();
                format!("{}...", head)
            } else {
                context_text
            };

            let chunks_retrieved: Vec<Value> = contexts
                .iter()
                .map(|c| {
                    let head: String = c.content.chars().take(200).collect();
                    json!({
                        "content_preview": format!("{}...", head),
                        "similarity": c.similarity,
                    })
                })
                .collect();

            Json(json!({
                "query": query,
                "document_id": document_id,
                "context_found": contexts.len(),
                "context_preview": context_preview,
                "llm_answer": llm_answer,
                "chunks_retrieved": chunks_retrieved,
            }))
        }
        Err(e) => Json(json!({ "error": e.to_string(), "document_id": document_id })),
    }
}

/// `GET /api/v1/debug/collections`: every collection with its size.
pub async fn collections(State(state): State<Arc<AppState>>) -> Json<Value> {
    let result = {
        let index = state.index.lock().await;
        index.list_collections()
    };

    match result {
        Ok(collections) => {
            let listing: Vec<Value> = collections
                .iter()
                .map(|c| {
                    json!({
                        "name": c.document_id,
                        "document_count": c.chunk_count,
                    })
                })
                .collect();
            Json(json!({
                "total_collections": listing.len(),
                "collections": listing,
            }))
        }
        Err(e) => Json(json!({ "error": e.to_string() })),
    }
}
