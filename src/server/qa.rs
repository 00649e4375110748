//! Question-answering endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::genai::{self, NO_CONTEXT_ANSWER, NO_CONTEXT_ANSWER_MULTI};
use crate::rag::{retriever, RetrievedContext};
use crate::AppState;

use super::error::ApiError;

#[derive(Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
}

#[derive(Deserialize)]
pub struct AskMultipleRequest {
    #[serde(default)]
    pub document_ids: Vec<String>,
    #[serde(default)]
    pub question: Option<String>,
}

/// First `limit` characters of a passage, for source listings.
fn preview(text: &str, limit: usize) -> String {
    let head: String = text.chars().take(limit).collect();
    format!("{}...", head)
}

/// `POST /api/v1/qa/ask`: answer a question against one document.
pub async fn ask(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AskRequest>,
) -> Result<Json<Value>, ApiError> {
    let (document_id, question) = match (request.document_id, request.question) {
        (Some(d), Some(q)) if !d.is_empty() && !q.is_empty() => (d, q),
        _ => return Err(ApiError::MissingField("document_id or question")),
    };

    let contexts = retriever::retrieve(
        &state.index,
        state.embedder.as_ref(),
        &question,
        &document_id,
        state.config.retrieval.k,
    )
    .await;

    if contexts.is_empty() {
        return Ok(Json(json!({ "answer": NO_CONTEXT_ANSWER })));
    }

    let answer = genai::answer(&state.genai, &contexts, &question).await;

    let sources_used: Vec<Value> = contexts
        .iter()
        .map(|c| {
            json!({
                "content_preview": preview(&c.content, 150),
                "source_info": c.metadata,
                "similarity": c.similarity,
            })
        })
        .collect();

    Ok(Json(json!({
        "answer": answer,
        "document_id": document_id,
        "sources_used": sources_used,
    })))
}

/// Group contexts by document, preserving first-seen order.
fn group_by_document(contexts: &[RetrievedContext]) -> Vec<(String, Vec<RetrievedContext>)> {
    let mut groups: Vec<(String, Vec<RetrievedContext>)> = Vec::new();
    for context in contexts {
        match groups.iter_mut().find(|(id, _)| *id == context.document_id) {
            Some((_, group)) => group.push(context.clone()),
            None => groups.push((context.document_id.clone(), vec![context.clone()])),
        }
    }
    groups
}

/// `POST /api/v1/qa/ask-multiple`: answer a question across several
/// documents, with per-document source attribution.
pub async fn ask_multiple(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AskMultipleRequest>,
) -> Result<Json<Value>, ApiError> {
    let question = match request.question {
        Some(q) if !q.is_empty() && !request.document_ids.is_empty() => q,
        _ => return Err(ApiError::MissingField("document_ids or question")),
    };

    let contexts = retriever::retrieve_multiple(
        &state.index,
        state.embedder.as_ref(),
        &question,
        &request.document_ids,
        state.config.retrieval.k_per_doc,
    )
    .await;

    if contexts.is_empty() {
        return Ok(Json(json!({
            "answer": NO_CONTEXT_ANSWER_MULTI,
            "sources": [],
        })));
    }

    let groups = group_by_document(&contexts);
    let answer = genai::answer_with_sources(&state.genai, &groups, &question).await;

    let sources: Vec<Value> = contexts
        .iter()
        .map(|c| {
            json!({
                "document_id": c.document_id,
                "content_preview": preview(&c.content, 200),
                "similarity": c.similarity,
                "source_info": c.source,
            })
        })
        .collect();

    Ok(Json(json!({
        "answer": answer,
        "sources": sources,
    })))
}

#[cfg(test)]
mod tests {
    use crate::rag::ChunkMetadata;

    use super::*;

    fn context(document_id: &str, content: &str) -> RetrievedContext {
        RetrievedContext {
            content: content.to_string(),
            document_id: document_id.to_string(),
            metadata: ChunkMetadata { chunk_index: 0 },
            similarity: 0.9,
            source: None,
        }
    }

    #[test]
    fn test_preview_truncates() {
        assert_eq!(preview("abcdef", 3), "abc...");
        // Short passages still get the trailing marker
        assert_eq!(preview("ab", 150), "ab...");
    }

    #[test]
    fn test_group_by_document_preserves_order() {
        let contexts = vec![
            context("b", "one"),
            context("a", "two"),
            context("b", "three"),
        ];
        let groups = group_by_document(&contexts);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "b");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "a");
    }
}
