//! Summary generation endpoints for already-indexed documents.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::genai::{summarize, SummaryStyle};
use crate::AppState;

use super::error::ApiError;

#[derive(Deserialize)]
pub struct SummaryParams {
    #[serde(default)]
    pub summary_type: Option<String>,
}

/// Stored chunk texts for a document; 404 when there are none.
async fn document_chunk_texts(
    state: &AppState,
    document_id: &str,
) -> Result<Vec<String>, ApiError> {
    let chunks = {
        let index = state.index.lock().await;
        index.get_chunks(document_id)?
    };

    if chunks.is_empty() {
        return Err(ApiError::NotFound);
    }

    Ok(chunks.into_iter().map(|c| c.content).collect())
}

/// `POST /api/v1/document/{id}/generate-summary?summary_type=`: one
/// summary in the requested style. Unknown styles fall back to overview.
pub async fn generate_summary(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<String>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<Value>, ApiError> {
    let requested = params
        .summary_type
        .unwrap_or_else(|| "overview".to_string());
    let style = SummaryStyle::parse(&requested).unwrap_or(SummaryStyle::Overview);

    let chunks = document_chunk_texts(&state, &document_id).await?;
    let ai_summary = summarize(&state.genai, &chunks, style).await;

    Ok(Json(json!({
        "document_id": document_id,
        "ai_summary": ai_summary,
        "summary_type": requested,
        "status": "success",
    })))
}

/// `POST /api/v1/document/{id}/generate-comprehensive-summaries`: the
/// overview, key-points, and executive styles in one response.
pub async fn generate_comprehensive_summaries(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let chunks = document_chunk_texts(&state, &document_id).await?;

    let overview = summarize(&state.genai, &chunks, SummaryStyle::Overview).await;
    let key_points = summarize(&state.genai, &chunks, SummaryStyle::KeyPoints).await;
    let executive = summarize(&state.genai, &chunks, SummaryStyle::Executive).await;

    Ok(Json(json!({
        "document_id": document_id,
        "summaries": {
            "overview": overview,
            "key_points": key_points,
            "executive": executive,
        },
        "status": "success",
    })))
}
