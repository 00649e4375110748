//! Document ingestion endpoints.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use crate::genai::{summarize, SummaryStyle};
use crate::ingest;
use crate::AppState;

use super::error::ApiError;

#[derive(Serialize)]
pub struct IndexResponse {
    pub status: &'static str,
    pub document_id: String,
    pub filename: String,
    pub total_chunks_indexed: usize,
}

/// Pull the uploaded file out of the multipart body.
async fn read_upload(multipart: &mut Multipart) -> Result<(String, Vec<u8>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.file_name().is_some() || field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            return Ok((filename, data.to_vec()));
        }
    }

    Err(ApiError::MissingField("file"))
}

/// `POST /api/v1/document/index`: parse, chunk, embed, and store an
/// uploaded file under a fresh document identity.
pub async fn index_document(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<IndexResponse>, ApiError> {
    let (filename, data) = read_upload(&mut multipart).await?;
    log::info!("Indexing upload {} ({} bytes)", filename, data.len());

    let outcome =
        ingest::ingest_document(&state.index, state.embedder.as_ref(), &data, &filename).await?;

    Ok(Json(IndexResponse {
        status: "success",
        document_id: outcome.document_id,
        filename,
        total_chunks_indexed: outcome.total_chunks,
    }))
}

/// `POST /api/v1/document/index-with-summary`: same as indexing, plus an
/// overview summary generated from the fresh chunks.
pub async fn index_document_with_summary(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let (filename, data) = read_upload(&mut multipart).await?;
    log::info!(
        "Indexing upload {} ({} bytes) with summary",
        filename,
        data.len()
    );

    let chunk_texts = ingest::prepare(&data, &filename)?;
    let ai_summary = summarize(&state.genai, &chunk_texts, SummaryStyle::Overview).await;
    let outcome = ingest::store(&state.index, state.embedder.as_ref(), chunk_texts).await?;

    Ok(Json(json!({
        "status": "success",
        "document_id": outcome.document_id,
        "filename": filename,
        "total_chunks_indexed": outcome.total_chunks,
        "ai_summary": ai_summary,
        "file_size": data.len(),
        "upload_date": chrono::Utc::now().timestamp(),
    })))
}
