//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::ingest::IngestError;
use crate::parser::ParseError;
use crate::rag::VectorIndexError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("Missing {0}.")]
    MissingField(&'static str),

    #[error("Document not found or has no content")]
    NotFound,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Index error: {0}")]
    Index(#[from] VectorIndexError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Ingest(IngestError::Parse(ParseError::UnsupportedFormat(_))) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Ingest(IngestError::Parse(ParseError::EmptyDocument)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Ingest(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MissingField(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Index(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let unsupported: ApiError =
            IngestError::Parse(ParseError::UnsupportedFormat(".csv".to_string())).into();
        assert_eq!(unsupported.status(), StatusCode::BAD_REQUEST);

        let empty: ApiError = IngestError::Parse(ParseError::EmptyDocument).into();
        assert_eq!(empty.status(), StatusCode::UNPROCESSABLE_ENTITY);

        assert_eq!(
            ApiError::MissingField("document_id or question").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_messages() {
        let unsupported: ApiError =
            IngestError::Parse(ParseError::UnsupportedFormat(".csv".to_string())).into();
        assert!(unsupported.to_string().contains("Unsupported file type"));

        assert_eq!(
            ApiError::MissingField("document_id or question").to_string(),
            "Missing document_id or question."
        );
    }
}
