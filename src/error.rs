//! Application error types and HTTP response mapping.
//!
//! Defines `ParseError` for dataset loading and `AppError` for everything
//! else. `AppError` implements Axum's `IntoResponse` so handlers can return
//! it directly as a JSON error body.
//!
//! Error mappings:
//! - `CommitNotFound` → 404
//! - `InvalidInput`, `Parse` → 400
//! - `DatasetUnavailable` → 503
//! - `Io`, `Internal` → 500

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures while turning a tabular source into line records.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("Row {row}: no usable timestamp in date/timezone or datetime")]
    InvalidTimestamp { row: usize },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dataset unavailable: {0}")]
    DatasetUnavailable(String),

    #[error("Commit not found: {0}")]
    CommitNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Parse(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            AppError::DatasetUnavailable(reason) => (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Dataset unavailable: {}", reason),
            ),
            AppError::CommitNotFound(id) => {
                (StatusCode::NOT_FOUND, format!("Commit not found: {}", id))
            }
            AppError::InvalidInput(msg) => {
                (StatusCode::BAD_REQUEST, format!("Invalid input: {}", msg))
            }
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
