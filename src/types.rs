// Error types and HTTP error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::borrow::Borrow;
use std::path::PathBuf;
use std::time::Duration;

/// Failures raised while driving an external tool.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("{tool} is not installed or not on PATH")]
    NotInstalled { tool: String },

    #[error("{tool} {}: {stderr}", exit_description(.code))]
    Failed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{tool} timed out after {timeout:?}")]
    TimedOut { tool: String, timeout: Duration },

    #[error("{tool} finished but produced no output at {path:?}")]
    MissingOutput { tool: String, path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_description<C: Borrow<Option<i32>>>(code: C) -> String {
    match code.borrow() {
        Some(code) => format!("exited with status {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

/// Request-level errors. Input problems map to 400, everything else to 500.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No file provided")]
    MissingFile,

    #[error("No selected file")]
    EmptyFilename,

    #[error("Invalid multipart request: {0}")]
    Multipart(String),

    #[error("OCR is disabled")]
    OcrDisabled,

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("{0}")]
    Conversion(#[from] ConvertError),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingFile
            | AppError::EmptyFilename
            | AppError::Multipart(_)
            | AppError::OcrDisabled
            | AppError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            AppError::Conversion(_) | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, "Rejected request");
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
