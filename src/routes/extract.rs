use axum::{
    extract::{multipart::MultipartRejection, rejection::QueryRejection, Multipart, Query, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::upload::read_file_field;
use crate::models::{AppState, StagedUpload};
use crate::ocr::{ExtractMode, ExtractedText};
use crate::types::{AppError, AppResult};

pub fn router() -> Router<AppState> {
    Router::new().route("/extract-text", post(extract_text))
}

#[derive(Debug, Default, Deserialize)]
pub struct ExtractQuery {
    #[serde(default)]
    pub mode: ExtractMode,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub id: Uuid,
    pub mode: ExtractMode,
    pub text: String,
    pub pages: usize,
}

/// POST /extract-text?mode=text|ocr
async fn extract_text(
    State(state): State<AppState>,
    query: Result<Query<ExtractQuery>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<ExtractResponse>> {
    let Query(query) = query.map_err(|rejection| AppError::InvalidQuery(rejection.body_text()))?;
    if query.mode == ExtractMode::Ocr && !state.extractor.ocr_enabled() {
        return Err(AppError::OcrDisabled);
    }

    let upload = read_file_field(multipart).await?;
    info!(filename = %upload.filename, mode = ?query.mode, "Text extraction request received");

    let staged = state.staging.stage(&upload).await?;
    let result = run_extraction(&state, &staged, query.mode).await;

    if !state.config.storage.keep_artifacts {
        state.staging.discard(&staged).await;
    }

    let extracted = result?;
    Ok(Json(ExtractResponse {
        id: staged.id,
        mode: query.mode,
        text: extracted.text,
        pages: extracted.pages,
    }))
}

async fn run_extraction(state: &AppState, staged: &StagedUpload, mode: ExtractMode) -> AppResult<ExtractedText> {
    let extracted = match mode {
        ExtractMode::Text => state.extractor.extract_text(&staged.input_path).await?,
        ExtractMode::Ocr => {
            state
                .extractor
                .extract_text_with_ocr(&staged.input_path, &staged.pages_dir())
                .await?
        }
    };
    Ok(extracted)
}
