use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use tokio::fs;
use tracing::info;

use super::upload::read_file_field;
use crate::models::{AppState, ConversionReport, StagedUpload};
use crate::types::AppResult;

pub const CONVERSION_ID_HEADER: HeaderName = HeaderName::from_static("x-conversion-id");
pub const SECONDARY_PASS_HEADER: HeaderName = HeaderName::from_static("x-secondary-pass");

pub fn router() -> Router<AppState> {
    Router::new().route("/convert", post(convert_file))
}

/// POST /convert - stage the upload, convert it, return the DOCX
async fn convert_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Response> {
    let upload = read_file_field(multipart).await?;
    info!(filename = %upload.filename, size = upload.bytes.len(), "Conversion request received");

    let staged = state.staging.stage(&upload).await?;
    let result = convert_staged(&state, &staged).await;

    if !state.config.storage.keep_artifacts {
        state.staging.discard(&staged).await;
    }

    let (report, body) = result?;
    let content_type = mime_guess::from_path(&staged.download_name).first_or_octet_stream();

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", staged.download_name),
            ),
            (CONVERSION_ID_HEADER, staged.id.to_string()),
            (SECONDARY_PASS_HEADER, report.secondary.label().to_string()),
        ],
        body,
    )
        .into_response())
}

async fn convert_staged(state: &AppState, staged: &StagedUpload) -> AppResult<(ConversionReport, Vec<u8>)> {
    let report = state.pipeline.run(staged).await?;
    let body = fs::read(&report.output_path).await?;
    Ok((report, body))
}
