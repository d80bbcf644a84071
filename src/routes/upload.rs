use axum::extract::{multipart::MultipartRejection, Multipart};
use tracing::debug;

use crate::models::UploadedFile;
use crate::types::{AppError, AppResult};

/// Name of the multipart field carrying the document.
pub const FILE_FIELD: &str = "file";

/// Pull the `file` part out of a multipart body.
///
/// A body that isn't `multipart/form-data` carries no file at all. Other
/// fields are skipped. A part named `file` without a filename is not a file
/// upload and is skipped too; one with an empty filename is rejected.
pub async fn read_file_field(
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<UploadedFile> {
    let mut multipart = multipart.map_err(|rejection| {
        debug!(reason = %rejection.body_text(), "Request body is not multipart");
        AppError::MissingFile
    })?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Multipart(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = match field.file_name() {
            Some(name) => name.to_string(),
            None => continue,
        };
        if filename.is_empty() {
            return Err(AppError::EmptyFilename);
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Multipart(e.body_text()))?;

        debug!(filename = %filename, size = bytes.len(), "Received upload");
        return Ok(UploadedFile { filename, bytes });
    }

    Err(AppError::MissingFile)
}
