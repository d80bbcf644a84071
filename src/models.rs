use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use uuid::Uuid;

use crate::config::Config;
use crate::converter::ConversionPipeline;
use crate::ocr::TextExtractor;
use crate::staging::Staging;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub staging: Staging,
    pub pipeline: Arc<ConversionPipeline>,
    pub extractor: Arc<TextExtractor>,
}

impl AppState {
    /// Wire the staging area, converters and extractor from configuration.
    pub fn from_config(config: Config) -> Self {
        let staging = Staging::from_config(&config.storage);
        let pipeline = ConversionPipeline::from_config(&config.converters);
        let extractor = TextExtractor::new(config.ocr.clone(), config.converters.timeout());

        Self {
            config: Arc::new(config),
            staging,
            pipeline: Arc::new(pipeline),
            extractor: Arc::new(extractor),
        }
    }
}

/// A file received in the `file` multipart field.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

/// An upload written to its per-request staging directory.
#[derive(Debug, Clone)]
pub struct StagedUpload {
    pub id: Uuid,
    pub original_filename: String,
    /// Filename after sanitizing, used on disk.
    pub filename: String,
    pub input_dir: PathBuf,
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub output_path: PathBuf,
    /// Name offered to the client in `Content-Disposition`.
    pub download_name: String,
}

impl StagedUpload {
    /// Where the secondary converter writes in sibling mode.
    pub fn sibling_output_path(&self) -> PathBuf {
        let stem = self
            .download_name
            .strip_suffix(".docx")
            .unwrap_or(&self.download_name);
        self.output_dir.join(format!("{}.pandoc.docx", stem))
    }

    /// Directory for intermediate page images of the OCR pass.
    pub fn pages_dir(&self) -> PathBuf {
        self.output_dir.join("pages")
    }
}

/// Result of the optional secondary pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SecondaryOutcome {
    Skipped,
    Succeeded { path: PathBuf },
    Failed { message: String },
}

impl SecondaryOutcome {
    /// Value of the `X-Secondary-Pass` response header.
    pub fn label(&self) -> &'static str {
        match self {
            SecondaryOutcome::Skipped => "skipped",
            SecondaryOutcome::Succeeded { .. } => "succeeded",
            SecondaryOutcome::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub conversion_id: Uuid,
    pub primary: String,
    pub output_path: PathBuf,
    pub secondary: SecondaryOutcome,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub tools: Vec<ToolStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolStatus {
    pub name: String,
    pub program: String,
    pub available: bool,
}
