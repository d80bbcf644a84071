//! PDF → DOCX converters
//!
//! The actual conversion is done by external programs. This module wraps
//! them behind the [`Converter`] trait and chains them in
//! [`ConversionPipeline`]:
//!
//! - [`Pdf2DocxConverter`] - primary, layout-aware (`pdf2docx convert`)
//! - [`PandocConverter`] - optional secondary pass (`pandoc -o`)

pub mod pandoc;
pub mod pdf2docx;
pub mod pipeline;
pub mod process;

pub use pandoc::PandocConverter;
pub use pdf2docx::Pdf2DocxConverter;
pub use pipeline::ConversionPipeline;
pub use process::{run_tool, ToolOutput};

use std::path::Path;

use async_trait::async_trait;

use crate::types::ConvertError;

#[async_trait]
pub trait Converter: Send + Sync {
    /// Short tool name used in logs and reports.
    fn name(&self) -> &str;

    /// Convert `input` and write the result to `output`.
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError>;
}

/// A tool can exit 0 without writing anything; treat that as a failure.
pub(crate) async fn ensure_output(tool: &str, path: &Path) -> Result<(), ConvertError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(ConvertError::MissingOutput {
            tool: tool.to_string(),
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ConvertError::MissingOutput {
            tool: tool.to_string(),
            path: path.to_path_buf(),
        }),
        Err(e) => Err(ConvertError::Io(e)),
    }
}
