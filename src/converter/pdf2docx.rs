use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use super::{ensure_output, run_tool, Converter};
use crate::types::ConvertError;

/// Layout-aware conversion through the `pdf2docx` command line tool.
#[derive(Debug, Clone)]
pub struct Pdf2DocxConverter {
    program: String,
    timeout: Option<Duration>,
}

impl Pdf2DocxConverter {
    pub fn new(program: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

#[async_trait]
impl Converter for Pdf2DocxConverter {
    fn name(&self) -> &str {
        "pdf2docx"
    }

    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        let args = [OsStr::new("convert"), input.as_os_str(), output.as_os_str()];
        let result = run_tool(&self.program, &args, self.timeout).await?;
        ensure_output(&self.program, output).await?;

        info!(
            input = %input.display(),
            output = %output.display(),
            duration_ms = result.duration_ms,
            "pdf2docx conversion finished"
        );
        Ok(())
    }
}
