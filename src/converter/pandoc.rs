use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use super::{ensure_output, run_tool, Converter};
use crate::types::ConvertError;

/// General-purpose conversion through `pandoc <input> -o <output>`.
#[derive(Debug, Clone)]
pub struct PandocConverter {
    program: String,
    timeout: Option<Duration>,
}

impl PandocConverter {
    pub fn new(program: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

#[async_trait]
impl Converter for PandocConverter {
    fn name(&self) -> &str {
        "pandoc"
    }

    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        let args = [input.as_os_str(), OsStr::new("-o"), output.as_os_str()];
        let result = run_tool(&self.program, &args, self.timeout).await?;
        ensure_output(&self.program, output).await?;

        info!(
            input = %input.display(),
            output = %output.display(),
            duration_ms = result.duration_ms,
            "pandoc conversion finished"
        );
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::test_utils::{recorded_args, write_tool_script, FAKE_PANDOC};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_converts_with_expected_arguments() {
        let temp_dir = TempDir::new().unwrap();
        let tool = write_tool_script(temp_dir.path(), "pandoc", FAKE_PANDOC);
        let input = temp_dir.path().join("in.pdf");
        let output = temp_dir.path().join("out.docx");
        let converter = PandocConverter::new(tool.to_string_lossy(), None);

        converter.convert(&input, &output).await.unwrap();

        assert_eq!(
            recorded_args(&tool),
            [input.to_str().unwrap(), "-o", output.to_str().unwrap()]
        );
        assert_eq!(std::fs::read(&output).unwrap(), b"pandoc output");
    }

    #[tokio::test]
    async fn test_failing_tool_reports_exit_status() {
        // `false` ignores its arguments and exits 1.
        let temp_dir = TempDir::new().unwrap();
        let converter = PandocConverter::new("false", None);

        let err = converter
            .convert(&temp_dir.path().join("in.pdf"), &temp_dir.path().join("out.docx"))
            .await
            .unwrap_err();

        match err {
            ConvertError::Failed { tool, code, .. } => {
                assert_eq!(tool, "false");
                assert_eq!(code, Some(1));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
