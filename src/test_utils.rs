//! Shared fixtures for unit tests: stand-in converters and a test app.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use tempfile::TempDir;

use crate::config::Config;
use crate::converter::{ConversionPipeline, Converter};
use crate::models::AppState;
use crate::ocr::TextExtractor;
use crate::staging::Staging;
use crate::types::ConvertError;

/// Writes the input bytes unchanged to the output path.
pub struct CopyConverter;

#[async_trait]
impl Converter for CopyConverter {
    fn name(&self) -> &str {
        "copy"
    }

    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        tokio::fs::copy(input, output).await?;
        Ok(())
    }
}

/// Writes fixed bytes to the output path.
pub struct StampConverter {
    content: &'static [u8],
}

impl StampConverter {
    pub fn new(content: &'static [u8]) -> Self {
        Self { content }
    }
}

#[async_trait]
impl Converter for StampConverter {
    fn name(&self) -> &str {
        "stamp"
    }

    async fn convert(&self, _input: &Path, output: &Path) -> Result<(), ConvertError> {
        tokio::fs::write(output, self.content).await?;
        Ok(())
    }
}

/// Always fails the way a tool rejecting its input does.
pub struct FailingConverter {
    stderr: String,
}

impl FailingConverter {
    pub fn new(stderr: impl Into<String>) -> Self {
        Self {
            stderr: stderr.into(),
        }
    }
}

#[async_trait]
impl Converter for FailingConverter {
    fn name(&self) -> &str {
        "failing"
    }

    async fn convert(&self, _input: &Path, _output: &Path) -> Result<(), ConvertError> {
        Err(ConvertError::Failed {
            tool: "failing".to_string(),
            code: Some(1),
            stderr: self.stderr.clone(),
        })
    }
}

/// Config rooted in `temp_dir`, with extra variables layered on top.
pub fn create_test_config(temp_dir: &TempDir, vars: &[(&str, &str)]) -> Config {
    let upload_dir = temp_dir.path().join("uploads").to_string_lossy().into_owned();
    let output_dir = temp_dir.path().join("output").to_string_lossy().into_owned();

    Config::from_lookup(|key| {
        if let Some((_, value)) = vars.iter().find(|(k, _)| *k == key) {
            return Some(value.to_string());
        }
        match key {
            "UPLOAD_DIR" => Some(upload_dir.clone()),
            "OUTPUT_DIR" => Some(output_dir.clone()),
            _ => None,
        }
    })
    .expect("test config should be valid")
}

/// App state using `pipeline` instead of the real tools.
pub async fn create_test_state(config: Config, pipeline: ConversionPipeline) -> AppState {
    let staging = Staging::from_config(&config.storage);
    staging.ensure_dirs().await.expect("failed to create staging dirs");
    let extractor = TextExtractor::new(config.ocr.clone(), None);

    AppState {
        config: Arc::new(config),
        staging,
        pipeline: Arc::new(pipeline),
        extractor: Arc::new(extractor),
    }
}

pub fn create_test_server(state: AppState) -> TestServer {
    TestServer::new(crate::routes::create_router(state)).unwrap()
}

/// Number of entries directly under `dir`.
pub fn entry_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

// Shell stand-ins for the external tools. Each one that takes paths records
// its arguments, one per line, in `<script>.args`.

/// Writes an empty but valid zip archive, which is what a DOCX is.
#[cfg(unix)]
pub const FAKE_PDF2DOCX: &str = r#"printf '%s\n' "$@" > "$0.args"
{ printf 'PK\005\006'; head -c 18 /dev/zero; } > "$3""#;

#[cfg(unix)]
pub const FAKE_PANDOC: &str = r#"printf '%s\n' "$@" > "$0.args"
printf 'pandoc output' > "$3""#;

/// Writes three pages, deliberately out of order.
#[cfg(unix)]
pub const FAKE_PDFTOPPM: &str = r#"printf '%s\n' "$@" > "$0.args"
: > "$5-10.png"
: > "$5-2.png"
: > "$5-1.png""#;

#[cfg(unix)]
pub const FAKE_TESSERACT: &str = r#"printf 'text of %s' "$(basename "$1" .png)""#;

#[cfg(unix)]
pub const FAKE_PDFTOTEXT: &str = r#"printf '%s\n' "$@" > "$0.args"
printf 'first\n\014second\n\014'"#;

/// Write an executable `/bin/sh` script named `name` into `dir`.
#[cfg(unix)]
pub fn write_tool_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("failed to write tool script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("failed to make tool script executable");
    path
}

/// Arguments the last run of `script` recorded.
#[cfg(unix)]
pub fn recorded_args(script: &Path) -> Vec<String> {
    let mut path = script.as_os_str().to_owned();
    path.push(".args");
    std::fs::read_to_string(PathBuf::from(path))
        .expect("tool script did not record its arguments")
        .lines()
        .map(str::to_string)
        .collect()
}
