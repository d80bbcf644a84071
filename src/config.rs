use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub converters: ConverterConfig,
    pub ocr: OcrConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub max_upload_bytes: usize,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Keep staged inputs and converted outputs after the response is built.
    pub keep_artifacts: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConverterConfig {
    pub pdf2docx_bin: String,
    pub pandoc_bin: String,
    pub secondary_mode: SecondaryMode,
    pub secondary_policy: SecondaryPolicy,
    /// No timeout when unset; a hung tool then blocks its request.
    pub timeout_secs: Option<u64>,
}

impl ConverterConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    pub enabled: bool,
    pub tesseract_bin: String,
    pub pdftoppm_bin: String,
    pub pdftotext_bin: String,
    pub dpi: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: Option<PathBuf>,
}

/// What the secondary (pandoc) pass does with its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondaryMode {
    /// Only the primary converter runs.
    Disabled,
    /// The secondary output replaces the primary output.
    Overwrite,
    /// The secondary output is written next to the primary output.
    Sibling,
}

impl FromStr for SecondaryMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disabled" | "off" | "none" => Ok(SecondaryMode::Disabled),
            "overwrite" => Ok(SecondaryMode::Overwrite),
            "sibling" => Ok(SecondaryMode::Sibling),
            other => Err(anyhow!(
                "unknown secondary mode '{}' (expected disabled, overwrite or sibling)",
                other
            )),
        }
    }
}

impl std::fmt::Display for SecondaryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecondaryMode::Disabled => write!(f, "disabled"),
            SecondaryMode::Overwrite => write!(f, "overwrite"),
            SecondaryMode::Sibling => write!(f, "sibling"),
        }
    }
}

/// How a failing secondary pass affects the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondaryPolicy {
    /// Report the failure and still serve the primary output.
    BestEffort,
    /// Fail the whole request.
    Required,
}

impl FromStr for SecondaryPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "best_effort" => Ok(SecondaryPolicy::BestEffort),
            "required" => Ok(SecondaryPolicy::Required),
            other => Err(anyhow!(
                "unknown secondary policy '{}' (expected best_effort or required)",
                other
            )),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. `from_env` is a thin
    /// wrapper over this so tests don't have to touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let timeout_secs: Option<u64> = lookup("CONVERTER_TIMEOUT_SECS")
            .map(|v| parse_var("CONVERTER_TIMEOUT_SECS", &v))
            .transpose()?;
        if timeout_secs == Some(0) {
            bail!("CONVERTER_TIMEOUT_SECS must be greater than 0 (unset it to disable the timeout)");
        }

        Ok(Self {
            server: ServerConfig {
                port: parse_var("PORT", &var("PORT", "5000"))?,
                host: var("HOST", "0.0.0.0"),
                max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", &var("MAX_UPLOAD_BYTES", "52428800"))?,
                cors_allowed_origins: var("ALLOWED_ORIGINS", "*")
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            storage: StorageConfig {
                upload_dir: PathBuf::from(var("UPLOAD_DIR", "uploads")),
                output_dir: PathBuf::from(var("OUTPUT_DIR", "output")),
                keep_artifacts: parse_var("KEEP_ARTIFACTS", &var("KEEP_ARTIFACTS", "true"))?,
            },
            converters: ConverterConfig {
                pdf2docx_bin: var("PDF2DOCX_BIN", "pdf2docx"),
                pandoc_bin: var("PANDOC_BIN", "pandoc"),
                secondary_mode: var("SECONDARY_MODE", "disabled").parse()?,
                secondary_policy: var("SECONDARY_POLICY", "best_effort").parse()?,
                timeout_secs,
            },
            ocr: OcrConfig {
                enabled: parse_var("OCR_ENABLED", &var("OCR_ENABLED", "true"))?,
                tesseract_bin: var("TESSERACT_BIN", "tesseract"),
                pdftoppm_bin: var("PDFTOPPM_BIN", "pdftoppm"),
                pdftotext_bin: var("PDFTOTEXT_BIN", "pdftotext"),
                dpi: parse_var("OCR_DPI", &var("OCR_DPI", "150"))?,
            },
            logging: LoggingConfig {
                log_dir: lookup("LOG_DIR").map(PathBuf::from),
            },
        })
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("invalid value for {}: '{}'", key, value))
}
