//! Text extraction
//!
//! Two ways to get text out of a PDF, both backed by external tools:
//!
//! - direct extraction of the embedded text layer with `pdftotext`
//! - an OCR pass for scanned documents: `pdftoppm` rasterizes every page to
//!   PNG, then `tesseract` reads each page image in page order

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info};

use crate::config::OcrConfig;
use crate::converter::run_tool;
use crate::types::ConvertError;

const PAGE_PREFIX: &str = "page";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractMode {
    #[default]
    Text,
    Ocr,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractedText {
    pub text: String,
    pub pages: usize,
}

#[derive(Debug, Clone)]
pub struct TextExtractor {
    config: OcrConfig,
    timeout: Option<Duration>,
}

impl TextExtractor {
    pub fn new(config: OcrConfig, timeout: Option<Duration>) -> Self {
        Self { config, timeout }
    }

    pub fn ocr_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Programs this extractor calls, as `(name, program)` pairs.
    pub fn tools(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("pdftotext", self.config.pdftotext_bin.as_str()),
            ("pdftoppm", self.config.pdftoppm_bin.as_str()),
            ("tesseract", self.config.tesseract_bin.as_str()),
        ]
    }

    /// Read the embedded text layer. Pages are separated by newlines.
    pub async fn extract_text(&self, pdf: &Path) -> Result<ExtractedText, ConvertError> {
        let args = [Path::new("-layout"), pdf, Path::new("-")];
        let output = run_tool(&self.config.pdftotext_bin, &args, self.timeout).await?;

        let extracted = text_layer(&output.stdout);

        info!(
            pdf = %pdf.display(),
            pages = extracted.pages,
            chars = extracted.text.len(),
            "Extracted text layer"
        );
        Ok(extracted)
    }

    /// Rasterize each page into `pages_dir` and OCR the images in order.
    ///
    /// The page images are left in `pages_dir`.
    pub async fn extract_text_with_ocr(
        &self,
        pdf: &Path,
        pages_dir: &Path,
    ) -> Result<ExtractedText, ConvertError> {
        fs::create_dir_all(pages_dir).await?;

        let dpi = self.config.dpi.to_string();
        let prefix = pages_dir.join(PAGE_PREFIX);
        let args = [
            Path::new("-png"),
            Path::new("-r"),
            Path::new(&dpi),
            pdf,
            prefix.as_path(),
        ];
        run_tool(&self.config.pdftoppm_bin, &args, self.timeout).await?;

        let images = page_images(pages_dir).await?;
        debug!(pdf = %pdf.display(), pages = images.len(), "Pages rasterized");

        let mut extracted = String::new();
        for image in &images {
            let args = [image.as_path(), Path::new("stdout")];
            let output = run_tool(&self.config.tesseract_bin, &args, self.timeout).await?;
            extracted.push_str(&output.stdout);
            extracted.push('\n');
        }

        let text = extracted.trim().to_string();
        info!(pdf = %pdf.display(), pages = images.len(), chars = text.len(), "OCR pass finished");
        Ok(ExtractedText {
            text,
            pages: images.len(),
        })
    }
}

// pdftotext ends every page with a form feed.
fn text_layer(stdout: &str) -> ExtractedText {
    ExtractedText {
        text: stdout.replace('\x0c', "\n").trim().to_string(),
        pages: stdout.matches('\x0c').count(),
    }
}

/// PNGs written by `pdftoppm`, sorted by page number.
///
/// `pdftoppm` zero-pads page numbers to the width of the page count
/// (`page-1.png` or `page-01.png`), so sort numerically rather than by name.
async fn page_images(dir: &Path) -> Result<Vec<PathBuf>, ConvertError> {
    let mut pages = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if let Some(number) = page_number(&path) {
            pages.push((number, path));
        }
    }
    pages.sort_by_key(|(number, _)| *number);
    Ok(pages.into_iter().map(|(_, path)| path).collect())
}

fn page_number(path: &Path) -> Option<u32> {
    if path.extension()?.to_str()? != "png" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let number = stem.strip_prefix(PAGE_PREFIX)?.strip_prefix('-')?;
    number.parse().ok()
}
