//! Staging area for uploads and converted artifacts
//!
//! Every request gets its own directory under both roots, named by a fresh
//! UUID, so two uploads with the same filename never share a path:
//!
//! ```text
//! uploads/<uuid>/<sanitized name>
//! output/<uuid>/<stem>.docx
//! output/<uuid>/<stem>.pandoc.docx   (secondary pass, sibling mode)
//! output/<uuid>/pages/page-N.png     (OCR pass)
//! ```

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::models::{StagedUpload, UploadedFile};

const FALLBACK_FILENAME: &str = "upload";

#[derive(Debug, Clone)]
pub struct Staging {
    upload_dir: PathBuf,
    output_dir: PathBuf,
}

impl Staging {
    pub fn new(upload_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.upload_dir, &config.output_dir)
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create both roots if they are missing.
    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.upload_dir).await?;
        fs::create_dir_all(&self.output_dir).await?;
        info!(
            upload_dir = %self.upload_dir.display(),
            output_dir = %self.output_dir.display(),
            "Staging directories ready"
        );
        Ok(())
    }

    /// Write the upload verbatim to a fresh per-request directory.
    ///
    /// On failure nothing created for this request is left behind.
    pub async fn stage(&self, upload: &UploadedFile) -> std::io::Result<StagedUpload> {
        let id = Uuid::new_v4();
        let filename = sanitize_filename(&upload.filename);
        let download_name = docx_name(&filename);

        let input_dir = self.upload_dir.join(id.to_string());
        let output_dir = self.output_dir.join(id.to_string());
        let input_path = input_dir.join(&filename);

        if let Err(e) = write_staged(&input_dir, &output_dir, &input_path, &upload.bytes).await {
            warn!(conversion_id = %id, error = %e, "Failed to stage upload");
            remove_dirs(id, [&input_dir, &output_dir]).await;
            return Err(e);
        }

        debug!(
            conversion_id = %id,
            original = %upload.filename,
            path = %input_path.display(),
            size = upload.bytes.len(),
            "Upload staged"
        );

        Ok(StagedUpload {
            id,
            original_filename: upload.filename.clone(),
            output_path: output_dir.join(&download_name),
            filename,
            input_dir,
            input_path,
            output_dir,
            download_name,
        })
    }

    /// Remove everything a request wrote. Failures are logged, not returned.
    pub async fn discard(&self, staged: &StagedUpload) {
        remove_dirs(staged.id, [&staged.input_dir, &staged.output_dir]).await;
    }
}

async fn write_staged(input_dir: &Path, output_dir: &Path, input_path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    fs::create_dir_all(input_dir).await?;
    fs::create_dir_all(output_dir).await?;
    fs::write(input_path, bytes).await
}

async fn remove_dirs(id: Uuid, dirs: [&PathBuf; 2]) {
    for dir in dirs {
        if let Err(e) = fs::remove_dir_all(dir).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    conversion_id = %id,
                    path = %dir.display(),
                    error = %e,
                    "Failed to remove staged files"
                );
            }
        }
    }
}

/// Reduce a client-supplied filename to a single safe path component.
///
/// Directory parts are dropped, characters outside `[A-Za-z0-9._-]` become
/// `_`, and leading dots are stripped so the result can't be `..` or hidden.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// `report.pdf` -> `report.docx`
pub fn docx_name(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK_FILENAME);
    format!("{}.docx", stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use tempfile::TempDir;

    fn upload(name: &str, content: &'static [u8]) -> UploadedFile {
        UploadedFile {
            filename: name.to_string(),
            bytes: Bytes::from_static(content),
        }
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("sample.pdf"), "sample.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\docs\\q3 report.pdf"), "q3_report.pdf");
        assert_eq!(sanitize_filename(".."), "upload");
        assert_eq!(sanitize_filename(".hidden.pdf"), "hidden.pdf");
        assert_eq!(sanitize_filename("dir/"), "upload");
    }

    #[test]
    fn test_docx_name() {
        assert_eq!(docx_name("sample.pdf"), "sample.docx");
        assert_eq!(docx_name("notes.txt"), "notes.docx");
        assert_eq!(docx_name("archive.tar.gz"), "archive.tar.docx");
        assert_eq!(docx_name("upload"), "upload.docx");
    }

    #[tokio::test]
    async fn test_stage_writes_bytes_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let staging = Staging::new(temp_dir.path().join("uploads"), temp_dir.path().join("output"));
        staging.ensure_dirs().await.unwrap();

        let staged = staging.stage(&upload("sample.pdf", b"%PDF-1.4 body")).await.unwrap();

        assert_eq!(staged.filename, "sample.pdf");
        assert_eq!(staged.download_name, "sample.docx");
        assert!(staged.input_path.starts_with(staging.upload_dir()));
        assert!(staged.output_path.starts_with(staging.output_dir()));
        assert_eq!(staged.output_path.file_name().unwrap(), "sample.docx");
        assert_eq!(
            staged.sibling_output_path().file_name().unwrap(),
            "sample.pandoc.docx"
        );
        assert_eq!(fs::read(&staged.input_path).await.unwrap(), b"%PDF-1.4 body");
        assert!(staged.output_dir.is_dir());
    }

    #[tokio::test]
    async fn test_same_filename_gets_distinct_paths() {
        let temp_dir = TempDir::new().unwrap();
        let staging = Staging::new(temp_dir.path().join("uploads"), temp_dir.path().join("output"));

        let first = upload("sample.pdf", b"first");
        let second = upload("sample.pdf", b"second");
        let (a, b) = tokio::join!(staging.stage(&first), staging.stage(&second));
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_ne!(a.id, b.id);
        assert_ne!(a.input_path, b.input_path);
        assert_ne!(a.output_path, b.output_path);
        assert_eq!(fs::read(&a.input_path).await.unwrap(), b"first");
        assert_eq!(fs::read(&b.input_path).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_failed_stage_leaves_nothing_behind() {
        let temp_dir = TempDir::new().unwrap();
        let upload_root = temp_dir.path().join("uploads");
        // A regular file where the output root should be makes the second
        // directory creation fail after the input directory exists.
        let output_root = temp_dir.path().join("output");
        fs::write(&output_root, b"not a directory").await.unwrap();
        let staging = Staging::new(&upload_root, &output_root);
        fs::create_dir_all(&upload_root).await.unwrap();

        let result = staging.stage(&upload("sample.pdf", b"data")).await;

        assert!(result.is_err());
        assert_eq!(std::fs::read_dir(&upload_root).unwrap().count(), 0);
        assert!(output_root.is_file());
    }

    #[tokio::test]
    async fn test_discard_removes_request_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let staging = Staging::new(temp_dir.path().join("uploads"), temp_dir.path().join("output"));

        let staged = staging.stage(&upload("sample.pdf", b"data")).await.unwrap();
        fs::write(&staged.output_path, b"docx").await.unwrap();

        staging.discard(&staged).await;

        assert!(!staged.input_dir.exists());
        assert!(!staged.output_dir.exists());
        // Second discard is a no-op.
        staging.discard(&staged).await;
    }
}
