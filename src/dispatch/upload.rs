//! Multipart upload intake
//!
//! Spools the `file` part to a uniquely named file under the upload
//! directory and collects the optional `targetSizeKB` field.

use multer::{Field, Multipart};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;

use super::error::DispatchError;
use super::kind::HandlerKind;
use crate::config::CompressionConfig;

pub const FILE_FIELD: &str = "file";
pub const TARGET_SIZE_FIELD: &str = "targetSizeKB";

/// Where the uploaded bytes live while the request is in flight
#[derive(Debug)]
enum StoredFile {
    /// Removed from disk when dropped
    Scoped(TempPath),
    Kept(PathBuf),
}

/// One parsed upload
#[derive(Debug)]
pub struct UploadRequest {
    stored: StoredFile,
    pub original_name: String,
    /// Passed to the handler verbatim
    pub target_size: String,
}

impl UploadRequest {
    /// Filesystem path of the stored upload
    pub fn path(&self) -> &Path {
        match &self.stored {
            StoredFile::Scoped(temp) => temp.as_ref(),
            StoredFile::Kept(path) => path.as_path(),
        }
    }

    /// Lowercased extension of the original filename
    pub fn extension(&self) -> Option<String> {
        super::kind::file_extension(&self.original_name)
    }

    /// Handler chosen by the original filename, `None` when unsupported
    pub fn handler_kind(&self) -> Option<HandlerKind> {
        HandlerKind::from_filename(&self.original_name)
    }
}

/// Read a multipart body into an [`UploadRequest`]
///
/// A `file` part without a filename (or with an empty one) is ignored, as
/// browsers send that for an empty file input. A second file part, or a file
/// under any other field name, is rejected.
pub async fn read_upload(
    mut multipart: Multipart<'_>,
    config: &CompressionConfig,
) -> Result<UploadRequest, DispatchError> {
    let mut file: Option<(TempPath, String)> = None;
    let mut target_size: Option<String> = None;

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field
            .file_name()
            .filter(|n| !n.is_empty())
            .map(ToString::to_string);

        match (name.as_str(), file_name) {
            (FILE_FIELD, Some(original)) if file.is_none() => {
                let temp = spool_to_disk(&mut field, Path::new(&config.upload_dir)).await?;
                file = Some((temp, original));
            }
            (_, Some(_)) => return Err(DispatchError::UnexpectedField(name)),
            (TARGET_SIZE_FIELD, None) => target_size = Some(field.text().await?),
            // Unknown text fields are skipped
            _ => {}
        }
    }

    let (temp, original_name) = file.ok_or(DispatchError::NoFile)?;
    let stored = if config.keep_uploads {
        StoredFile::Kept(temp.keep().map_err(|e| DispatchError::Storage(e.error))?)
    } else {
        StoredFile::Scoped(temp)
    };

    Ok(UploadRequest {
        stored,
        original_name,
        target_size: target_size
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| config.default_target_size_kb.clone()),
    })
}

async fn spool_to_disk(field: &mut Field<'_>, dir: &Path) -> Result<TempPath, DispatchError> {
    let temp = create_temp_in(dir.to_path_buf()).await?;

    let mut out = tokio::fs::OpenOptions::new().write(true).open(&temp).await?;
    while let Some(chunk) = field.chunk().await? {
        out.write_all(&chunk).await?;
    }
    out.flush().await?;
    Ok(temp)
}

/// Create a uniquely named empty file under `dir` on the blocking pool
async fn create_temp_in(dir: PathBuf) -> io::Result<TempPath> {
    tokio::task::spawn_blocking(move || -> io::Result<TempPath> {
        std::fs::create_dir_all(&dir)?;
        let file = tempfile::Builder::new().prefix("upload-").tempfile_in(&dir)?;
        Ok(file.into_temp_path())
    })
    .await
    .map_err(io::Error::other)?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{multipart, FormBody};

    fn test_config(dir: &Path) -> CompressionConfig {
        CompressionConfig {
            upload_dir: dir.to_string_lossy().into_owned(),
            ..CompressionConfig::default()
        }
    }

    #[tokio::test]
    async fn test_reads_file_and_target_size() {
        let dir = tempfile::tempdir().unwrap();
        let body = FormBody::new()
            .text("targetSizeKB", "250")
            .file("file", "holiday.PNG", b"\x89PNG fake")
            .finish();

        let upload = read_upload(multipart(body), &test_config(dir.path()))
            .await
            .unwrap();

        assert_eq!(upload.original_name, "holiday.PNG");
        assert_eq!(upload.extension().as_deref(), Some("png"));
        assert_eq!(upload.handler_kind(), Some(HandlerKind::Image));
        assert_eq!(upload.target_size, "250");
        assert!(upload.path().starts_with(dir.path()));
        assert_eq!(std::fs::read(upload.path()).unwrap(), b"\x89PNG fake");
    }

    #[tokio::test]
    async fn test_default_target_size() {
        let dir = tempfile::tempdir().unwrap();
        let body = FormBody::new()
            .file("file", "a.pdf", b"%PDF-1.7")
            .text("targetSizeKB", "")
            .finish();

        let upload = read_upload(multipart(body), &test_config(dir.path()))
            .await
            .unwrap();
        assert_eq!(upload.target_size, "500");
    }

    #[tokio::test]
    async fn test_target_size_passed_through_unvalidated() {
        let dir = tempfile::tempdir().unwrap();
        let body = FormBody::new()
            .file("file", "a.pdf", b"%PDF-1.7")
            .text("targetSizeKB", "-12.5kb")
            .finish();

        let upload = read_upload(multipart(body), &test_config(dir.path()))
            .await
            .unwrap();
        assert_eq!(upload.target_size, "-12.5kb");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let body = FormBody::new().text("targetSizeKB", "100").finish();

        let result = read_upload(multipart(body), &test_config(dir.path())).await;
        assert!(matches!(result, Err(DispatchError::NoFile)));
    }

    #[tokio::test]
    async fn test_empty_file_input_counts_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let body = FormBody::new().file("file", "", b"").finish();

        let result = read_upload(multipart(body), &test_config(dir.path())).await;
        assert!(matches!(result, Err(DispatchError::NoFile)));
    }

    #[tokio::test]
    async fn test_second_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let body = FormBody::new()
            .file("file", "a.png", b"one")
            .file("file", "b.png", b"two")
            .finish();

        let result = read_upload(multipart(body), &test_config(dir.path())).await;
        assert!(matches!(result, Err(DispatchError::UnexpectedField(name)) if name == "file"));
    }

    #[tokio::test]
    async fn test_file_under_other_name_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let body = FormBody::new().file("attachment", "a.png", b"one").finish();

        let result = read_upload(multipart(body), &test_config(dir.path())).await;
        assert!(
            matches!(result, Err(DispatchError::UnexpectedField(name)) if name == "attachment")
        );
    }

    #[tokio::test]
    async fn test_temp_file_created_in_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");

        let temp = create_temp_in(nested.clone()).await.unwrap();
        assert!(temp.starts_with(&nested));
        assert!(temp
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("upload-"));
        assert_eq!(std::fs::metadata(&temp).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_upload_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let body = FormBody::new().file("file", "a.png", b"bytes").finish();

        let upload = read_upload(multipart(body), &test_config(dir.path()))
            .await
            .unwrap();
        let path = upload.path().to_path_buf();
        assert!(path.exists());

        drop(upload);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_keep_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let config = CompressionConfig {
            keep_uploads: true,
            ..test_config(dir.path())
        };
        let body = FormBody::new().file("file", "a.png", b"bytes").finish();

        let upload = read_upload(multipart(body), &config).await.unwrap();
        let path = upload.path().to_path_buf();

        drop(upload);
        assert!(path.exists());
    }
}
