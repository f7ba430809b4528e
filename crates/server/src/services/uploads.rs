//! Uploaded image storage.
//!
//! Files are written to the uploads directory as `<millis>-<sanitized name>`
//! and exposed under [`UPLOADS_PREFIX`]. Removal is fire-and-forget: it runs
//! on a detached task and never reports failure to the caller.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::io::AsyncWriteExt;

use catalog_core::UPLOADS_PREFIX;

/// Attempts at finding a free file name before giving up.
const MAX_NAME_ATTEMPTS: u32 = 16;

/// Error writing an uploaded file.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not find a free file name for {0:?}")]
    NameExhausted(String),
}

/// Image storage rooted at the uploads directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Use `dir` for uploads, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Io` if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, UploadError> {
        let dir = dir.into();
        if !tokio::fs::try_exists(&dir).await.unwrap_or(false) {
            tokio::fs::create_dir_all(&dir).await?;
            tracing::info!(dir = %dir.display(), "Created uploads directory");
        }
        Ok(Self { dir })
    }

    /// Uploads directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write an uploaded file and return its web path (`/uploads/<name>`).
    ///
    /// # Errors
    ///
    /// Returns `UploadError` if the file cannot be written.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, UploadError> {
        let millis = chrono::Utc::now().timestamp_millis();
        let sanitized = sanitize_file_name(original_name);

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let file_name = if attempt == 0 {
                format!("{millis}-{sanitized}")
            } else {
                format!("{millis}-{attempt}-{sanitized}")
            };
            let path = self.dir.join(&file_name);

            let mut file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };
            file.write_all(bytes).await?;
            file.flush().await?;

            tracing::debug!(file = %file_name, size = bytes.len(), "Stored upload");
            return Ok(format!("{UPLOADS_PREFIX}{file_name}"));
        }

        Err(UploadError::NameExhausted(sanitized))
    }

    /// Filesystem path for a web path under `/uploads/`.
    ///
    /// Returns `None` for other URLs and for names that could escape the
    /// uploads directory.
    #[must_use]
    pub fn path_for(&self, image_url: &str) -> Option<PathBuf> {
        let name = image_url.strip_prefix(UPLOADS_PREFIX)?;
        let is_plain_name = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\']);
        is_plain_name.then(|| self.dir.join(name))
    }

    /// Delete an uploaded file in the background, ignoring any failure.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn remove_detached(&self, image_url: &str) {
        let Some(path) = self.path_for(image_url) else {
            return;
        };
        tokio::spawn(async move {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => tracing::debug!(path = %path.display(), "Removed stale upload"),
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "Ignoring upload cleanup failure");
                }
            }
        });
    }
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
#[must_use]
pub fn sanitize_file_name(original: &str) -> String {
    let sanitized: String = original
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() {
        "upload".to_string()
    } else {
        sanitized
    }
}
