//! Blob storage for generated artifacts such as registration reports.
//!
//! Paths handed to a [`BlobStore`] are relative and `/`-separated. A store
//! never overwrites: when the requested name is taken it saves under the
//! first free `name_N.ext` and returns the path it actually used.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

/// Upper bound on suffixed names tried before giving up.
const MAX_NAME_ATTEMPTS: u32 = 1000;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("No free file name for {0}")]
    NameExhausted(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Persists bytes under a relative path.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Save `bytes` at `path` (or a free variant of it) and return the
    /// relative path that was written.
    async fn save(&self, path: &str, bytes: &[u8]) -> Result<String, StorageError>;
}

// ---------------------------------------------------------------------------
// LocalBlobStore
// ---------------------------------------------------------------------------

/// Stores blobs as files below a root directory.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Reject absolute paths and any `..` or root component.
fn validate_relative(path: &str) -> Result<(), StorageError> {
    let candidate = Path::new(path);
    let valid = !path.is_empty()
        && candidate
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidPath(path.to_string()))
    }
}

/// `reports/a.csv`, attempt 2 -> `reports/a_2.csv`.
fn suffixed(path: &str, attempt: u32) -> String {
    if attempt == 0 {
        return path.to_string();
    }
    let (dir, file) = match path.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, path),
    };
    let file = match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{attempt}.{ext}"),
        _ => format!("{file}_{attempt}"),
    };
    match dir {
        Some(dir) => format!("{dir}/{file}"),
        None => file,
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn save(&self, path: &str, bytes: &[u8]) -> Result<String, StorageError> {
        use tokio::io::AsyncWriteExt;

        validate_relative(path)?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let relative = suffixed(path, attempt);
            let full = self.root.join(&relative);
            if let Some(parent) = full.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            // create_new makes the existence check and the create one step.
            let opened = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&full)
                .await;
            let mut file = match opened {
                Ok(file) => file,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };

            file.write_all(bytes).await?;
            file.flush().await?;

            tracing::debug!(path = %relative, size = bytes.len(), "Blob saved");
            return Ok(relative);
        }

        Err(StorageError::NameExhausted(path.to_string()))
    }
}
