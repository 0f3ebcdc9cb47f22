//! Disk-backed upload storage
//!
//! Files land in `<root>/<folder>/<millis>-<random>.<ext>` and are addressed
//! by clients as `<public_path>/<folder>/<name>`.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error};

use magang_core::domain::UploadKind;
use magang_core::error::DomainError;
use magang_core::repositories::FileStorage;

pub struct LocalFileStorage {
    root: PathBuf,
    public_path: String,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>, public_path: &str) -> Self {
        Self {
            root: root.into(),
            public_path: public_path.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a public reference back onto disk, refusing anything outside the root.
    fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let relative = reference.strip_prefix(&self.public_path)?.trim_start_matches('/');
        let relative = Path::new(relative);
        if relative.as_os_str().is_empty()
            || !relative.components().all(|c| matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(relative))
    }
}

fn storage_error(context: &str, e: std::io::Error) -> DomainError {
    error!("Storage error {}: {}", context, e);
    DomainError::StorageError(e.to_string())
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn store(&self, kind: UploadKind, extension: &str, bytes: Vec<u8>) -> Result<String, DomainError> {
        let folder = self.root.join(kind.folder());
        tokio::fs::create_dir_all(&folder)
            .await
            .map_err(|e| storage_error("creating upload folder", e))?;

        let name = format!("{}-{:08x}.{}", Utc::now().timestamp_millis(), rand::random::<u32>(), extension);
        tokio::fs::write(folder.join(&name), bytes)
            .await
            .map_err(|e| storage_error("writing upload", e))?;

        debug!("Stored {} upload {}", kind.folder(), name);
        Ok(format!("{}/{}/{}", self.public_path, kind.folder(), name))
    }

    async fn remove(&self, reference: &str) -> Result<(), DomainError> {
        let Some(path) = self.resolve(reference) else {
            debug!("Ignoring foreign file reference {}", reference);
            return Ok(());
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error("removing upload", e)),
        }
    }
}
