//! Persistence infrastructure adapter.
//!
//! Implements the [`pipeline::ArtifactStore`] trait on the local filesystem,
//! rooted at an output directory. Paths come from [`pipeline::layout`], so the
//! files land at:
//!
//! ```text
//! <root>/pages/<registrable-name>/<ArtifactBaseName>.ts
//! <root>/tests/<registrable-name>/<stem>.spec.ts
//! ```
//!
//! An existing file is only replaced after the injected
//! [`pipeline::Confirmer`] agrees; otherwise it is left byte-for-byte intact
//! and the save reports [`SaveOutcome::Skipped`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use pipeline::layout::storage_path;
use pipeline::{ArtifactPath, ArtifactStore, Confirmer, GeneratedArtifact, SaveOutcome, StoreError};
use tracing::{info, instrument};

/// Filesystem-backed artifact store.
#[derive(Clone)]
pub struct FileArtifactStore {
    root: PathBuf,
    confirmer: Arc<dyn Confirmer>,
}

impl std::fmt::Debug for FileArtifactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileArtifactStore")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl FileArtifactStore {
    pub fn new(root: impl Into<PathBuf>, confirmer: Arc<dyn Confirmer>) -> Self {
        Self {
            root: root.into(),
            confirmer,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute (or root-relative) location of a layout path.
    pub fn resolve(&self, path: &ArtifactPath) -> PathBuf {
        self.root.join(path.as_str())
    }
}

fn io_error(path: &Path, e: &std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

#[async_trait]
impl ArtifactStore for FileArtifactStore {
    #[instrument(skip_all, fields(role = %artifact.role, registrable = %artifact.registrable_name))]
    async fn save(&self, artifact: &GeneratedArtifact) -> Result<SaveOutcome, StoreError> {
        let relative = storage_path(artifact.role, &artifact.registrable_name, &artifact.file_name);
        let full = self.resolve(&relative);

        if let Some(dir) = full.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| io_error(dir, &e))?;
        }

        let existed = tokio::fs::try_exists(&full)
            .await
            .map_err(|e| io_error(&full, &e))?;

        if existed {
            let prompt = format!("File {} already exists. Overwrite?", full.display());
            if !self.confirmer.confirm(&prompt).await {
                info!(path = %relative, "overwrite declined; existing file kept");
                return Ok(SaveOutcome::Skipped { path: relative });
            }
        }

        tokio::fs::write(&full, artifact.content.trim())
            .await
            .map_err(|e| io_error(&full, &e))?;
        info!(path = %relative, overwritten = existed, "artifact saved");

        Ok(if existed {
            SaveOutcome::Overwritten { path: relative }
        } else {
            SaveOutcome::Written { path: relative }
        })
    }

    async fn load(&self, path: &ArtifactPath) -> Result<Option<String>, StoreError> {
        let full = self.resolve(path);
        match tokio::fs::read_to_string(&full).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&full, &e)),
        }
    }
}
