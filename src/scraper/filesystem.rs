use super::{ArtifactFile, ArtifactMeta, ArtifactUploader};
use crate::error::{ExecutorError, Result};
use std::fs;
use std::path::PathBuf;

/// Copies artifacts to `{root}/{execution id}/{relative path}`
#[derive(Debug, Clone)]
pub struct FilesystemUploader {
    root: PathBuf,
}

impl FilesystemUploader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ArtifactUploader for FilesystemUploader {
    fn upload(&self, meta: &ArtifactMeta, files: &[ArtifactFile]) -> Result<()> {
        let target_dir = self.root.join(&meta.execution_id);

        for file in files {
            let target = target_dir.join(&file.relative_path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(&file.path, &target).map_err(|e| {
                ExecutorError::Upload(format!(
                    "copying {} to {}: {}",
                    file.path.display(),
                    target.display(),
                    e
                ))
            })?;
        }

        tracing::debug!(target = %target_dir.display(), count = files.len(), "Copied artifacts");
        Ok(())
    }
}
