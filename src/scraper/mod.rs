//! Artifact scraping
//!
//! After a run the output directory (JTL report and HTML dashboard) is
//! collected and handed to an [`ArtifactUploader`]. The uploader variant is
//! chosen by the caller from the runner configuration.

pub mod cloud;
pub mod filesystem;

pub use cloud::CloudUploader;
pub use filesystem::FilesystemUploader;

use crate::error::{ExecutorError, Result};
use crate::models::Execution;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Execution metadata attached to uploaded artifacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactMeta {
    pub execution_id: String,
    pub test_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_suite_name: Option<String>,
}

impl From<&Execution> for ArtifactMeta {
    fn from(execution: &Execution) -> Self {
        Self {
            execution_id: execution.id.clone(),
            test_name: execution.test_name.clone(),
            test_suite_name: execution.test_suite_name.clone(),
        }
    }
}

/// A file found while scraping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFile {
    pub path: PathBuf,
    /// Path relative to the scraped directory
    pub relative_path: PathBuf,
}

impl ArtifactFile {
    /// Relative path with `/` separators, as used in object keys and URLs
    pub fn key(&self) -> String {
        self.relative_path
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

pub trait ArtifactUploader {
    fn upload(&self, meta: &ArtifactMeta, files: &[ArtifactFile]) -> Result<()>;
}

pub struct Scraper {
    uploader: Box<dyn ArtifactUploader>,
}

impl Scraper {
    pub fn new(uploader: Box<dyn ArtifactUploader>) -> Self {
        Self { uploader }
    }

    /// Upload every regular file below `directories`, each directory's files
    /// ordered by key.
    pub fn scrape(&self, directories: &[PathBuf], meta: &ArtifactMeta) -> Result<()> {
        let mut files = Vec::new();
        for directory in directories {
            let mut found = Vec::new();
            collect_files(directory, directory, &mut found).map_err(|e| {
                ExecutorError::Scrape(format!("reading {}: {}", directory.display(), e))
            })?;
            found.sort_by_key(ArtifactFile::key);
            files.extend(found);
        }

        tracing::info!(
            execution_id = %meta.execution_id,
            files = files.len(),
            "Uploading artifacts"
        );

        self.uploader
            .upload(meta, &files)
            .map_err(|e| ExecutorError::Scrape(e.to_string()))
    }
}

fn collect_files(root: &Path, dir: &Path, files: &mut Vec<ArtifactFile>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_files(root, &path, files)?;
        } else if file_type.is_file() {
            let relative_path = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
            files.push(ArtifactFile {
                path,
                relative_path,
            });
        }
    }

    Ok(())
}
