use super::resolver::{REPO_DIR, TEST_CONTENT_DIR};
use crate::error::{ExecutorError, Result};
use crate::models::{ContentType, TestContent};
use std::fs;
use std::path::{Path, PathBuf};

/// Materializes test content under the data root
pub trait ContentFetcher {
    fn fetch(&self, content: &TestContent, data_root: &Path) -> Result<PathBuf>;
}

/// Fetcher for content that is available without network access.
///
/// Git repositories are expected to be checked out under `{data_root}/repo`
/// by the orchestrator before the executor starts.
#[derive(Debug, Clone, Default)]
pub struct LocalFetcher;

impl LocalFetcher {
    pub fn new() -> Self {
        Self
    }

    fn local_path(uri: &str) -> Result<PathBuf> {
        if uri.starts_with("http://") || uri.starts_with("https://") {
            return Err(ExecutorError::UnsupportedContent(format!(
                "HTTP(S) URIs are not yet supported: {}",
                uri
            )));
        }

        Ok(PathBuf::from(uri.strip_prefix("file://").unwrap_or(uri)))
    }
}

impl ContentFetcher for LocalFetcher {
    fn fetch(&self, content: &TestContent, data_root: &Path) -> Result<PathBuf> {
        let target = data_root.join(TEST_CONTENT_DIR);

        match content.content_type {
            ContentType::InlineString => {
                let data = content.data.as_deref().ok_or_else(|| {
                    ExecutorError::UnsupportedContent("string content without data".to_string())
                })?;
                fs::create_dir_all(data_root)?;
                fs::write(&target, data)?;
                tracing::info!(path = %target.display(), "Wrote inline test content");
                Ok(target)
            }
            ContentType::FileUri => {
                let uri = content.uri.as_deref().ok_or_else(|| {
                    ExecutorError::UnsupportedContent("file-uri content without uri".to_string())
                })?;
                let source = Self::local_path(uri)?;
                fs::create_dir_all(data_root)?;
                fs::copy(&source, &target).map_err(|source_err| {
                    ExecutorError::ContentPathNotFound {
                        path: source.clone(),
                        source: source_err,
                    }
                })?;
                tracing::info!(
                    from = %source.display(),
                    to = %target.display(),
                    "Copied test content"
                );
                Ok(target)
            }
            ContentType::GitFile | ContentType::GitDir | ContentType::GitRepository => {
                let repo = data_root.join(REPO_DIR);
                if !repo.is_dir() {
                    return Err(ExecutorError::UnsupportedContent(format!(
                        "git content must be checked out in {}",
                        repo.display()
                    )));
                }
                Ok(repo)
            }
        }
    }
}
