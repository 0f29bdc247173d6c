use super::{ArtifactFile, ArtifactMeta, ArtifactUploader};
use crate::error::{ExecutorError, Result};
use reqwest::Url;
use reqwest::blocking::Client;
use std::fs::File;
use std::time::Duration;

/// Uploads artifacts to the cloud API, one `PUT` per file
#[derive(Debug, Clone)]
pub struct CloudUploader {
    client: Client,
    api_url: String,
    api_key: String,
}

impl CloudUploader {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ExecutorError::Upload(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
        })
    }

    /// `{api}/executions/{id}/artifacts/{relative path}`, every segment
    /// percent-encoded
    fn artifact_url(&self, meta: &ArtifactMeta, file: &ArtifactFile) -> Result<Url> {
        let invalid = || ExecutorError::Upload(format!("invalid API URL {}", self.api_url));
        let mut url = Url::parse(&self.api_url).map_err(|_| invalid())?;

        let components = file
            .relative_path
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(["executions", meta.execution_id.as_str(), "artifacts"])
            .extend(&components);

        Ok(url)
    }
}

impl ArtifactUploader for CloudUploader {
    fn upload(&self, meta: &ArtifactMeta, files: &[ArtifactFile]) -> Result<()> {
        for file in files {
            let url = self.artifact_url(meta, file)?;
            let body = File::open(&file.path)?;

            self.client
                .put(url.clone())
                .bearer_auth(&self.api_key)
                .header("X-Test-Name", &meta.test_name)
                .body(body)
                .send()
                .and_then(|response| response.error_for_status())
                .map_err(|e| ExecutorError::Upload(format!("uploading {}: {}", file.key(), e)))?;

            tracing::debug!(%url, "Uploaded artifact");
        }

        Ok(())
    }
}
