use crate::error::{ExecutorError, Result};
use crate::scraper::{ArtifactUploader, CloudUploader, FilesystemUploader};
use std::collections::HashMap;
use std::path::PathBuf;

/// Runner settings, built once by the caller and handed to the runner.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub data_dir: PathBuf,
    pub scraper_enabled: bool,
    pub cloud_mode: bool,
    pub cloud_api_url: String,
    pub cloud_api_key: String,
    /// Target of the filesystem uploader when not in cloud mode
    pub artifacts_dir: PathBuf,
    pub git_username: String,
    pub git_token: String,
    pub jmeter_binary: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            scraper_enabled: false,
            cloud_mode: false,
            cloud_api_url: String::new(),
            cloud_api_key: String::new(),
            artifacts_dir: PathBuf::from("./artifacts"),
            git_username: String::new(),
            git_token: String::new(),
            jmeter_binary: "jmeter".to_string(),
        }
    }
}

impl RunnerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Build the configuration from an explicit variable map.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| vars.get(key).cloned().unwrap_or_default();
        let flag = |key: &str| -> Result<bool> {
            match vars.get(key).map(|v| v.trim().to_ascii_lowercase()) {
                None => Ok(false),
                Some(v) if v.is_empty() || v == "false" || v == "0" => Ok(false),
                Some(v) if v == "true" || v == "1" => Ok(true),
                Some(v) => Err(ExecutorError::Config(format!(
                    "{} must be a boolean, got '{}'",
                    key, v
                ))),
            }
        };

        let defaults = Self::default();
        let data_dir = vars
            .get("RUNNER_DATADIR")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let artifacts_dir = vars
            .get("RUNNER_ARTIFACTS_DIR")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("artifacts"));
        let jmeter_binary = vars
            .get("RUNNER_JMETER_BINARY")
            .filter(|v| !v.is_empty())
            .cloned()
            .unwrap_or(defaults.jmeter_binary);

        Ok(Self {
            scraper_enabled: flag("RUNNER_SCRAPPERENABLED")?,
            cloud_mode: flag("RUNNER_CLOUD_MODE")?,
            cloud_api_url: get("RUNNER_CLOUD_API_URL"),
            cloud_api_key: get("RUNNER_CLOUD_API_KEY"),
            git_username: get("RUNNER_GITUSERNAME"),
            git_token: get("RUNNER_GITTOKEN"),
            data_dir,
            artifacts_dir,
            jmeter_binary,
        })
    }

    /// Uploader matching the configured mode
    pub fn uploader(&self) -> Result<Box<dyn ArtifactUploader>> {
        if self.cloud_mode {
            if self.cloud_api_url.is_empty() || self.cloud_api_key.is_empty() {
                return Err(ExecutorError::Config(
                    "cloud mode requires RUNNER_CLOUD_API_URL and RUNNER_CLOUD_API_KEY".to_string(),
                ));
            }
            let uploader = CloudUploader::new(&self.cloud_api_url, &self.cloud_api_key)?;
            return Ok(Box::new(uploader));
        }

        Ok(Box::new(FilesystemUploader::new(&self.artifacts_dir)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = RunnerConfig::from_vars(HashMap::new()).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("."));
        assert_eq!(config.artifacts_dir, PathBuf::from("./artifacts"));
        assert!(!config.scraper_enabled);
        assert_eq!(config.jmeter_binary, "jmeter");
    }

    #[test]
    fn test_reads_runner_variables() {
        let config = RunnerConfig::from_vars(vars(&[
            ("RUNNER_DATADIR", "/data"),
            ("RUNNER_SCRAPPERENABLED", "TRUE"),
            ("RUNNER_GITUSERNAME", "bot"),
            ("RUNNER_JMETER_BINARY", "/opt/jmeter/bin/jmeter"),
        ]))
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/data"));
        assert_eq!(config.artifacts_dir, PathBuf::from("/data/artifacts"));
        assert!(config.scraper_enabled);
        assert_eq!(config.git_username, "bot");
        assert_eq!(config.jmeter_binary, "/opt/jmeter/bin/jmeter");
    }

    #[test]
    fn test_invalid_flag() {
        let err =
            RunnerConfig::from_vars(vars(&[("RUNNER_CLOUD_MODE", "yes please")])).unwrap_err();
        assert!(err.to_string().contains("RUNNER_CLOUD_MODE"));
    }

    #[test]
    fn test_cloud_mode_requires_credentials() {
        let config = RunnerConfig {
            cloud_mode: true,
            ..Default::default()
        };
        assert!(config.uploader().is_err());
    }
}
