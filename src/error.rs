use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("Content path not found: {}: {source}", .path.display())]
    ContentPathNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not find file {script} in the directory {}", .directory.display())]
    ScriptNotFoundInDirectory { script: String, directory: PathBuf },

    #[error("Directory test requires the script name as the last argument: {}", .0.display())]
    MissingScriptArgument(PathBuf),

    #[error("Could not create output directory {}: {source}", .path.display())]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JMeter run error: {0}")]
    ProcessInvocation(String),

    #[error("Getting JTL report error: {}: {source}", .path.display())]
    ReportAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JTL report: {0}")]
    ReportStructure(String),

    #[error("Scrape artifacts error: {0}")]
    Scrape(String),

    #[error("Artifact upload error: {0}")]
    Upload(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported content: {0}")]
    UnsupportedContent(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ExecutorError {
    /// Fatal errors short-circuit the pipeline with no result. The rest are
    /// attached to an already built result.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ExecutorError::ProcessInvocation(_)
                | ExecutorError::Scrape(_)
                | ExecutorError::Upload(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ExecutorError>;
