use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single test execution requested by the orchestrator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    /// Execution identifier, used as artifact prefix
    pub id: String,

    /// Name of the test being executed
    #[serde(default)]
    pub test_name: String,

    /// Name of the test suite this execution belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_suite_name: Option<String>,

    /// Extra arguments appended to the JMeter command line
    #[serde(default)]
    pub args: Vec<String>,

    /// Variables passed to JMeter as `-J` properties, in declaration order
    #[serde(default)]
    pub variables: IndexMap<String, Variable>,

    /// Where the test script comes from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<TestContent>,
}

impl Execution {
    /// Replace repository credentials when the runner has its own.
    pub fn with_git_credentials(mut self, username: &str, token: &str) -> Self {
        if username.is_empty() && token.is_empty() {
            return self;
        }

        if let Some(repository) = self
            .content
            .as_mut()
            .and_then(|content| content.repository.as_mut())
        {
            repository.username = username.to_string();
            repository.token = token.to_string();
        }

        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,

    #[serde(default)]
    pub value: String,

    #[serde(default, rename = "type")]
    pub var_type: VariableType,
}

impl Variable {
    pub fn basic(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            var_type: VariableType::Basic,
        }
    }

    pub fn secret(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            var_type: VariableType::Secret,
        }
    }

    pub fn is_secret(&self) -> bool {
        self.var_type == VariableType::Secret
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    #[default]
    Basic,
    Secret,
}

/// Content descriptor of the test script
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestContent {
    #[serde(rename = "type")]
    pub content_type: ContentType,

    /// Inline script text (`string` content)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    /// Script location (`file-uri` content)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<Repository>,
}

impl TestContent {
    pub fn new(content_type: ContentType) -> Self {
        Self {
            content_type,
            data: None,
            uri: None,
            repository: None,
        }
    }

    pub fn with_repository(mut self, repository: Repository) -> Self {
        self.repository = Some(repository);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    #[serde(rename = "string")]
    InlineString,
    #[serde(rename = "file-uri")]
    FileUri,
    #[serde(rename = "git-file")]
    GitFile,
    #[serde(rename = "git-dir")]
    GitDir,
    #[serde(rename = "git")]
    GitRepository,
}

impl ContentType {
    pub fn is_git(&self) -> bool {
        matches!(
            self,
            ContentType::GitFile | ContentType::GitDir | ContentType::GitRepository
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,

    /// Path of the test inside the checked out repository
    #[serde(default)]
    pub path: String,

    /// Directory, relative to the repository root, to run JMeter in
    #[serde(default)]
    pub working_dir: String,

    #[serde(default)]
    pub username: String,

    #[serde(default, skip_serializing)]
    pub token: String,
}
