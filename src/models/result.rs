use serde::{Deserialize, Serialize};
use std::fmt;

pub const OUTPUT_TYPE_TEXT: &str = "text/plain";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Passed,
    Failed,
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionStatus::Passed => write!(f, "passed"),
            ExecutionStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Normalized result of one test execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub status: ExecutionStatus,

    /// Captured process output, secrets already obfuscated
    pub output: String,

    pub output_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    #[serde(default)]
    pub steps: Vec<StepResult>,

    /// Non-fatal errors attached after the status was determined
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ExecutionResult {
    /// Failed result without any report data.
    pub fn failed(output: impl Into<String>, error: impl fmt::Display) -> Self {
        let message = error.to_string();
        Self {
            status: ExecutionStatus::Failed,
            output: output.into(),
            output_type: OUTPUT_TYPE_TEXT.to_string(),
            error_message: Some(message.clone()),
            steps: Vec::new(),
            errors: vec![message],
        }
    }

    /// Attach a non-fatal error. The status is left untouched.
    pub fn with_error(mut self, error: impl fmt::Display) -> Self {
        self.errors.push(error.to_string());
        self
    }

    pub fn is_passed(&self) -> bool {
        self.status == ExecutionStatus::Passed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    pub name: String,
    pub duration: String,
    pub status: ExecutionStatus,
    pub assertion_results: Vec<AssertionResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionResult {
    pub name: String,
    pub status: ExecutionStatus,
}
