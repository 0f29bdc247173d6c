//! Execution variables and secret obfuscation
//!
//! Variables reach JMeter twice: as `-J` properties on the command line and
//! as environment variables of the child process. Secret values must never
//! leak through captured output or logged argument vectors.

use crate::error::{ExecutorError, Result};
use crate::models::Variable;
use indexmap::IndexMap;
use regex::bytes::Regex;

pub const OBFUSCATION_MASK: &str = "********";

#[derive(Debug, Clone, Default)]
pub struct VariableSet {
    variables: IndexMap<String, Variable>,
    secrets: Option<Regex>,
}

impl VariableSet {
    pub fn new(variables: IndexMap<String, Variable>) -> Result<Self> {
        let mut values: Vec<&str> = variables
            .values()
            .filter(|v| v.is_secret() && !v.value.is_empty())
            .map(|v| v.value.as_str())
            .collect();

        // longest first so a secret containing another one is masked whole
        values.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        values.dedup();

        let secrets = if values.is_empty() {
            None
        } else {
            let pattern = values
                .iter()
                .map(|v| regex::escape(v))
                .collect::<Vec<_>>()
                .join("|");
            let re = Regex::new(&pattern).map_err(|e| {
                ExecutorError::Config(format!("Failed to build secret obfuscation pattern: {}", e))
            })?;
            Some(re)
        };

        Ok(Self { variables, secrets })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    /// `-J{name}={value}` tokens in declaration order
    pub fn jmeter_properties(&self) -> Vec<String> {
        self.iter()
            .map(|v| format!("-J{}={}", v.name, v.value))
            .collect()
    }

    /// Environment pairs handed to the child process
    pub fn env_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().map(|v| (v.name.as_str(), v.value.as_str()))
    }

    pub fn obfuscate(&self, output: &[u8]) -> Vec<u8> {
        match &self.secrets {
            Some(re) => re.replace_all(output, OBFUSCATION_MASK.as_bytes()).into_owned(),
            None => output.to_vec(),
        }
    }

    pub fn obfuscate_str(&self, text: &str) -> String {
        String::from_utf8_lossy(&self.obfuscate(text.as_bytes())).into_owned()
    }
}
