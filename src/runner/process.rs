use crate::variables::VariableSet;
use std::path::Path;
use std::process::Command;

/// Captured output of an external process. A failed launch or a non-zero
/// exit is reported in `error`, the output is kept either way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// stdout followed by stderr
    pub output: Vec<u8>,
    pub error: Option<String>,
}

pub trait ProcessInvoker {
    fn run(
        &self,
        working_dir: &Path,
        command: &str,
        variables: &VariableSet,
        args: &[String],
    ) -> ProcessOutput;
}

/// Runs the command as a child process, inheriting the parent environment.
#[derive(Debug, Clone, Default)]
pub struct SystemProcess;

impl ProcessInvoker for SystemProcess {
    fn run(
        &self,
        working_dir: &Path,
        command: &str,
        variables: &VariableSet,
        args: &[String],
    ) -> ProcessOutput {
        let output = Command::new(command)
            .current_dir(working_dir)
            .args(args)
            .envs(variables.env_pairs())
            .output();

        match output {
            Ok(output) => {
                let error = (!output.status.success())
                    .then(|| format!("process {} finished with {}", command, output.status));
                let mut combined = output.stdout;
                combined.extend_from_slice(&output.stderr);

                ProcessOutput {
                    output: combined,
                    error,
                }
            }
            Err(e) => ProcessOutput {
                output: Vec::new(),
                error: Some(format!("failed to start {}: {}", command, e)),
            },
        }
    }
}
