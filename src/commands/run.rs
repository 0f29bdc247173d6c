//! Run command implementation
//!
//! Loads an execution document, materializes local content and runs it
//! through the JMeter runner.

use crate::config::RunnerConfig;
use crate::content::{ContentFetcher, LocalFetcher};
use crate::error::Result;
use crate::loader::load_execution;
use crate::models::ExecutionResult;
use crate::runner::{JMeterRunner, Runner};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

pub struct RunCommandArgs<'a> {
    pub execution_path: &'a Path,
    pub data_dir: Option<PathBuf>,
    pub output_path: Option<&'a Path>,
}

/// Execute the run command
pub fn execute_run(args: RunCommandArgs<'_>, mut config: RunnerConfig) -> Result<ExecutionResult> {
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }

    let execution = load_execution(args.execution_path)?;
    eprintln!(
        "{} Loaded execution {} ({})",
        "✓".green(),
        execution.id,
        args.execution_path.display()
    );

    if let Some(content) = &execution.content {
        LocalFetcher::new().fetch(content, &config.data_dir)?;
    }

    eprintln!("{} Running JMeter...", "→".blue());
    let runner = JMeterRunner::new(config)?;
    let result = runner.run(execution)?;

    let json = serde_json::to_string_pretty(&result)?;
    match args.output_path {
        Some(path) => {
            fs::write(path, &json)?;
            eprintln!("{} Result written to {}", "✓".green(), path.display());
        }
        None => println!("{}", json),
    }

    if result.is_passed() {
        eprintln!("{} Test run passed", "✓".green());
    } else {
        eprintln!(
            "{} Test run failed: {}",
            "✗".red(),
            result.error_message.as_deref().unwrap_or("unknown error")
        );
    }
    for error in &result.errors {
        eprintln!("{} {}", "!".yellow(), error);
    }

    Ok(result)
}
