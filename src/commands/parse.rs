use crate::cli::OutputFormat;
use crate::error::Result;
use crate::models::{ExecutionResult, ExecutionStatus};
use crate::runner::jmeter::read_report;
use crate::runner::map_results;
use colored::Colorize;
use std::path::Path;

/// Execute the parse command
pub fn execute_parse(report_path: &Path, format: &OutputFormat) -> Result<ExecutionResult> {
    let outcome = read_report(report_path)?;
    let result = map_results(b"", &outcome);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Table => print_table(&result),
    }

    Ok(result)
}

fn print_table(result: &ExecutionResult) {
    for step in &result.steps {
        let icon = match step.status {
            ExecutionStatus::Passed => "✓".green(),
            ExecutionStatus::Failed => "✗".red(),
        };
        println!("  {} {} ({})", icon, step.name, step.duration);
    }

    println!();
    match result.status {
        ExecutionStatus::Passed => {
            println!("{} {} steps passed", "✓".green(), result.steps.len())
        }
        ExecutionStatus::Failed => println!(
            "{} Failed: {}",
            "✗".red(),
            result.error_message.as_deref().unwrap_or_default()
        ),
    }
}
