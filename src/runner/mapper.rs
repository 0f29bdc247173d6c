//! Mapping of parsed JTL records to the execution result

use crate::models::{
    AssertionResult, ExecutionResult, ExecutionStatus, OUTPUT_TYPE_TEXT, StepResult,
};
use crate::report::{ParseOutcome, ReportRecord, format_duration};

pub fn map_status(record: &ReportRecord) -> ExecutionStatus {
    if record.success {
        ExecutionStatus::Passed
    } else {
        ExecutionStatus::Failed
    }
}

/// Build the result from captured output and the parsed report. Every record
/// becomes one step carrying a single assertion named after itself.
pub fn map_results(output: &[u8], outcome: &ParseOutcome) -> ExecutionResult {
    let (status, error_message) = if outcome.has_error {
        (
            ExecutionStatus::Failed,
            Some(outcome.last_error_message.clone()),
        )
    } else {
        (ExecutionStatus::Passed, None)
    };

    let steps = outcome
        .records
        .iter()
        .map(|record| {
            let status = map_status(record);
            StepResult {
                name: record.label.clone(),
                duration: format_duration(record.duration),
                status,
                assertion_results: vec![AssertionResult {
                    name: record.label.clone(),
                    status,
                }],
            }
        })
        .collect();

    ExecutionResult {
        status,
        output: String::from_utf8_lossy(output).into_owned(),
        output_type: OUTPUT_TYPE_TEXT.to_string(),
        error_message,
        steps,
        errors: Vec::new(),
    }
}
