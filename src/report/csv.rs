//! JTL CSV reader, JMeter's default `-l` output format.

use super::{ReportRecord, fallback_error, structure_error};
use crate::error::{ExecutorError, Result};
use ::csv::{ReaderBuilder, StringRecord};
use std::io::BufRead;
use std::time::Duration;

#[derive(Debug)]
struct Columns {
    label: usize,
    elapsed: usize,
    success: usize,
    failure_message: Option<usize>,
    response_code: Option<usize>,
    response_message: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| {
                ExecutorError::ReportStructure(format!("CSV report has no '{}' column", name))
            })
        };

        Ok(Self {
            label: require("label")?,
            elapsed: require("elapsed")?,
            success: require("success")?,
            failure_message: find("failureMessage"),
            response_code: find("responseCode"),
            response_message: find("responseMessage"),
        })
    }

    fn record(&self, row: &StringRecord) -> Result<ReportRecord> {
        let get = |index: usize| row.get(index).unwrap_or_default();
        let optional = |index: Option<usize>| index.map(get).unwrap_or_default();

        let label = get(self.label);
        let elapsed = get(self.elapsed);
        let elapsed_ms: u64 = elapsed.trim().parse().map_err(|_| {
            ExecutorError::ReportStructure(format!("invalid elapsed time '{}'", elapsed))
        })?;
        let duration = Duration::from_millis(elapsed_ms);

        if get(self.success).trim().eq_ignore_ascii_case("true") {
            return Ok(ReportRecord::passed(label, duration));
        }

        let message = optional(self.failure_message).trim();
        let error = if message.is_empty() {
            fallback_error(
                label,
                optional(self.response_code),
                optional(self.response_message),
            )
        } else {
            message.to_string()
        };

        Ok(ReportRecord::failed(label, duration, error))
    }
}

/// Read every row of a CSV JTL report.
pub fn parse_records<R: BufRead>(reader: R) -> Result<Vec<ReportRecord>> {
    let mut csv = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv.headers().map_err(structure_error)?.clone();
    let columns = Columns::from_headers(&headers)?;

    csv.records()
        .map(|row| {
            let row = row.map_err(structure_error)?;
            columns.record(&row)
        })
        .collect()
}
