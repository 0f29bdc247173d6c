//! JTL report parsing
//!
//! JMeter writes one entry per sampler into the JTL file given with `-l`.
//! Both the XML and the CSV flavour are understood; the format is sniffed
//! from the first non-whitespace byte.

pub mod csv;
pub mod xml;

use crate::error::{ExecutorError, Result};
use std::io::BufRead;
use std::time::Duration;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// One sampler entry of the report, in file order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRecord {
    pub label: String,
    pub duration: Duration,
    pub success: bool,
    pub error: Option<String>,
}

impl ReportRecord {
    pub fn passed(label: impl Into<String>, duration: Duration) -> Self {
        Self {
            label: label.into(),
            duration,
            success: true,
            error: None,
        }
    }

    pub fn failed(label: impl Into<String>, duration: Duration, error: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            duration,
            success: false,
            error: Some(error.into()),
        }
    }
}

/// All records of a report plus the aggregated error state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    pub records: Vec<ReportRecord>,
    pub has_error: bool,
    pub last_error_message: String,
}

impl FromIterator<ReportRecord> for ParseOutcome {
    fn from_iter<I: IntoIterator<Item = ReportRecord>>(iter: I) -> Self {
        iter.into_iter()
            .fold(ParseOutcome::default(), |mut outcome, record| {
                if !record.success {
                    outcome.has_error = true;
                    outcome.last_error_message = record.error.clone().unwrap_or_default();
                }
                outcome.records.push(record);
                outcome
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Xml,
    Csv,
}

/// Parse a JTL report in either format.
pub fn parse<R: BufRead>(mut reader: R) -> Result<ParseOutcome> {
    let records = match sniff_format(&mut reader)? {
        Some(ReportFormat::Xml) => self::xml::parse_records(reader)?,
        Some(ReportFormat::Csv) => self::csv::parse_records(reader)?,
        None => return Err(ExecutorError::ReportStructure("report is empty".to_string())),
    };

    Ok(records.into_iter().collect())
}

/// Skip leading whitespace and a BOM, then look at the first byte.
fn sniff_format<R: BufRead>(reader: &mut R) -> Result<Option<ReportFormat>> {
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(None);
        }

        if buf.starts_with(UTF8_BOM) {
            reader.consume(UTF8_BOM.len());
            continue;
        }

        match buf.iter().position(|b| !b.is_ascii_whitespace()) {
            Some(pos) => {
                let format = if buf[pos] == b'<' {
                    ReportFormat::Xml
                } else {
                    ReportFormat::Csv
                };
                reader.consume(pos);
                return Ok(Some(format));
            }
            None => {
                let len = buf.len();
                reader.consume(len);
            }
        }
    }
}

/// Error detail for a failed sample without a failing assertion
pub(crate) fn fallback_error(label: &str, response_code: &str, response_message: &str) -> String {
    let detail = format!("{} {}", response_code, response_message)
        .trim()
        .to_string();
    if detail.is_empty() {
        label.to_string()
    } else {
        detail
    }
}

pub(crate) fn structure_error(err: impl std::fmt::Display) -> ExecutorError {
    ExecutorError::ReportStructure(err.to_string())
}

/// Render a duration the short way JMeter users are used to, e.g. `850ms`,
/// `1.5s` or `2m3.4s`.
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }

    if nanos < 1_000 {
        return format!("{}ns", nanos);
    }
    if nanos < 1_000_000 {
        return format!("{}µs", fixed(nanos / 1_000, nanos % 1_000, 3));
    }
    if nanos < 1_000_000_000 {
        return format!("{}ms", fixed(nanos / 1_000_000, nanos % 1_000_000, 6));
    }

    let total_secs = nanos / 1_000_000_000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = fixed(total_secs % 60, nanos % 1_000_000_000, 9);

    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

fn fixed(whole: u128, fraction: u128, digits: usize) -> String {
    if fraction == 0 {
        return whole.to_string();
    }
    let fraction = format!("{:0width$}", fraction, width = digits);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_outcome_tracks_last_error() {
        let outcome: ParseOutcome = vec![
            ReportRecord::failed("login", Duration::from_millis(10), "first"),
            ReportRecord::passed("browse", Duration::from_millis(20)),
            ReportRecord::failed("checkout", Duration::from_millis(30), "second"),
            ReportRecord::passed("logout", Duration::from_millis(5)),
        ]
        .into_iter()
        .collect();

        assert!(outcome.has_error);
        assert_eq!(outcome.last_error_message, "second");
        assert_eq!(outcome.records.len(), 4);
    }

    #[test]
    fn test_outcome_without_errors() {
        let outcome: ParseOutcome = vec![ReportRecord::passed("home", Duration::from_millis(1))]
            .into_iter()
            .collect();

        assert!(!outcome.has_error);
        assert!(outcome.last_error_message.is_empty());
    }

    #[test]
    fn test_parse_sniffs_xml_after_bom_and_whitespace() {
        let mut data = UTF8_BOM.to_vec();
        data.extend_from_slice(
            b"\n  <testResults version=\"1.2\"><sample t=\"5\" s=\"true\" lb=\"ping\"/></testResults>",
        );

        let outcome = parse(Cursor::new(data)).unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].label, "ping");
    }

    #[test]
    fn test_parse_sniffs_csv() {
        let data = "timeStamp,elapsed,label,responseCode,responseMessage,success,failureMessage\n\
                    1690000000000,12,home,200,OK,true,\n";

        let outcome = parse(Cursor::new(data)).unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert!(outcome.records[0].success);
    }

    #[test]
    fn test_parse_empty_report() {
        let err = parse(Cursor::new("   \n")).unwrap_err();
        assert!(matches!(err, ExecutorError::ReportStructure(_)));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::ZERO), "0s");
        assert_eq!(format_duration(Duration::from_nanos(500)), "500ns");
        assert_eq!(format_duration(Duration::from_micros(1500)), "1.5ms");
        assert_eq!(format_duration(Duration::from_millis(850)), "850ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_millis(123_400)), "2m3.4s");
        assert_eq!(format_duration(Duration::from_secs(3600)), "1h0m0s");
    }

    #[test]
    fn test_fallback_error() {
        assert_eq!(
            fallback_error("home", "500", "Internal Server Error"),
            "500 Internal Server Error"
        );
        assert_eq!(fallback_error("home", "", ""), "home");
    }
}
