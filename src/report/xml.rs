//! JTL XML reader
//!
//! ```xml
//! <testResults version="1.2">
//!   <httpSample t="120" s="true" lb="GET /" rc="200" rm="OK">
//!     <assertionResult>
//!       <name>Response Assertion</name>
//!       <failure>false</failure>
//!       <error>false</error>
//!     </assertionResult>
//!   </httpSample>
//! </testResults>
//! ```
//!
//! Only direct children of `testResults` become records; nested samples are
//! sub-results of their parent.

use super::{ReportRecord, fallback_error, structure_error};
use crate::error::{ExecutorError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::io::BufRead;
use std::time::Duration;

const ROOT: &[u8] = b"testResults";
const SAMPLE: &[u8] = b"sample";
const HTTP_SAMPLE: &[u8] = b"httpSample";
const ASSERTION: &[u8] = b"assertionResult";

const ROOT_DEPTH: usize = 1;
const SAMPLE_DEPTH: usize = 2;
const ASSERTION_DEPTH: usize = 3;
const FIELD_DEPTH: usize = 4;

#[derive(Debug, Default)]
struct SampleBuilder {
    label: String,
    elapsed_ms: u64,
    success: bool,
    response_code: String,
    response_message: String,
    failure_message: Option<String>,
}

impl SampleBuilder {
    fn from_element(element: &BytesStart<'_>) -> Result<Self> {
        let mut sample = SampleBuilder::default();

        for attr in element.attributes() {
            let attr = attr.map_err(structure_error)?;
            let value = attr.unescape_value().map_err(structure_error)?;
            match attr.key.as_ref() {
                b"lb" => sample.label = value.into_owned(),
                b"t" => {
                    sample.elapsed_ms = value.parse().map_err(|_| {
                        ExecutorError::ReportStructure(format!("invalid elapsed time '{}'", value))
                    })?
                }
                b"s" => sample.success = value.eq_ignore_ascii_case("true"),
                b"rc" => sample.response_code = value.into_owned(),
                b"rm" => sample.response_message = value.into_owned(),
                _ => {}
            }
        }

        Ok(sample)
    }

    fn build(self) -> ReportRecord {
        let duration = Duration::from_millis(self.elapsed_ms);
        if self.success {
            return ReportRecord::passed(self.label, duration);
        }

        let error = self.failure_message.unwrap_or_else(|| {
            fallback_error(&self.label, &self.response_code, &self.response_message)
        });
        ReportRecord::failed(self.label, duration, error)
    }
}

#[derive(Debug, Default)]
struct AssertionBuilder {
    failed: bool,
    message: String,
}

#[derive(Debug, Clone, Copy)]
enum AssertionField {
    Failure,
    Error,
    FailureMessage,
}

#[derive(Debug, Default)]
struct JtlReader {
    depth: usize,
    records: Vec<ReportRecord>,
    sample: Option<SampleBuilder>,
    assertion: Option<AssertionBuilder>,
    field: Option<AssertionField>,
}

impl JtlReader {
    fn open(&mut self, element: &BytesStart<'_>) -> Result<()> {
        self.depth += 1;
        let name = element.name();

        match self.depth {
            ROOT_DEPTH if name.as_ref() != ROOT => {
                return Err(ExecutorError::ReportStructure(format!(
                    "unexpected root element '{}'",
                    String::from_utf8_lossy(name.as_ref())
                )));
            }
            SAMPLE_DEPTH if matches!(name.as_ref(), SAMPLE | HTTP_SAMPLE) => {
                self.sample = Some(SampleBuilder::from_element(element)?);
            }
            ASSERTION_DEPTH if self.sample.is_some() && name.as_ref() == ASSERTION => {
                self.assertion = Some(AssertionBuilder::default());
            }
            FIELD_DEPTH if self.assertion.is_some() => {
                self.field = match name.as_ref() {
                    b"failure" => Some(AssertionField::Failure),
                    b"error" => Some(AssertionField::Error),
                    b"failureMessage" => Some(AssertionField::FailureMessage),
                    _ => None,
                };
            }
            _ => {}
        }

        Ok(())
    }

    fn close(&mut self) {
        match self.depth {
            SAMPLE_DEPTH => {
                if let Some(sample) = self.sample.take() {
                    self.records.push(sample.build());
                }
            }
            ASSERTION_DEPTH => {
                if let Some(assertion) = self.assertion.take()
                    && assertion.failed
                    && let Some(sample) = self.sample.as_mut()
                    && sample.failure_message.is_none()
                {
                    sample.failure_message = Some(assertion.message);
                }
            }
            FIELD_DEPTH => self.field = None,
            _ => {}
        }

        self.depth = self.depth.saturating_sub(1);
    }

    fn text(&mut self, text: &str) {
        let (Some(field), Some(assertion)) = (self.field, self.assertion.as_mut()) else {
            return;
        };

        match field {
            AssertionField::Failure | AssertionField::Error => {
                if text.trim().eq_ignore_ascii_case("true") {
                    assertion.failed = true;
                }
            }
            AssertionField::FailureMessage => assertion.message.push_str(text),
        }
    }
}

/// Read every top-level sample of an XML JTL report.
pub fn parse_records<R: BufRead>(reader: R) -> Result<Vec<ReportRecord>> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(true);

    let mut state = JtlReader::default();
    let mut seen_root = false;
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf).map_err(structure_error)? {
            Event::Start(element) => {
                seen_root = true;
                state.open(&element)?;
            }
            Event::Empty(element) => {
                seen_root = true;
                state.open(&element)?;
                state.close();
            }
            Event::End(_) => state.close(),
            Event::Text(text) => {
                let text = text.unescape().map_err(structure_error)?;
                state.text(&text);
            }
            Event::CData(data) => {
                let data = data.into_inner();
                state.text(&String::from_utf8_lossy(&data));
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(ExecutorError::ReportStructure(
            "report has no root element".to_string(),
        ));
    }
    if state.depth != 0 {
        return Err(ExecutorError::ReportStructure(
            "report ended before the root element was closed".to_string(),
        ));
    }

    Ok(state.records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(xml: &str) -> Result<Vec<ReportRecord>> {
        parse_records(Cursor::new(xml))
    }

    #[test]
    fn test_parse_samples_in_order() {
        let records = parse(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<testResults version="1.2">
<httpSample t="120" lt="100" ts="1690000000000" s="true" lb="GET /home" rc="200" rm="OK"/>
<sample t="35" s="true" lb="JSR223 setup" rc="200" rm="OK"></sample>
<httpSample t="1500" s="false" lb="POST /checkout" rc="500" rm="Internal Server Error"/>
</testResults>"#,
        )
        .unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0], ReportRecord::passed("GET /home", Duration::from_millis(120)));
        assert_eq!(records[1].label, "JSR223 setup");
        assert_eq!(
            records[2],
            ReportRecord::failed(
                "POST /checkout",
                Duration::from_millis(1500),
                "500 Internal Server Error"
            )
        );
    }

    #[test]
    fn test_failed_assertion_message_wins() {
        let records = parse(
            r#"<testResults version="1.2">
<httpSample t="80" s="false" lb="GET /api" rc="200" rm="OK">
  <assertionResult>
    <name>Size Assertion</name>
    <failure>false</failure>
    <error>false</error>
  </assertionResult>
  <assertionResult>
    <name>Response Assertion</name>
    <failure>true</failure>
    <error>false</error>
    <failureMessage>Test failed: text expected to contain /&quot;ok&quot;/</failureMessage>
  </assertionResult>
  <assertionResult>
    <name>Duration Assertion</name>
    <failure>true</failure>
    <error>false</error>
    <failureMessage>The operation lasted too long</failureMessage>
  </assertionResult>
</httpSample>
</testResults>"#,
        )
        .unwrap();

        assert_eq!(records.len(), 1);
        assert!(!records[0].success);
        assert_eq!(
            records[0].error.as_deref(),
            Some("Test failed: text expected to contain /\"ok\"/")
        );
    }

    #[test]
    fn test_nested_samples_are_not_records() {
        let records = parse(
            r#"<testResults version="1.2">
<sample t="300" s="true" lb="Transaction">
  <httpSample t="100" s="true" lb="GET /a"/>
  <httpSample t="200" s="true" lb="GET /b">
    <assertionResult><failure>true</failure><failureMessage>nested</failureMessage></assertionResult>
  </httpSample>
</sample>
</testResults>"#,
        )
        .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0], ReportRecord::passed("Transaction", Duration::from_millis(300)));
    }

    #[test]
    fn test_missing_success_attribute_is_failure() {
        let records = parse(r#"<testResults><sample t="5" lb="odd"/></testResults>"#).unwrap();
        assert!(!records[0].success);
        assert_eq!(records[0].error.as_deref(), Some("odd"));
    }

    #[test]
    fn test_unrecognized_success_value_is_failure() {
        let report = r#"<testResults><sample t="5" s="maybe" lb="odd" rc="200"/></testResults>"#;
        let records = parse(report).unwrap();
        assert!(!records[0].success);
    }

    #[test]
    fn test_empty_results() {
        let records = parse(r#"<testResults version="1.2"></testResults>"#).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_wrong_root_element() {
        let err = parse(r#"<jmeterTestPlan version="1.2"/>"#).unwrap_err();
        assert!(matches!(err, ExecutorError::ReportStructure(_)));
    }

    #[test]
    fn test_truncated_report() {
        let report = r#"<testResults version="1.2"><sample t="1" s="true" lb="a"/>"#;
        let err = parse(report).unwrap_err();
        assert!(matches!(err, ExecutorError::ReportStructure(_)));
    }

    #[test]
    fn test_mismatched_tags() {
        let err = parse(r#"<testResults><sample t="1" s="true" lb="a"></httpSample></testResults>"#)
            .unwrap_err();
        assert!(matches!(err, ExecutorError::ReportStructure(_)));
    }

    #[test]
    fn test_invalid_elapsed() {
        let report = r#"<testResults><sample t="fast" s="true" lb="a"/></testResults>"#;
        let err = parse(report).unwrap_err();
        assert!(err.to_string().contains("invalid elapsed time"));
    }
}
