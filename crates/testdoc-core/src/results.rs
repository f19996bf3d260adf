//! JUnit XML test results.
//!
//! Test runners (for Go, usually `go-junit-report` or `gotestsum`) emit one
//! `<testcase>` per test and sub-test, named with the same slash-joined path
//! the discovery side computes as a unit's machine name. This module reads
//! such a report into a [`ResultMap`] keyed by [`result_key`].
//!
//! Both document shapes are accepted:
//!
//! ```xml
//! <testsuites><testsuite name="pkg"><testcase .../></testsuite></testsuites>
//! <testsuite name="pkg"><testcase .../></testsuite>
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator between package and test name in a lookup key.
pub const KEY_SEPARATOR: &str = "::";

// ============================================================================
// Error Types
// ============================================================================

/// Error type for reading a results document.
#[derive(Debug, Error)]
pub enum JunitError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The document is not well-formed XML.
    #[error("malformed JUnit XML at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    /// The document has no `<testsuites>` or `<testsuite>` root.
    #[error("expected a <testsuites> or <testsuite> root element, found {found}")]
    UnexpectedRoot { found: String },
}

// ============================================================================
// Records
// ============================================================================

/// Outcome of one test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestStatus {
    Pass,
    Fail,
    Skip,
    /// No record exists for the unit.
    NotRun,
}

impl TestStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TestStatus::Pass => "PASS",
            TestStatus::Fail => "FAIL",
            TestStatus::Skip => "SKIP",
            TestStatus::NotRun => "NOT RUN",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            TestStatus::Pass => "✅",
            TestStatus::Fail => "❌",
            TestStatus::Skip => "⏭️",
            TestStatus::NotRun => "⚪",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The recorded result of one test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JunitRecord {
    pub status: TestStatus,
    /// Duration with unit suffix, e.g. `0.13s`.
    pub duration: Option<String>,
    /// Failure or skip message, trimmed.
    pub message: Option<String>,
}

/// Results keyed by [`result_key`].
pub type ResultMap = HashMap<String, JunitRecord>;

/// Lookup key joining a package identifier and a test's machine name.
pub fn result_key(package: &str, test: &str) -> String {
    format!("{}{}{}", package.trim(), KEY_SEPARATOR, test.trim())
}

// ============================================================================
// Parsing
// ============================================================================

/// Read and parse a JUnit XML file.
pub fn parse_junit_file(path: &Path) -> Result<ResultMap, JunitError> {
    let content = std::fs::read_to_string(path).map_err(|source| JunitError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_junit(&content)
}

/// Test case being assembled while its children are read.
#[derive(Default)]
struct PendingCase {
    class: String,
    name: String,
    time: String,
    skipped: Option<String>,
    failure: Option<String>,
    failure_text: String,
    in_failure: bool,
}

impl PendingCase {
    fn from_start(e: &BytesStart<'_>) -> Result<Self, JunitError> {
        Ok(PendingCase {
            class: attribute(e, b"classname")?.unwrap_or_default(),
            name: attribute(e, b"name")?.unwrap_or_default(),
            time: attribute(e, b"time")?.unwrap_or_default(),
            ..PendingCase::default()
        })
    }

    fn finish(self, suite_name: &str, results: &mut ResultMap) {
        let package = if self.class.is_empty() {
            suite_name
        } else {
            self.class.as_str()
        };

        let mut status = TestStatus::Pass;
        let mut message = String::new();
        if let Some(skip_message) = self.skipped {
            status = TestStatus::Skip;
            message = skip_message;
        }
        if let Some(failure_message) = self.failure {
            status = TestStatus::Fail;
            message = if failure_message.is_empty() {
                self.failure_text
            } else {
                failure_message
            };
        }

        let time = self.time.trim();
        let duration = (!time.is_empty()).then(|| format!("{}s", time));
        let message = message.trim();
        let message = (!message.is_empty()).then(|| message.to_string());

        results.insert(
            result_key(package, &self.name),
            JunitRecord {
                status,
                duration,
                message,
            },
        );
    }
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, JunitError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| JunitError::Malformed {
            position: 0,
            message: err.to_string(),
        })?;
        if attr.key.as_ref() == key {
            let value = attr.unescape_value().map_err(|err| JunitError::Malformed {
                position: 0,
                message: err.to_string(),
            })?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn check_root(e: &BytesStart<'_>) -> Result<String, JunitError> {
    let name = element_name(e);
    if name == "testsuites" || name == "testsuite" {
        Ok(name)
    } else {
        Err(JunitError::UnexpectedRoot {
            found: format!("<{}>", name),
        })
    }
}

/// Parse JUnit XML text into a result map.
pub fn parse_junit(content: &str) -> Result<ResultMap, JunitError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut results = ResultMap::new();
    let mut saw_root = false;
    let mut suite_names: Vec<String> = Vec::new();
    let mut case: Option<PendingCase> = None;

    loop {
        let event = reader.read_event().map_err(|err| JunitError::Malformed {
            position: reader.buffer_position(),
            message: err.to_string(),
        })?;

        match event {
            Event::Start(e) if !saw_root => {
                let name = check_root(&e)?;
                saw_root = true;
                if name == "testsuite" {
                    suite_names.push(attribute(&e, b"name")?.unwrap_or_default());
                }
            }
            Event::Empty(e) if !saw_root => {
                check_root(&e)?;
                saw_root = true;
            }
            Event::Start(e) => match element_name(&e).as_str() {
                "testsuite" => suite_names.push(attribute(&e, b"name")?.unwrap_or_default()),
                "testcase" => case = Some(PendingCase::from_start(&e)?),
                "failure" | "error" => {
                    if let Some(c) = case.as_mut() {
                        c.failure = Some(attribute(&e, b"message")?.unwrap_or_default());
                        c.in_failure = true;
                    }
                }
                "skipped" => {
                    if let Some(c) = case.as_mut() {
                        c.skipped = Some(attribute(&e, b"message")?.unwrap_or_default());
                    }
                }
                _ => {}
            },
            Event::Empty(e) => match element_name(&e).as_str() {
                "testcase" => {
                    let suite = suite_names.last().map(String::as_str).unwrap_or("");
                    PendingCase::from_start(&e)?.finish(suite, &mut results);
                }
                "failure" | "error" => {
                    if let Some(c) = case.as_mut() {
                        c.failure = Some(attribute(&e, b"message")?.unwrap_or_default());
                    }
                }
                "skipped" => {
                    if let Some(c) = case.as_mut() {
                        c.skipped = Some(attribute(&e, b"message")?.unwrap_or_default());
                    }
                }
                _ => {}
            },
            Event::Text(t) => {
                if let Some(c) = case.as_mut().filter(|c| c.in_failure) {
                    let text = t.unescape().map_err(|err| JunitError::Malformed {
                        position: reader.buffer_position(),
                        message: err.to_string(),
                    })?;
                    c.failure_text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(c) = case.as_mut().filter(|c| c.in_failure) {
                    c.failure_text
                        .push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"testsuite" => {
                    suite_names.pop();
                }
                b"testcase" => {
                    if let Some(c) = case.take() {
                        let suite = suite_names.last().map(String::as_str).unwrap_or("");
                        c.finish(suite, &mut results);
                    }
                }
                b"failure" | b"error" => {
                    if let Some(c) = case.as_mut() {
                        c.in_failure = false;
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(JunitError::UnexpectedRoot {
            found: "no root element".to_string(),
        });
    }

    Ok(results)
}
