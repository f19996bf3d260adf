//! JSON output types and serialization for CLI responses.
//!
//! Every response carries `status` first and a `schema_version`, so callers
//! can branch on success before reading the payload. Field and array order is
//! deterministic: suites and units keep discovery order.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{OutputErrorCode, TestDocError};
use crate::report::{extract_summary, resolve, truncate, ReportOptions};
use crate::results::{ResultMap, TestStatus};
use crate::types::{TestSuite, TestUnit};

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Report Response
// ============================================================================

/// Response for `testdoc report --format json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// One entry per test file, in discovery order.
    pub suites: Vec<SuiteReport>,
}

/// One documented test file joined with its results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub package: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub units: Vec<UnitReport>,
}

/// One test unit joined with its result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitReport {
    pub name: String,
    pub machine_name: String,
    /// Bound comment verbatim.
    pub comment: String,
    /// First usable comment line.
    pub summary: String,
    pub status: TestStatus,
    /// Explicit `null` when the runner recorded no time.
    pub duration: Option<String>,
    /// Failure message, present only for failed units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    pub subtests: Vec<UnitReport>,
}

impl ReportResponse {
    /// Join discovered suites with results.
    pub fn new(suites: &[TestSuite], results: &ResultMap, options: ReportOptions) -> Self {
        ReportResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            suites: suites
                .iter()
                .map(|suite| SuiteReport {
                    package: suite.package.clone(),
                    name: suite.name.clone(),
                    description: suite.description.clone(),
                    units: suite
                        .units
                        .iter()
                        .map(|u| UnitReport::new(u, &suite.package, results, options))
                        .collect(),
                })
                .collect(),
        }
    }
}

impl UnitReport {
    fn new(unit: &TestUnit, package: &str, results: &ResultMap, options: ReportOptions) -> Self {
        let resolved = resolve(results, package, unit);
        let failure = resolved
            .record
            .filter(|r| r.status == TestStatus::Fail)
            .and_then(|r| r.message.as_deref())
            .map(|m| truncate(m, options.fail_snippet))
            .filter(|m| !m.is_empty());

        UnitReport {
            name: unit.name.clone(),
            machine_name: unit.machine_name.clone(),
            comment: unit.comment.clone(),
            summary: extract_summary(&unit.comment),
            status: resolved.status,
            duration: resolved.record.and_then(|r| r.duration.clone()),
            failure,
            subtests: unit
                .subtests
                .iter()
                .map(|sub| UnitReport::new(sub, package, results, options))
                .collect(),
        }
    }
}

// ============================================================================
// List Response
// ============================================================================

/// Response for `testdoc list --format json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub status: String,
    pub schema_version: String,
    /// Total units across all suites, sub-tests included.
    pub unit_count: usize,
    pub suites: Vec<TestSuite>,
}

impl ListResponse {
    pub fn new(suites: Vec<TestSuite>) -> Self {
        ListResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            unit_count: suites.iter().map(TestSuite::unit_count).sum(),
            suites,
        }
    }
}

// ============================================================================
// Error Response
// ============================================================================

/// Error details for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code (the process exit code).
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Path the error refers to, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ErrorInfo {
    /// Create from a TestDocError.
    pub fn from_error(err: &TestDocError) -> Self {
        let path = match err {
            TestDocError::RootNotFound { path }
            | TestDocError::ModuleNotFound { path }
            | TestDocError::Output { path, .. } => Some(path.clone()),
            _ => None,
        };
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
            path,
        }
    }
}

/// Response emitted when a command fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn from_error(err: &TestDocError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Emission
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}
