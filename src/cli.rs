//! CLI command implementations.
//!
//! Each `run_*` function implements one subcommand over explicit arguments
//! and returns `Result<_, TestDocError>`; argument parsing, logging setup
//! and exit codes live in the binary.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use testdoc_core::config::Config;
use testdoc_core::error::TestDocError;
use testdoc_core::output::ReportResponse;
use testdoc_core::report::{write_markdown, ReportOptions};
use testdoc_core::results::{parse_junit_file, ResultMap};
use testdoc_core::types::{TestSuite, TestUnit};
use testdoc_go::parse_test_suites;

/// Report output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Markdown,
    Json,
}

/// Inputs of `testdoc report`.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub source: PathBuf,
    pub junit: PathBuf,
    pub output: PathBuf,
    pub format: ReportFormat,
    /// Overrides the configured failure snippet length.
    pub fail_snippet: Option<usize>,
}

/// What `testdoc report` produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub output: PathBuf,
    pub suites: usize,
    pub units: usize,
    /// Number of JUnit records loaded (0 when results were unusable).
    pub results: usize,
}

// ============================================================================
// Configuration
// ============================================================================

/// Load configuration from an explicit path, or from the source root.
pub fn load_config(source: &Path, explicit: Option<&Path>) -> Result<Config, TestDocError> {
    match explicit {
        Some(path) => Config::load(path),
        None => Config::load_from_root(source),
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Read JUnit results, degrading to an empty map on any failure.
pub fn load_results(junit: &Path) -> ResultMap {
    match parse_junit_file(junit) {
        Ok(results) => {
            info!(path = %junit.display(), records = results.len(), "loaded junit results");
            results
        }
        Err(e) => {
            warn!(path = %junit.display(), error = %e, "reading junit failed; all tests report NOT RUN");
            ResultMap::new()
        }
    }
}

/// Discover tests, merge results and write the report.
pub fn run_report(request: &ReportRequest, config: &Config) -> Result<ReportSummary, TestDocError> {
    let suites = parse_test_suites(&request.source, &config.testdoc)?;
    let results = load_results(&request.junit);
    let options = ReportOptions {
        fail_snippet: request.fail_snippet.unwrap_or(config.testdoc.fail_snippet),
    };

    match request.format {
        ReportFormat::Markdown => write_markdown(&request.output, &suites, &results, options)?,
        ReportFormat::Json => write_json(&request.output, &suites, &results, options)?,
    }

    let summary = ReportSummary {
        output: request.output.clone(),
        suites: suites.len(),
        units: suites.iter().map(TestSuite::unit_count).sum(),
        results: results.len(),
    };
    info!(
        output = %summary.output.display(),
        suites = summary.suites,
        units = summary.units,
        "wrote report"
    );
    Ok(summary)
}

fn write_json(
    path: &Path,
    suites: &[TestSuite],
    results: &ResultMap,
    options: ReportOptions,
) -> Result<(), TestDocError> {
    let response = ReportResponse::new(suites, results, options);
    let mut json =
        serde_json::to_string_pretty(&response).map_err(|e| TestDocError::internal(e.to_string()))?;
    json.push('\n');
    fs::write(path, json).map_err(|e| TestDocError::output(path.display().to_string(), e.to_string()))
}

/// Discover tests without merging results.
pub fn run_list(source: &Path, config: &Config) -> Result<Vec<TestSuite>, TestDocError> {
    parse_test_suites(source, &config.testdoc)
}

/// Render the discovered tree as indented text.
pub fn format_tree(suites: &[TestSuite]) -> String {
    let mut out = String::new();
    for suite in suites {
        let _ = writeln!(out, "Package: {}", suite.package);
        let _ = writeln!(out, "Suite: {}", suite.name);
        if let Some(description) = &suite.description {
            let _ = writeln!(out, "Comments:\n{}", description);
        }
        for unit in &suite.units {
            format_unit(&mut out, unit, "");
        }
    }
    out
}

fn format_unit(out: &mut String, unit: &TestUnit, indent: &str) {
    let _ = writeln!(out, "{}Test: {}", indent, unit.name);
    let _ = writeln!(out, "{}Machine Name: {}", indent, unit.machine_name);
    if !unit.comment.is_empty() {
        let _ = writeln!(out, "{}Comments:\n{}", indent, unit.comment);
    }
    let child_indent = format!("{}  ", indent);
    for sub in &unit.subtests {
        format_unit(out, sub, &child_indent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_text_is_indented_by_depth() {
        let sub = TestUnit::child("TestA", "case a", "// first".to_string(), Vec::new());
        let root = TestUnit::root("TestA", String::new(), vec![sub]);
        let suite = TestSuite::new("example.com/m", "a_test.go", vec![root]);
        assert_eq!(
            format_tree(&[suite]),
            "Package: example.com/m\n\
             Suite: a_test.go\n\
             Test: TestA\n\
             Machine Name: TestA\n  \
             Test: case a\n  \
             Machine Name: TestA/case_a\n  \
             Comments:\n\
             // first\n"
        );
    }

    #[test]
    fn unreadable_results_become_empty() {
        assert!(load_results(Path::new("/nonexistent/junit.xml")).is_empty());
    }

    #[test]
    fn markdown_report_is_written_to_output() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("go.mod"), "module example.com/m\n").unwrap();
        fs::write(
            dir.path().join("a_test.go"),
            "package m\n\nimport \"testing\"\n\nfunc TestA(t *testing.T) {}\n",
        )
        .unwrap();
        let request = ReportRequest {
            source: dir.path().to_path_buf(),
            junit: dir.path().join("missing.xml"),
            output: dir.path().join("TESTS.md"),
            format: ReportFormat::Markdown,
            fail_snippet: None,
        };

        let summary = run_report(&request, &Config::default()).unwrap();
        assert_eq!(summary.units, 1);
        assert_eq!(summary.results, 0);
        let report = fs::read_to_string(&request.output).unwrap();
        assert!(report.contains("| TestA | ⚪ NOT RUN | - |"));
    }

    #[test]
    fn markdown_report_to_missing_directory_is_output_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("go.mod"), "module example.com/m\n").unwrap();
        let request = ReportRequest {
            source: dir.path().to_path_buf(),
            junit: dir.path().join("missing.xml"),
            output: dir.path().join("no/such/TESTS.md"),
            format: ReportFormat::Markdown,
            fail_snippet: None,
        };

        let err = run_report(&request, &Config::default()).unwrap_err();
        assert!(matches!(err, TestDocError::Output { .. }));
    }

    #[test]
    fn explicit_config_must_exist() {
        let err = load_config(Path::new("."), Some(Path::new("/nonexistent/testdoc.toml")))
            .unwrap_err();
        assert!(matches!(err, TestDocError::Config { .. }));
    }
}
