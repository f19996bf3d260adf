//! CLI end-to-end tests.
//!
//! These tests spawn the actual `testdoc` binary against throwaway Go
//! modules and validate the written reports and exit codes.
//!
//! Exit code expectations:
//! - 0: Success
//! - 2: Invalid arguments or configuration
//! - 3: Resolution error (source root or go.mod not found)
//! - 4: Output error (report could not be written)

use std::fs;
use std::path::Path;
use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

const SAMPLE_TEST: &str = r#"package testproject

import "testing"

// TestBasicFunction tests basic functionality
func TestBasicFunction(t *testing.T) {
	if 1+1 != 2 {
		t.Error("math is broken")
	}
}

// TestWithSubtests demonstrates subtests
func TestWithSubtests(t *testing.T) {
	for _, input := range []string{"input1", "input2"} {
		t.Run("subtest for "+input, func(t *testing.T) {})
	}
}
"#;

const JUNIT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuites>
	<testsuite name="testproject" tests="4" failures="1" time="0.123">
		<testcase classname="testproject" name="TestBasicFunction" time="0.001"></testcase>
		<testcase classname="testproject" name="TestWithSubtests" time="0.005"></testcase>
		<testcase classname="testproject" name="TestWithSubtests/subtest_for_input1" time="0.002"></testcase>
		<testcase classname="testproject" name="TestWithSubtests/subtest_for_input2" time="0.003">
			<failure message="test failed" type="assertion"></failure>
		</testcase>
	</testsuite>
</testsuites>"#;

// ============================================================================
// Test Infrastructure
// ============================================================================

/// Run testdoc with given arguments and return (stdout, stderr, exit_code).
fn run_testdoc(args: &[&str], cwd: &Path) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_testdoc"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute testdoc");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

/// A module named `testproject` with the sample test and JUnit file.
fn sample_project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("go.mod"), "module testproject\n\ngo 1.22\n").unwrap();
    fs::write(dir.path().join("sample_test.go"), SAMPLE_TEST).unwrap();
    fs::write(dir.path().join("junit.xml"), JUNIT).unwrap();
    dir
}

// ============================================================================
// report
// ============================================================================

#[test]
fn report_writes_markdown() {
    let dir = sample_project();
    let (stdout, stderr, code) = run_testdoc(
        &["report", "--source", ".", "--junit", "junit.xml", "-o", "TESTS.md"],
        dir.path(),
    );
    assert_eq!(code, 0, "stderr: {}", stderr);
    assert!(stdout.contains("wrote TESTS.md"));

    let report = fs::read_to_string(dir.path().join("TESTS.md")).unwrap();
    assert!(report.contains("# Test Documentation Report"));
    assert!(report.contains("## Test Suite: sample_test.go"));
    assert!(report.contains(
        "| TestBasicFunction | ✅ PASS | 0.001s | TestBasicFunction tests basic functionality |"
    ));
    assert!(report.contains("| TestWithSubtests → subtest for input1 | ✅ PASS | 0.002s |"));
    assert!(report.contains(
        "| TestWithSubtests → subtest for input2 | ❌ FAIL | 0.003s |  | test failed |"
    ));
}

#[test]
fn report_without_usable_results_marks_not_run() {
    let dir = sample_project();
    fs::write(dir.path().join("junit.xml"), "invalid xml content").unwrap();
    let (_stdout, stderr, code) = run_testdoc(
        &["report", "--junit", "junit.xml", "-o", "out.md"],
        dir.path(),
    );
    assert_eq!(code, 0, "stderr: {}", stderr);
    assert!(stderr.contains("reading junit failed"));

    let report = fs::read_to_string(dir.path().join("out.md")).unwrap();
    assert_eq!(report.matches("⚪ NOT RUN").count(), 4);
}

#[test]
fn report_missing_junit_still_succeeds() {
    let dir = sample_project();
    let (_stdout, stderr, code) = run_testdoc(
        &["report", "--junit", "missing.xml", "-o", "out.md"],
        dir.path(),
    );
    assert_eq!(code, 0, "stderr: {}", stderr);
    assert!(dir.path().join("out.md").exists());
}

#[test]
fn report_json_format() {
    let dir = sample_project();
    let (_stdout, stderr, code) = run_testdoc(
        &[
            "report", "--junit", "junit.xml", "--format", "json", "-o", "report.json",
        ],
        dir.path(),
    );
    assert_eq!(code, 0, "stderr: {}", stderr);

    let json: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("report.json")).unwrap())
            .unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["schema_version"], "1");
    let unit = &json["suites"][0]["units"][1]["subtests"][1];
    assert_eq!(unit["machine_name"], "TestWithSubtests/subtest_for_input2");
    assert_eq!(unit["status"], "FAIL");
    assert_eq!(unit["failure"], "test failed");
}

#[test]
fn fail_snippet_flag_truncates_failures() {
    let dir = sample_project();
    let (_stdout, stderr, code) = run_testdoc(
        &["report", "--junit", "junit.xml", "--fail-snippet", "4", "-o", "TESTS.md"],
        dir.path(),
    );
    assert_eq!(code, 0, "stderr: {}", stderr);
    let report = fs::read_to_string(dir.path().join("TESTS.md")).unwrap();
    assert!(report.contains("| test… |"));
}

#[test]
fn config_file_sets_snippet_length() {
    let dir = sample_project();
    fs::write(dir.path().join("testdoc.toml"), "[testdoc]\nfail_snippet = 0\n").unwrap();
    let (_stdout, stderr, code) = run_testdoc(
        &["report", "--junit", "junit.xml", "-o", "TESTS.md"],
        dir.path(),
    );
    assert_eq!(code, 0, "stderr: {}", stderr);
    let report = fs::read_to_string(dir.path().join("TESTS.md")).unwrap();
    assert!(!report.contains("test failed"));
}

#[test]
fn invalid_config_returns_exit_2() {
    let dir = sample_project();
    fs::write(dir.path().join("testdoc.toml"), "[testdoc]\nfail_snippet = \"x\"\n").unwrap();
    let (_stdout, stderr, code) = run_testdoc(
        &["report", "--junit", "junit.xml"],
        dir.path(),
    );
    assert_eq!(code, 2);
    let json: Value = serde_json::from_str(&stderr).expect("stderr should be JSON");
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"]["code"], 2);
}

#[test]
fn missing_source_returns_exit_3() {
    let dir = sample_project();
    let (_stdout, stderr, code) = run_testdoc(
        &["report", "--source", "nope", "--junit", "junit.xml"],
        dir.path(),
    );
    assert_eq!(code, 3);
    let json: Value = serde_json::from_str(&stderr).expect("stderr should be JSON");
    assert_eq!(json["error"]["code"], 3);
}

#[test]
fn unwritable_output_returns_exit_4() {
    let dir = sample_project();
    let (_stdout, _stderr, code) = run_testdoc(
        &["report", "--junit", "junit.xml", "-o", "no/such/dir/TESTS.md"],
        dir.path(),
    );
    assert_eq!(code, 4);
}

#[test]
fn missing_junit_flag_is_usage_error() {
    let dir = sample_project();
    let (_stdout, _stderr, code) = run_testdoc(&["report"], dir.path());
    assert_eq!(code, 2);
}

// ============================================================================
// list
// ============================================================================

#[test]
fn list_prints_tree() {
    let dir = sample_project();
    let (stdout, stderr, code) = run_testdoc(&["list"], dir.path());
    assert_eq!(code, 0, "stderr: {}", stderr);
    assert!(stdout.starts_with("Package: testproject\nSuite: sample_test.go\n"));
    assert!(stdout.contains("Test: TestWithSubtests\nMachine Name: TestWithSubtests\n"));
    assert!(stdout.contains("  Machine Name: TestWithSubtests/subtest_for_input2\n"));
}

#[test]
fn list_json() {
    let dir = sample_project();
    let (stdout, stderr, code) = run_testdoc(&["list", "--format", "json"], dir.path());
    assert_eq!(code, 0, "stderr: {}", stderr);
    let json: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["unit_count"], 4);
    assert_eq!(json["suites"][0]["package"], "testproject");
}
