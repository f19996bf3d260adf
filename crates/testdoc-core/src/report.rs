//! Markdown rendering of a documented test tree.
//!
//! Each suite becomes a section with one table row per unit, in depth-first
//! order, joined with its JUnit record (or reported as NOT RUN).

use std::fmt::Write as _;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::TestDocError;
use crate::results::{result_key, JunitRecord, ResultMap, TestStatus};
use crate::types::{TestSuite, TestUnit};

/// Separator between ancestor names in the "Test Path" column.
pub const PATH_SEPARATOR: &str = " → ";

/// Directive comment lines (`//go:build`, `//nolint:...`, `// +build`).
static DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:go:\S|nolint\b|lint:|\s*\+build\b)").unwrap());

/// Rendering options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// Maximum failure-message characters (0 hides failure messages).
    pub fail_snippet: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions { fail_snippet: 300 }
    }
}

/// A unit joined with its recorded result.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedResult<'a> {
    pub status: TestStatus,
    pub record: Option<&'a JunitRecord>,
}

/// Look up the result for a unit of the given package.
pub fn resolve<'a>(results: &'a ResultMap, package: &str, unit: &TestUnit) -> ResolvedResult<'a> {
    let record = results.get(&result_key(package, &unit.machine_name));
    ResolvedResult {
        status: record.map_or(TestStatus::NotRun, |r| r.status),
        record,
    }
}

/// Render the full markdown report.
pub fn render_markdown(suites: &[TestSuite], results: &ResultMap, options: ReportOptions) -> String {
    let mut out = String::new();
    out.push_str("# Test Documentation Report\n\n");

    for suite in suites {
        let _ = write!(out, "## Test Suite: {}\n\n", suite.name);
        let description = suite.description.as_deref().map(comment_body);
        if let Some(description) = description.filter(|d| !d.is_empty()) {
            let _ = write!(out, "**Suite Description:**\n\n{}\n\n", description);
        }

        out.push_str("| Test Path | Status | Duration | Description | Failure |\n");
        out.push_str("|-----------|--------|----------|-------------|----------|\n");
        for unit in &suite.units {
            write_rows(&mut out, unit, &suite.package, results, None, options);
        }
        out.push('\n');
    }

    out
}

/// Render the report and write it to `path`.
pub fn write_markdown(
    path: &Path,
    suites: &[TestSuite],
    results: &ResultMap,
    options: ReportOptions,
) -> Result<(), TestDocError> {
    let markdown = render_markdown(suites, results, options);
    std::fs::write(path, markdown)
        .map_err(|e| TestDocError::output(path.display().to_string(), e.to_string()))
}

fn write_rows(
    out: &mut String,
    unit: &TestUnit,
    package: &str,
    results: &ResultMap,
    parent_path: Option<&str>,
    options: ReportOptions,
) {
    let path = match parent_path {
        Some(parent) => format!("{}{}{}", parent, PATH_SEPARATOR, unit.name),
        None => unit.name.clone(),
    };

    let resolved = resolve(results, package, unit);
    let duration = resolved
        .record
        .and_then(|r| r.duration.as_deref())
        .unwrap_or("-");
    let failure = match resolved.record {
        Some(record) if record.status == TestStatus::Fail => record
            .message
            .as_deref()
            .map(|m| table_cell(&truncate(m, options.fail_snippet)))
            .unwrap_or_default(),
        _ => String::new(),
    };
    let description = table_cell(&extract_summary(&unit.comment));

    let _ = writeln!(
        out,
        "| {} | {} {} | {} | {} | {} |",
        path,
        resolved.status.icon(),
        resolved.status.label(),
        duration,
        description,
        failure
    );

    for sub in &unit.subtests {
        write_rows(out, sub, package, results, Some(&path), options);
    }
}

/// Escape a value for use inside a markdown table cell.
fn table_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Truncate to at most `max` characters, appending `…` when shortened.
///
/// `max == 0` hides the text entirely.
pub fn truncate(text: &str, max: usize) -> String {
    if max == 0 || text.is_empty() {
        return String::new();
    }
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

/// Strip comment markers from one line of a comment block.
fn strip_markers(line: &str) -> &str {
    let line = line.trim();
    let line = line
        .strip_prefix("//")
        .or_else(|| line.strip_prefix("/*"))
        .unwrap_or(line);
    let line = line.strip_suffix("*/").unwrap_or(line);
    let line = line.trim_start();
    // continuation lines of block comments: " * text"
    let line = match line.strip_prefix('*') {
        Some(rest) if rest.is_empty() || rest.starts_with(' ') => rest,
        _ => line,
    };
    line.trim()
}

fn is_directive(line: &str) -> bool {
    DIRECTIVE.is_match(line.trim().trim_start_matches("//"))
}

/// A comment block's text without markers or directive lines.
pub fn comment_body(comment: &str) -> String {
    let lines: Vec<&str> = comment
        .lines()
        .filter(|raw| !is_directive(raw))
        .map(strip_markers)
        .collect();
    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !l.is_empty()).map_or(start, |i| i + 1);
    lines[start..end].join("\n")
}

/// First usable line of a comment block.
///
/// Comment markers are stripped; blank lines, `@tag` lines and tool
/// directives are skipped, except `@desc:` whose payload is returned.
pub fn extract_summary(comment: &str) -> String {
    for raw in comment.lines() {
        if is_directive(raw) {
            continue;
        }
        let line = strip_markers(raw);
        if let Some(desc) = line.strip_prefix("@desc:") {
            return desc.trim().to_string();
        }
        if line.is_empty() || line.starts_with('@') {
            continue;
        }
        return line.to_string();
    }
    String::new()
}
