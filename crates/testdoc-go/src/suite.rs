//! Suite assembly: one [`TestSuite`] per Go test file.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};
use tree_sitter::Node;

use testdoc_core::config::DocConfig;
use testdoc_core::error::TestDocError;
use testdoc_core::types::{TestSuite, TestUnit};

use crate::collect::{FileContext, SubtestCollector};
use crate::comments::CommentIndex;
use crate::files::collect_test_files;
use crate::parse::{named_children, node_text, GoParser, ParseError};

/// Discover every documented test under `root`.
///
/// Fails only when `root` cannot be resolved to a directory inside a Go
/// module. Files that cannot be read or parsed are skipped with a warning.
pub fn parse_test_suites(root: &Path, config: &DocConfig) -> Result<Vec<TestSuite>, TestDocError> {
    let (module, files) = collect_test_files(root, &config.exclude_dirs)?;
    debug!(module = %module.path, files = files.len(), "collected test files");

    let mut parser = GoParser::new().map_err(|e| TestDocError::internal(e.to_string()))?;
    let mut suites = Vec::new();

    for file in &files {
        let source = match fs::read(&file.path) {
            Ok(source) => source,
            Err(e) => {
                warn!(file = %file.rel_path, error = %e, "skipping unreadable test file");
                continue;
            }
        };

        match parse_test_source(&mut parser, &file.package, &file.file_name(), &source, config) {
            Ok(Some(suite)) => {
                debug!(file = %file.rel_path, units = suite.unit_count(), "documented test file");
                suites.push(suite);
            }
            Ok(None) => debug!(file = %file.rel_path, "no test functions"),
            Err(e) => warn!(file = %file.rel_path, error = %e, "skipping test file"),
        }
    }

    Ok(suites)
}

/// Build the suite for one file's source.
///
/// Returns `Ok(None)` when the file declares no test functions.
pub fn parse_test_source(
    parser: &mut GoParser,
    package: &str,
    file_name: &str,
    source: &[u8],
    config: &DocConfig,
) -> Result<Option<TestSuite>, ParseError> {
    let tree = parser.parse(source, file_name)?;
    let root = tree.root_node();
    let comments = CommentIndex::from_tree(root, source);
    let ctx = FileContext {
        source,
        comments: &comments,
        run_method: &config.run_method,
        max_comment_gap: config.max_comment_gap,
    };

    let units: Vec<TestUnit> = named_children(root)
        .into_iter()
        .filter(|n| n.kind() == "function_declaration")
        .filter_map(|func| test_function(func, ctx, &config.test_prefix))
        .collect();
    if units.is_empty() {
        return Ok(None);
    }

    let mut suite = TestSuite::new(package, file_name, units);
    suite.description = package_doc(root, ctx);
    Ok(Some(suite))
}

/// A top-level test function as a root unit.
fn test_function(func: Node, ctx: FileContext, prefix: &str) -> Option<TestUnit> {
    let name = node_text(func.child_by_field_name("name")?, ctx.source);
    if !name.starts_with(prefix) {
        return None;
    }

    let subtests = match func.child_by_field_name("body") {
        Some(body) => SubtestCollector::collect(body, ctx, name, &[]),
        None => Vec::new(),
    };
    Some(TestUnit::root(name, ctx.comment_for(func), subtests))
}

/// The comment documenting the `package` clause, if any.
fn package_doc(root: Node, ctx: FileContext) -> Option<String> {
    let clause = named_children(root)
        .into_iter()
        .find(|n| n.kind() == "package_clause")?;
    let doc = ctx.comment_for(clause);
    (!doc.is_empty()).then_some(doc)
}
