//! Go language support for testdoc.
//!
//! Statically discovers Go test functions and their `t.Run` sub-tests using
//! tree-sitter, including sub-tests generated by ranging over literal
//! collections, and binds each to its documentation comment.
//!
//! ## Module Structure
//!
//! - `files`: module resolution and `*_test.go` discovery
//! - `parse`: tree-sitter parser wrapper and literal helpers
//! - `comments`: comment grouping and the comment binder
//! - `expand`: loop bindings and name expansion
//! - `collect`: the sub-test collector
//! - `suite`: per-file suite assembly

pub mod collect;
pub mod comments;
pub mod expand;
pub mod files;
pub mod parse;
pub mod suite;

pub use suite::{parse_test_source, parse_test_suites};
