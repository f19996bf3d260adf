//! testdoc: documentation reports for Go test suites.
//!
//! Statically discovers Go test functions and `t.Run` sub-tests, binds each
//! to its documentation comment, merges JUnit results by test identity and
//! renders a markdown or JSON report.

// Core infrastructure - re-exported from testdoc-core
pub use testdoc_core::config;
pub use testdoc_core::error;
pub use testdoc_core::output;
pub use testdoc_core::report;
pub use testdoc_core::results;
pub use testdoc_core::text;
pub use testdoc_core::types;

// Language adapter
pub use testdoc_go as go;

// Front door
pub mod cli;
