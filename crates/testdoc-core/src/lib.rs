//! Core infrastructure for testdoc.
//!
//! This crate provides language-agnostic infrastructure:
//! - The discovered test tree (`TestSuite`, `TestUnit`)
//! - Error types and exit codes
//! - Configuration loading
//! - JUnit result parsing and lookup keys
//! - Markdown and JSON report rendering
//! - Text position utilities

pub mod config;
pub mod error;
pub mod output;
pub mod report;
pub mod results;
pub mod text;
pub mod types;
