//! Text position utilities for byte offset and line:column conversions.
//!
//! Syntax trees report positions both as byte offsets and as line/column
//! points. The comment binder deliberately re-derives byte offsets from the
//! line/column form against the file's own bytes, so these helpers are the
//! single place where the two coordinate systems meet.
//!
//! ## Coordinate Conventions
//!
//! - Lines and columns are **1-indexed** (matching editor conventions)
//! - Columns count bytes, not characters
//! - Byte offsets are **0-indexed**
//! - Line/column values of 0 do not address any byte

use serde::{Deserialize, Serialize};

/// A half-open byte range `[start, end)` into a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Conversions
// ============================================================================

/// Convert a byte offset to 1-indexed line and column.
///
/// If `offset` exceeds the content length, returns the position at the end
/// of the content.
pub fn byte_offset_to_position(content: &[u8], offset: usize) -> (u32, u32) {
    let offset = offset.min(content.len());
    let before = &content[..offset];
    let line = 1 + before.iter().filter(|&&b| b == b'\n').count() as u32;
    let line_start = before
        .iter()
        .rposition(|&b| b == b'\n')
        .map(|p| p + 1)
        .unwrap_or(0);
    let col = 1 + (offset - line_start) as u32;
    (line, col)
}

/// Convert 1-indexed line and column to a byte offset.
///
/// Returns `None` for line or column 0, a line beyond the content, or a
/// column past the end of its line. The line's newline is addressable.
pub fn checked_position_to_byte_offset(content: &[u8], line: u32, col: u32) -> Option<usize> {
    if col == 0 {
        return None;
    }
    let start = line_start_offset(content, line)?;
    let line_len = content[start..]
        .iter()
        .position(|&b| b == b'\n')
        .unwrap_or(content.len() - start);
    let col = (col - 1) as usize;
    (col <= line_len).then_some(start + col)
}

/// Byte offset of the first byte of a 1-indexed line.
///
/// Returns `None` when the content has fewer lines. A final line that is
/// empty because the content ends in a newline still exists.
pub fn line_start_offset(content: &[u8], line: u32) -> Option<usize> {
    if line == 0 {
        return None;
    }
    if line == 1 {
        return Some(0);
    }
    content
        .iter()
        .enumerate()
        .filter(|(_, b)| **b == b'\n')
        .nth((line - 2) as usize)
        .map(|(i, _)| i + 1)
}

// ============================================================================
// Span Utilities
// ============================================================================

/// Extract the bytes of a span.
///
/// Returns `None` if the span is inverted or extends beyond the content.
pub fn extract_span<'a>(content: &'a [u8], span: &Span) -> Option<&'a [u8]> {
    content.get(span.start..span.end)
}

/// Count newline bytes in a slice.
pub fn count_newlines(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| b == b'\n').count()
}

// ============================================================================
// Tests
// ============================================================================
