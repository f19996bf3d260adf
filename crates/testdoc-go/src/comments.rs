//! Comment blocks and the comment binder.
//!
//! Go attaches documentation by adjacency: a comment block documents the
//! code that immediately follows it. [`CommentIndex`] groups a file's
//! comment tokens into blocks once, and [`CommentIndex::bind`] finds the
//! block that documents a given position.
//!
//! ## Grouping
//!
//! Consecutive comments form one block when only whitespace with at most
//! one newline separates them. A comment trailing code on its line always
//! stands alone.
//!
//! ## Binding
//!
//! The first block ending at or before the target within `max_gap` bytes
//! decides the outcome: it binds unless the gap holds more than one
//! newline, in which case nothing binds.

use tracing::warn;
use tree_sitter::Node;

use testdoc_core::text::{
    checked_position_to_byte_offset, count_newlines, extract_span, line_start_offset, Span,
};

use crate::parse::{named_children, node_text};

/// A position to bind a comment to, in both coordinate forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    /// Byte offset.
    pub offset: usize,
    /// 1-indexed line.
    pub line: u32,
    /// 1-indexed byte column.
    pub col: u32,
}

impl Anchor {
    /// The start of a node.
    pub fn of(node: Node) -> Self {
        let point = node.start_position();
        Anchor {
            offset: node.start_byte(),
            line: point.row as u32 + 1,
            col: point.column as u32 + 1,
        }
    }
}

/// A run of adjacent comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentBlock {
    /// Byte range from the first comment's start to the last one's end.
    pub span: Span,
    /// 1-indexed line and column of the end of the block.
    pub end_line: u32,
    pub end_col: u32,
    /// Comment texts joined by newlines, markers included.
    pub text: String,
    /// Whether the block is a comment trailing code on its line.
    pub trailing: bool,
}

/// All comment blocks of one file, in source order.
#[derive(Debug, Clone, Default)]
pub struct CommentIndex {
    blocks: Vec<CommentBlock>,
}

impl CommentIndex {
    /// Group every comment in the tree rooted at `root`.
    pub fn from_tree(root: Node, source: &[u8]) -> Self {
        let mut comments = Vec::new();
        gather_comments(root, &mut comments);

        let mut blocks: Vec<CommentBlock> = Vec::new();
        for comment in comments {
            let text = comment_text(node_text(comment, source));
            let end = comment.end_position();
            let end_line = end.row as u32 + 1;
            let end_col = end.column as u32 + 1;
            let trailing = follows_code(source, comment);

            if let Some(last) = blocks.last_mut() {
                if !trailing && !last.trailing && joins(source, last.span.end, comment.start_byte())
                {
                    last.span.end = comment.end_byte();
                    last.end_line = end_line;
                    last.end_col = end_col;
                    last.text.push('\n');
                    last.text.push_str(&text);
                    continue;
                }
            }

            blocks.push(CommentBlock {
                span: Span::new(comment.start_byte(), comment.end_byte()),
                end_line,
                end_col,
                text,
                trailing,
            });
        }

        CommentIndex { blocks }
    }

    pub fn blocks(&self) -> &[CommentBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The text of the block documenting `target`, or an empty string.
    pub fn bind(&self, target: Anchor, source: &[u8], max_gap: usize) -> String {
        let Some(block) = self.blocks.iter().find(|b| {
            b.span.end <= target.offset && target.offset - b.span.end <= max_gap
        }) else {
            return String::new();
        };

        // Offsets are re-derived from line/column against the bytes we hold.
        let gap_start = checked_position_to_byte_offset(source, block.end_line, block.end_col);
        let gap_end = checked_position_to_byte_offset(source, target.line, target.col);
        let gap = gap_start
            .zip(gap_end)
            .and_then(|(start, end)| extract_span(source, &Span::new(start, end)));
        let Some(gap) = gap else {
            warn!(
                block_end_line = block.end_line,
                target_line = target.line,
                len = source.len(),
                "comment gap not addressable in source; leaving comment unbound"
            );
            return String::new();
        };

        if count_newlines(gap) > 1 {
            return String::new();
        }
        block.text.clone()
    }
}

fn gather_comments<'t>(node: Node<'t>, out: &mut Vec<Node<'t>>) {
    if node.kind() == "comment" {
        out.push(node);
        return;
    }
    for child in named_children(node) {
        gather_comments(child, out);
    }
}

/// Comment token text with CRLF line endings folded to `\n`.
fn comment_text(raw: &str) -> String {
    raw.trim_end_matches('\r').replace("\r\n", "\n")
}

/// Whether only whitespace with at most one newline lies between two offsets.
fn joins(source: &[u8], prev_end: usize, next_start: usize) -> bool {
    match source.get(prev_end..next_start) {
        Some(gap) => gap.iter().all(u8::is_ascii_whitespace) && count_newlines(gap) <= 1,
        None => false,
    }
}

/// Whether non-whitespace precedes the comment on its first line.
fn follows_code(source: &[u8], comment: Node) -> bool {
    let row = comment.start_position().row as u32 + 1;
    let line_start = line_start_offset(source, row).unwrap_or(0);
    source
        .get(line_start..comment.start_byte())
        .is_some_and(|prefix| prefix.iter().any(|b| !b.is_ascii_whitespace()))
}
