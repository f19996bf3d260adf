//! Go parsing via tree-sitter.
//!
//! Thin wrapper over a tree-sitter parser configured with the Go grammar,
//! plus the small literal helpers the collector needs.

use thiserror::Error;
use tree_sitter::{Node, Parser, Tree};

use testdoc_core::text::byte_offset_to_position;

// ============================================================================
// Error Types
// ============================================================================

/// Error type for parsing a Go source file.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The grammar could not be loaded (ABI mismatch).
    #[error("failed to load Go grammar: {0}")]
    Language(String),

    /// The parser produced no tree.
    #[error("failed to parse {path}")]
    Failed { path: String },

    /// The file contains syntax errors.
    #[error("syntax error in {path} at {line}:{col}")]
    Syntax { path: String, line: u32, col: u32 },
}

// ============================================================================
// Parser
// ============================================================================

/// A reusable Go parser.
pub struct GoParser {
    parser: Parser,
}

impl GoParser {
    pub fn new() -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .map_err(|e| ParseError::Language(e.to_string()))?;
        Ok(GoParser { parser })
    }

    /// Parse a source file, rejecting trees that contain syntax errors.
    pub fn parse(&mut self, source: &[u8], path: &str) -> Result<Tree, ParseError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| ParseError::Failed {
                path: path.to_string(),
            })?;

        let root = tree.root_node();
        if root.has_error() {
            let offset = first_error(root).map_or(0, |n| n.start_byte());
            let (line, col) = byte_offset_to_position(source, offset);
            return Err(ParseError::Syntax {
                path: path.to_string(),
                line,
                col,
            });
        }
        Ok(tree)
    }
}

/// First `ERROR` or missing node in document order.
fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

// ============================================================================
// Node Helpers
// ============================================================================

/// Source text of a node; empty if the bytes are not UTF-8.
pub fn node_text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// Named children of a node, in source order.
pub fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Whether a node is a Go string literal.
pub fn is_string_literal(node: Node) -> bool {
    matches!(
        node.kind(),
        "interpreted_string_literal" | "raw_string_literal"
    )
}

/// Unquote a Go string literal token.
///
/// Raw strings drop their backticks and any carriage returns. Interpreted
/// strings have their escape sequences decoded. Returns `None` when the
/// token is not a well-formed literal.
pub fn unquote_go(literal: &str) -> Option<String> {
    if let Some(body) = literal
        .strip_prefix('`')
        .and_then(|s| s.strip_suffix('`'))
    {
        return Some(body.replace('\r', ""));
    }

    let body = literal.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(body.len());
    let mut bytes: Vec<u8> = Vec::new();
    let mut chars = body.chars();

    // \x and octal escapes produce raw bytes that may combine into UTF-8.
    let flush = |bytes: &mut Vec<u8>, out: &mut String| -> Option<()> {
        if !bytes.is_empty() {
            out.push_str(std::str::from_utf8(bytes).ok()?);
            bytes.clear();
        }
        Some(())
    };

    while let Some(c) = chars.next() {
        if c == '\n' || c == '"' {
            return None;
        }
        if c != '\\' {
            flush(&mut bytes, &mut out)?;
            out.push(c);
            continue;
        }

        let escape = chars.next()?;
        match escape {
            'x' => bytes.push(take_hex(&mut chars, 2)? as u8),
            '0'..='7' => {
                let mut value = escape.to_digit(8)?;
                for _ in 0..2 {
                    value = value * 8 + chars.next()?.to_digit(8)?;
                }
                bytes.push(u8::try_from(value).ok()?);
            }
            _ => {
                flush(&mut bytes, &mut out)?;
                let decoded = match escape {
                    'a' => '\u{07}',
                    'b' => '\u{08}',
                    'f' => '\u{0C}',
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    'v' => '\u{0B}',
                    '\\' => '\\',
                    '"' => '"',
                    'u' => char::from_u32(take_hex(&mut chars, 4)?)?,
                    'U' => char::from_u32(take_hex(&mut chars, 8)?)?,
                    _ => return None,
                };
                out.push(decoded);
            }
        }
    }
    flush(&mut bytes, &mut out)?;
    Some(out)
}

fn take_hex(chars: &mut impl Iterator<Item = char>, digits: usize) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..digits {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    Some(value)
}
