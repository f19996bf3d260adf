//! Name expansion for sub-test names.
//!
//! A sub-test's name argument is an expression, often built from a loop
//! variable (`"case_" + tc`). Expansion evaluates it against the values the
//! visible loop variables can take and yields every concrete name, in order.

use tree_sitter::Node;

use crate::parse::{is_string_literal, named_children, node_text, unquote_go};

/// A loop variable and the values of the literal collection it ranges over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopBinding {
    pub name: String,
    pub values: Vec<String>,
}

impl LoopBinding {
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        LoopBinding {
            name: name.into(),
            values,
        }
    }
}

/// Every concrete string `expr` can evaluate to.
///
/// `bindings` are ordered outermost first; an inner binding shadows an outer
/// one with the same name. The result is never empty.
pub fn expand_name(expr: Node, source: &[u8], bindings: &[LoopBinding]) -> Vec<String> {
    let text = node_text(expr, source);
    match expr.kind() {
        "interpreted_string_literal" | "raw_string_literal" => {
            vec![unquote_go(text).unwrap_or_else(|| text.to_string())]
        }
        "binary_expression" if is_concatenation(expr) => {
            let (Some(left), Some(right)) = (
                expr.child_by_field_name("left"),
                expr.child_by_field_name("right"),
            ) else {
                return vec![text.to_string()];
            };
            let left = expand_name(left, source, bindings);
            let right = expand_name(right, source, bindings);
            left.iter()
                .flat_map(|l| right.iter().map(move |r| format!("{}{}", l, r)))
                .collect()
        }
        "identifier" => match bindings.iter().rev().find(|b| b.name == text) {
            Some(binding) if !binding.values.is_empty() => binding.values.clone(),
            _ => vec![text.to_string()],
        },
        _ => vec![text.to_string()],
    }
}

fn is_concatenation(expr: Node) -> bool {
    expr.child_by_field_name("operator")
        .is_some_and(|op| op.kind() == "+")
}

/// Element values of a composite literal, in source order.
///
/// String elements are unquoted (malformed ones are dropped); every other
/// element contributes its source text. Anything but a composite literal
/// has no values.
pub fn range_values(collection: Node, source: &[u8]) -> Vec<String> {
    if collection.kind() != "composite_literal" {
        return Vec::new();
    }
    let Some(body) = collection.child_by_field_name("body") else {
        return Vec::new();
    };

    named_children(body)
        .into_iter()
        .filter(|element| element.kind() != "comment")
        .filter_map(|element| {
            let value = match element.kind() {
                "literal_element" => named_children(element)
                    .into_iter()
                    .find(|n| n.kind() != "comment")
                    .unwrap_or(element),
                _ => element,
            };
            if is_string_literal(value) {
                unquote_go(node_text(value, source))
            } else {
                Some(node_text(value, source).to_string())
            }
        })
        .collect()
}
