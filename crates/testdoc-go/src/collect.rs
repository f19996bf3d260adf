//! Sub-test discovery.
//!
//! [`SubtestCollector`] walks a test function (or closure) body and turns
//! every `t.Run(name, func(...) {...})` call into [`TestUnit`]s, recursing
//! into the closure for nested sub-tests. Range loops over a literal
//! collection bind their value variable, so a call inside the loop yields
//! one unit per element.
//!
//! ```go
//! for _, tc := range []string{"a", "b"} {
//!     t.Run("case_"+tc, func(t *testing.T) { ... })   // case_a, case_b
//! }
//! ```

use tree_sitter::Node;

use testdoc_core::types::{child_machine_name, TestUnit};

use crate::comments::{Anchor, CommentIndex};
use crate::expand::{expand_name, range_values, LoopBinding};
use crate::parse::{named_children, node_text};

/// Per-file inputs shared by every level of the walk.
#[derive(Debug, Clone, Copy)]
pub struct FileContext<'a> {
    pub source: &'a [u8],
    pub comments: &'a CommentIndex,
    /// Method name that registers a sub-test.
    pub run_method: &'a str,
    /// Comment binder byte tolerance.
    pub max_comment_gap: usize,
}

impl FileContext<'_> {
    /// The comment documenting the node, or an empty string.
    pub fn comment_for(&self, node: Node) -> String {
        self.comments
            .bind(Anchor::of(node), self.source, self.max_comment_gap)
    }
}

/// Result of visiting a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Walk {
    /// Visit the node's children.
    Continue,
    /// The node was fully handled; skip its children.
    SkipChildren,
}

/// A `t.Run` call whose second argument is a function literal.
struct RunCall<'t> {
    call: Node<'t>,
    name: Node<'t>,
    body: Option<Node<'t>>,
}

/// Collects the sub-tests declared in one body.
pub struct SubtestCollector<'a> {
    ctx: FileContext<'a>,
    parent_machine: &'a str,
    bindings: &'a [LoopBinding],
    units: Vec<TestUnit>,
}

impl<'a> SubtestCollector<'a> {
    /// Collect the sub-tests declared inside `body`, in source order.
    ///
    /// `parent_machine` is the machine name of the enclosing unit and
    /// `bindings` the loop variables visible at `body`, outermost first.
    pub fn collect(
        body: Node,
        ctx: FileContext<'a>,
        parent_machine: &'a str,
        bindings: &'a [LoopBinding],
    ) -> Vec<TestUnit> {
        let mut collector = SubtestCollector {
            ctx,
            parent_machine,
            bindings,
            units: Vec::new(),
        };
        collector.walk(body);
        collector.units
    }

    fn walk(&mut self, node: Node) {
        if self.visit(node) == Walk::SkipChildren {
            return;
        }
        for child in named_children(node) {
            self.walk(child);
        }
    }

    fn visit(&mut self, node: Node) -> Walk {
        match node.kind() {
            "for_statement" => self.visit_range_loop(node),
            "call_expression" => match self.run_call(node) {
                Some(run) => {
                    self.add_run(run);
                    Walk::SkipChildren
                }
                None => Walk::Continue,
            },
            _ => Walk::Continue,
        }
    }

    /// A range loop over a composite literal: collect its body with the
    /// value variable bound. Other loops are walked as plain statements.
    fn visit_range_loop(&mut self, node: Node) -> Walk {
        let Some(clause) = named_children(node)
            .into_iter()
            .find(|n| n.kind() == "range_clause")
        else {
            return Walk::Continue;
        };
        let Some(collection) = clause
            .child_by_field_name("right")
            .filter(|n| n.kind() == "composite_literal")
        else {
            return Walk::Continue;
        };
        let Some(body) = node.child_by_field_name("body") else {
            return Walk::SkipChildren;
        };

        let mut bindings = self.bindings.to_vec();
        if let Some(name) = value_variable(clause, self.ctx.source) {
            bindings.push(LoopBinding::new(
                name,
                range_values(collection, self.ctx.source),
            ));
        }

        let units = SubtestCollector::collect(body, self.ctx, self.parent_machine, &bindings);
        self.units.extend(units);
        Walk::SkipChildren
    }

    fn run_call<'t>(&self, call: Node<'t>) -> Option<RunCall<'t>> {
        let function = call.child_by_field_name("function")?;
        if function.kind() != "selector_expression" {
            return None;
        }
        let method = function.child_by_field_name("field")?;
        if node_text(method, self.ctx.source) != self.ctx.run_method {
            return None;
        }

        let args: Vec<Node<'t>> = named_children(call.child_by_field_name("arguments")?)
            .into_iter()
            .filter(|n| n.kind() != "comment")
            .collect();
        if args.len() < 2 || args[1].kind() != "func_literal" {
            return None;
        }
        Some(RunCall {
            call,
            name: args[0],
            body: args[1].child_by_field_name("body"),
        })
    }

    fn add_run(&mut self, run: RunCall) {
        let comment = self.ctx.comment_for(run.call);
        for name in expand_name(run.name, self.ctx.source, self.bindings) {
            let machine = child_machine_name(self.parent_machine, &name);
            let subtests = match run.body {
                Some(body) => SubtestCollector::collect(body, self.ctx, &machine, self.bindings),
                None => Vec::new(),
            };
            self.units.push(TestUnit::child(
                self.parent_machine,
                name,
                comment.clone(),
                subtests,
            ));
        }
    }
}

/// The loop's value variable: the second identifier on the left.
fn value_variable(clause: Node, source: &[u8]) -> Option<String> {
    let left = clause.child_by_field_name("left")?;
    named_children(left)
        .into_iter()
        .filter(|n| n.kind() != "comment")
        .nth(1)
        .filter(|n| n.kind() == "identifier")
        .map(|n| node_text(n, source).to_string())
}
