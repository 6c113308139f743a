//! Semantic walking over a parsed chunk
//!
//! Runs after the tree has been printed. [`AssignmentWalker`] reports every
//! assignment it meets and enforces the compile-time rules the parser
//! leaves open: `break` must sit inside a loop and `...` inside a vararg
//! function.

use crate::frontend::ast::AstNode;
use crate::frontend::token_types as types;
use crate::utils::{Error, Result};

/// A pass over a finished syntax tree
pub trait SemanticWalker {
    fn walk(&mut self, root: &AstNode) -> Result<()>;
}

/// One assignment statement found in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentReport {
    pub line: usize,
    pub local: bool,
    /// Assigned names; indexed targets are shown as `INDEX`
    pub targets: Vec<String>,
    pub value_count: usize,
}

/// Walking context inherited from enclosing nodes
#[derive(Debug, Clone, Copy)]
struct Scope {
    in_loop: bool,
    vararg: bool,
}

/// Reports assignments and validates `break` and `...` placement
///
/// Each assignment is logged through `log::info!`, so with `env_logger` the
/// report only shows up when `RUST_LOG=info` (or more verbose) is set. The
/// same data is always available from [`AssignmentWalker::reports`].
#[derive(Debug, Default)]
pub struct AssignmentWalker {
    reports: Vec<AssignmentReport>,
}

impl AssignmentWalker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assignments seen by the last walk, in source order
    pub fn reports(&self) -> &[AssignmentReport] {
        &self.reports
    }

    fn record(&mut self, node: &AstNode) {
        let local = node.is(types::LOCAL_ASSIGNMENT);
        let targets: Vec<String> = node
            .child(0)
            .map(|list| list.children.iter().map(describe_target).collect())
            .unwrap_or_default();
        let value_count = node.child(1).map_or(0, |values| values.children.len());
        let report = AssignmentReport {
            line: node.span.line,
            local,
            targets,
            value_count,
        };
        log::info!(
            "{}assignment at line {}: {} <- {} value(s)",
            if report.local { "local " } else { "" },
            report.line,
            report.targets.join(", "),
            report.value_count
        );
        self.reports.push(report);
    }
}

fn describe_target(target: &AstNode) -> String {
    if target.is(types::NAME) {
        target.text.clone()
    } else {
        types::display_name(target.type_id).unwrap_or_default().to_string()
    }
}

impl SemanticWalker for AssignmentWalker {
    fn walk(&mut self, root: &AstNode) -> Result<()> {
        self.reports.clear();

        // The main chunk is a vararg function.
        let mut pending = vec![(root, Scope { in_loop: false, vararg: true })];
        while let Some((node, scope)) = pending.pop() {
            match node.type_id {
                types::ASSIGNMENT | types::LOCAL_ASSIGNMENT => self.record(node),
                types::BREAK if !scope.in_loop => {
                    return Err(Error::Semantic {
                        message: format!("<break> at line {} not inside a loop", node.span.line),
                        span: node.span,
                    });
                }
                types::ELLIPSIS if !scope.vararg => {
                    return Err(Error::Semantic {
                        message: "cannot use '...' outside a vararg function near '...'"
                            .to_string(),
                        span: node.span,
                    });
                }
                _ => {}
            }

            let inner = match node.type_id {
                types::WHILE | types::REPEAT | types::FOR_NUM | types::FOR_IN => Scope {
                    in_loop: true,
                    ..scope
                },
                types::FUNCTION => Scope {
                    in_loop: false,
                    vararg: node.child(0).is_some_and(|params| {
                        params.children.iter().any(|p| p.is(types::ELLIPSIS))
                    }),
                },
                _ => scope,
            };

            // Reversed so siblings are visited left to right.
            pending.extend(node.children.iter().rev().map(|child| (child, inner)));
        }
        Ok(())
    }
}
