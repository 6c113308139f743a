//! AST Printer - render a syntax tree as a branch diagram
//!
//! ```text
//! '- CHUNK
//!    |- ASSIGNMENT
//!    |  |- VAR_LIST
//!    |  |  '- Name='x'
//!    |  '- EXPR_LIST
//!    |     '- Number='1'
//!    '- CALL
//!       ...
//! ```
//!
//! The walk keeps an explicit stack of sibling queues instead of
//! recursing, so the printable depth is bounded by the heap, not by the
//! thread's stack.

use std::collections::VecDeque;

use crate::frontend::ast::AstNode;
use crate::frontend::token_types::TypeNames;
use crate::utils::{Error, Result};

const OPEN_BRANCH: &str = "|  ";
const CLOSED_BRANCH: &str = "   ";
const SIBLING: &str = "|- ";
const LAST_SIBLING: &str = "'- ";

/// Pretty printer for syntax trees
pub struct AstPrinter<'n, N: TypeNames + ?Sized> {
    names: &'n N,
    output: String,
}

impl<'n, N: TypeNames + ?Sized> AstPrinter<'n, N> {
    pub fn new(names: &'n N) -> Self {
        Self {
            names,
            output: String::new(),
        }
    }

    /// Print a tree to string, one line per node
    pub fn print(&mut self, root: &AstNode) -> Result<String> {
        self.output.clear();

        let mut stack: Vec<VecDeque<&AstNode>> = vec![VecDeque::from([root])];
        while let Some(top) = stack.len().checked_sub(1) {
            let Some(node) = stack[top].pop_front() else {
                stack.pop();
                continue;
            };

            if !self.output.is_empty() {
                self.output.push('\n');
            }
            for frame in &stack[..top] {
                self.output
                    .push_str(if frame.is_empty() { CLOSED_BRANCH } else { OPEN_BRANCH });
            }
            self.output
                .push_str(if stack[top].is_empty() { LAST_SIBLING } else { SIBLING });
            self.print_label(node)?;

            if !node.is_leaf() {
                stack.push(node.children.iter().collect());
            }
        }

        Ok(std::mem::take(&mut self.output))
    }

    /// `Name`, or `Name='literal'` when the text differs from the name
    fn print_label(&mut self, node: &AstNode) -> Result<()> {
        let name = self
            .names
            .name_of(node.type_id)
            .ok_or(Error::UnknownTokenType { type_id: node.type_id })?;
        self.output.push_str(name);
        if node.text != name {
            self.output.push_str("='");
            self.output.push_str(&escape_literal(&node.text));
            self.output.push('\'');
        }
        Ok(())
    }
}

/// Escape line breaks and single quotes so a literal stays on one line
pub fn escape_literal(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\'' => escaped.push_str("\\'"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render a tree; an absent tree renders as the empty string
pub fn render_ast<N: TypeNames + ?Sized>(root: Option<&AstNode>, names: &N) -> Result<String> {
    match root {
        Some(root) => AstPrinter::new(names).print(root),
        None => Ok(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parser::Parser;
    use crate::frontend::token_types::{LuaTypeNames, TypeId};
    use crate::utils::Span;
    use pretty_assertions::assert_eq;

    const CHUNK: TypeId = TypeId(0);
    const A: TypeId = TypeId(1);
    const B: TypeId = TypeId(2);
    const NAMES: &[&str] = &["Chunk", "A", "B"];

    fn node(type_id: TypeId, text: &str) -> AstNode {
        AstNode::new(type_id, text, Span::dummy())
    }

    fn render(root: &AstNode) -> String {
        render_ast(Some(root), NAMES).unwrap()
    }

    fn render_lua(source: &str) -> String {
        let root = Parser::from_source(source).unwrap().parse_chunk().unwrap();
        render_ast(Some(&root), &LuaTypeNames).unwrap()
    }

    #[test]
    fn test_named_and_literal_children() {
        let tree = node(CHUNK, "Chunk")
            .with_child(node(A, "A"))
            .with_child(node(B, "x\ny"));
        assert_eq!(render(&tree), "'- Chunk\n   |- A\n   '- B='x\\ny'");
    }

    #[test]
    fn test_single_node() {
        let names: &[&str] = &["EOF"];
        let tree = node(TypeId(0), "EOF");
        assert_eq!(render_ast(Some(&tree), names).unwrap(), "'- EOF");
    }

    #[test]
    fn test_empty_tree() {
        assert_eq!(render_ast(None, NAMES).unwrap(), "");
    }

    #[test]
    fn test_empty_literal_is_still_quoted() {
        let tree = node(A, "");
        assert_eq!(render(&tree), "'- A=''");
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape_literal("it's\r\n"), "it\\'s\\r\\n");
        assert_eq!(escape_literal("plain \\ \" text"), "plain \\ \" text");
        let tree = node(B, "'a'");
        assert_eq!(render(&tree), "'- B='\\'a\\''");
    }

    #[test]
    fn test_open_and_closed_branches() {
        // Chunk
        // |- A          (has children, more siblings follow)
        // |  '- B
        // '- A          (last, has children)
        //    |- B
        //    '- B
        let tree = node(CHUNK, "Chunk")
            .with_child(node(A, "A").with_child(node(B, "B")))
            .with_child(node(A, "A").with_child(node(B, "B")).with_child(node(B, "B")));
        let expected = [
            "'- Chunk",
            "   |- A",
            "   |  '- B",
            "   '- A",
            "      |- B",
            "      '- B",
        ]
        .join("\n");
        assert_eq!(render(&tree), expected);
    }

    #[test]
    fn test_one_line_per_node_with_depth_indent() {
        let tree = node(CHUNK, "Chunk")
            .with_child(node(A, "A").with_child(node(A, "A").with_child(node(B, "1"))))
            .with_child(node(B, "B"))
            .with_child(node(A, "A").with_child(node(B, "B")));
        let output = render(&tree);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), tree.node_count());
        assert!(lines.iter().all(|line| !line.trim().is_empty()));

        // connector position after n indent units is 3n
        let connector_depths: Vec<usize> = lines
            .iter()
            .map(|line| {
                let at = line.rfind("- ").unwrap_or(0);
                (at - 1) / 3
            })
            .collect();
        assert_eq!(connector_depths, vec![0, 1, 2, 3, 1, 1, 2]);
    }

    #[test]
    fn test_exactly_one_last_connector_per_group() {
        let mut root = node(CHUNK, "Chunk");
        for _ in 0..5 {
            root.push(node(A, "A"));
        }
        let output = render(&root);
        let children: Vec<&str> = output.lines().skip(1).collect();
        assert_eq!(children.iter().filter(|l| l.starts_with("   '- ")).count(), 1);
        assert_eq!(children.iter().filter(|l| l.starts_with("   |- ")).count(), 4);
        assert!(children[4].starts_with("   '- "));
    }

    #[test]
    fn test_unknown_type_is_an_error() {
        let tree = node(CHUNK, "Chunk").with_child(node(TypeId(42), "?"));
        match render_ast(Some(&tree), NAMES) {
            Err(Error::UnknownTokenType { type_id }) => assert_eq!(type_id, TypeId(42)),
            other => panic!("expected lookup failure, got {:?}", other),
        }
    }

    #[test]
    fn test_deep_tree_does_not_recurse() {
        const DEPTH: usize = 3_000;
        let mut tree = node(B, "leaf");
        for _ in 0..DEPTH {
            tree = node(A, "A").with_child(tree);
        }
        let output = render(&tree);
        assert_eq!(output.lines().count(), DEPTH + 1);
        let last = output.lines().last().unwrap();
        assert_eq!(last, format!("{}'- B='leaf'", CLOSED_BRANCH.repeat(DEPTH)));
    }

    #[test]
    fn test_lua_assignment() {
        let expected = [
            "'- CHUNK",
            "   '- ASSIGNMENT",
            "      |- VAR_LIST",
            "      |  '- Name='x'",
            "      '- EXPR_LIST",
            "         '- Add='+'",
            "            |- Number='1'",
            "            '- String='\\'a\\nb\\''",
        ]
        .join("\n");
        assert_eq!(render_lua("x = 1 + 'a\\nb'"), expected);
    }

    #[test]
    fn test_lua_keywords_and_structure() {
        let expected = [
            "'- CHUNK",
            "   |- While='while'",
            "   |  |- True='true'",
            "   |  '- BLOCK",
            "   |     '- Break='break'",
            "   '- CALL",
            "      |- Name='print'",
            "      '- ARGS",
        ]
        .join("\n");
        assert_eq!(render_lua("while true do break end print()"), expected);
    }
}
