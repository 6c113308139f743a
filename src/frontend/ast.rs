//! Abstract Syntax Tree for Lua chunks
//!
//! The tree is homogeneous: every node is an [`AstNode`] tagged with a
//! [`TypeId`]. Structural nodes carry their display name as text; nodes
//! built from tokens carry the source lexeme.

use crate::frontend::token::Token;
use crate::frontend::token_types::{self, TypeId};
use crate::utils::Span;

/// A node of the syntax tree
#[derive(Debug, Clone, PartialEq)]
pub struct AstNode {
    pub type_id: TypeId,
    pub text: String,
    pub span: Span,
    /// Children in source order
    pub children: Vec<AstNode>,
}

impl AstNode {
    pub fn new(type_id: TypeId, text: impl Into<String>, span: Span) -> Self {
        Self {
            type_id,
            text: text.into(),
            span,
            children: Vec::new(),
        }
    }

    /// A structural node whose text is its own display name
    pub fn imaginary(type_id: TypeId, span: Span) -> Self {
        Self::new(type_id, token_types::display_name(type_id).unwrap_or_default(), span)
    }

    /// A node carrying the token's type and lexeme
    pub fn from_token(token: Token) -> Self {
        Self::new(token.type_id, token.text, token.span)
    }

    /// Append a child and return the node (builder style)
    pub fn with_child(mut self, child: AstNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: AstNode) {
        self.children.push(child);
    }

    pub fn is(&self, type_id: TypeId) -> bool {
        self.type_id == type_id
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn child(&self, index: usize) -> Option<&AstNode> {
        self.children.get(index)
    }

    /// Total number of nodes in this subtree
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.children.iter());
        }
        count
    }

    /// Nesting depth of this subtree; a leaf has depth 0
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 0)];
        while let Some((node, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            pending.extend(node.children.iter().map(|child| (child, depth + 1)));
        }
        deepest
    }
}

// Source nesting is unbounded, so the default recursive drop could
// overflow the stack on a deep tree.
impl Drop for AstNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}
