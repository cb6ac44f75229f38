//! Owned document model: arena-allocated node table plus a flat token
//! stream.
//!
//! The parser produces a foreign tree with rich node relationships; the
//! engine never walks that structure directly. Lowering converts it into
//! index-based handles into this table, which rules read concurrently
//! within one pass and never mutate.

use crate::source::{SourceBuffer, Span};

/// Handle into the arena node table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,
    Class,
    Module,
    Method,
    Block,
    If,
    While,
    Until,
    Begin,
    Case,
    Assignment,
    Other,
}

impl NodeKind {
    /// Kinds whose body is closed by an `end` keyword.
    pub fn has_terminator(&self) -> bool {
        matches!(
            self,
            NodeKind::Class
                | NodeKind::Module
                | NodeKind::Method
                | NodeKind::Block
                | NodeKind::If
                | NodeKind::While
                | NodeKind::Until
                | NodeKind::Begin
                | NodeKind::Case
        )
    }
}

#[derive(Debug, Clone)]
pub struct NodeData {
    pub kind: NodeKind,
    /// Enclosing span of the whole construct.
    pub span: Span,
    /// The opening keyword token (`class`, `def`, `while`, `do`, ...).
    pub keyword: Option<Span>,
    /// The closing `end` keyword; `None` for constructs without one
    /// (modifier forms, brace blocks).
    pub terminator: Option<Span>,
    /// A named sub-span: the assigned variable for assignments, the
    /// definition name for classes/modules/methods.
    pub name: Option<Span>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

/// Arena node table with a fixed root. Read-only after lowering.
#[derive(Debug, Default)]
pub struct Tree {
    nodes: Vec<NodeData>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub(crate) fn attach_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0 as usize].children.push(child);
        self.nodes[child.0 as usize].parent = Some(parent);
    }

    pub fn get(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0 as usize]
    }

    pub fn root(&self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(NodeId(0))
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth-first preorder traversal from the root.
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: self.root().into_iter().collect(),
        }
    }
}

pub struct Preorder<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        let node = self.tree.get(id);
        // Push in reverse so children pop in source order.
        for &child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Comment,
    Keyword,
    Identifier,
    Constant,
    Operator,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Flat token stream in source order.
#[derive(Debug, Default)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn all(&self) -> &[Token] {
        &self.tokens
    }

    pub fn first(&self) -> Option<&Token> {
        self.tokens.first()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// One parsed document: buffer, lowered tree, and token stream.
///
/// Shared by reference across all rules examining the document.
#[derive(Debug)]
pub struct Document {
    pub buffer: SourceBuffer,
    pub tree: Tree,
    pub tokens: TokenStream,
}

impl Document {
    pub fn node_text(&self, id: NodeId) -> &str {
        self.buffer.slice(self.tree.get(id).span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(kind: NodeKind, start: usize, end: usize) -> NodeData {
        NodeData {
            kind,
            span: Span::new(start, end),
            keyword: None,
            terminator: None,
            name: None,
            children: Vec::new(),
            parent: None,
        }
    }

    #[test]
    fn preorder_visits_children_in_source_order() {
        let mut tree = Tree::new();
        let root = tree.push(leaf(NodeKind::Program, 0, 20));
        let a = tree.push(leaf(NodeKind::Class, 0, 10));
        let b = tree.push(leaf(NodeKind::Method, 2, 8));
        let c = tree.push(leaf(NodeKind::Assignment, 12, 20));
        tree.attach_child(root, a);
        tree.attach_child(a, b);
        tree.attach_child(root, c);

        let order: Vec<NodeId> = tree.preorder().collect();
        assert_eq!(order, vec![root, a, b, c]);
        assert_eq!(tree.get(b).parent, Some(a));
    }

    #[test]
    fn empty_tree_has_no_root() {
        let tree = Tree::new();
        assert!(tree.root().is_none());
        assert_eq!(tree.preorder().count(), 0);
    }
}
