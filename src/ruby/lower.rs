//! Lowering from the tree-sitter tree to the owned arena document model.
//!
//! Only the node kinds the rules care about are materialized; everything
//! else is flattened into its nearest materialized ancestor. The lowered
//! tree carries the named sub-spans rules anchor on: the opening keyword,
//! the closing `end`, and the definition name or assignment target.

use crate::document::{Document, NodeData, NodeId, NodeKind, Token, TokenKind, TokenStream, Tree};
use crate::ruby::parser::ParsedRuby;
use crate::source::{SourceBuffer, Span};

const OPENING_KEYWORDS: &[&str] = &[
    "class", "module", "def", "if", "unless", "while", "until", "begin", "case", "do",
];

const KEYWORD_TOKENS: &[&str] = &[
    "class", "module", "def", "if", "elsif", "else", "unless", "while", "until", "begin", "end",
    "case", "when", "in", "do", "then", "return", "yield", "rescue", "ensure", "not", "and", "or",
];

/// Lower one parsed source into a [`Document`].
pub fn lower(source: &str, parsed: &ParsedRuby<'_>) -> Document {
    let buffer = SourceBuffer::new(source);
    let mut tree = Tree::new();

    let root = parsed.root_node();
    let root_id = tree.push(build_node(NodeKind::Program, root));
    lower_children(root, root_id, &mut tree);

    let mut tokens = Vec::new();
    collect_tokens(root, &mut tokens);

    Document {
        buffer,
        tree,
        tokens: TokenStream::new(tokens),
    }
}

fn map_kind(kind: &str) -> Option<NodeKind> {
    Some(match kind {
        "class" | "singleton_class" => NodeKind::Class,
        "module" => NodeKind::Module,
        "method" | "singleton_method" => NodeKind::Method,
        "do_block" | "block" => NodeKind::Block,
        "if" | "unless" => NodeKind::If,
        "while" => NodeKind::While,
        "until" => NodeKind::Until,
        "begin" => NodeKind::Begin,
        "case" | "case_match" => NodeKind::Case,
        "assignment" | "operator_assignment" => NodeKind::Assignment,
        _ => return None,
    })
}

fn lower_children(ts_node: tree_sitter::Node<'_>, parent: NodeId, tree: &mut Tree) {
    let mut cursor = ts_node.walk();
    for child in ts_node.children(&mut cursor) {
        match map_kind(child.kind()) {
            Some(kind) => {
                let id = tree.push(build_node(kind, child));
                tree.attach_child(parent, id);
                lower_children(child, id, tree);
            }
            // Unmapped constructs flatten into the nearest mapped ancestor.
            None => lower_children(child, parent, tree),
        }
    }
}

fn build_node(kind: NodeKind, node: tree_sitter::Node<'_>) -> NodeData {
    let span = span_of(node);
    let mut keyword = None;
    let mut terminator = None;

    if kind.has_terminator() {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if keyword.is_none() && OPENING_KEYWORDS.contains(&child.kind()) {
                keyword = Some(span_of(child));
            }
            if child.kind() == "end" {
                terminator = Some(span_of(child));
            }
        }
    }

    let name = match kind {
        NodeKind::Assignment => node.child_by_field_name("left"),
        NodeKind::Class | NodeKind::Module | NodeKind::Method => node.child_by_field_name("name"),
        _ => None,
    }
    .map(span_of);

    NodeData {
        kind,
        span,
        keyword,
        terminator,
        name,
        children: Vec::new(),
        parent: None,
    }
}

fn span_of(node: tree_sitter::Node<'_>) -> Span {
    Span::new(node.start_byte(), node.end_byte())
}

fn collect_tokens(node: tree_sitter::Node<'_>, out: &mut Vec<Token>) {
    if node.child_count() == 0 {
        let kind = classify_token(node.kind());
        let span = span_of(node);
        if !span.is_empty() {
            out.push(Token { kind, span });
        }
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_tokens(child, out);
    }
}

fn classify_token(kind: &str) -> TokenKind {
    match kind {
        "comment" => TokenKind::Comment,
        "identifier" => TokenKind::Identifier,
        "constant" => TokenKind::Constant,
        k if KEYWORD_TOKENS.contains(&k) => TokenKind::Keyword,
        k if !k.is_empty() && k.chars().all(|c| !c.is_alphanumeric()) => TokenKind::Operator,
        _ => TokenKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ruby::parse_document;

    #[test]
    fn lowers_class_with_method() {
        let source = "class Foo\n  def bar\n    1\n  end\nend\n";
        let doc = parse_document(source).unwrap();

        let ids: Vec<_> = doc.tree.preorder().collect();
        let kinds: Vec<_> = ids.iter().map(|&id| doc.tree.get(id).kind).collect();
        assert_eq!(
            kinds,
            vec![NodeKind::Program, NodeKind::Class, NodeKind::Method]
        );

        let class = doc.tree.get(ids[1]);
        assert_eq!(doc.buffer.slice(class.keyword.unwrap()), "class");
        assert_eq!(doc.buffer.slice(class.terminator.unwrap()), "end");
        assert_eq!(doc.buffer.slice(class.name.unwrap()), "Foo");

        let method = doc.tree.get(ids[2]);
        assert_eq!(doc.buffer.slice(method.keyword.unwrap()), "def");
        assert_eq!(doc.buffer.slice(method.terminator.unwrap()), "end");
        assert_eq!(method.parent, Some(ids[1]));
    }

    #[test]
    fn assignment_carries_target_name_and_nested_construct() {
        let source = "variable = if true\n  1\nend\n";
        let doc = parse_document(source).unwrap();

        let ids: Vec<_> = doc.tree.preorder().collect();
        let kinds: Vec<_> = ids.iter().map(|&id| doc.tree.get(id).kind).collect();
        assert_eq!(
            kinds,
            vec![NodeKind::Program, NodeKind::Assignment, NodeKind::If]
        );

        let assignment = doc.tree.get(ids[1]);
        assert_eq!(doc.buffer.slice(assignment.name.unwrap()), "variable");
        assert!(assignment.terminator.is_none());

        let if_node = doc.tree.get(ids[2]);
        assert_eq!(if_node.parent, Some(ids[1]));
        assert_eq!(doc.buffer.slice(if_node.keyword.unwrap()), "if");
        assert_eq!(doc.buffer.slice(if_node.terminator.unwrap()), "end");
    }

    #[test]
    fn brace_block_has_no_terminator() {
        let source = "items.each { |i| puts i }\n";
        let doc = parse_document(source).unwrap();

        let block = doc
            .tree
            .preorder()
            .map(|id| doc.tree.get(id))
            .find(|n| n.kind == NodeKind::Block)
            .unwrap();
        assert!(block.terminator.is_none());
    }

    #[test]
    fn tokens_are_collected_in_source_order() {
        let source = "#!/usr/bin/env ruby\n# a comment\nx = 1\n";
        let doc = parse_document(source).unwrap();

        let tokens = doc.tokens.all();
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(doc.buffer.slice(tokens[0].span), "#!/usr/bin/env ruby");
        assert_eq!(tokens[1].kind, TokenKind::Comment);
        assert!(tokens
            .windows(2)
            .all(|w| w[0].span.start <= w[1].span.start));
    }

    #[test]
    fn parse_failure_yields_no_document() {
        assert!(parse_document("class Foo\n  def\n").is_none());
    }
}
