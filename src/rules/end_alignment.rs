//! Checks that the `end` closing a keyword construct lines up with the
//! convention the file follows.
//!
//! Three candidate styles: align with the opening keyword, with the
//! variable being assigned, or with the start of the statement's line.
//! With no explicit style configured, the first construct whose `end`
//! unambiguously matches one candidate fixes the style for the rest of
//! the document.

use crate::correction::realign;
use crate::document::{NodeId, NodeKind};
use crate::rule::{Rule, RuleContext};
use crate::source::{SourceBuffer, Span};
use crate::style::{Classification, Occurrence, StylePreference, StyleState};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndAlignmentStyle {
    Keyword,
    Variable,
    StartOfLine,
}

impl fmt::Display for EndAlignmentStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndAlignmentStyle::Keyword => write!(f, "keyword"),
            EndAlignmentStyle::Variable => write!(f, "variable"),
            EndAlignmentStyle::StartOfLine => write!(f, "start_of_line"),
        }
    }
}

/// Kinds whose `end` this rule checks. Brace/do blocks are a different
/// alignment discipline and are left alone.
const CHECKED_KINDS: &[NodeKind] = &[
    NodeKind::Class,
    NodeKind::Module,
    NodeKind::Method,
    NodeKind::If,
    NodeKind::While,
    NodeKind::Until,
    NodeKind::Case,
    NodeKind::Begin,
];

const TARGET_KINDS: &[NodeKind] = &[
    NodeKind::Assignment,
    NodeKind::Class,
    NodeKind::Module,
    NodeKind::Method,
    NodeKind::If,
    NodeKind::While,
    NodeKind::Until,
    NodeKind::Case,
    NodeKind::Begin,
];

pub struct EndAlignment {
    state: StyleState<EndAlignmentStyle>,
    /// Constructs already checked through their enclosing assignment.
    handled: HashSet<NodeId>,
}

impl EndAlignment {
    pub const ID: &'static str = "Layout/EndAlignment";

    pub fn new(preference: StylePreference<EndAlignmentStyle>) -> Self {
        Self {
            state: StyleState::new(preference),
            handled: HashSet::new(),
        }
    }

    fn check_assignment(&mut self, id: NodeId, ctx: &mut RuleContext<'_>) {
        let doc = ctx.doc();
        let node = doc.tree.get(id);

        let rhs = node
            .children
            .iter()
            .map(|&child| (child, doc.tree.get(child)))
            .find(|(_, n)| {
                CHECKED_KINDS.contains(&n.kind) && n.keyword.is_some() && n.terminator.is_some()
            });
        let Some((rhs_id, rhs)) = rhs else { return };
        self.handled.insert(rhs_id);

        let (Some(keyword), Some(terminator)) = (rhs.keyword, rhs.terminator) else {
            return;
        };
        let buffer = &doc.buffer;

        // The variable anchor only applies when the keyword sits on the
        // assignment's own line; a line break before the keyword falls
        // back to keyword alignment.
        let lhs = node.name.unwrap_or(Span::empty_at(node.span.start));
        let variable_anchor =
            if buffer.line_of(keyword.start) == buffer.line_of(node.span.start) {
                lhs
            } else {
                keyword
            };

        let anchors = [
            (EndAlignmentStyle::Keyword, keyword),
            (EndAlignmentStyle::Variable, variable_anchor),
            (
                EndAlignmentStyle::StartOfLine,
                start_of_line_anchor(buffer, node.span.start, keyword),
            ),
        ];
        self.check(&anchors, terminator, ctx);
    }

    fn check_bare(&mut self, id: NodeId, ctx: &mut RuleContext<'_>) {
        let node = ctx.doc().tree.get(id);
        let (Some(keyword), Some(terminator)) = (node.keyword, node.terminator) else {
            return;
        };
        let buffer = &ctx.doc().buffer;

        // Without an assignment the variable style has no anchor of its
        // own and falls back to the keyword.
        let anchors = [
            (EndAlignmentStyle::Keyword, keyword),
            (EndAlignmentStyle::Variable, keyword),
            (
                EndAlignmentStyle::StartOfLine,
                start_of_line_anchor(buffer, keyword.start, keyword),
            ),
        ];
        self.check(&anchors, terminator, ctx);
    }

    fn check(
        &mut self,
        anchors: &[(EndAlignmentStyle, Span)],
        terminator: Span,
        ctx: &mut RuleContext<'_>,
    ) {
        let buffer = &ctx.doc().buffer;
        let end_loc = buffer.loc_of(terminator.start);

        let mut occurrence = Occurrence::new();
        for &(style, span) in anchors {
            occurrence = occurrence.vote(style, buffer.loc_of(span.start));
        }

        if let Classification::NonConforming { expected, .. } =
            self.state.classify(&occurrence, end_loc)
        {
            let Some(&(_, anchor_span)) = anchors.iter().find(|(s, _)| *s == expected) else {
                return;
            };
            let anchor_loc = buffer.loc_of(anchor_span.start);
            let message = format!(
                "`end` at {}, {} is not aligned with `{}` at {}, {}.",
                end_loc.line,
                end_loc.column,
                buffer.slice(anchor_span),
                anchor_loc.line,
                anchor_loc.column,
            );
            ctx.report(Self::ID, terminator, message);

            if let Some(correction) = realign(buffer, terminator, Some(anchor_loc.column)) {
                ctx.correct(correction);
            }
        }
    }
}

impl Rule for EndAlignment {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn target_kinds(&self) -> &'static [NodeKind] {
        TARGET_KINDS
    }

    fn on_node(&mut self, id: NodeId, ctx: &mut RuleContext<'_>) {
        if self.handled.contains(&id) {
            return;
        }
        match ctx.doc().tree.get(id).kind {
            NodeKind::Assignment => self.check_assignment(id, ctx),
            _ => self.check_bare(id, ctx),
        }
    }
}

/// Anchor span for the start-of-line style: from the first non-whitespace
/// character of `offset`'s line through the opening keyword (clamped to
/// that line).
fn start_of_line_anchor(buffer: &SourceBuffer, offset: usize, keyword: Span) -> Span {
    let line = buffer.line_of(offset);
    let line_start = buffer.line_start(line);
    let text = buffer.line_text(line);
    let indent = text.len() - text.trim_start().len();
    let start = line_start + indent;
    let line_end = line_start + text.len();
    Span::new(start, keyword.end.clamp(start, line_end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::run_rules;
    use crate::ruby::parse_document;

    fn run(source: &str, preference: StylePreference<EndAlignmentStyle>) -> (usize, Vec<String>) {
        let doc = parse_document(source).unwrap();
        let mut rules: Vec<Box<dyn Rule>> = vec![Box::new(EndAlignment::new(preference))];
        let (offenses, _) = run_rules(&doc, &mut rules);
        let messages = offenses.iter().map(|o| o.message.clone()).collect();
        (offenses.len(), messages)
    }

    #[test]
    fn keyword_aligned_end_is_clean_under_keyword_style() {
        let source = "if a\n  1\nend\n";
        let (count, _) = run(source, StylePreference::Fixed(EndAlignmentStyle::Keyword));
        assert_eq!(count, 0);
    }

    #[test]
    fn misaligned_end_is_flagged_under_keyword_style() {
        let source = "if a\n  1\n  end\n";
        let (count, messages) = run(source, StylePreference::Fixed(EndAlignmentStyle::Keyword));
        assert_eq!(count, 1);
        assert_eq!(
            messages[0],
            "`end` at 3, 3 is not aligned with `if` at 1, 1."
        );
    }

    #[test]
    fn variable_style_accepts_lhs_aligned_end() {
        let source = "result = if a\n  1\nend\n";
        let (count, _) = run(source, StylePreference::Fixed(EndAlignmentStyle::Variable));
        assert_eq!(count, 0);
    }

    #[test]
    fn variable_style_flags_keyword_aligned_end() {
        let source = "result = if a\n           1\n         end\n";
        let (count, messages) = run(source, StylePreference::Fixed(EndAlignmentStyle::Variable));
        assert_eq!(count, 1);
        assert_eq!(
            messages[0],
            "`end` at 3, 10 is not aligned with `result` at 1, 1."
        );
    }

    #[test]
    fn line_break_before_keyword_falls_back_to_keyword_anchor() {
        let source = "result =\n  if a\n    1\n  end\n";
        let (count, _) = run(source, StylePreference::Fixed(EndAlignmentStyle::Variable));
        assert_eq!(count, 0);
    }

    #[test]
    fn detect_fixes_on_first_unambiguous_construct() {
        // First `end` aligns only with the keyword column; the style is
        // fixed to keyword, and the second construct violates it.
        let source = "\
foo = if a
        1
      end
bar = if b
  2
end
";
        let (count, messages) = run(source, StylePreference::Detect);
        assert_eq!(count, 1);
        assert!(messages[0].contains("`if` at 4, 7"));
    }

    #[test]
    fn detect_never_fixes_when_nothing_matches() {
        // `end` shares neither line nor column with any anchor, so there
        // is no basis to flag anything, for the whole document.
        let source = "foo = if a\n        1\n    end\nbar = if b\n        2\n    end\n";
        let (count, _) = run(source, StylePreference::Detect);
        assert_eq!(count, 0);
    }

    #[test]
    fn correction_realigns_end_to_expected_anchor() {
        let source = "if a\n  1\n  end\n";
        let doc = parse_document(source).unwrap();
        let mut rules: Vec<Box<dyn Rule>> = vec![Box::new(EndAlignment::new(
            StylePreference::Fixed(EndAlignmentStyle::Keyword),
        ))];
        let (offenses, corrections) = run_rules(&doc, &mut rules);
        assert_eq!(offenses.len(), 1);
        assert_eq!(corrections.len(), 1);
        // The leading whitespace before `end` is replaced with none.
        assert_eq!(corrections[0].replacement, "");
    }

    #[test]
    fn correction_withheld_when_end_is_not_alone_on_its_line() {
        // `end` shares its line with the body, so the span before it is
        // not pure whitespace: the offense stands, the fix is withheld.
        let source = "if a\n  1 end\n";
        let doc = parse_document(source).unwrap();
        let mut rules: Vec<Box<dyn Rule>> = vec![Box::new(EndAlignment::new(
            StylePreference::Fixed(EndAlignmentStyle::Keyword),
        ))];
        let (offenses, corrections) = run_rules(&doc, &mut rules);
        assert_eq!(offenses.len(), 1);
        assert!(corrections.is_empty());
    }

    #[test]
    fn nested_construct_checked_once() {
        let source = "x = if a\n      1\n    end\n";
        let (count_fixed, _) = run(source, StylePreference::Fixed(EndAlignmentStyle::Keyword));
        // Conforming either way; the point is no duplicate offense.
        assert_eq!(count_fixed, 0);
    }
}
