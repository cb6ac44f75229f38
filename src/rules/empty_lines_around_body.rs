//! Checks empty lines around class and module bodies against the
//! configured policy.

use crate::correction::Correction;
use crate::document::{NodeId, NodeKind};
use crate::rule::{Rule, RuleContext};
use crate::source::Span;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyStyle {
    /// The body must be wrapped in single empty lines.
    EmptyLines,
    /// The body must start and end without empty lines.
    NoEmptyLines,
}

impl fmt::Display for BodyStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyStyle::EmptyLines => write!(f, "empty_lines"),
            BodyStyle::NoEmptyLines => write!(f, "no_empty_lines"),
        }
    }
}

pub struct EmptyLinesAroundBody {
    style: BodyStyle,
}

impl EmptyLinesAroundBody {
    pub const ID: &'static str = "Layout/EmptyLinesAroundClassBody";

    pub fn new(style: BodyStyle) -> Self {
        Self { style }
    }
}

impl Rule for EmptyLinesAroundBody {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn target_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Class, NodeKind::Module]
    }

    fn on_node(&mut self, id: NodeId, ctx: &mut RuleContext<'_>) {
        let node = ctx.doc().tree.get(id);
        let kind_word = match node.kind {
            NodeKind::Module => "module",
            _ => "class",
        };
        let (Some(keyword), Some(terminator)) = (node.keyword, node.terminator) else {
            return;
        };

        let buffer = &ctx.doc().buffer;
        let start_line = buffer.line_of(keyword.start);
        let end_line = buffer.line_of(terminator.start);

        let first_body = start_line + 1;
        let last_body = match end_line.checked_sub(1) {
            Some(line) if line >= first_body => line,
            _ => return, // single-line construct or empty body
        };

        let begin_blank = buffer.line_text(first_body).trim().is_empty();
        let end_blank = buffer.line_text(last_body).trim().is_empty();

        match self.style {
            BodyStyle::NoEmptyLines => {
                if begin_blank {
                    self.extra(first_body, kind_word, "beginning", ctx);
                }
                if last_body > first_body && end_blank {
                    self.extra(last_body, kind_word, "end", ctx);
                }
            }
            BodyStyle::EmptyLines => {
                if !begin_blank {
                    self.missing(first_body, kind_word, "beginning", ctx);
                }
                if !end_blank {
                    self.missing(end_line, kind_word, "end", ctx);
                }
            }
        }
    }
}

impl EmptyLinesAroundBody {
    fn extra(&self, line: usize, kind_word: &str, edge: &str, ctx: &mut RuleContext<'_>) {
        let buffer = &ctx.doc().buffer;
        let span = Span::new(buffer.line_start(line), buffer.line_start(line + 1));
        ctx.report(
            Self::ID,
            span,
            format!("Extra empty line detected at {} body {}.", kind_word, edge),
        );
        ctx.correct(Correction::deletion(span));
    }

    fn missing(&self, line: usize, kind_word: &str, edge: &str, ctx: &mut RuleContext<'_>) {
        let offset = ctx.doc().buffer.line_start(line);
        ctx.report(
            Self::ID,
            Span::empty_at(offset),
            format!("Empty line missing at {} body {}.", kind_word, edge),
        );
        ctx.correct(Correction::insertion(offset, "\n"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::{FixOutcome, PatchSet};
    use crate::rule::run_rules;
    use crate::ruby::parse_document;

    fn run(source: &str, style: BodyStyle) -> (Vec<String>, FixOutcome) {
        let doc = parse_document(source).unwrap();
        let mut rules: Vec<Box<dyn Rule>> = vec![Box::new(EmptyLinesAroundBody::new(style))];
        let (offenses, corrections) = run_rules(&doc, &mut rules);
        let messages = offenses.iter().map(|o| o.message.clone()).collect();
        (messages, PatchSet::new(corrections).apply(source))
    }

    #[test]
    fn tight_body_is_clean_under_no_empty_lines() {
        let (messages, outcome) = run("class Foo\n  def bar\n  end\nend\n", BodyStyle::NoEmptyLines);
        assert!(messages.is_empty());
        assert_eq!(outcome, FixOutcome::NothingToFix);
    }

    #[test]
    fn extra_blank_lines_are_flagged_and_deleted() {
        let source = "class Foo\n\n  def bar\n  end\n\nend\n";
        let (messages, outcome) = run(source, BodyStyle::NoEmptyLines);
        assert_eq!(
            messages,
            vec![
                "Extra empty line detected at class body beginning.",
                "Extra empty line detected at class body end.",
            ]
        );
        assert_eq!(
            outcome,
            FixOutcome::Fixed("class Foo\n  def bar\n  end\nend\n".to_string())
        );
    }

    #[test]
    fn missing_blank_lines_are_flagged_and_inserted() {
        let source = "module Foo\n  BAR = 1\nend\n";
        let (messages, outcome) = run(source, BodyStyle::EmptyLines);
        assert_eq!(
            messages,
            vec![
                "Empty line missing at module body beginning.",
                "Empty line missing at module body end.",
            ]
        );
        assert_eq!(
            outcome,
            FixOutcome::Fixed("module Foo\n\n  BAR = 1\n\nend\n".to_string())
        );
    }

    #[test]
    fn empty_body_is_ignored() {
        let (messages, _) = run("class Foo\nend\n", BodyStyle::EmptyLines);
        assert!(messages.is_empty());
        let (messages, _) = run("class Foo\nend\n", BodyStyle::NoEmptyLines);
        assert!(messages.is_empty());
    }

    #[test]
    fn single_blank_body_reported_once() {
        let (messages, outcome) = run("class Foo\n\nend\n", BodyStyle::NoEmptyLines);
        assert_eq!(messages.len(), 1);
        assert_eq!(
            outcome,
            FixOutcome::Fixed("class Foo\nend\n".to_string())
        );
    }
}
