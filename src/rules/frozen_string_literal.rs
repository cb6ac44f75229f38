//! Requires a `# frozen_string_literal: true` directive comment at the
//! top of every file.
//!
//! The directive must sit below a shebang and an encoding comment when
//! those are present. The directive is only meaningful on Ruby 2.3 and
//! newer; configuring the rule below that is rejected at setup time, and
//! the rule additionally no-ops if it is ever run under an older target.

use crate::correction::insert_leading_line;
use crate::document::NodeKind;
use crate::rule::{Rule, RuleContext};
use crate::source::Span;

pub struct FrozenStringLiteralComment {
    gate_open: bool,
}

impl FrozenStringLiteralComment {
    pub const ID: &'static str = "Style/FrozenStringLiteralComment";
    /// Minimum Ruby version that understands the directive.
    pub const MIN_VERSION: &'static str = ">=2.3.0";

    const DIRECTIVE_PREFIX: &'static str = "# frozen_string_literal:";
    const DIRECTIVE: &'static str = "# frozen_string_literal: true";
    const MSG: &'static str = "Missing frozen string literal comment.";

    /// `gate_open` is the resolved version gate: false below the minimum
    /// supported Ruby version, in which case the rule does nothing.
    pub fn new(gate_open: bool) -> Self {
        Self { gate_open }
    }

    fn directive_exists(ctx: &RuleContext<'_>) -> bool {
        let buffer = &ctx.doc().buffer;
        (1..=3.min(buffer.line_count()))
            .any(|line| buffer.line_text(line).starts_with(Self::DIRECTIVE_PREFIX))
    }
}

impl Rule for FrozenStringLiteralComment {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn target_kinds(&self) -> &'static [NodeKind] {
        &[]
    }

    fn on_document(&mut self, ctx: &mut RuleContext<'_>) {
        if !self.gate_open {
            return;
        }
        if ctx.doc().buffer.is_empty() {
            return;
        }
        if Self::directive_exists(ctx) {
            return;
        }

        ctx.report(Self::ID, Span::empty_at(0), Self::MSG);
        let correction = insert_leading_line(ctx.doc(), Self::DIRECTIVE);
        ctx.correct(correction);
    }
}
