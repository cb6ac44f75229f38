//! The concrete style rules and their registry.

pub mod empty_lines_around_body;
pub mod end_alignment;
pub mod frozen_string_literal;

pub use empty_lines_around_body::{BodyStyle, EmptyLinesAroundBody};
pub use end_alignment::{EndAlignment, EndAlignmentStyle};
pub use frozen_string_literal::FrozenStringLiteralComment;

use crate::config::ResolvedConfig;
use crate::rule::Rule;

/// Every rule id this crate knows about.
pub const ALL_RULE_IDS: &[&str] = &[
    EndAlignment::ID,
    FrozenStringLiteralComment::ID,
    EmptyLinesAroundBody::ID,
];

/// Build fresh rule instances for one document analysis.
///
/// Rules are rebuilt per document so per-rule style state can never leak
/// across analyses.
pub fn build(config: &ResolvedConfig) -> Vec<Box<dyn Rule>> {
    let mut rules: Vec<Box<dyn Rule>> = Vec::new();

    if let Some(preference) = config.end_alignment {
        rules.push(Box::new(EndAlignment::new(preference)));
    }
    if config.frozen_string_literal {
        rules.push(Box::new(FrozenStringLiteralComment::new(
            config.frozen_gate_open,
        )));
    }
    if let Some(style) = config.empty_lines_around_body {
        rules.push(Box::new(EmptyLinesAroundBody::new(style)));
    }

    rules
}
