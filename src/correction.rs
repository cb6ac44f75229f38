//! Deferred text edits.
//!
//! A correction is a plain value: a span over the original buffer and its
//! replacement text. Rules build corrections alongside offenses; nothing
//! is applied until the patch applicator has seen the full set, so a
//! correction can still be rejected as part of a conflicting group.

use crate::document::{Document, TokenKind};
use crate::source::{SourceBuffer, Span};

/// A single deferred edit: replace `span` with `replacement`.
///
/// An empty span is an insertion; an empty replacement is a deletion.
/// Spans are relative to the original buffer, never to partially patched
/// text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    pub span: Span,
    pub replacement: String,
}

impl Correction {
    pub fn new(span: Span, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }

    pub fn insertion(offset: usize, text: impl Into<String>) -> Self {
        Self::new(Span::empty_at(offset), text)
    }

    pub fn deletion(span: Span) -> Self {
        Self::new(span, "")
    }
}

/// Build a correction that realigns `target` to `reference_column`
/// (1-based), or to column 1 when the reference is absent.
///
/// The span to rewrite is the run of characters between the start of the
/// target's line and the target itself. If that run contains anything but
/// whitespace the correction is withheld: the offense still stands, but
/// deleting non-whitespace content is never safe.
///
/// Pure: same inputs always yield the same correction or the same
/// withholding decision.
pub fn realign(
    buffer: &SourceBuffer,
    target: Span,
    reference_column: Option<usize>,
) -> Option<Correction> {
    let column = buffer.column_of(target.start);
    let leading = Span::new(target.start - (column - 1), target.start);

    if !buffer.slice(leading).chars().all(char::is_whitespace) {
        return None;
    }

    let indent = reference_column.map(|c| c - 1).unwrap_or(0);
    Some(Correction::new(leading, " ".repeat(indent)))
}

/// Build an insertion that places `line` at the top of the document,
/// below any leading special comments.
///
/// At most two special comment lines are recognized, in order: a shebang
/// (`#!...`) and an encoding comment. The new line lands after whichever
/// of those is present, or at the very start of the document when neither
/// is.
pub fn insert_leading_line(doc: &Document, line: &str) -> Correction {
    match last_special_comment(doc) {
        Some(span) => Correction::insertion(span.end, format!("\n{}", line)),
        None => Correction::insertion(0, format!("{}\n", line)),
    }
}

/// The span of the last leading special comment, if any.
pub fn last_special_comment(doc: &Document) -> Option<Span> {
    let mut index = 0;
    let mut found = None;

    if let Some(token) = doc.tokens.get(index) {
        if token.kind == TokenKind::Comment && doc.buffer.slice(token.span).starts_with("#!") {
            found = Some(token.span);
            index += 1;
        }
    }

    if let Some(token) = doc.tokens.get(index) {
        if token.kind == TokenKind::Comment && is_encoding_comment(doc.buffer.slice(token.span)) {
            found = Some(token.span);
        }
    }

    found
}

/// Recognizes `# encoding: utf-8` and editor-style `# -*- coding: utf-8 -*-`
/// comments.
fn is_encoding_comment(text: &str) -> bool {
    if !text.starts_with('#') {
        return false;
    }
    let lowered = text.to_ascii_lowercase();
    lowered.contains("coding:") || lowered.contains("coding=")
}
