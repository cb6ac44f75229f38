use crate::source::{Loc, SourceBuffer, Span};
use serde::Serialize;

/// A single detected style violation, anchored to a source span.
///
/// Created once per violation during a traversal and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offense {
    pub rule_id: &'static str,
    pub span: Span,
    pub message: String,
    /// Location resolved at report time so formatters need no buffer access.
    pub loc: Loc,
}

impl Offense {
    pub fn line(&self) -> usize {
        self.loc.line
    }

    pub fn column(&self) -> usize {
        self.loc.column
    }

    /// Serializable view for JSON output.
    pub fn to_record(&self) -> OffenseRecord<'_> {
        OffenseRecord {
            rule_id: self.rule_id,
            line: self.loc.line,
            column: self.loc.column,
            message: &self.message,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OffenseRecord<'a> {
    pub rule_id: &'a str,
    pub line: usize,
    pub column: usize,
    pub message: &'a str,
}

/// Append-only collection of offenses for one document analysis.
///
/// Insertion order is preserved: formatting and tests depend on
/// deterministic, traversal-order output. The ledger never deduplicates;
/// rules are responsible for not reporting the same construct twice.
#[derive(Debug, Default)]
pub struct OffenseLedger {
    offenses: Vec<Offense>,
}

impl OffenseLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(
        &mut self,
        buffer: &SourceBuffer,
        rule_id: &'static str,
        span: Span,
        message: impl Into<String>,
    ) {
        let loc = buffer.loc_of(span.start);
        self.offenses.push(Offense {
            rule_id,
            span,
            message: message.into(),
            loc,
        });
    }

    pub fn all(&self) -> &[Offense] {
        &self.offenses
    }

    pub fn is_empty(&self) -> bool {
        self.offenses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.offenses.len()
    }

    pub fn into_vec(self) -> Vec<Offense> {
        self.offenses
    }
}
