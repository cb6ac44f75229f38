//! Patch application for the corrections accumulated across all rules.
//!
//! The applicator enforces one invariant: no two corrections' spans may
//! overlap. Rules never generate overlapping edits for the same construct,
//! but cross-rule conflicts are possible and must be caught rather than
//! resolved by last-write-wins. A conflicting set is rejected whole -- the
//! output is either fully patched text or a conflict, never a partial
//! patch.

use crate::correction::Correction;
use crate::source::Span;

/// Outcome of applying a correction set to one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixOutcome {
    /// No corrections were available.
    NothingToFix,
    /// All corrections applied; the fully patched document text.
    Fixed(String),
    /// Two corrections overlap; nothing was applied.
    Conflict(PatchConflict),
}

impl FixOutcome {
    pub fn patched_text(&self) -> Option<&str> {
        match self {
            FixOutcome::Fixed(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, FixOutcome::Conflict(_))
    }
}

/// The first detected pair of overlapping correction spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchConflict {
    pub first: Span,
    pub second: Span,
}

/// Collects corrections and applies them as a set.
#[derive(Debug, Default)]
pub struct PatchSet {
    corrections: Vec<Correction>,
}

impl PatchSet {
    pub fn new(corrections: Vec<Correction>) -> Self {
        Self { corrections }
    }

    pub fn is_empty(&self) -> bool {
        self.corrections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.corrections.len()
    }

    /// First pair of conflicting spans, in ascending start order.
    pub fn find_conflict(&self) -> Option<PatchConflict> {
        let mut order: Vec<usize> = (0..self.corrections.len()).collect();
        order.sort_by_key(|&i| (self.corrections[i].span.start, self.corrections[i].span.end));

        // Sorted by start, a span can only overlap the furthest-reaching
        // span seen before it.
        let mut widest: Option<Span> = None;
        for &i in &order {
            let span = self.corrections[i].span;
            if let Some(prev) = widest {
                if prev.conflicts_with(&span) {
                    return Some(PatchConflict {
                        first: prev,
                        second: span,
                    });
                }
                if span.end > prev.end {
                    widest = Some(span);
                }
            } else {
                widest = Some(span);
            }
        }
        None
    }

    /// Apply all corrections to `source`.
    ///
    /// Non-conflicting corrections are applied in descending start order so
    /// earlier offsets stay valid as later edits land. Equal-start
    /// insertions are applied in reverse emission order, which leaves the
    /// first-emitted text first in the output.
    pub fn apply(&self, source: &str) -> FixOutcome {
        if self.corrections.is_empty() {
            return FixOutcome::NothingToFix;
        }

        if let Some(conflict) = self.find_conflict() {
            return FixOutcome::Conflict(conflict);
        }

        let mut order: Vec<usize> = (0..self.corrections.len()).collect();
        order.sort_by(|&a, &b| {
            let sa = self.corrections[a].span.start;
            let sb = self.corrections[b].span.start;
            sb.cmp(&sa).then(b.cmp(&a))
        });

        let mut patched = source.to_string();
        for &i in &order {
            let correction = &self.corrections[i];
            patched.replace_range(correction.span.start..correction.span.end, &correction.replacement);
        }

        FixOutcome::Fixed(patched)
    }
}
