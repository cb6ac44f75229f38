//! Generic style inference shared by style-inferring rules.
//!
//! A rule family declares a small closed enumeration of candidate styles.
//! Each checked construct becomes an [`Occurrence`]: for every candidate
//! style, the location its anchor would require the construct's terminator
//! to match. Classification tests the observed terminator against each
//! anchor; when no style is configured explicitly, the first occurrence
//! that matches exactly one candidate fixes the style for the rest of the
//! document.

use crate::source::Loc;
use std::fmt;

/// Marker bound for a rule family's candidate-style enumeration.
pub trait CandidateStyle: Copy + Eq + fmt::Display {}

impl<T: Copy + Eq + fmt::Display> CandidateStyle for T {}

/// One checked construct: the anchor location each candidate style would
/// require the terminator to align with, in declaration order.
#[derive(Debug, Clone)]
pub struct Occurrence<S> {
    anchors: Vec<(S, Loc)>,
}

impl<S: CandidateStyle> Occurrence<S> {
    pub fn new() -> Self {
        Self {
            anchors: Vec::new(),
        }
    }

    pub fn vote(mut self, style: S, anchor: Loc) -> Self {
        self.anchors.push((style, anchor));
        self
    }

    pub fn anchor(&self, style: S) -> Option<Loc> {
        self.anchors
            .iter()
            .find(|(s, _)| *s == style)
            .map(|(_, loc)| *loc)
    }

    /// Styles whose anchor matches the observed terminator.
    ///
    /// The test is deliberately permissive: a style matches if either the
    /// anchor's line or its column equals the terminator's. An aligned
    /// terminator can coincide with an anchor by line or by column alone,
    /// and rule suites are written against this either/or behavior.
    pub fn matched_styles(&self, observed: Loc) -> Vec<S> {
        self.anchors
            .iter()
            .filter(|(_, anchor)| anchor.line == observed.line || anchor.column == observed.column)
            .map(|(style, _)| *style)
            .collect()
    }
}

impl<S: CandidateStyle> Default for Occurrence<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Externally-resolved style choice for a rule family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StylePreference<S> {
    /// An explicitly configured style.
    Fixed(S),
    /// Infer the style from the first unambiguous occurrence.
    Detect,
}

/// Outcome of classifying one occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification<S> {
    /// The terminator matches the style in force.
    Conforming,
    /// The terminator violates the style in force. `matched` carries the
    /// other styles the terminator did line up with, for diagnostics.
    NonConforming { expected: S, matched: Vec<S> },
    /// Detect mode: this occurrence fixed the style for the document.
    Detected(S),
    /// Detect mode: several styles matched, so inference is deferred
    /// rather than picking arbitrarily among ties.
    Ambiguous,
    /// No style in force and no candidate matched: nothing to flag.
    NoBasis,
}

/// Per-rule, per-document style state.
///
/// Owned by a single rule instance and rebuilt for every document; never
/// shared across analyses.
#[derive(Debug, Clone)]
pub struct StyleState<S> {
    preference: StylePreference<S>,
    detected: Option<S>,
    validated: bool,
}

impl<S: CandidateStyle> StyleState<S> {
    pub fn new(preference: StylePreference<S>) -> Self {
        Self {
            preference,
            detected: None,
            validated: false,
        }
    }

    pub fn explicit(style: S) -> Self {
        Self::new(StylePreference::Fixed(style))
    }

    pub fn detect() -> Self {
        Self::new(StylePreference::Detect)
    }

    /// The style currently in force, if any.
    pub fn current(&self) -> Option<S> {
        match self.preference {
            StylePreference::Fixed(style) => Some(style),
            StylePreference::Detect => self.detected,
        }
    }

    /// Whether the style in force has been seen conforming at least once.
    /// Aggregate "configured but never observed" reporting is a caller
    /// concern; the engine only records the fact.
    pub fn style_validated(&self) -> bool {
        self.validated
    }

    pub fn classify(&mut self, occurrence: &Occurrence<S>, observed: Loc) -> Classification<S> {
        let matched = occurrence.matched_styles(observed);

        match self.current() {
            Some(expected) => {
                if matched.contains(&expected) {
                    self.validated = true;
                    Classification::Conforming
                } else {
                    Classification::NonConforming { expected, matched }
                }
            }
            None => match matched.as_slice() {
                [] => Classification::NoBasis,
                [single] => {
                    self.detected = Some(*single);
                    Classification::Detected(*single)
                }
                _ => Classification::Ambiguous,
            },
        }
    }
}
