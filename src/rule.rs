//! The polymorphic contract every style rule implements.
//!
//! A rule declares the node kinds it wants to visit and receives one
//! callback per matching node during a single depth-first traversal, plus
//! an optional whole-document hook before traversal. Rules read the
//! document and emit offenses and corrections through [`RuleContext`];
//! they never mutate the tree or the buffer. Rules are independent: all
//! rules see the same traversal order, and no rule may depend on another
//! rule's offenses or corrections.

use crate::correction::Correction;
use crate::document::{Document, NodeId, NodeKind};
use crate::offense::{Offense, OffenseLedger};
use crate::source::Span;

/// Sink through which rules report offenses and hand over corrections.
pub struct RuleContext<'a> {
    doc: &'a Document,
    ledger: OffenseLedger,
    corrections: Vec<Correction>,
}

impl<'a> RuleContext<'a> {
    pub fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            ledger: OffenseLedger::new(),
            corrections: Vec::new(),
        }
    }

    pub fn doc(&self) -> &'a Document {
        self.doc
    }

    pub fn report(&mut self, rule_id: &'static str, span: Span, message: impl Into<String>) {
        self.ledger.report(&self.doc.buffer, rule_id, span, message);
    }

    /// Hand a deferred correction to the patch applicator.
    pub fn correct(&mut self, correction: Correction) {
        self.corrections.push(correction);
    }

    pub fn finish(self) -> (Vec<Offense>, Vec<Correction>) {
        (self.ledger.into_vec(), self.corrections)
    }
}

pub trait Rule {
    fn id(&self) -> &'static str;

    /// Node kinds this rule is invoked for.
    fn target_kinds(&self) -> &'static [NodeKind];

    /// Called once per document before traversal begins.
    fn on_document(&mut self, _ctx: &mut RuleContext<'_>) {}

    /// Called once per matching node, in depth-first traversal order.
    fn on_node(&mut self, _id: NodeId, _ctx: &mut RuleContext<'_>) {}
}

/// Run all rules over one document in a single depth-first pass.
///
/// Every rule invocation completes before the next node is visited;
/// offenses come out in traversal order.
pub fn run_rules(doc: &Document, rules: &mut [Box<dyn Rule>]) -> (Vec<Offense>, Vec<Correction>) {
    let mut ctx = RuleContext::new(doc);

    for rule in rules.iter_mut() {
        rule.on_document(&mut ctx);
    }

    for id in doc.tree.preorder() {
        let kind = doc.tree.get(id).kind;
        for rule in rules.iter_mut() {
            if rule.target_kinds().contains(&kind) {
                rule.on_node(id, &mut ctx);
            }
        }
    }

    ctx.finish()
}
