//! Engine façade: one call from source text to offenses and fixes.

use crate::config::{Config, ConfigError, ResolvedConfig};
use crate::correction::Correction;
use crate::offense::Offense;
use crate::patch::{FixOutcome, PatchSet};
use crate::rule::run_rules;
use crate::{ruby, rules};

/// Analyzes documents against a validated configuration.
///
/// One engine may analyze many documents; per-rule state is rebuilt for
/// every document, so nothing leaks between analyses. Parallel analyses
/// need one engine (or one clone of the resolved config) per thread.
pub struct Engine {
    config: ResolvedConfig,
}

impl Engine {
    /// Validate `config` and build an engine.
    ///
    /// Configuration problems -- unknown rules or styles, a rule enabled
    /// below its minimum supported language version -- are fatal here,
    /// before any analysis begins.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        Ok(Self {
            config: config.resolve()?,
        })
    }

    pub fn from_resolved(config: ResolvedConfig) -> Self {
        Self { config }
    }

    /// Analyze one document: a single synchronous depth-first pass.
    ///
    /// A source that does not parse cleanly produces an empty analysis;
    /// upstream parse failures are never engine errors.
    pub fn analyze(&self, source: &str) -> Analysis {
        let Some(doc) = ruby::parse_document(source) else {
            return Analysis::default();
        };

        let mut rules = rules::build(&self.config);
        let (offenses, corrections) = run_rules(&doc, &mut rules);
        Analysis {
            offenses,
            corrections,
        }
    }
}

/// Convenience entry point: analyze with exactly the named rules enabled.
pub fn analyze(source: &str, rule_ids: &[&str]) -> Result<Analysis, ConfigError> {
    Ok(Engine::new(Config::only(rule_ids))?.analyze(source))
}

/// The result of analyzing one document.
#[derive(Debug, Default)]
pub struct Analysis {
    /// Offenses in traversal order.
    pub offenses: Vec<Offense>,
    /// Deferred corrections, not yet applied.
    pub corrections: Vec<Correction>,
}

impl Analysis {
    pub fn has_offenses(&self) -> bool {
        !self.offenses.is_empty()
    }

    /// Apply all corrections to `source`.
    ///
    /// The outcome distinguishes "nothing to fix" from "fixes exist but
    /// conflict": a conflicting set is rejected whole and no partial
    /// patch is ever produced.
    pub fn fix(&self, source: &str) -> FixOutcome {
        PatchSet::new(self.corrections.clone()).apply(source)
    }
}
