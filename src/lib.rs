//! Rubystyle: a style-rule engine for Ruby sources
//!
//! Inspects a parsed syntax tree, reports style violations ("offenses")
//! anchored to precise source locations, and can emit minimal textual
//! edits that fix a violation without altering program meaning.
//!
//! # Architecture
//!
//! Rules visit nodes of an owned, arena-allocated document tree lowered
//! from tree-sitter. Style-inferring rules consult a generic inference
//! engine that learns the dominant style from the first style-relevant
//! occurrence in a file and holds every later occurrence to it. Fixes
//! are plain [`Correction`] values collected across all rules and
//! composed by a patch applicator that rejects conflicting edit sets
//! rather than producing a partial patch.
//!
//! # Example
//!
//! ```no_run
//! use rubystyle::{Config, Engine};
//!
//! let engine = Engine::new(Config::default()).expect("valid config");
//! let analysis = engine.analyze("x = 1\n");
//! for offense in &analysis.offenses {
//!     println!(
//!         "{}:{}: {} {}",
//!         offense.line(),
//!         offense.column(),
//!         offense.rule_id,
//!         offense.message
//!     );
//! }
//! ```

pub mod config;
pub mod correction;
pub mod document;
pub mod engine;
pub mod offense;
pub mod patch;
pub mod pool;
pub mod ruby;
pub mod rule;
pub mod rules;
pub mod source;
pub mod style;

// Re-exports
pub use config::{Config, ConfigError, ResolvedConfig, TargetVersion};
pub use correction::Correction;
pub use engine::{analyze, Analysis, Engine};
pub use offense::{Offense, OffenseLedger};
pub use patch::{FixOutcome, PatchConflict, PatchSet};
pub use rule::{Rule, RuleContext};
pub use source::{Loc, SourceBuffer, Span};
pub use style::{Classification, Occurrence, StylePreference, StyleState};
