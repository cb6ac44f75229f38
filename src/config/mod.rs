//! Configuration: rule enablement, explicit style choices, and the target
//! Ruby version.
//!
//! Configuration problems are setup-time failures surfaced before any
//! analysis begins, distinct from runtime offenses: a rule configured to
//! run below its minimum supported language version is fatal until the
//! caller disables the rule or adjusts the version setting.

pub mod version;

pub use version::{TargetVersion, VersionError};

use crate::rules::{
    BodyStyle, EmptyLinesAroundBody, EndAlignment, EndAlignmentStyle, FrozenStringLiteralComment,
    ALL_RULE_IDS,
};
use crate::style::StylePreference;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown rule `{name}`{}", suggestion_suffix(.suggestion))]
    UnknownRule {
        name: String,
        suggestion: Option<String>,
    },

    #[error("unknown style `{style}` for rule `{rule}` (expected one of: {expected})")]
    UnknownStyle {
        rule: &'static str,
        style: String,
        expected: &'static str,
    },

    #[error(
        "rule `{rule}` requires Ruby {minimum}, but the target version is {target}; \
         disable the rule or adjust `target_ruby_version`"
    )]
    UnsupportedVersion {
        rule: &'static str,
        minimum: &'static str,
        target: String,
    },

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean `{}`?)", s),
        None => String::new(),
    }
}

/// Raw configuration as written in a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub target_ruby_version: Option<String>,

    /// Per-rule settings keyed by rule id. Unlisted rules run with
    /// defaults.
    #[serde(default)]
    pub rules: BTreeMap<String, RuleConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    #[serde(default = "enabled_default")]
    pub enabled: bool,

    /// Explicit style name; absent means the rule's default (for
    /// style-inferring rules: infer from the document).
    #[serde(default)]
    pub style: Option<String>,
}

fn enabled_default() -> bool {
    true
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            style: None,
        }
    }
}

impl Config {
    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load_from_str(&text)
    }

    /// Config with exactly the named rules enabled, everything else off.
    pub fn only(rule_ids: &[&str]) -> Self {
        let mut rules = BTreeMap::new();
        for &id in ALL_RULE_IDS {
            rules.insert(
                id.to_string(),
                RuleConfig {
                    enabled: rule_ids.contains(&id),
                    style: None,
                },
            );
        }
        for &id in rule_ids {
            // Unknown names survive into the map so resolve() can reject
            // them with a suggestion.
            rules.entry(id.to_string()).or_default();
        }
        Self {
            target_ruby_version: None,
            rules,
        }
    }

    /// Validate and resolve into typed per-rule settings.
    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        let target_version = match &self.target_ruby_version {
            Some(raw) => TargetVersion::parse(raw)?,
            None => TargetVersion::default(),
        };

        let mut end_alignment = Some(StylePreference::Detect);
        let mut frozen_string_literal = true;
        let mut empty_lines_around_body = Some(BodyStyle::NoEmptyLines);

        for (name, rule) in &self.rules {
            match name.as_str() {
                EndAlignment::ID => {
                    end_alignment = if rule.enabled {
                        Some(parse_end_alignment_style(rule.style.as_deref())?)
                    } else {
                        None
                    };
                }
                FrozenStringLiteralComment::ID => {
                    if let Some(style) = &rule.style {
                        if style != "always" {
                            return Err(ConfigError::UnknownStyle {
                                rule: FrozenStringLiteralComment::ID,
                                style: style.clone(),
                                expected: "always",
                            });
                        }
                    }
                    frozen_string_literal = rule.enabled;
                }
                EmptyLinesAroundBody::ID => {
                    empty_lines_around_body = if rule.enabled {
                        Some(parse_body_style(rule.style.as_deref())?)
                    } else {
                        None
                    };
                }
                other => {
                    return Err(ConfigError::UnknownRule {
                        name: other.to_string(),
                        suggestion: suggest_rule_id(other),
                    });
                }
            }
        }

        let frozen_gate_open = target_version.satisfies(FrozenStringLiteralComment::MIN_VERSION)?;
        if frozen_string_literal && !frozen_gate_open {
            return Err(ConfigError::UnsupportedVersion {
                rule: FrozenStringLiteralComment::ID,
                minimum: "2.3 or newer",
                target: target_version.as_str().to_string(),
            });
        }

        Ok(ResolvedConfig {
            target_version,
            end_alignment,
            frozen_string_literal,
            frozen_gate_open,
            empty_lines_around_body,
        })
    }
}

/// Validated, typed configuration consumed by the engine.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub target_version: TargetVersion,
    /// `None` = rule disabled.
    pub end_alignment: Option<StylePreference<EndAlignmentStyle>>,
    pub frozen_string_literal: bool,
    pub frozen_gate_open: bool,
    pub empty_lines_around_body: Option<BodyStyle>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Config::default()
            .resolve()
            .expect("default config is valid")
    }
}

fn parse_end_alignment_style(
    style: Option<&str>,
) -> Result<StylePreference<EndAlignmentStyle>, ConfigError> {
    Ok(match style {
        None => StylePreference::Detect,
        Some("keyword") => StylePreference::Fixed(EndAlignmentStyle::Keyword),
        Some("variable") => StylePreference::Fixed(EndAlignmentStyle::Variable),
        Some("start_of_line") => StylePreference::Fixed(EndAlignmentStyle::StartOfLine),
        Some(other) => {
            return Err(ConfigError::UnknownStyle {
                rule: EndAlignment::ID,
                style: other.to_string(),
                expected: "keyword, variable, start_of_line",
            })
        }
    })
}

fn parse_body_style(style: Option<&str>) -> Result<BodyStyle, ConfigError> {
    Ok(match style {
        None | Some("no_empty_lines") => BodyStyle::NoEmptyLines,
        Some("empty_lines") => BodyStyle::EmptyLines,
        Some(other) => {
            return Err(ConfigError::UnknownStyle {
                rule: EmptyLinesAroundBody::ID,
                style: other.to_string(),
                expected: "empty_lines, no_empty_lines",
            })
        }
    })
}

/// Closest known rule id, when it is close enough to be a plausible typo.
fn suggest_rule_id(name: &str) -> Option<String> {
    ALL_RULE_IDS
        .iter()
        .map(|&id| (id, strsim::jaro_winkler(name, id)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .filter(|&(_, score)| score > 0.8)
        .map(|(id, _)| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_enables_defaults() {
        let resolved = Config::default().resolve().unwrap();
        assert_eq!(resolved.end_alignment, Some(StylePreference::Detect));
        assert!(resolved.frozen_string_literal);
        assert_eq!(
            resolved.empty_lines_around_body,
            Some(BodyStyle::NoEmptyLines)
        );
    }

    #[test]
    fn toml_round_trip() {
        let config = Config::load_from_str(
            r#"
target_ruby_version = "2.7"

[rules."Layout/EndAlignment"]
style = "variable"

[rules."Layout/EmptyLinesAroundClassBody"]
enabled = false
"#,
        )
        .unwrap();
        let resolved = config.resolve().unwrap();
        assert_eq!(
            resolved.end_alignment,
            Some(StylePreference::Fixed(EndAlignmentStyle::Variable))
        );
        assert!(resolved.empty_lines_around_body.is_none());
        assert_eq!(resolved.target_version.as_str(), "2.7");
    }

    #[test]
    fn unknown_rule_gets_a_suggestion() {
        let mut config = Config::default();
        config
            .rules
            .insert("Layout/EndAlignmnet".to_string(), RuleConfig::default());
        match config.resolve() {
            Err(ConfigError::UnknownRule { suggestion, .. }) => {
                assert_eq!(suggestion.as_deref(), Some("Layout/EndAlignment"));
            }
            other => panic!("expected UnknownRule, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn unknown_style_is_rejected() {
        let mut config = Config::default();
        config.rules.insert(
            EndAlignment::ID.to_string(),
            RuleConfig {
                enabled: true,
                style: Some("banana".to_string()),
            },
        );
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::UnknownStyle { .. })
        ));
    }

    #[test]
    fn frozen_rule_below_minimum_version_is_fatal() {
        let config = Config {
            target_ruby_version: Some("2.2".to_string()),
            rules: BTreeMap::new(),
        };
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn frozen_rule_disabled_makes_old_target_valid() {
        let mut rules = BTreeMap::new();
        rules.insert(
            FrozenStringLiteralComment::ID.to_string(),
            RuleConfig {
                enabled: false,
                style: None,
            },
        );
        let config = Config {
            target_ruby_version: Some("2.2".to_string()),
            rules,
        };
        let resolved = config.resolve().unwrap();
        assert!(!resolved.frozen_string_literal);
        assert!(!resolved.frozen_gate_open);
    }

    #[test]
    fn only_selects_exactly_the_named_rules() {
        let resolved = Config::only(&[EndAlignment::ID]).resolve().unwrap();
        assert!(resolved.end_alignment.is_some());
        assert!(!resolved.frozen_string_literal);
        assert!(resolved.empty_lines_around_body.is_none());
    }
}
