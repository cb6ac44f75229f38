//! Target-version gating using semver constraints.
//!
//! Ruby versions are conventionally written as `"3.0"` or `"2.3"`; they
//! are padded to full semver so requirement strings like `">=2.3.0"` can
//! be matched directly.

use semver::{Version, VersionReq};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum VersionError {
    #[error("invalid target version '{value}': {reason}")]
    InvalidVersion { value: String, reason: String },

    #[error("invalid version requirement '{value}': {reason}")]
    InvalidRequirement { value: String, reason: String },
}

/// The Ruby version the analyzed code targets.
#[derive(Debug, Clone)]
pub struct TargetVersion {
    version: Version,
    raw: String,
}

impl TargetVersion {
    /// Parse a version string, padding missing components: `"3"` and
    /// `"3.0"` both mean `3.0.0`.
    pub fn parse(value: &str) -> Result<Self, VersionError> {
        let trimmed = value.trim();
        let padded = match trimmed.split('.').count() {
            1 => format!("{}.0.0", trimmed),
            2 => format!("{}.0", trimmed),
            _ => trimmed.to_string(),
        };

        let version = Version::parse(&padded).map_err(|e| VersionError::InvalidVersion {
            value: value.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            version,
            raw: trimmed.to_string(),
        })
    }

    /// Check this version against a requirement string like `">=2.3.0"`.
    pub fn satisfies(&self, requirement: &str) -> Result<bool, VersionError> {
        let req =
            VersionReq::parse(requirement).map_err(|e| VersionError::InvalidRequirement {
                value: requirement.to_string(),
                reason: e.to_string(),
            })?;
        Ok(req.matches(&self.version))
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Default for TargetVersion {
    fn default() -> Self {
        Self {
            version: Version::new(3, 0, 0),
            raw: "3.0".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_short_versions() {
        assert!(TargetVersion::parse("2.3")
            .unwrap()
            .satisfies("=2.3.0")
            .unwrap());
        assert!(TargetVersion::parse("3").unwrap().satisfies("=3.0.0").unwrap());
    }

    #[test]
    fn requirement_matching() {
        let v23 = TargetVersion::parse("2.3").unwrap();
        let v22 = TargetVersion::parse("2.2").unwrap();
        assert!(v23.satisfies(">=2.3.0").unwrap());
        assert!(!v22.satisfies(">=2.3.0").unwrap());
    }

    #[test]
    fn invalid_inputs_are_errors() {
        assert!(matches!(
            TargetVersion::parse("not-a-version"),
            Err(VersionError::InvalidVersion { .. })
        ));
        let v = TargetVersion::default();
        assert!(matches!(
            v.satisfies(">=bad"),
            Err(VersionError::InvalidRequirement { .. })
        ));
    }

    #[test]
    fn default_is_current_stable_line() {
        let v = TargetVersion::default();
        assert!(v.satisfies(">=2.3.0").unwrap());
        assert_eq!(v.as_str(), "3.0");
    }
}
