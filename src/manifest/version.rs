//! Semver parsing and bump arithmetic.

use std::fmt;
use std::str::FromStr;

use semver::Version;

use crate::error::ManifestError;

/// Semantic-versioning increment category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BumpKind {
    Patch,
    Minor,
    Major,
}

impl BumpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BumpKind::Major => "major",
            BumpKind::Minor => "minor",
            BumpKind::Patch => "patch",
        }
    }
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BumpKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "major" => Ok(BumpKind::Major),
            "minor" => Ok(BumpKind::Minor),
            "patch" => Ok(BumpKind::Patch),
            other => Err(format!(
                "unknown bump kind '{other}' (expected major, minor, or patch)"
            )),
        }
    }
}

/// Apply a bump to a version. Total: never fails for a valid version.
///
/// Lower components reset to zero, so the result is strictly greater under
/// (major, minor, patch) ordering.
pub fn apply_bump(version: &Version, kind: BumpKind) -> Version {
    match kind {
        BumpKind::Major => Version::new(version.major + 1, 0, 0),
        BumpKind::Minor => Version::new(version.major, version.minor + 1, 0),
        BumpKind::Patch => Version::new(version.major, version.minor, version.patch + 1),
    }
}

/// Parse a strict `N.N.N` version string.
///
/// Rejects pre-release or build metadata: manifest versions this tool owns
/// are plain dotted triples, and anything else means the field holds
/// something we should not silently rewrite.
pub fn parse_strict(s: &str) -> Result<Version, ManifestError> {
    let version = Version::parse(s.trim()).map_err(|e| ManifestError::InvalidVersion {
        value: s.to_string(),
        reason: e.to_string(),
    })?;
    if !version.pre.is_empty() || !version.build.is_empty() {
        return Err(ManifestError::InvalidVersion {
            value: s.to_string(),
            reason: "expected exactly three numeric components".to_string(),
        });
    }
    Ok(version)
}
