//! Installed extension version.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw form reported when the version cannot be determined.
pub const UNKNOWN_VERSION: &str = "?";

/// Extension version as reported by the catalog, with its ordered numeric
/// encoding `major * 10000 + minor * 100 + patch`.
///
/// # Examples
///
/// ```
/// use emaj_gateway::session::domain::ExtensionVersion;
///
/// assert_eq!(ExtensionVersion::parse("1.2.0").numeric(), 10200);
/// assert_eq!(ExtensionVersion::parse("2.3").numeric(), 20300);
/// assert!(!ExtensionVersion::parse("1.2.3.4").is_known());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtensionVersion {
    raw: String,
    numeric: u32,
}

impl ExtensionVersion {
    /// Returns the unknown sentinel (`"?"`, `0`).
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            raw: UNKNOWN_VERSION.to_owned(),
            numeric: 0,
        }
    }

    /// Parses a `N.N` or `N.N.N` version string.
    ///
    /// Any other shape resolves to [`ExtensionVersion::unknown`].
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        encode(trimmed).map_or_else(Self::unknown, |numeric| Self {
            raw: trimmed.to_owned(),
            numeric,
        })
    }

    /// Returns the version string, `"?"` when unknown.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the numeric encoding, `0` when unknown.
    #[must_use]
    pub const fn numeric(&self) -> u32 {
        self.numeric
    }

    /// Returns `true` when the version was parsed.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        self.numeric != 0
    }
}

impl Default for ExtensionVersion {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Display for ExtensionVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn component(part: &str) -> Option<u32> {
    if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

fn encode(version: &str) -> Option<u32> {
    let parts = version
        .split('.')
        .map(component)
        .collect::<Option<Vec<u32>>>()?;
    let (major, minor, patch) = match parts.as_slice() {
        [major, minor] => (*major, *minor, 0),
        [major, minor, patch] => (*major, *minor, *patch),
        _ => return None,
    };
    major
        .checked_mul(10_000)?
        .checked_add(minor.checked_mul(100)?)?
        .checked_add(patch)
        .filter(|numeric| *numeric != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.2.0", 10_200)]
    #[case("2.3", 20_300)]
    #[case("1.0.5", 10_005)]
    #[case("0.11.1", 1_101)]
    #[case(" 4.1.0 ", 40_100)]
    fn parses_two_and_three_component_versions(#[case] input: &str, #[case] expected: u32) {
        let version = ExtensionVersion::parse(input);
        assert_eq!(version.numeric(), expected);
        assert_eq!(version.raw(), input.trim());
    }

    #[rstest]
    #[case("")]
    #[case("1")]
    #[case("1.2.3.4")]
    #[case("<devel>")]
    #[case("1.x.0")]
    #[case("1..0")]
    #[case("0.0")]
    fn other_shapes_are_unknown(#[case] input: &str) {
        let version = ExtensionVersion::parse(input);
        assert_eq!(version, ExtensionVersion::unknown());
        assert_eq!(version.raw(), "?");
        assert_eq!(version.numeric(), 0);
    }
}
