use crate::error::{ReleaseDroidError, Result};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Grammar every release version must match.
pub const VERSION_PATTERN: &str = r"^\d+\.\d+\.\d+$";

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(VERSION_PATTERN).expect("version pattern is valid"))
}

/// Release version as `major.minor.fix`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub fix: u32,
}

impl Version {
    /// Create a new version
    pub fn new(major: u32, minor: u32, fix: u32) -> Self {
        Version { major, minor, fix }
    }

    /// Check a string against the version grammar without parsing it
    pub fn is_well_formed(text: &str) -> bool {
        version_regex().is_match(text)
    }

    /// Parse a strict `X.Y.Z` version (no prefix, no suffix)
    pub fn parse(text: &str) -> Result<Self> {
        if !Self::is_well_formed(text) {
            return Err(ReleaseDroidError::user_input(
                "E-RD-VAL-3",
                format!(
                    "Invalid version format: '{}'. The valid format is: <major>.<minor>.<fix>",
                    text
                ),
            ));
        }

        let mut parts = text.split('.').map(|part| {
            part.parse::<u32>().map_err(|_| {
                ReleaseDroidError::user_input(
                    "E-RD-VAL-3",
                    format!("Version component out of range: '{}'", part),
                )
            })
        });
        // the grammar guarantees exactly three components
        let major = parts.next().unwrap_or(Ok(0))?;
        let minor = parts.next().unwrap_or(Ok(0))?;
        let fix = parts.next().unwrap_or(Ok(0))?;

        Ok(Version { major, minor, fix })
    }

    /// Bump version according to bump type, `None` when the component is at `u32::MAX`
    pub fn bump(&self, bump_type: VersionBump) -> Option<Self> {
        match bump_type {
            VersionBump::Major => Some(Version::new(self.major.checked_add(1)?, 0, 0)),
            VersionBump::Minor => Some(Version::new(self.major, self.minor.checked_add(1)?, 0)),
            VersionBump::Fix => Some(Version::new(self.major, self.minor, self.fix.checked_add(1)?)),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.fix)
    }
}

/// Version bump type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionBump {
    Major,
    Minor,
    Fix,
}

/// Where a repository stands relative to its previous releases.
///
/// Decides whether a proposed version is a legal successor. With a prior
/// release exactly three successors are accepted: the major, minor and fix
/// bumps of the latest release. Combined or multi-step bumps are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseHistory {
    NoPriorRelease,
    HasPriorRelease(Version),
}

impl ReleaseHistory {
    /// Build the history from the latest tag, if any
    pub fn from_latest_tag(latest_tag: Option<&str>) -> Result<Self> {
        match latest_tag {
            None => Ok(ReleaseHistory::NoPriorRelease),
            Some(tag) => {
                let clean_tag = tag.trim_start_matches('v').trim_start_matches('V');
                Ok(ReleaseHistory::HasPriorRelease(Version::parse(clean_tag)?))
            }
        }
    }

    /// Legal successors of the latest release, ordered fix, minor, major
    pub fn candidates(&self) -> Vec<Version> {
        match self {
            ReleaseHistory::NoPriorRelease => Vec::new(),
            ReleaseHistory::HasPriorRelease(latest) => [
                VersionBump::Fix,
                VersionBump::Minor,
                VersionBump::Major,
            ]
            .into_iter()
            .filter_map(|bump| latest.bump(bump))
            .collect(),
        }
    }

    /// Check whether `proposed` may be released next
    pub fn is_legal_next(&self, proposed: &str) -> bool {
        match self {
            ReleaseHistory::NoPriorRelease => Version::is_well_formed(proposed),
            ReleaseHistory::HasPriorRelease(_) => match Version::parse(proposed) {
                Ok(version) => self.candidates().contains(&version),
                Err(_) => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse() {
        let v = Version::parse("1.2.3").unwrap();
        assert_eq!(v.major, 1);
        assert_eq!(v.minor, 2);
        assert_eq!(v.fix, 3);
    }

    #[test]
    fn test_version_parse_rejects_prefix_and_suffix() {
        assert!(Version::parse("v1.2.3").is_err());
        assert!(Version::parse("1.2.3-SNAPSHOT").is_err());
        assert!(Version::parse("1.2").is_err());
        assert!(Version::parse("1.2.3.4").is_err());
        assert!(Version::parse("").is_err());
    }

    #[test]
    fn test_version_parse_error_code() {
        let err = Version::parse("one.two.three").unwrap_err();
        assert!(err.to_string().starts_with("E-RD-VAL-3"));
    }

    #[test]
    fn test_version_bump() {
        let v = Version::new(1, 2, 3);
        assert_eq!(v.bump(VersionBump::Major), Some(Version::new(2, 0, 0)));
        assert_eq!(v.bump(VersionBump::Minor), Some(Version::new(1, 3, 0)));
        assert_eq!(v.bump(VersionBump::Fix), Some(Version::new(1, 2, 4)));
    }

    #[test]
    fn test_bump_at_component_limit() {
        let v = Version::new(u32::MAX, u32::MAX, 7);
        assert_eq!(v.bump(VersionBump::Major), None);
        assert_eq!(v.bump(VersionBump::Minor), None);
        assert_eq!(v.bump(VersionBump::Fix), Some(Version::new(u32::MAX, u32::MAX, 8)));
    }

    #[test]
    fn test_candidates_skip_impossible_bumps() {
        let history = ReleaseHistory::from_latest_tag(Some("4294967295.0.0")).unwrap();
        let candidates: Vec<String> = history.candidates().iter().map(Version::to_string).collect();
        assert_eq!(candidates, vec!["4294967295.0.1", "4294967295.1.0"]);
        assert!(history.is_legal_next("4294967295.1.0"));
        assert!(!history.is_legal_next("0.0.0"));
    }

    #[test]
    fn test_version_display() {
        assert_eq!(Version::new(1, 2, 3).to_string(), "1.2.3");
    }

    #[test]
    fn test_first_release_accepts_any_well_formed_version() {
        let history = ReleaseHistory::NoPriorRelease;
        for proposed in ["0.0.1", "0.1.0", "1.0.0", "17.4.250"] {
            assert!(history.is_legal_next(proposed), "{} should be legal", proposed);
        }
        assert!(!history.is_legal_next("1.0"));
        assert!(!history.is_legal_next("latest"));
    }

    #[test]
    fn test_prior_release_accepts_exactly_three_successors() {
        let history = ReleaseHistory::HasPriorRelease(Version::new(2, 3, 4));
        assert!(history.is_legal_next("3.0.0"));
        assert!(history.is_legal_next("2.4.0"));
        assert!(history.is_legal_next("2.3.5"));

        for rejected in ["2.3.4", "2.3.6", "2.5.0", "4.0.0", "3.1.0", "2.4.1", "3.0.1", "1.0.0"] {
            assert!(!history.is_legal_next(rejected), "{} should be rejected", rejected);
        }
    }

    #[test]
    fn test_candidates_are_listed_for_feedback() {
        let history = ReleaseHistory::from_latest_tag(Some("v0.9.1")).unwrap();
        let candidates: Vec<String> = history.candidates().iter().map(Version::to_string).collect();
        assert_eq!(candidates, vec!["0.9.2", "0.10.0", "1.0.0"]);
    }

    #[test]
    fn test_history_from_missing_tag() {
        let history = ReleaseHistory::from_latest_tag(None).unwrap();
        assert_eq!(history, ReleaseHistory::NoPriorRelease);
        assert!(history.candidates().is_empty());
    }

    #[test]
    fn test_history_from_malformed_tag() {
        assert!(ReleaseHistory::from_latest_tag(Some("release-7")).is_err());
    }
}
