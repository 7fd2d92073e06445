use crate::error::{ReleaseDroidError, Result};
use std::fmt;
use std::str::FromStr;

/// Supported release platforms.
///
/// Variant order is the processing order: packages are published before the
/// forge release is created, and the announcement comes last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PlatformName {
    Maven,
    Github,
    Community,
}

impl PlatformName {
    pub const ALL: [PlatformName; 3] = [
        PlatformName::Maven,
        PlatformName::Github,
        PlatformName::Community,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformName::Maven => "MAVEN",
            PlatformName::Github => "GITHUB",
            PlatformName::Community => "COMMUNITY",
        }
    }

    /// Parse a list of names and return them in processing order without duplicates
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> Result<Vec<PlatformName>> {
        let mut platforms = names
            .iter()
            .map(|name| name.as_ref().parse())
            .collect::<Result<Vec<PlatformName>>>()?;
        platforms.sort();
        platforms.dedup();
        Ok(platforms)
    }
}

impl fmt::Display for PlatformName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformName {
    type Err = ReleaseDroidError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "maven" => Ok(PlatformName::Maven),
            "github" => Ok(PlatformName::Github),
            "community" => Ok(PlatformName::Community),
            _ => {
                let available: Vec<String> = PlatformName::ALL
                    .iter()
                    .map(|p| p.as_str().to_lowercase())
                    .collect();
                Err(ReleaseDroidError::user_input(
                    "E-RD-PL-1",
                    format!(
                        "Cannot parse a platform '{}'. Please, use one of the following platforms: {}",
                        s,
                        available.join(",")
                    ),
                ))
            }
        }
    }
}
