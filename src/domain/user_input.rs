use crate::domain::PlatformName;
use crate::error::{ReleaseDroidError, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// What the user wants to do with the repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
    Validate,
    Release,
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Goal::Validate => f.write_str("VALIDATE"),
            Goal::Release => f.write_str("RELEASE"),
        }
    }
}

impl FromStr for Goal {
    type Err = ReleaseDroidError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "validate" => Ok(Goal::Validate),
            "release" => Ok(Goal::Release),
            _ => Err(ReleaseDroidError::user_input(
                "E-RD-GO-1",
                format!(
                    "Cannot parse a goal '{}'. Please, use one of the following goals: validate,release",
                    s
                ),
            )),
        }
    }
}

/// Validated request of a single run. Built once through [`UserInputBuilder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInput {
    goal: Goal,
    platforms: Vec<PlatformName>,
    repository_owner: String,
    repository_name: String,
    branch: Option<String>,
    local_path: Option<PathBuf>,
}

impl UserInput {
    pub fn builder() -> UserInputBuilder {
        UserInputBuilder::default()
    }

    pub fn goal(&self) -> Goal {
        self.goal
    }

    /// Requested platforms in processing order
    pub fn platforms(&self) -> &[PlatformName] {
        &self.platforms
    }

    pub fn repository_owner(&self) -> &str {
        &self.repository_owner
    }

    pub fn repository_name(&self) -> &str {
        &self.repository_name
    }

    /// `owner/name`
    pub fn full_repository_name(&self) -> String {
        format!("{}/{}", self.repository_owner, self.repository_name)
    }

    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    pub fn local_path(&self) -> Option<&std::path::Path> {
        self.local_path.as_deref()
    }
}

/// Builder enforcing mandatory fields and goal/branch compatibility
#[derive(Debug, Clone, Default)]
pub struct UserInputBuilder {
    goal: Option<Goal>,
    platforms: Vec<PlatformName>,
    repository_owner: Option<String>,
    repository_name: Option<String>,
    branch: Option<String>,
    local_path: Option<PathBuf>,
}

impl UserInputBuilder {
    pub fn goal(mut self, goal: Goal) -> Self {
        self.goal = Some(goal);
        self
    }

    pub fn platforms(mut self, platforms: impl IntoIterator<Item = PlatformName>) -> Self {
        self.platforms = platforms.into_iter().collect();
        self
    }

    pub fn repository_owner(mut self, owner: impl Into<String>) -> Self {
        self.repository_owner = Some(owner.into());
        self
    }

    pub fn repository_name(mut self, name: impl Into<String>) -> Self {
        self.repository_name = Some(name.into());
        self
    }

    /// Validate a branch other than the default one
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Validate a local checkout instead of the forge copy
    pub fn local_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<UserInput> {
        let goal = self.goal.ok_or_else(|| missing_parameter("E-RD-2", "goal"))?;
        if self.platforms.is_empty() {
            return Err(missing_parameter("E-RD-3", "platforms"));
        }
        let repository_name = non_blank(self.repository_name)
            .ok_or_else(|| missing_parameter("E-RD-4", "repository name"))?;
        let repository_owner = non_blank(self.repository_owner)
            .ok_or_else(|| missing_parameter("E-RD-5", "repository owner"))?;

        if goal == Goal::Release && self.branch.is_some() {
            return Err(ReleaseDroidError::user_input(
                "E-RD-1",
                "Please, remove branch parameter if you want to make a release. \
                 A release always targets the default branch.",
            ));
        }
        if goal == Goal::Release && self.local_path.is_some() {
            return Err(ReleaseDroidError::user_input(
                "E-RD-6",
                "Please, remove local path parameter if you want to make a release. \
                 Releases are only made from the forge repository.",
            ));
        }

        let mut platforms = self.platforms;
        platforms.sort();
        platforms.dedup();

        Ok(UserInput {
            goal,
            platforms,
            repository_owner,
            repository_name,
            branch: non_blank(self.branch),
            local_path: self.local_path,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn missing_parameter(code: &'static str, parameter: &str) -> ReleaseDroidError {
    ReleaseDroidError::user_input(
        code,
        format!(
            "Please, specify a mandatory parameter `{}` and re-run the release droid",
            parameter
        ),
    )
}
