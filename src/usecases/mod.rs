//! Validate and release use cases
//!
//! [`ReleaseDroid`] ties a repository, the structure validators and the
//! requested platforms together. A platform is released only when its own
//! validation report, which includes the structure checks, has no failures.
//! Platforms never block each other.

pub mod platform;

pub use platform::{Platform, PlatformRegistry};

use tracing::{debug, info, warn};

use crate::domain::{Goal, PlatformName, UserInput};
use crate::error::{ReleaseDroidError, Result};
use crate::report::{CheckResult, Report, ReportKind};
use crate::repository::Repository;
use crate::validation::RepositoryValidator;

/// Reports produced by one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub validation: Report,
    /// Present when the goal was release and at least one platform was eligible
    pub release: Option<Report>,
}

impl RunOutcome {
    pub fn has_failures(&self) -> bool {
        self.validation.has_failures()
            || self.release.as_ref().map_or(false, Report::has_failures)
    }

    /// Reports in the order they were produced
    pub fn reports(&self) -> impl Iterator<Item = &Report> {
        std::iter::once(&self.validation).chain(self.release.iter())
    }
}

/// Orchestrates validation and release of one repository
pub struct ReleaseDroid {
    structure_validators: Vec<Box<dyn RepositoryValidator>>,
    platforms: PlatformRegistry,
}

impl ReleaseDroid {
    pub fn new(
        structure_validators: Vec<Box<dyn RepositoryValidator>>,
        platforms: PlatformRegistry,
    ) -> Self {
        ReleaseDroid {
            structure_validators,
            platforms,
        }
    }

    /// Run the goal of `input` against `repository`
    pub fn run(&self, input: &UserInput, repository: &dyn Repository) -> Result<RunOutcome> {
        info!(
            goal = %input.goal(),
            repository = repository.name(),
            branch = repository.branch_name(),
            "starting release droid"
        );
        match input.goal() {
            Goal::Validate => Ok(RunOutcome {
                validation: self.validate(repository, input.platforms())?,
                release: None,
            }),
            Goal::Release => self.release(repository, input.platforms()),
        }
    }

    /// Merged validation report of all requested platforms
    pub fn validate(&self, repository: &dyn Repository, platforms: &[PlatformName]) -> Result<Report> {
        let per_platform = self.validate_platforms(repository, platforms)?;
        Report::merge_all(
            ReportKind::Validation,
            per_platform.into_iter().map(|(_, report)| report),
        )
    }

    /// Validate, then release every platform whose validation passed
    pub fn release(&self, repository: &dyn Repository, platforms: &[PlatformName]) -> Result<RunOutcome> {
        let per_platform = self.validate_platforms(repository, platforms)?;

        let mut release_reports = Vec::new();
        for (platform, report) in &per_platform {
            if report.has_failures() {
                warn!(platform = %platform.name(), "validation failed, skipping release");
                continue;
            }
            release_reports.push(Self::release_platform(platform, repository));
        }

        let release = if release_reports.is_empty() {
            None
        } else {
            Some(Report::merge_all(ReportKind::Release, release_reports)?)
        };
        let validation = Report::merge_all(
            ReportKind::Validation,
            per_platform.into_iter().map(|(_, report)| report),
        )?;
        Ok(RunOutcome {
            validation,
            release,
        })
    }

    fn structure_report(&self, repository: &dyn Repository) -> Result<Report> {
        let reports = self
            .structure_validators
            .iter()
            .map(|validator| {
                debug!(validator = validator.name(), "running structure validator");
                validator.validate(repository)
            })
            .collect::<Result<Vec<_>>>()?;
        Report::merge_all(ReportKind::Validation, reports)
    }

    /// Each requested platform with its attributed report: structure checks plus its own
    fn validate_platforms(
        &self,
        repository: &dyn Repository,
        names: &[PlatformName],
    ) -> Result<Vec<(&Platform, Report)>> {
        let platforms = self.platforms.select(names)?;
        let structure = self.structure_report(repository)?;

        platforms
            .into_iter()
            .map(|platform| {
                debug!(platform = %platform.name(), validator = platform.validator().name(), "running platform validator");
                let own = platform.validator().validate(repository)?;
                let report = structure.clone().merge(own)?.for_platform(platform.name());
                Ok((platform, report))
            })
            .collect()
    }

    fn release_platform(platform: &Platform, repository: &dyn Repository) -> Report {
        info!(platform = %platform.name(), "releasing");
        let result = match platform.release_maker().make_release(repository) {
            Ok(message) => CheckResult::success(message),
            Err(e) => {
                warn!(platform = %platform.name(), error = %e, "release failed");
                release_failure(e)
            }
        };
        Report::single(ReportKind::Release, result.for_platform(platform.name()))
    }
}

fn release_failure(error: ReleaseDroidError) -> CheckResult {
    match error {
        ReleaseDroidError::UserInput { code, message }
        | ReleaseDroidError::RepositoryAccess { code, message } => {
            CheckResult::failure(code, message)
        }
        other => CheckResult::failure("E-RD-REL-1", other.to_string()),
    }
}
