use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::{ReleaseHistory, ReleaseLetter, Version};
use crate::error::Result;
use crate::gateway::GatewayResult;
use crate::report::{CheckResult, Report};
use crate::repository::Repository;
use crate::validation::RepositoryValidator;

/// Version of `repository` when it passes the format and legality checks.
///
/// Checks that read the release letter run only for such a version; the letter
/// of an illegal version usually does not exist yet.
pub fn releasable_version(repository: &dyn Repository) -> Result<Option<String>> {
    let version = repository.version()?;
    if !Version::is_well_formed(&version) {
        return Ok(None);
    }
    let legal = repository
        .latest_tag()
        .ok()
        .and_then(|tag| ReleaseHistory::from_latest_tag(tag.as_deref()).ok())
        .is_some_and(|history| history.is_legal_next(&version));
    Ok(legal.then_some(version))
}

/// Checks every repository needs before a release: version, changelog and release letter.
///
/// Runs in order. A malformed version skips the legality check, and any version
/// failure skips the changelog and release letter checks. The four release letter
/// checks always run together so every problem shows up in one pass.
pub struct StructureValidator {
    today: NaiveDate,
}

impl StructureValidator {
    /// `today` is the date release letters must carry
    pub fn new(today: NaiveDate) -> Self {
        StructureValidator { today }
    }

    fn validate_version_format(version: &str) -> CheckResult {
        if Version::is_well_formed(version) {
            CheckResult::success("Version format is correct.")
        } else {
            CheckResult::failure(
                "E-RD-VAL-3",
                format!(
                    "The version '{}' has an invalid format. Please use the format <major>.<minor>.<fix>, e.g. 1.2.3.",
                    version
                ),
            )
        }
    }

    fn validate_version_legality(
        version: &str,
        latest_tag: GatewayResult<Option<String>>,
    ) -> CheckResult {
        let latest_tag = match latest_tag {
            Ok(tag) => tag,
            Err(e) => {
                return CheckResult::failure(
                    "E-RD-VAL-4",
                    format!(
                        "Unable to retrieve the latest release tag, so '{}' cannot be checked against it: {}",
                        version, e
                    ),
                )
            }
        };
        let latest_tag = latest_tag.as_deref();
        let history = match ReleaseHistory::from_latest_tag(latest_tag) {
            Ok(history) => history,
            Err(_) => {
                return CheckResult::failure(
                    "E-RD-VAL-4",
                    format!(
                        "The latest tag '{}' is not a version, so '{}' cannot be checked against it. Please fix the tag.",
                        latest_tag.unwrap_or_default(),
                        version
                    ),
                )
            }
        };

        if history.is_legal_next(version) {
            return CheckResult::success("Version is a legal successor of the latest release.");
        }
        let candidates = history
            .candidates()
            .iter()
            .map(Version::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        CheckResult::failure(
            "E-RD-VAL-4",
            format!(
                "The new version '{}' does not fit the versioning rules. Possible versions for the release are: {}",
                version, candidates
            ),
        )
    }

    fn validate_changelog(changelog: &str, version: &str) -> CheckResult {
        let link = format!("[{}](changes_{}.md)", version, version);
        if changelog.contains(&link) {
            CheckResult::success("Changelog links the release letter.")
        } else {
            CheckResult::failure(
                "E-RD-VAL-5",
                format!(
                    "The changelog does not contain a link to the release letter of version {}. Please add '{}' to changelog.md.",
                    version, link
                ),
            )
        }
    }

    fn validate_header(letter: &ReleaseLetter) -> CheckResult {
        match letter.header() {
            Some(_) => CheckResult::success("Release letter has a header."),
            None => CheckResult::failure(
                "E-RD-VAL-9",
                format!(
                    "The release letter {} has no code name. Please add a line 'Code name: ...' below the title.",
                    letter.file_name()
                ),
            ),
        }
    }

    fn validate_letter_version(letter: &ReleaseLetter, version: &str) -> CheckResult {
        match letter.version_number() {
            Some(found) if found == version => {
                CheckResult::success("Release letter mentions the release version.")
            }
            found => CheckResult::failure(
                "E-RD-VAL-6",
                format!(
                    "The release letter {} mentions version '{}' instead of '{}'. Please fix the title line.",
                    letter.file_name(),
                    found.unwrap_or("none"),
                    version
                ),
            ),
        }
    }

    fn validate_date(&self, letter: &ReleaseLetter, on_default_branch: bool) -> CheckResult {
        if letter.release_date() == Some(self.today) {
            return CheckResult::success("Release date is today.");
        }
        let found = letter
            .release_date()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "none".to_string());
        if on_default_branch {
            CheckResult::failure(
                "E-RD-VAL-7",
                format!(
                    "The release date in {} is '{}' but today is {}. Please update the date.",
                    letter.file_name(),
                    found,
                    self.today
                ),
            )
        } else {
            let message = format!(
                "W-RD-VAL-2: The release date in {} is '{}' but today is {}. Don't forget to update it before releasing.",
                letter.file_name(),
                found,
                self.today
            );
            warn!("{}", message);
            CheckResult::success(message)
        }
    }

    fn validate_body(letter: &ReleaseLetter) -> CheckResult {
        match letter.body() {
            Some(_) => CheckResult::success("Release letter has a body."),
            None => CheckResult::failure(
                "E-RD-VAL-8",
                format!(
                    "The release letter {} has no body. Please describe the changes of the release.",
                    letter.file_name()
                ),
            ),
        }
    }
}

impl RepositoryValidator for StructureValidator {
    fn name(&self) -> &'static str {
        "structure"
    }

    fn validate(&self, repository: &dyn Repository) -> Result<Report> {
        debug!(repository = repository.name(), branch = repository.branch_name(), "validating repository structure");
        let version = repository.version()?;
        let mut report = Report::validation();

        let format = Self::validate_version_format(&version);
        let format_ok = format.is_successful();
        report = report.with(format);
        if !format_ok {
            return Ok(report);
        }

        let legality = Self::validate_version_legality(&version, repository.latest_tag());
        let legality_ok = legality.is_successful();
        report = report.with(legality);
        if !legality_ok {
            return Ok(report);
        }

        let changelog = repository.changelog()?;
        report = report.with(Self::validate_changelog(&changelog, &version));

        let letter = repository.release_letter(&version)?;
        let on_default_branch = repository.is_on_default_branch()?;
        Ok(report
            .with(Self::validate_header(&letter))
            .with(Self::validate_letter_version(&letter, &version))
            .with(self.validate_date(&letter, on_default_branch))
            .with(Self::validate_body(&letter)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{
        open_repository, release_letter_path, MemorySource, CHANGELOG_PATH, POM_PATH,
    };

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
    }

    fn pom(version: &str) -> String {
        format!(
            "<project><artifactId>project</artifactId><version>{}</version></project>",
            version
        )
    }

    fn source(version: &str, changelog: &str, letter: &str) -> MemorySource {
        let mut source = MemorySource::new("exasol/project", "main");
        source.add_file(POM_PATH, pom(version));
        source.add_file(CHANGELOG_PATH, changelog);
        source.add_file(&release_letter_path(version), letter);
        source
    }

    fn validate(source: MemorySource) -> Report {
        let repository = open_repository(Box::new(source));
        StructureValidator::new(today())
            .validate(repository.as_ref())
            .unwrap()
    }

    fn codes(report: &Report) -> Vec<&str> {
        report.failures().filter_map(|r| r.code()).collect()
    }

    const GOOD_LETTER: &str =
        "# Project 1.0.0, released 2024-05-17\n\nCode name: 1.0.0\n\n## Features\n* #1: Added things\n";

    #[test]
    fn test_complete_repository_passes() {
        let report = validate(source("1.0.0", "* [1.0.0](changes_1.0.0.md)", GOOD_LETTER));
        assert!(!report.has_failures(), "{}", report.failures_report());
        assert_eq!(report.results().len(), 7);
    }

    #[test]
    fn test_malformed_version_skips_everything_else() {
        let report = validate(source("1.0", "", ""));
        assert_eq!(report.results().len(), 1);
        assert_eq!(codes(&report), vec!["E-RD-VAL-3"]);
    }

    #[test]
    fn test_illegal_version_lists_candidates() {
        let mut src = source("1.3.0", "", "");
        src.set_latest_tag("1.1.0");
        let report = validate(src);
        assert_eq!(codes(&report), vec!["E-RD-VAL-4"]);
        let message = report.failures().next().unwrap().message().to_string();
        assert!(message.contains("1.1.1, 1.2.0, 2.0.0"));
    }

    #[test]
    fn test_same_version_as_latest_tag_is_illegal() {
        let mut src = source("1.0.0", "* [1.0.0](changes_1.0.0.md)", GOOD_LETTER);
        src.set_latest_tag("v1.0.0");
        assert_eq!(codes(&validate(src)), vec!["E-RD-VAL-4"]);
    }

    #[test]
    fn test_failed_latest_tag_lookup_is_a_failed_check() {
        let mut src = source("1.1.0", "* [1.1.0](changes_1.1.0.md)", GOOD_LETTER);
        src.fail_latest_tag("timed out");
        let report = validate(src);
        assert_eq!(codes(&report), vec!["E-RD-VAL-4"]);
        let message = report.failures().next().unwrap().message().to_string();
        assert!(message.contains("timed out"));
    }

    #[test]
    fn test_releasable_version() {
        let mut src = MemorySource::new("exasol/project", "main");
        src.add_file(POM_PATH, pom("1.3.0"));
        src.set_latest_tag("1.1.0");
        let repository = open_repository(Box::new(src));
        assert_eq!(releasable_version(repository.as_ref()).unwrap(), None);

        let mut src = MemorySource::new("exasol/project", "main");
        src.add_file(POM_PATH, pom("1.2.0"));
        src.set_latest_tag("1.1.0");
        let repository = open_repository(Box::new(src));
        assert_eq!(
            releasable_version(repository.as_ref()).unwrap().as_deref(),
            Some("1.2.0")
        );

        let mut src = MemorySource::new("exasol/project", "main");
        src.add_file(POM_PATH, pom("1.2.0"));
        src.fail_latest_tag("timed out");
        let repository = open_repository(Box::new(src));
        assert_eq!(releasable_version(repository.as_ref()).unwrap(), None);
    }

    #[test]
    fn test_missing_changelog_link_still_checks_letter() {
        let mut src = source("2.3.0", "* [2.2.0](changes_2.2.0.md)", "# Project 2.3.0, released 2024-05-17\n");
        src.set_latest_tag("2.2.0");
        let report = validate(src);
        assert_eq!(codes(&report), vec!["E-RD-VAL-5", "E-RD-VAL-9", "E-RD-VAL-8"]);
        assert_eq!(report.results().len(), 7);
    }

    #[test]
    fn test_letter_with_all_problems() {
        let report = validate(source(
            "1.0.0",
            "* [1.0.0](changes_1.0.0.md)",
            "# Project 0.9.0, released 2020-01-01\n",
        ));
        assert_eq!(
            codes(&report),
            vec!["E-RD-VAL-9", "E-RD-VAL-6", "E-RD-VAL-7", "E-RD-VAL-8"]
        );
    }

    #[test]
    fn test_missing_date_on_default_branch_fails() {
        let letter = "# Project 1.0.0\n\nCode name: 1.0.0\n\nSome body\n";
        let report = validate(source("1.0.0", "* [1.0.0](changes_1.0.0.md)", letter));
        assert_eq!(codes(&report), vec!["E-RD-VAL-7"]);
    }

    #[test]
    fn test_missing_date_on_feature_branch_warns() {
        let letter = "# Project 1.0.0\n\nCode name: 1.0.0\n\nSome body\n";
        let mut src = source("1.0.0", "* [1.0.0](changes_1.0.0.md)", letter);
        src.set_on_default_branch(false);
        let report = validate(src);
        assert!(!report.has_failures());
        assert!(report
            .results()
            .iter()
            .any(|r| r.message().starts_with("W-RD-VAL-2")));
    }

    #[test]
    fn test_missing_release_letter_is_fatal() {
        let mut src = MemorySource::new("exasol/project", "main");
        src.add_file(POM_PATH, pom("1.0.0"));
        src.add_file(CHANGELOG_PATH, "* [1.0.0](changes_1.0.0.md)");
        let repository = open_repository(Box::new(src));
        let err = StructureValidator::new(today())
            .validate(repository.as_ref())
            .unwrap_err();
        assert!(err.to_string().starts_with("E-RD-REP-4"));
    }
}
