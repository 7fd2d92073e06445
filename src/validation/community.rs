use tracing::debug;

use crate::error::Result;
use crate::release::CommunityPortalTemplate;
use crate::report::{CheckResult, Report};
use crate::repository::Repository;
use crate::validation::structure::releasable_version;
use crate::validation::RepositoryValidator;

/// Announcement needs a complete template and a summary in the release letter
pub struct CommunityPlatformValidator {
    template_path: String,
}

impl CommunityPlatformValidator {
    pub fn new(template_path: impl Into<String>) -> Self {
        CommunityPlatformValidator {
            template_path: template_path.into(),
        }
    }

    fn validate_template(&self, repository: &dyn Repository) -> Vec<CheckResult> {
        let template = match repository
            .read_file(&self.template_path)
            .map_err(|e| e.to_string())
            .and_then(|json| CommunityPortalTemplate::parse(&json).map_err(|e| e.to_string()))
        {
            Ok(template) => template,
            Err(cause) => {
                return vec![CheckResult::failure(
                    "E-RD-CP-3",
                    format!(
                        "Cannot use the community portal template '{}': {}. Please add a valid template.",
                        self.template_path, cause
                    ),
                )]
            }
        };

        let field = |name: &str, value: &str| {
            if value.trim().is_empty() {
                CheckResult::failure(
                    "E-RD-CP-5",
                    format!("The community portal template has no '{}'. Please fill it in.", name),
                )
            } else {
                CheckResult::success(format!("Template field '{}' is set.", name))
            }
        };
        let tags = if template.tags.iter().any(|t| !t.trim().is_empty()) {
            CheckResult::success("Template has tags.")
        } else {
            CheckResult::failure(
                "E-RD-CP-6",
                "The community portal template has no tags. Please add at least one.",
            )
        };

        vec![
            field("project name", &template.project_name),
            field("project description", &template.project_description),
            tags,
        ]
    }

    fn validate_summary(repository: &dyn Repository, version: &str) -> Result<CheckResult> {
        let letter = repository.release_letter(version)?;
        Ok(match letter.summary() {
            Some(_) => CheckResult::success("Release letter has a summary."),
            None => CheckResult::failure(
                "E-RD-CP-7",
                format!(
                    "The release letter {} has no '## Summary' section. The community post needs it.",
                    letter.file_name()
                ),
            ),
        })
    }
}

impl RepositoryValidator for CommunityPlatformValidator {
    fn name(&self) -> &'static str {
        "community"
    }

    fn validate(&self, repository: &dyn Repository) -> Result<Report> {
        debug!(template = %self.template_path, "validating community portal requirements");
        let mut report = self
            .validate_template(repository)
            .into_iter()
            .fold(Report::validation(), Report::with);

        if let Some(version) = releasable_version(repository)? {
            report = report.with(Self::validate_summary(repository, &version)?);
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{open_repository, release_letter_path, MemorySource, CHANGELOG_PATH};

    const TEMPLATE_PATH: &str = "community_portal_post_template.json";
    const LETTER: &str = "# P 1.0.0, released 2024-05-17\n\nCode name: x\n\n## Summary\n\nText.\n";

    fn validate(template: Option<&str>, letter: &str) -> Report {
        let mut source = MemorySource::new("exasol/project", "main");
        source.add_file(CHANGELOG_PATH, "* [1.0.0](changes_1.0.0.md)");
        source.add_file(&release_letter_path("1.0.0"), letter);
        if let Some(template) = template {
            source.add_file(TEMPLATE_PATH, template);
        }
        let repository = open_repository(Box::new(source));
        CommunityPlatformValidator::new(TEMPLATE_PATH)
            .validate(repository.as_ref())
            .unwrap()
    }

    fn codes(report: &Report) -> Vec<&str> {
        report.failures().filter_map(|r| r.code()).collect()
    }

    #[test]
    fn test_complete_template_passes() {
        let report = validate(
            Some(r#"{"project name": "P", "project description": "D", "tags": ["T"]}"#),
            LETTER,
        );
        assert!(!report.has_failures(), "{}", report.failures_report());
    }

    #[test]
    fn test_missing_template() {
        assert_eq!(codes(&validate(None, LETTER)), vec!["E-RD-CP-3"]);
        assert_eq!(codes(&validate(Some("not json"), LETTER)), vec!["E-RD-CP-3"]);
    }

    #[test]
    fn test_incomplete_template_and_letter() {
        let report = validate(
            Some(r#"{"project name": "", "tags": []}"#),
            "# P 1.0.0\n\nCode name: x\n\nbody\n",
        );
        assert_eq!(
            codes(&report),
            vec!["E-RD-CP-5", "E-RD-CP-5", "E-RD-CP-6", "E-RD-CP-7"]
        );
    }

    #[test]
    fn test_illegal_version_does_not_need_a_letter() {
        let mut source = MemorySource::new("exasol/project", "main");
        source.add_file(CHANGELOG_PATH, "* [1.3.0](changes_1.3.0.md)");
        source.add_file(
            TEMPLATE_PATH,
            r#"{"project name": "P", "project description": "D", "tags": ["T"]}"#,
        );
        source.set_latest_tag("1.1.0");
        let repository = open_repository(Box::new(source));

        let report = CommunityPlatformValidator::new(TEMPLATE_PATH)
            .validate(repository.as_ref())
            .unwrap();
        assert!(!report.has_failures());
        assert_eq!(report.results().len(), 3);
    }
}
