use tracing::debug;

use crate::error::Result;
use crate::report::{CheckResult, Report};
use crate::repository::pom::{MavenPlugin, MavenPom};
use crate::repository::{Repository, POM_PATH};
use crate::validation::RepositoryValidator;

/// Plugins a project needs to be deployable to Maven Central
pub const REQUIRED_PLUGINS: [&str; 4] = [
    "nexus-staging-maven-plugin",
    "maven-source-plugin",
    "maven-gpg-plugin",
    "maven-javadoc-plugin",
];

const GPG_PLUGIN: &str = "maven-gpg-plugin";
const SIGN_EXECUTION_ID: &str = "sign-artifacts";
const PINENTRY_OPTION: &str = "--pinentry-mode";

/// Registry release needs its publish workflow and a deployable pom.xml
pub struct MavenPlatformValidator {
    workflow_path: String,
}

impl MavenPlatformValidator {
    pub fn new(workflow_path: impl Into<String>) -> Self {
        MavenPlatformValidator {
            workflow_path: workflow_path.into(),
        }
    }

    fn validate_workflow(&self, repository: &dyn Repository) -> CheckResult {
        if repository.has_file(&self.workflow_path) {
            CheckResult::success("Maven Central release workflow exists.")
        } else {
            CheckResult::failure(
                "E-RD-MVN-9",
                format!(
                    "The workflow '{}' is missing. Please add it to the repository, it deploys to Maven Central.",
                    self.workflow_path
                ),
            )
        }
    }

    fn validate_plugins(pom: &MavenPom) -> Vec<CheckResult> {
        REQUIRED_PLUGINS
            .iter()
            .map(|name| match pom.plugin(name) {
                Some(_) => CheckResult::success(format!("Plugin {} is declared.", name)),
                None => CheckResult::failure(
                    "E-RD-MVN-13",
                    format!("The pom.xml does not declare the required plugin {}.", name),
                ),
            })
            .collect()
    }

    fn validate_gpg_plugin(plugin: &MavenPlugin) -> CheckResult {
        if plugin.executions.is_empty() {
            return CheckResult::failure(
                "E-RD-MVN-14",
                format!("The {} has no <executions>. Please add a '{}' execution.", GPG_PLUGIN, SIGN_EXECUTION_ID),
            );
        }
        let Some(sign) = plugin
            .executions
            .iter()
            .find(|e| e.id.as_deref() == Some(SIGN_EXECUTION_ID))
        else {
            return CheckResult::failure(
                "E-RD-MVN-15",
                format!("The {} has no execution with id '{}'.", GPG_PLUGIN, SIGN_EXECUTION_ID),
            );
        };
        let pinentry = sign
            .configuration
            .as_deref()
            .map_or(false, |c| c.contains(PINENTRY_OPTION));
        if pinentry {
            CheckResult::success(format!("The {} signs artifacts non-interactively.", GPG_PLUGIN))
        } else {
            CheckResult::failure(
                "E-RD-MVN-16",
                format!(
                    "The '{}' execution of the {} does not pass '{}'. Please add it to the gpgArguments.",
                    SIGN_EXECUTION_ID, GPG_PLUGIN, PINENTRY_OPTION
                ),
            )
        }
    }
}

impl RepositoryValidator for MavenPlatformValidator {
    fn name(&self) -> &'static str {
        "maven"
    }

    fn validate(&self, repository: &dyn Repository) -> Result<Report> {
        debug!(workflow = %self.workflow_path, "validating Maven platform requirements");
        let report = Report::validation().with(self.validate_workflow(repository));

        let pom = match repository.read_file(POM_PATH) {
            Ok(content) => MavenPom::parse(&content),
            Err(e) => {
                return Ok(report.with(CheckResult::failure(
                    "E-RD-MVN-10",
                    format!("Cannot release to Maven Central without a pom.xml: {}", e),
                )))
            }
        };

        let mut report = Self::validate_plugins(&pom)
            .into_iter()
            .fold(report, Report::with);
        if let Some(gpg) = pom.plugin(GPG_PLUGIN) {
            report = report.with(Self::validate_gpg_plugin(gpg));
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{open_repository, MemorySource};

    const WORKFLOW: &str = ".github/workflows/maven_central_release.yml";

    fn plugin(name: &str, inner: &str) -> String {
        format!("<plugin><artifactId>{}</artifactId>{}</plugin>", name, inner)
    }

    fn validate(pom: Option<String>, workflow: bool) -> Report {
        let mut source = MemorySource::new("exasol/project", "main");
        if let Some(pom) = pom {
            source.add_file(POM_PATH, pom);
        }
        if workflow {
            source.add_file(WORKFLOW, "on: workflow_dispatch");
        }
        let repository = open_repository(Box::new(source));
        MavenPlatformValidator::new(WORKFLOW)
            .validate(repository.as_ref())
            .unwrap()
    }

    fn pom_with(gpg_inner: &str) -> String {
        let plugins: String = [
            plugin("nexus-staging-maven-plugin", ""),
            plugin("maven-source-plugin", ""),
            plugin("maven-javadoc-plugin", ""),
            plugin(GPG_PLUGIN, gpg_inner),
        ]
        .concat();
        format!(
            "<project><artifactId>a</artifactId><version>1.0.0</version><build><plugins>{}</plugins></build></project>",
            plugins
        )
    }

    fn codes(report: &Report) -> Vec<&str> {
        report.failures().filter_map(|r| r.code()).collect()
    }

    #[test]
    fn test_deployable_pom_passes() {
        let gpg = "<executions><execution><id>sign-artifacts</id><configuration>\
                   <gpgArguments><arg>--pinentry-mode</arg><arg>loopback</arg></gpgArguments>\
                   </configuration></execution></executions>";
        let report = validate(Some(pom_with(gpg)), true);
        assert!(!report.has_failures(), "{}", report.failures_report());
    }

    #[test]
    fn test_missing_workflow_and_pom() {
        assert_eq!(codes(&validate(None, false)), vec!["E-RD-MVN-9", "E-RD-MVN-10"]);
    }

    #[test]
    fn test_missing_plugins_are_reported_individually() {
        let report = validate(
            Some("<project><artifactId>a</artifactId><version>1.0.0</version></project>".to_string()),
            true,
        );
        assert_eq!(codes(&report), vec!["E-RD-MVN-13"; 4]);
    }

    #[test]
    fn test_gpg_plugin_checks() {
        assert_eq!(codes(&validate(Some(pom_with("")), true)), vec!["E-RD-MVN-14"]);
        assert_eq!(
            codes(&validate(
                Some(pom_with("<executions><execution><id>other</id></execution></executions>")),
                true
            )),
            vec!["E-RD-MVN-15"]
        );
        assert_eq!(
            codes(&validate(
                Some(pom_with(
                    "<executions><execution><id>sign-artifacts</id></execution></executions>"
                )),
                true
            )),
            vec!["E-RD-MVN-16"]
        );
    }
}
