use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{ReleaseDroidError, Result};
use crate::repository::pom::MavenPom;
use crate::repository::{BranchContent, Repository, RepositoryKind, POM_PATH};

const ASSEMBLY_PLUGIN: &str = "maven-assembly-plugin";
const TARGET_DIRECTORY: &str = "./target/";

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"))
}

/// Maven project described by a `pom.xml`
pub struct MavenRepository {
    content: BranchContent,
}

impl MavenRepository {
    pub fn new(content: BranchContent) -> Self {
        MavenRepository { content }
    }

    /// Parsed descriptor of the bound branch
    pub fn pom(&self) -> Result<MavenPom> {
        Ok(MavenPom::parse(&self.read_file(POM_PATH)?))
    }

    fn resolve_placeholders(&self, text: &str, pom: &MavenPom, version: &str) -> Result<String> {
        let mut unresolved = Vec::new();
        let resolved = placeholder_regex().replace_all(text, |caps: &regex::Captures| {
            let key = &caps[1];
            match key {
                "version" | "project.version" => version.to_string(),
                _ => match pom.properties.get(key) {
                    Some(value) => value.clone(),
                    None => {
                        unresolved.push(key.to_string());
                        caps[0].to_string()
                    }
                },
            }
        });
        if unresolved.is_empty() {
            Ok(resolved.into_owned())
        } else {
            Err(ReleaseDroidError::repository_access(
                "E-RD-REP-5",
                format!(
                    "Cannot resolve {} in the assembly final name '{}'. Please declare {} in the pom.xml properties.",
                    unresolved.join(", "),
                    text,
                    if unresolved.len() == 1 { "it" } else { "them" }
                ),
            ))
        }
    }
}

impl Repository for MavenRepository {
    fn content(&self) -> &BranchContent {
        &self.content
    }

    fn kind(&self) -> RepositoryKind {
        RepositoryKind::Maven
    }

    fn read_version(&self) -> Result<String> {
        self.pom()?.version.ok_or_else(|| {
            ReleaseDroidError::repository_access(
                "E-RD-REP-3",
                "Cannot detect the project version: pom.xml has no <version>.",
            )
        })
    }

    fn deliverables(&self) -> Result<BTreeMap<String, String>> {
        let pom = self.pom()?;
        let version = self.version()?;
        let final_name = pom
            .plugin(ASSEMBLY_PLUGIN)
            .and_then(|plugin| plugin.configuration.as_deref())
            .and_then(|configuration| {
                configuration
                    .split_once("<finalName>")
                    .and_then(|(_, rest)| rest.split_once("</finalName>"))
                    .map(|(name, _)| name.trim().to_string())
            })
            .filter(|name| !name.is_empty());

        let base_name = match final_name {
            Some(name) => self.resolve_placeholders(&name, &pom, &version)?,
            None => {
                let artifact_id = pom.artifact_id.as_deref().ok_or_else(|| {
                    ReleaseDroidError::repository_access(
                        "E-RD-REP-8",
                        "Cannot detect the deliverable: pom.xml has no <artifactId>.",
                    )
                })?;
                format!("{}-{}", artifact_id, version)
            }
        };

        let asset_name = format!("{}.jar", base_name);
        let asset_path = format!("{}{}", TARGET_DIRECTORY, asset_name);
        Ok(BTreeMap::from([(asset_name, asset_path)]))
    }
}
