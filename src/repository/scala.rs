use std::collections::BTreeMap;

use crate::error::{ReleaseDroidError, Result};
use crate::repository::{BranchContent, Repository, RepositoryKind, BUILD_SBT_PATH};

const VERSION_KEY: &str = "version :=";
const MODULE_NAME_KEY: &str = "moduleName :=";
const TARGET_DIRECTORY: &str = "./target/scala-2.12/";

/// Quoted value following `key` in a build.sbt.
///
/// The first occurrence outside a `//` line comment wins, so in a multi-project
/// build the setting of the first listed project is used.
fn sbt_setting(build_file: &str, key: &str) -> Option<String> {
    build_file
        .lines()
        .map(str::trim_start)
        .filter(|line| !line.starts_with("//"))
        .find_map(|line| {
            let rest = &line[line.find(key)? + key.len()..];
            let start = rest.find('"')? + 1;
            let end = rest[start..].find('"')? + start;
            Some(rest[start..end].to_string())
        })
}

/// Scala project built with sbt
pub struct ScalaRepository {
    content: BranchContent,
}

impl ScalaRepository {
    pub fn new(content: BranchContent) -> Self {
        ScalaRepository { content }
    }
}

impl Repository for ScalaRepository {
    fn content(&self) -> &BranchContent {
        &self.content
    }

    fn kind(&self) -> RepositoryKind {
        RepositoryKind::Scala
    }

    fn read_version(&self) -> Result<String> {
        let build_file = self.read_file(BUILD_SBT_PATH)?;
        sbt_setting(&build_file, VERSION_KEY).ok_or_else(|| {
            ReleaseDroidError::repository_access(
                "E-RD-REP-3",
                "Cannot detect the project version: build.sbt has no 'version := \"...\"' setting.",
            )
        })
    }

    fn deliverables(&self) -> Result<BTreeMap<String, String>> {
        let build_file = self.read_file(BUILD_SBT_PATH)?;
        let module_name = sbt_setting(&build_file, MODULE_NAME_KEY).unwrap_or_else(|| {
            let name = self.name();
            name.rsplit('/').next().unwrap_or(name).to_string()
        });
        let asset_name = format!("{}-{}.jar", module_name, self.version()?);
        let asset_path = format!("{}{}", TARGET_DIRECTORY, asset_name);
        Ok(BTreeMap::from([(asset_name, asset_path)]))
    }
}
