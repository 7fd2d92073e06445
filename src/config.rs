use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ReleaseDroidError, Result};

/// Represents the complete configuration for release-droid.
///
/// Contains workflow locations per platform, community portal settings and behavior options.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub maven: MavenConfig,

    #[serde(default)]
    pub community: CommunityConfig,

    #[serde(default)]
    pub behavior: BehaviorConfig,
}

fn default_github_workflow_path() -> String {
    ".github/workflows/release_droid_upload_github_release_assets.yml".to_string()
}

fn default_maven_workflow_id() -> String {
    "maven_central_release.yml".to_string()
}

fn default_maven_workflow_path() -> String {
    format!(".github/workflows/{}", default_maven_workflow_id())
}

fn default_template_path() -> String {
    "community_portal_post_template.json".to_string()
}

fn default_board_id() -> String {
    "ProductNews".to_string()
}

fn default_drafts_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("release-droid")
        .join("community-drafts")
}

/// Forge release settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitHubConfig {
    /// Workflow that uploads release assets; must exist in the repository
    #[serde(default = "default_github_workflow_path")]
    pub workflow_path: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        GitHubConfig {
            workflow_path: default_github_workflow_path(),
        }
    }
}

/// Maven Central release settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct MavenConfig {
    #[serde(default = "default_maven_workflow_path")]
    pub workflow_path: String,

    /// Workflow dispatched to deploy the release
    #[serde(default = "default_maven_workflow_id")]
    pub workflow_id: String,
}

impl Default for MavenConfig {
    fn default() -> Self {
        MavenConfig {
            workflow_path: default_maven_workflow_path(),
            workflow_id: default_maven_workflow_id(),
        }
    }
}

/// Community portal settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CommunityConfig {
    #[serde(default = "default_template_path")]
    pub template_path: String,

    #[serde(default = "default_board_id")]
    pub board_id: String,

    /// Directory receiving draft posts
    #[serde(default = "default_drafts_directory")]
    pub drafts_directory: PathBuf,
}

impl Default for CommunityConfig {
    fn default() -> Self {
        CommunityConfig {
            template_path: default_template_path(),
            board_id: default_board_id(),
            drafts_directory: default_drafts_directory(),
        }
    }
}

/// Which calendar "today" release letters are compared with.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DateTimezone {
    #[default]
    Utc,
    Local,
}

impl DateTimezone {
    pub fn today(self) -> NaiveDate {
        match self {
            DateTimezone::Utc => Utc::now().date_naive(),
            DateTimezone::Local => Local::now().date_naive(),
        }
    }
}

/// Configuration for behavior customization.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct BehaviorConfig {
    #[serde(default)]
    pub date_timezone: DateTimezone,
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `release_droid.toml` in current directory
/// 3. `release-droid/config.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let path = if let Some(path) = config_path {
        PathBuf::from(path)
    } else if Path::new("./release_droid.toml").exists() {
        PathBuf::from("./release_droid.toml")
    } else if let Some(config_dir) = dirs::config_dir() {
        let user_config = config_dir.join("release-droid").join("config.toml");
        if user_config.exists() {
            user_config
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let content = fs::read_to_string(&path).map_err(|e| {
        ReleaseDroidError::config(format!("cannot read {}: {}", path.display(), e))
    })?;
    toml::from_str(&content)
        .map_err(|e| ReleaseDroidError::config(format!("cannot parse {}: {}", path.display(), e)))
}
