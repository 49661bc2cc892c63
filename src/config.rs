use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

use crate::error::{BootstrapError, BootstrapResult};

pub const DEFAULT_API_BASE: &str = "https://api.app.shortcut.com/api/v3";
pub const TOKEN_VAR: &str = "SHORTCUT_TOKEN";
pub const API_BASE_VAR: &str = "SHORTCUT_API_BASE";

/// The desired state of the workspace, as written in the config document.
#[derive(Debug, Deserialize)]
pub struct DesiredState {
    #[serde(default)]
    pub org: OrgConfig,
    #[serde(default)]
    pub projects: Vec<ProjectConfig>,
    pub milestone: Option<MilestoneConfig>,
    #[serde(default)]
    pub epics: Vec<EpicConfig>,
    pub iteration: Option<IterationConfig>,
    #[serde(default)]
    pub stories: Vec<StoryConfig>,
}

#[derive(Debug, Deserialize)]
pub struct OrgConfig {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_iteration_length")]
    pub iteration_length_days: u32,
    /// Prefix of synthesized task external ids.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for OrgConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            iteration_length_days: default_iteration_length(),
            namespace: default_namespace(),
        }
    }
}

fn default_timezone() -> String {
    "UTC".into()
}

fn default_iteration_length() -> u32 {
    7
}

fn default_namespace() -> String {
    "beeai".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub external_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MilestoneConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_milestone_state")]
    pub state: String,
    pub external_id: String,
}

fn default_milestone_state() -> String {
    "to_do".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct EpicConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub labels: Vec<String>,
    pub external_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IterationConfig {
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub external_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoryConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_story_type")]
    pub story_type: String,
    /// Name of a configured project.
    pub project: String,
    /// Name of a configured epic.
    pub epic: String,
    #[serde(default = "default_estimate")]
    pub estimate: u32,
    #[serde(default)]
    pub labels: Vec<String>,
    pub external_id: String,
    /// Task descriptions; list position determines task identity.
    #[serde(default)]
    pub tasks: Vec<String>,
}

fn default_story_type() -> String {
    "feature".into()
}

fn default_estimate() -> u32 {
    1
}

impl DesiredState {
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let state: Self = serde_yaml::from_str(contents).context("Failed to parse YAML config")?;
        state.validate()?;
        Ok(state)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let state: Self = toml::from_str(contents).context("Failed to parse TOML config")?;
        state.validate()?;
        Ok(state)
    }

    fn validate(&self) -> BootstrapResult<()> {
        if self.milestone.is_none() {
            return Err(BootstrapError::MissingMilestone);
        }
        if self.org.iteration_length_days == 0 {
            return Err(BootstrapError::Config(
                "org.iteration_length_days must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn milestone(&self) -> BootstrapResult<&MilestoneConfig> {
        self.milestone.as_ref().ok_or(BootstrapError::MissingMilestone)
    }
}

/// Load the desired-state document. `.toml` files are read as TOML, anything
/// else as YAML.
pub fn load_config(path: &Path) -> Result<DesiredState> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let state = if is_toml {
        DesiredState::from_toml(&contents)
    } else {
        DesiredState::from_yaml(&contents)
    };
    state.with_context(|| format!("Invalid config {}", path.display()))
}

/// Connection settings for the remote API, resolved once at startup.
#[derive(Clone)]
pub struct ApiSettings {
    pub token: String,
    pub base_url: String,
}

impl ApiSettings {
    pub fn new(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> BootstrapResult<Self> {
        let token = lookup(TOKEN_VAR)
            .filter(|t| !t.trim().is_empty())
            .ok_or(BootstrapError::MissingToken)?;
        let base_url = lookup(API_BASE_VAR)
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Ok(Self::new(token, base_url))
    }
}

impl fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSettings")
            .field("token", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}
