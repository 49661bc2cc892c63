use chrono::NaiveDate;
use serde::Serialize;

use super::entity::EntityKind;
use crate::config::{EpicConfig, IterationConfig, MilestoneConfig, ProjectConfig, StoryConfig};

/// A create/update body for one remote entity type.
///
/// The same body is sent for both create and update, so an update is always a
/// full overwrite of the fields listed here.
pub trait Payload: Serialize + Send + Sync {
    const KIND: EntityKind;

    fn external_id(&self) -> &str;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelParam {
    pub name: String,
}

fn label_params(labels: &[String]) -> Vec<LabelParam> {
    labels
        .iter()
        .map(|name| LabelParam { name: name.clone() })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectPayload {
    pub name: String,
    pub description: String,
    pub external_id: String,
}

impl From<&ProjectConfig> for ProjectPayload {
    fn from(cfg: &ProjectConfig) -> Self {
        Self {
            name: cfg.name.clone(),
            description: cfg.description.clone(),
            external_id: cfg.external_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MilestonePayload {
    pub name: String,
    pub description: String,
    pub state: String,
    pub external_id: String,
}

impl From<&MilestoneConfig> for MilestonePayload {
    fn from(cfg: &MilestoneConfig) -> Self {
        Self {
            name: cfg.name.clone(),
            description: cfg.description.clone(),
            state: cfg.state.clone(),
            external_id: cfg.external_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EpicPayload {
    pub name: String,
    pub description: String,
    pub milestone_id: i64,
    pub labels: Vec<LabelParam>,
    pub external_id: String,
}

impl EpicPayload {
    pub fn new(cfg: &EpicConfig, milestone_id: i64) -> Self {
        Self {
            name: cfg.name.clone(),
            description: cfg.description.clone(),
            milestone_id,
            labels: label_params(&cfg.labels),
            external_id: cfg.external_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IterationPayload {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub external_id: String,
}

impl IterationPayload {
    pub fn new(cfg: &IterationConfig, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            name: cfg.name.clone(),
            start_date,
            end_date,
            external_id: cfg.external_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StoryPayload {
    pub name: String,
    pub description: String,
    pub story_type: String,
    pub project_id: i64,
    pub epic_id: i64,
    pub estimate: u32,
    pub labels: Vec<LabelParam>,
    pub external_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iteration_id: Option<i64>,
}

impl StoryPayload {
    pub fn new(cfg: &StoryConfig, project_id: i64, epic_id: i64, iteration_id: Option<i64>) -> Self {
        Self {
            name: cfg.name.clone(),
            description: cfg.description.clone(),
            story_type: cfg.story_type.clone(),
            project_id,
            epic_id,
            estimate: cfg.estimate,
            labels: label_params(&cfg.labels),
            external_id: cfg.external_id.clone(),
            iteration_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskPayload {
    pub description: String,
    pub story_id: i64,
    pub external_id: String,
}

macro_rules! impl_payload {
    ($ty:ty, $kind:expr, $name:ident) => {
        impl Payload for $ty {
            const KIND: EntityKind = $kind;

            fn external_id(&self) -> &str {
                &self.external_id
            }

            fn name(&self) -> &str {
                &self.$name
            }
        }
    };
}

impl_payload!(ProjectPayload, EntityKind::Project, name);
impl_payload!(MilestonePayload, EntityKind::Milestone, name);
impl_payload!(EpicPayload, EntityKind::Epic, name);
impl_payload!(IterationPayload, EntityKind::Iteration, name);
impl_payload!(StoryPayload, EntityKind::Story, name);
impl_payload!(TaskPayload, EntityKind::Task, description);
