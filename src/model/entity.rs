use serde::{Deserialize, Serialize};
use std::fmt;

/// Remote entity types, in the order they must be reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Project,
    Milestone,
    Epic,
    Iteration,
    Story,
    Task,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Project => "project",
            EntityKind::Milestone => "milestone",
            EntityKind::Epic => "epic",
            EntityKind::Iteration => "iteration",
            EntityKind::Story => "story",
            EntityKind::Task => "task",
        }
    }

    /// Collection path relative to the API base.
    pub fn collection_path(&self) -> &'static str {
        match self {
            EntityKind::Project => "/projects",
            EntityKind::Milestone => "/milestones",
            EntityKind::Epic => "/epics",
            EntityKind::Iteration => "/iterations",
            EntityKind::Story => "/stories",
            EntityKind::Task => "/tasks",
        }
    }

    pub fn plural(&self) -> &'static str {
        &self.collection_path()[1..]
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
