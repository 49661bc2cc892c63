use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::BootstrapResult;
use crate::model::entity::EntityKind;
use crate::reconcile::UpsertAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalAction {
    Created,
    Updated,
    /// Dry-run: the action that would have been taken.
    Planned,
}

impl From<UpsertAction> for JournalAction {
    fn from(action: UpsertAction) -> Self {
        match action {
            UpsertAction::Created => JournalAction::Created,
            UpsertAction::Updated => JournalAction::Updated,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEvent {
    pub timestamp: String,
    pub kind: EntityKind,
    pub external_id: String,
    pub name: String,
    pub remote_id: i64,
    pub action: JournalAction,
    pub dry_run: bool,
}

impl JournalEvent {
    pub fn new(
        kind: EntityKind,
        external_id: &str,
        name: &str,
        remote_id: i64,
        action: JournalAction,
    ) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            kind,
            external_id: external_id.to_string(),
            name: name.to_string(),
            remote_id,
            action,
            dry_run: action == JournalAction::Planned,
        }
    }
}

/// Append-only JSON-lines record of what a run did.
#[derive(Debug, Clone)]
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn append(&self, event: &JournalEvent) -> BootstrapResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let line = serde_json::to_string(event)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    /// Events from all runs, oldest first. Unparsable lines are skipped.
    #[cfg(test)]
    pub fn read_events(&self) -> Vec<JournalEvent> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        };
        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }
}
