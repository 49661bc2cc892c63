use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::Tracker;
use crate::error::BootstrapResult;
use crate::model::payload::{Payload, TaskPayload};
use crate::model::record::RemoteRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertAction {
    Created,
    Updated,
}

#[derive(Debug, Clone)]
pub struct Upserted {
    pub record: RemoteRecord,
    pub action: UpsertAction,
}

/// Create-or-update keyed by external id.
///
/// Looks the record up first; a match gets the full payload written over it,
/// otherwise a new record is created carrying the external id so the next run
/// finds it. One lookup plus one write per call.
pub async fn upsert<P: Payload>(tracker: &dyn Tracker, payload: &P) -> BootstrapResult<Upserted> {
    let body = serde_json::to_value(payload)?;
    let existing = tracker
        .find_by_external_id(P::KIND, payload.external_id())
        .await?;

    let (record, action) = match existing {
        Some(found) => (
            tracker.update(P::KIND, found.id, &body).await?,
            UpsertAction::Updated,
        ),
        None => (tracker.create(P::KIND, &body).await?, UpsertAction::Created),
    };

    info!(
        kind = %P::KIND,
        external_id = payload.external_id(),
        id = record.id,
        action = ?action,
        "Reconciled"
    );
    Ok(Upserted { record, action })
}

/// `<namespace>:task:<story external id>:<1-based index>`.
pub fn task_external_id(namespace: &str, story_external_id: &str, index: usize) -> String {
    format!("{namespace}:task:{story_external_id}:{index}")
}

impl TaskPayload {
    pub fn for_story(
        namespace: &str,
        description: &str,
        story_id: i64,
        story_external_id: &str,
        index: usize,
    ) -> Self {
        Self {
            description: description.to_string(),
            story_id,
            external_id: task_external_id(namespace, story_external_id, index),
        }
    }
}

/// Tasks are always created, never looked up. A rerun with the same task
/// list adds another copy of every task.
pub async fn create_task(tracker: &dyn Tracker, payload: &TaskPayload) -> BootstrapResult<RemoteRecord> {
    let body = serde_json::to_value(payload)?;
    let record = tracker.create(TaskPayload::KIND, &body).await?;
    info!(
        external_id = %payload.external_id,
        story_id = payload.story_id,
        id = record.id,
        "Created task"
    );
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{Call, FakeTracker};
    use crate::error::BootstrapError;
    use crate::model::entity::EntityKind;
    use crate::model::payload::{MilestonePayload, ProjectPayload};
    use serde_json::json;

    fn project(name: &str, external_id: &str) -> ProjectPayload {
        ProjectPayload {
            name: name.into(),
            description: "desc".into(),
            external_id: external_id.into(),
        }
    }

    #[test]
    fn task_external_id_format() {
        assert_eq!(task_external_id("beeai", "story-1", 2), "beeai:task:story-1:2");
    }

    #[test]
    fn task_payload_for_story() {
        let task = TaskPayload::for_story("beeai", "Write docs", 77, "story-1", 1);
        assert_eq!(task.external_id, "beeai:task:story-1:1");
        assert_eq!(task.story_id, 77);
    }

    #[tokio::test]
    async fn upsert_creates_when_absent() {
        let tracker = FakeTracker::new();
        let result = upsert(&tracker, &project("Platform", "proj-1")).await.unwrap();

        assert_eq!(result.action, UpsertAction::Created);
        assert_eq!(result.record.external_id.as_deref(), Some("proj-1"));
        assert_eq!(
            tracker.calls(),
            vec![Call::List(EntityKind::Project), Call::Create(EntityKind::Project)]
        );
    }

    #[tokio::test]
    async fn upsert_updates_matching_record_with_full_payload() {
        let tracker = FakeTracker::new();
        tracker.seed(
            EntityKind::Project,
            json!({ "name": "Unrelated", "external_id": "proj-9" }),
        );
        let id = tracker.seed(
            EntityKind::Project,
            json!({ "name": "Old name", "description": "old", "external_id": "proj-1" }),
        );

        let result = upsert(&tracker, &project("Platform", "proj-1")).await.unwrap();

        assert_eq!(result.action, UpsertAction::Updated);
        assert_eq!(result.record.id, id);
        assert_eq!(tracker.count(EntityKind::Project), 2);
        assert_eq!(
            tracker.payloads(EntityKind::Project)[1],
            json!({ "name": "Platform", "description": "desc", "external_id": "proj-1" })
        );
        assert_eq!(
            tracker.writes(),
            vec![Call::Update(EntityKind::Project, id)]
        );
    }

    #[tokio::test]
    async fn records_without_external_id_are_never_matched() {
        let tracker = FakeTracker::new();
        tracker.seed(EntityKind::Project, json!({ "name": "Platform" }));

        let result = upsert(&tracker, &project("Platform", "proj-1")).await.unwrap();
        assert_eq!(result.action, UpsertAction::Created);
        assert_eq!(tracker.count(EntityKind::Project), 2);
    }

    #[tokio::test]
    async fn repeated_upserts_do_not_duplicate() {
        let tracker = FakeTracker::new();
        let milestone = MilestonePayload {
            name: "MVP".into(),
            description: String::new(),
            state: "to_do".into(),
            external_id: "ms-1".into(),
        };
        for _ in 0..3 {
            upsert(&tracker, &milestone).await.unwrap();
        }
        assert_eq!(tracker.count(EntityKind::Milestone), 1);
    }

    #[tokio::test]
    async fn create_failure_propagates() {
        let tracker = FakeTracker::new().with_failing_create(EntityKind::Project);
        let err = upsert(&tracker, &project("Platform", "proj-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, BootstrapError::Api { status: 422, .. }));
    }

    #[tokio::test]
    async fn tasks_are_created_every_time() {
        let tracker = FakeTracker::new();
        let task = TaskPayload::for_story("beeai", "Write docs", 1, "story-1", 1);
        create_task(&tracker, &task).await.unwrap();
        create_task(&tracker, &task).await.unwrap();

        assert_eq!(tracker.count(EntityKind::Task), 2);
        assert!(!tracker.calls().contains(&Call::List(EntityKind::Task)));
    }
}
