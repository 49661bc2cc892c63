//! In-memory tracker used by the reconciliation tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::Tracker;
use crate::error::{BootstrapError, BootstrapResult};
use crate::model::entity::EntityKind;
use crate::model::record::RemoteRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    List(EntityKind),
    Create(EntityKind),
    Update(EntityKind, i64),
}

impl Call {
    pub fn is_write(&self) -> bool {
        !matches!(self, Call::List(_))
    }
}

#[derive(Default)]
struct FakeState {
    records: HashMap<EntityKind, Vec<(RemoteRecord, Value)>>,
    next_id: i64,
    calls: Vec<Call>,
    failing_creates: Vec<EntityKind>,
}

#[derive(Default)]
pub struct FakeTracker {
    state: Mutex<FakeState>,
}

fn record_from(id: i64, payload: &Value) -> RemoteRecord {
    let field = |key: &str| payload.get(key).and_then(Value::as_str).map(String::from);
    RemoteRecord {
        id,
        name: field("name"),
        external_id: field("external_id"),
        description: field("description"),
    }
}

impl FakeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every create of `kind` answer HTTP 422.
    pub fn with_failing_create(self, kind: EntityKind) -> Self {
        self.state.lock().unwrap().failing_creates.push(kind);
        self
    }

    /// Insert a record as if someone else had created it.
    pub fn seed(&self, kind: EntityKind, payload: Value) -> i64 {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        let record = record_from(id, &payload);
        state.records.entry(kind).or_default().push((record, payload));
        id
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.state
            .lock()
            .unwrap()
            .records
            .get(&kind)
            .map_or(0, Vec::len)
    }

    pub fn payloads(&self, kind: EntityKind) -> Vec<Value> {
        self.state
            .lock()
            .unwrap()
            .records
            .get(&kind)
            .map(|rs| rs.iter().map(|(_, p)| p.clone()).collect())
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn writes(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_write).collect()
    }
}

#[async_trait]
impl Tracker for FakeTracker {
    async fn list(&self, kind: EntityKind) -> BootstrapResult<Vec<RemoteRecord>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::List(kind));
        Ok(state
            .records
            .get(&kind)
            .map(|rs| rs.iter().map(|(r, _)| r.clone()).collect())
            .unwrap_or_default())
    }

    async fn create(&self, kind: EntityKind, payload: &Value) -> BootstrapResult<RemoteRecord> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Create(kind));
        if state.failing_creates.contains(&kind) {
            return Err(BootstrapError::Api {
                context: format!("create {kind}"),
                status: 422,
                body: r#"{"message":"Unprocessable"}"#.into(),
            });
        }
        state.next_id += 1;
        let record = record_from(state.next_id, payload);
        state
            .records
            .entry(kind)
            .or_default()
            .push((record.clone(), payload.clone()));
        Ok(record)
    }

    async fn update(
        &self,
        kind: EntityKind,
        id: i64,
        payload: &Value,
    ) -> BootstrapResult<RemoteRecord> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Update(kind, id));
        let slot = state
            .records
            .get_mut(&kind)
            .and_then(|rs| rs.iter_mut().find(|(r, _)| r.id == id))
            .ok_or_else(|| BootstrapError::Api {
                context: format!("update {kind}"),
                status: 404,
                body: "Resource not found".into(),
            })?;
        let record = record_from(id, payload);
        *slot = (record.clone(), payload.clone());
        Ok(record)
    }
}
