pub mod retry;
pub mod shortcut;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::BootstrapResult;
use crate::model::entity::EntityKind;
use crate::model::record::RemoteRecord;

/// The remote project-tracking service, reduced to the calls the
/// reconciler needs. Every call is a full round-trip; implementations do not
/// cache.
#[async_trait]
pub trait Tracker: Send + Sync {
    /// Entire remote collection for `kind`. No paging.
    async fn list(&self, kind: EntityKind) -> BootstrapResult<Vec<RemoteRecord>>;

    async fn create(&self, kind: EntityKind, payload: &Value) -> BootstrapResult<RemoteRecord>;

    async fn update(
        &self,
        kind: EntityKind,
        id: i64,
        payload: &Value,
    ) -> BootstrapResult<RemoteRecord>;

    /// First remote record tagged with `external_id`. The default lists the
    /// whole collection and scans it; override when the service can filter.
    async fn find_by_external_id(
        &self,
        kind: EntityKind,
        external_id: &str,
    ) -> BootstrapResult<Option<RemoteRecord>> {
        let records = self.list(kind).await?;
        Ok(records.into_iter().find(|r| r.has_external_id(external_id)))
    }
}

#[cfg(test)]
pub mod fake;
