use serde::{Deserialize, Serialize};

/// The subset of a remote entity the bootstrapper reads back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRecord {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Set only on records the bootstrapper (or another tool) tagged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RemoteRecord {
    /// Stand-in for records that were never fetched (dry-run).
    pub fn placeholder() -> Self {
        Self {
            id: 0,
            name: None,
            external_id: None,
            description: None,
        }
    }

    pub fn has_external_id(&self, external_id: &str) -> bool {
        self.external_id.as_deref() == Some(external_id)
    }

    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.description.as_deref())
            .unwrap_or_default()
    }
}
