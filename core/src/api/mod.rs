//! Endpoint groups, one module per resource.

pub mod agent_groups;
pub mod agents;
pub mod editor;
pub mod filters;
pub mod folders;
pub mod scans;

pub use agent_groups::AgentGroupsApi;
pub use agents::{AgentQuery, AgentsApi};
pub use editor::EditorApi;
pub use filters::FiltersApi;
pub use folders::FoldersApi;
pub use scans::{ScanDetailsQuery, ScansApi};

use crate::error::{NessusError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A non-empty, ordered set of identifiers.
///
/// One id maps to the singular endpoint, several to the bulk endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdSet {
    Single(u64),
    Bulk(Vec<u64>),
}

impl IdSet {
    pub fn new<I>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = u64>,
    {
        let ids: Vec<u64> = ids.into_iter().collect();
        match ids.as_slice() {
            [] => Err(NessusError::NoIdentifiers),
            [id] => Ok(IdSet::Single(*id)),
            _ => Ok(IdSet::Bulk(ids)),
        }
    }

    /// Bulk request body; the key is always `ids`.
    pub fn body(ids: &[u64]) -> Value {
        json!({ "ids": ids })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}
