use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: u64,
    #[serde(default)]
    pub uuid: Option<String>,
    pub name: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub distro: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub core_version: Option<String>,
    #[serde(default)]
    pub core_build: Option<String>,
    #[serde(default)]
    pub plugin_feed_id: Option<String>,
    /// Unix timestamps; absent until the agent first checks in.
    #[serde(default)]
    pub linked_on: Option<i64>,
    #[serde(default)]
    pub last_connect: Option<i64>,
    #[serde(default)]
    pub last_scanned: Option<i64>,
    #[serde(default)]
    pub groups: Option<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentGroup {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub owner_id: Option<u64>,
    #[serde(default)]
    pub user_permissions: Option<u32>,
    #[serde(default)]
    pub creation_date: Option<i64>,
    #[serde(default)]
    pub last_modification_date: Option<i64>,
    #[serde(default)]
    pub agents_count: Option<u64>,
}
