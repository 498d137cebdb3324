use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: u64,
    pub name: String,
    /// `main`, `trash` or `custom`.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub default_tag: Option<u8>,
    #[serde(default)]
    pub custom: Option<u8>,
    #[serde(default)]
    pub unread_count: Option<u64>,
}

impl Folder {
    pub fn is_custom(&self) -> bool {
        self.custom == Some(1) || self.kind.as_deref() == Some("custom")
    }
}
