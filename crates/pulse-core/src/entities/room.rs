//! Room summary - the sidebar entry pushed by `new_room_created`

use serde::{Deserialize, Serialize};

use super::user::UserSummary;
use crate::value_objects::RoomId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    #[serde(alias = "_id")]
    pub id: RoomId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_group: bool,
    #[serde(default)]
    pub members: Vec<UserSummary>,
    #[serde(default)]
    pub unread_count: u64,
    /// Fields the realtime layer passes through untouched
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RoomSummary {
    pub fn new(id: impl Into<RoomId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            is_group: false,
            members: Vec::new(),
            unread_count: 0,
            extra: serde_json::Map::new(),
        }
    }
}
