//! Presence and typing entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::UserId;

/// Online status of a peer as last reported by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceEntry {
    pub user_id: UserId,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
}

impl PresenceEntry {
    pub fn online(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            is_online: true,
            last_seen: None,
        }
    }

    pub fn offline(user_id: impl Into<UserId>, last_seen: Option<DateTime<Utc>>) -> Self {
        Self {
            user_id: user_id.into(),
            is_online: false,
            last_seen,
        }
    }
}

/// A user currently typing in a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingUser {
    #[serde(alias = "id")]
    pub user_id: UserId,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}
