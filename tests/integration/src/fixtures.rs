//! Test fixtures and data generators
//!
//! Provides configuration and wire payloads shaped like the server's pushes.

use std::sync::atomic::{AtomicU64, Ordering};

use pulse_common::AppConfig;
use pulse_core::{Message, UserSummary};
use serde_json::{json, Value};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Default configuration with deterministic reconnect delays
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.realtime.randomization_factor = 0.0;
    config
}

/// A text message from `sender` in `room`
pub fn text_message(id: &str, room: &str, sender: &str) -> Message {
    Message::text(id, room, UserSummary::new(sender), format!("message {id}"))
}

fn user(id: &str) -> Value {
    json!({ "_id": id, "displayName": format!("User {id}") })
}

/// `receive_message`
pub fn receive_message(room: &str, message_id: &str, sender: &str) -> Value {
    json!({
        "roomId": room,
        "newMessage": {
            "_id": message_id,
            "sender": user(sender),
            "type": "text",
            "content": format!("message {message_id}"),
        },
    })
}

/// `message_reaction_update` with one reaction per `(user, emoji)` pair
pub fn reaction_update(room: &str, message_id: &str, reactions: &[(&str, &str)]) -> Value {
    let reactions: Vec<Value> = reactions
        .iter()
        .map(|(user_id, content)| json!({ "content": content, "user": user(user_id) }))
        .collect();
    json!({ "messageId": message_id, "roomId": room, "reactions": reactions })
}

/// `message_read_update`
pub fn read_update(room: &str, message_id: &str, readers: &[&str]) -> Value {
    let reads: Vec<Value> = readers
        .iter()
        .map(|user_id| json!({ "userId": user_id, "readAt": "2024-01-01T00:00:00Z" }))
        .collect();
    json!({ "messageId": message_id, "roomId": room, "reads": reads })
}

/// `message_deleted`
pub fn message_deleted(room: &str, message_id: &str) -> Value {
    json!({ "messageId": message_id, "roomId": room })
}

/// `user_online` / `user_offline`
pub fn presence(user_id: &str) -> Value {
    json!({ "userId": user_id })
}

/// `user_status_change`
pub fn status_change(user_id: &str, online: bool) -> Value {
    json!({ "userId": user_id, "isOnline": online })
}

/// `typing_update`
pub fn typing_update(room: &str, users: &[&str]) -> Value {
    let users: Vec<Value> = users
        .iter()
        .map(|id| json!({ "userId": id, "displayName": format!("User {id}") }))
        .collect();
    json!({ "roomId": room, "typingUsers": users })
}

/// `notifications_unread_update` / `rooms_unreads_update`
pub fn unread_count(count: u64) -> Value {
    json!({ "unreadCount": count })
}

/// `notification_received`
pub fn notification(id: &str) -> Value {
    json!({ "_id": id, "type": "like", "isRead": false })
}
