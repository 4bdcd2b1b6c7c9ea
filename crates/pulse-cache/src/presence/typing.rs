//! Who is typing in each room
//!
//! Each `typing_update` carries the complete list for its room and replaces what was
//! there. The list is cleared locally when the user navigates away from the room.

use dashmap::DashMap;
use pulse_core::{RoomId, TypingUser, UserId};

#[derive(Debug, Default)]
pub struct TypingSet {
    rooms: DashMap<RoomId, Vec<TypingUser>>,
}

impl TypingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&self, room_id: RoomId, users: Vec<TypingUser>) {
        if users.is_empty() {
            self.rooms.remove(&room_id);
        } else {
            self.rooms.insert(room_id, users);
        }
    }

    /// Typing users in a room, optionally hiding the current user
    pub fn typing_in(&self, room_id: &RoomId, exclude: Option<&UserId>) -> Vec<TypingUser> {
        self.rooms
            .get(room_id)
            .map(|users| {
                users
                    .iter()
                    .filter(|u| Some(&u.user_id) != exclude)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn clear_room(&self, room_id: &RoomId) {
        self.rooms.remove(room_id);
    }

    pub fn clear(&self) {
        self.rooms.clear();
    }
}
