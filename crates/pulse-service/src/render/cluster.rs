//! Transcript clustering
//!
//! Consecutive messages from the same sender are drawn as one visual group. Each message
//! is tagged with its position in the group so the view can round the right corners and
//! show the avatar and name once.

use pulse_core::{Message, UserId};

/// Where a message sits inside its cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterPosition {
    Only,
    First,
    Middle,
    Last,
}

impl ClusterPosition {
    fn at(index: usize, len: usize) -> Self {
        match (len, index) {
            (1, _) => Self::Only,
            (_, 0) => Self::First,
            (_, i) if i + 1 == len => Self::Last,
            _ => Self::Middle,
        }
    }

    pub fn starts_cluster(self) -> bool {
        matches!(self, Self::Only | Self::First)
    }
}

/// Render hints for one message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusteredMessage<'m> {
    pub message: &'m Message,
    pub position: ClusterPosition,
    /// Avatar and display name are drawn above this message
    pub show_sender: bool,
    pub is_own: bool,
}

fn same_cluster(a: &Message, b: &Message) -> bool {
    if a.is_system() || b.is_system() {
        return false;
    }
    a.sender_id().is_some() && a.sender_id() == b.sender_id()
}

/// Tag an ordered transcript with cluster positions
pub fn cluster<'m>(messages: &'m [Message], me: Option<&UserId>) -> Vec<ClusteredMessage<'m>> {
    let mut out = Vec::with_capacity(messages.len());
    let mut start = 0;

    while start < messages.len() {
        let mut end = start + 1;
        while end < messages.len() && same_cluster(&messages[end - 1], &messages[end]) {
            end += 1;
        }

        let len = end - start;
        for (index, message) in messages[start..end].iter().enumerate() {
            let position = ClusterPosition::at(index, len);
            let is_own = me.is_some_and(|me| message.is_from(me));
            out.push(ClusteredMessage {
                message,
                position,
                show_sender: position.starts_cluster() && !is_own && !message.is_system(),
                is_own,
            });
        }
        start = end;
    }

    out
}
