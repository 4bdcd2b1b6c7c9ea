//! Post likes and unread badge counters

mod likes;
mod unread;

pub use likes::LikeStore;
pub use unread::{UnreadCounters, UnreadSnapshot};
