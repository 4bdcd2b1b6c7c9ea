//! Messages that arrived before their room view was mounted

mod pending_buffer;

pub use pending_buffer::{PendingBuffer, PendingEvent};
