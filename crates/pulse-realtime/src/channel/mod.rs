//! The realtime channel and the handles consumers hold on it

mod handle;
mod shared;

pub use handle::ChannelHandle;
pub(crate) use shared::ChannelShared;
