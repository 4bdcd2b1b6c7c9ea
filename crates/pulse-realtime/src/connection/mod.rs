//! Connection management
//!
//! One live channel per session, its state machine, and reconnect policy.

mod backoff;
mod driver;
mod manager;
mod session;
mod state;

pub use backoff::ReconnectPolicy;
pub use manager::ConnectionManager;
pub use session::Session;
pub use state::ConnectionState;
