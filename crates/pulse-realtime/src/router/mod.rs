//! Inbound event routing into the session caches

mod event_router;

pub use event_router::EventRouter;
