//! Presence service
//!
//! Reads come from the presence cache; probes ask the server to push a fresh status.

use pulse_core::{PresenceEntry, UserId};
use pulse_realtime::OutboundEvent;

use super::context::ServiceContext;
use super::dispatch::emit_only;
use super::error::ServiceResult;

/// Presence service
pub struct PresenceService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PresenceService<'a> {
    /// Create a new PresenceService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Last known status; never blocks on the network
    pub fn query(&self, user_id: &UserId) -> Option<PresenceEntry> {
        self.ctx.cache().presence.query(user_id)
    }

    pub fn is_online(&self, user_id: &UserId) -> bool {
        self.ctx.cache().presence.is_online(user_id)
    }

    /// Ask the server for a user's status; the answer arrives as a presence event
    pub async fn probe(&self, user_id: &UserId) -> ServiceResult<()> {
        emit_only(self.ctx, OutboundEvent::check_user_status(user_id.clone())).await
    }

    /// Probe every user without a cached status
    pub async fn probe_unknown(&self, user_ids: &[UserId]) -> ServiceResult<usize> {
        let mut probed = 0;
        for user_id in user_ids {
            if self.query(user_id).is_none() {
                self.probe(user_id).await?;
                probed += 1;
            }
        }
        Ok(probed)
    }
}
