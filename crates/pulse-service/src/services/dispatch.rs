//! Delivery of outbound mutations
//!
//! The channel is the primary path. When it is not connected the HTTP equivalent is
//! used instead, so a mutation made while offline still reaches the server.
//!
//! With `ack_mutations` set, a channel mutation resolves only on the server's ack. A
//! rejection or a missing ack within the timeout fails the mutation so the caller rolls
//! back; the HTTP path is not tried, since the server may already have applied it.

use pulse_core::ApiResult;
use pulse_realtime::{ChannelError, ChannelHandle, OutboundEvent};
use std::future::Future;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Path a mutation took to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Channel,
    Http,
}

/// Result of an optimistic mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// Applied locally and delivered
    Applied(Delivery),
    /// Already in the requested state; nothing was sent
    Unchanged,
}

impl Mutation {
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Emit on the channel, or run `fallback` when the channel cannot take the event
pub(crate) async fn emit_or_fallback<F, Fut>(
    ctx: &ServiceContext,
    event: OutboundEvent,
    fallback: F,
) -> ServiceResult<Delivery>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = ApiResult<()>>,
{
    let name = event.event_type();
    if let Some(channel) = ctx.channel().filter(ChannelHandle::is_connected) {
        let sent = if ctx.ack_mutations() {
            channel
                .emit_with_ack(event, ctx.ack_timeout())
                .await
                .map(|_| ())
        } else {
            channel.emit(event).await
        };

        match sent {
            Ok(()) => return Ok(Delivery::Channel),
            Err(e @ (ChannelError::NotConnected | ChannelError::Closed)) => {
                tracing::debug!(event = %name, error = %e, "Channel unavailable, using HTTP");
            }
            Err(e) => {
                tracing::debug!(event = %name, error = %e, "Channel mutation failed");
                return Err(e.into());
            }
        }
    }

    fallback().await?;
    tracing::debug!(event = %name, "Delivered over HTTP");
    Ok(Delivery::Http)
}

/// Emit an event that has no HTTP equivalent
pub(crate) async fn emit_only(ctx: &ServiceContext, event: OutboundEvent) -> ServiceResult<()> {
    let channel = ctx
        .channel()
        .ok_or(ServiceError::Channel(ChannelError::NotConnected))?;
    channel.emit(event).await.map_err(ServiceError::from)
}
