//! Consumer-facing channel handle
//!
//! Handles can emit, await acknowledgements and subscribe, but cannot close or replace
//! the channel; only the connection manager can.

use pulse_core::RoomId;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

use super::shared::ChannelShared;
use crate::connection::ConnectionState;
use crate::error::{ChannelError, ChannelResult};
use crate::protocol::{InboundEvent, OutboundEvent, Packet};

#[derive(Clone)]
pub struct ChannelHandle {
    shared: Arc<ChannelShared>,
}

impl ChannelHandle {
    pub(crate) fn new(shared: Arc<ChannelShared>) -> Self {
        Self { shared }
    }

    /// Identifies the channel object; changes whenever the manager replaces it
    pub fn generation(&self) -> u64 {
        self.shared.generation
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    /// Fire-and-forget emit; resolves once the packet is queued on a live connection
    pub async fn emit(&self, event: OutboundEvent) -> ChannelResult<()> {
        let packet = event.to_packet(None)?;
        tracing::trace!(event = %event.event_type(), generation = self.generation(), "Emit");
        self.send(packet).await
    }

    /// Emit and wait for the server's acknowledgement
    ///
    /// An ack whose first argument carries an `error` (or `success: false`) is a rejection.
    pub async fn emit_with_ack(
        &self,
        event: OutboundEvent,
        timeout: Duration,
    ) -> ChannelResult<Vec<Value>> {
        let (id, waiter) = self.shared.register_ack();
        let packet = match event.to_packet(Some(id)) {
            Ok(packet) => packet,
            Err(e) => {
                self.shared.forget_ack(id);
                return Err(e.into());
            }
        };

        if let Err(e) = self.send(packet).await {
            self.shared.forget_ack(id);
            return Err(e);
        }

        match tokio::time::timeout(timeout, waiter).await {
            Err(_) => {
                self.shared.forget_ack(id);
                Err(ChannelError::AckTimeout(timeout))
            }
            Ok(Err(_)) => Err(ChannelError::Closed),
            Ok(Ok(data)) => match rejection(&data) {
                Some(reason) => Err(ChannelError::Rejected(reason)),
                None => Ok(data),
            },
        }
    }

    /// Stream of decoded inbound events, after caches have been updated
    pub fn subscribe(&self) -> ChannelResult<broadcast::Receiver<InboundEvent>> {
        self.shared.subscribe().ok_or(ChannelError::Closed)
    }

    /// Join a room now if connected, and again after every reconnect
    pub async fn join_room(&self, room_id: RoomId) -> ChannelResult<()> {
        if self.shared.is_closed() {
            return Err(ChannelError::Closed);
        }
        self.shared.remember_room(&room_id);

        if self.is_connected() {
            self.emit(OutboundEvent::JoinRoom(room_id)).await
        } else {
            tracing::debug!(room_id = %room_id, "Join deferred until connected");
            Ok(())
        }
    }

    /// Stop re-joining a room on reconnect
    pub fn forget_room(&self, room_id: &RoomId) {
        self.shared.forget_room(room_id);
    }

    pub fn joined_rooms(&self) -> Vec<RoomId> {
        self.shared.rooms()
    }

    async fn send(&self, packet: Packet) -> ChannelResult<()> {
        if self.shared.is_closed() {
            return Err(ChannelError::Closed);
        }
        if !self.is_connected() {
            return Err(ChannelError::NotConnected);
        }
        let sender = self.shared.sender().ok_or(ChannelError::NotConnected)?;
        sender
            .send(packet)
            .await
            .map_err(|_| ChannelError::NotConnected)
    }
}

impl fmt::Debug for ChannelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelHandle")
            .field("generation", &self.shared.generation)
            .field("state", &self.shared.state())
            .finish()
    }
}

fn rejection(data: &[Value]) -> Option<String> {
    let first = data.first()?.as_object()?;
    if let Some(error) = first.get("error").filter(|e| !e.is_null()) {
        return Some(
            error
                .as_str()
                .map_or_else(|| error.to_string(), ToString::to_string),
        );
    }
    if first.get("success").and_then(Value::as_bool) == Some(false) {
        return Some(
            first
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("request failed")
                .to_string(),
        );
    }
    None
}
