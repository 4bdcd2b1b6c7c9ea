//! Channel driver task
//!
//! One driver runs per channel object. It performs connect attempts, pumps inbound
//! packets while connected, and decides between reconnecting and giving up. Everything
//! it does is scoped to the channel's cancellation token.

use pulse_cache::RealtimeCache;
use pulse_core::RealtimeApi;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::backoff::ReconnectPolicy;
use super::manager::ManagerInner;
use super::state::ConnectionState;
use crate::channel::ChannelShared;
use crate::error::TransportError;
use crate::protocol::{DisconnectReason, InboundEvent, OutboundEvent, Packet};
use crate::router::EventRouter;
use crate::transport::{AuthPayload, Connector, Link, LinkEvent};

pub(super) struct Driver {
    manager: Weak<ManagerInner>,
    shared: Arc<ChannelShared>,
    connector: Arc<dyn Connector>,
    api: Arc<dyn RealtimeApi>,
    cache: Arc<RealtimeCache>,
    router: EventRouter,
    policy: ReconnectPolicy,
    connect_timeout: Duration,
    max_transport_errors: u32,
    auth: AuthPayload,
}

impl Driver {
    pub(super) fn new(
        manager: &Arc<ManagerInner>,
        shared: Arc<ChannelShared>,
        auth: AuthPayload,
    ) -> Self {
        Self {
            manager: Arc::downgrade(manager),
            shared,
            connector: manager.connector.clone(),
            api: manager.api.clone(),
            cache: manager.cache.clone(),
            router: manager.router.clone(),
            policy: ReconnectPolicy::from_config(&manager.config),
            connect_timeout: manager.config.connect_timeout(),
            max_transport_errors: manager.config.max_transport_errors.max(1),
            auth,
        }
    }

    pub(super) async fn run(self) {
        let cancel = self.shared.cancel.clone();
        let generation = self.shared.generation;
        let mut failures: u32 = 0;
        let mut attempt: u32 = 0;

        loop {
            let outcome = tokio::select! {
                () = cancel.cancelled() => {
                    tracing::debug!(generation, "Connect attempt abandoned");
                    return;
                }
                outcome = self.spawn_attempt() => outcome,
            };

            match outcome {
                Ok(link) => {
                    failures = 0;
                    attempt = 0;

                    let Some(reason) = self.connected(link, &cancel).await else {
                        return;
                    };
                    if !reason.should_reconnect() {
                        tracing::info!(generation, reason = %reason, "Channel disconnected");
                        self.give_up();
                        return;
                    }
                    tracing::info!(generation, reason = %reason, "Connection lost");
                }
                Err(e) => {
                    failures += 1;
                    if failures >= self.max_transport_errors {
                        tracing::warn!(
                            generation,
                            failures,
                            error = %e,
                            "Realtime connection failed repeatedly, giving up"
                        );
                        self.give_up();
                        return;
                    }
                    tracing::debug!(
                        generation,
                        failures,
                        kind = e.kind(),
                        error = %e,
                        "Connect attempt failed"
                    );
                }
            }

            attempt += 1;
            if !self.policy.allows(attempt) {
                tracing::warn!(generation, attempts = attempt - 1, "Reconnect attempts exhausted");
                self.give_up();
                return;
            }
            if !self.transition(ConnectionState::Reconnecting) {
                return;
            }

            let delay = self.policy.delay(attempt);
            tracing::debug!(generation, attempt, delay_ms = delay.as_millis() as u64, "Reconnecting");
            tokio::select! {
                () = cancel.cancelled() => return,
                () = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Run one connect attempt on its own task
    ///
    /// Cancelling the driver drops the join handle but not the attempt; a link it
    /// produces afterwards is dropped unused, which closes it.
    async fn spawn_attempt(&self) -> Result<Link, TransportError> {
        let connector = self.connector.clone();
        let auth = self.auth.clone();
        let timeout = self.connect_timeout;

        let attempt = tokio::spawn(async move {
            match tokio::time::timeout(timeout, connector.connect(&auth)).await {
                Ok(result) => result,
                Err(_) => Err(TransportError::Timeout(timeout)),
            }
        });

        match attempt.await {
            Ok(result) => result,
            Err(e) => Err(TransportError::WebSocket(format!("connect task failed: {e}"))),
        }
    }

    /// Connected phase; returns the disconnect reason, or None if the channel was closed
    async fn connected(&self, link: Link, cancel: &CancellationToken) -> Option<DisconnectReason> {
        let Link {
            outbound,
            mut inbound,
        } = link;

        self.shared.attach(outbound);
        if !self.transition(ConnectionState::Connected) {
            self.shared.detach();
            return None;
        }
        self.rejoin_rooms().await;
        self.seed_badges(cancel.clone());

        let reason = loop {
            let next = tokio::select! {
                () = cancel.cancelled() => {
                    self.shared.detach();
                    return None;
                }
                next = inbound.recv() => next,
            };

            match next {
                Some(LinkEvent::Packet(packet)) => {
                    if let Some(reason) = self.handle_packet(packet).await {
                        break reason;
                    }
                }
                Some(LinkEvent::Closed(reason)) => break reason,
                None => break DisconnectReason::TransportClose,
            }
        };

        self.shared.detach();
        Some(reason)
    }

    async fn handle_packet(&self, packet: Packet) -> Option<DisconnectReason> {
        match packet {
            Packet::Event { ack, name, data } => {
                match InboundEvent::decode(&name, data) {
                    Ok(event) => {
                        self.router.apply(&event);
                        self.shared.publish(event);
                    }
                    Err(e) => {
                        tracing::warn!(event = %name, error = %e, "Dropping inbound event");
                    }
                }
                if let Some(id) = ack {
                    self.send(Packet::Ack { id, data: Vec::new() }).await;
                }
                None
            }
            Packet::Ack { id, data } => {
                self.shared.resolve_ack(id, data);
                None
            }
            Packet::Disconnect => Some(DisconnectReason::IoServerDisconnect),
            Packet::ConnectError(message) => {
                tracing::warn!(error = %message, "Server rejected the session");
                Some(DisconnectReason::IoServerDisconnect)
            }
            other => {
                tracing::trace!(packet = %other, "Ignoring packet");
                None
            }
        }
    }

    async fn rejoin_rooms(&self) {
        let rooms = self.shared.rooms();
        if rooms.is_empty() {
            return;
        }

        tracing::debug!(count = rooms.len(), "Re-joining rooms");
        for room_id in rooms {
            match OutboundEvent::JoinRoom(room_id).to_packet(None) {
                Ok(packet) => self.send(packet).await,
                Err(e) => tracing::warn!(error = %e, "Failed to encode join_room"),
            }
        }
    }

    /// Fetch badge counts once per transition into Connected
    fn seed_badges(&self, cancel: CancellationToken) {
        let api = self.api.clone();
        let cache = self.cache.clone();

        tokio::spawn(async move {
            let (notifications, rooms) =
                tokio::join!(api.unread_notification_count(), api.unread_room_count());
            if cancel.is_cancelled() {
                return;
            }

            match notifications {
                Ok(count) => cache.unread.set_notifications(count),
                Err(e) => tracing::debug!(error = %e, "Failed to seed notification badge"),
            }
            match rooms {
                Ok(count) => cache.unread.set_rooms(count),
                Err(e) => tracing::debug!(error = %e, "Failed to seed room badge"),
            }
        });
    }

    async fn send(&self, packet: Packet) {
        if let Some(sender) = self.shared.sender() {
            if sender.send(packet).await.is_err() {
                tracing::debug!("Link closed while sending");
            }
        }
    }

    fn transition(&self, state: ConnectionState) -> bool {
        self.manager
            .upgrade()
            .is_some_and(|manager| manager.transition(&self.shared, state))
    }

    fn give_up(&self) {
        if let Some(manager) = self.manager.upgrade() {
            manager.disconnect(&self.shared);
        }
    }
}
