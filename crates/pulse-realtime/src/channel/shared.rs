//! State of one channel object, shared between its driver task and its handles

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use pulse_core::RoomId;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::connection::ConnectionState;
use crate::protocol::{InboundEvent, Packet};

/// Capacity of the per-channel inbound event broadcast
const EVENT_BUFFER_SIZE: usize = 256;

pub(crate) struct ChannelShared {
    pub(crate) generation: u64,
    pub(crate) cancel: CancellationToken,
    state: RwLock<ConnectionState>,
    outbound: RwLock<Option<mpsc::Sender<Packet>>>,
    events: RwLock<Option<broadcast::Sender<InboundEvent>>>,
    acks: DashMap<u64, oneshot::Sender<Vec<Value>>>,
    next_ack: AtomicU64,
    rooms: Mutex<Vec<RoomId>>,
    closed: AtomicBool,
    open_channels: Arc<AtomicUsize>,
}

impl ChannelShared {
    pub(crate) fn new(generation: u64, open_channels: Arc<AtomicUsize>) -> Arc<Self> {
        open_channels.fetch_add(1, Ordering::AcqRel);
        let (events, _) = broadcast::channel(EVENT_BUFFER_SIZE);

        Arc::new(Self {
            generation,
            cancel: CancellationToken::new(),
            state: RwLock::new(ConnectionState::Connecting),
            outbound: RwLock::new(None),
            events: RwLock::new(Some(events)),
            acks: DashMap::new(),
            next_ack: AtomicU64::new(0),
            rooms: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
            open_channels,
        })
    }

    pub(crate) fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    pub(crate) fn set_state(&self, state: ConnectionState) {
        *self.state.write() = state;
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    // ------------------------------------------------------------------------
    // Link
    // ------------------------------------------------------------------------

    pub(crate) fn attach(&self, outbound: mpsc::Sender<Packet>) {
        *self.outbound.write() = Some(outbound);
    }

    /// Drop the link's sender, which closes the connection, and fail waiting acks
    pub(crate) fn detach(&self) {
        self.outbound.write().take();
        self.acks.clear();
    }

    pub(crate) fn sender(&self) -> Option<mpsc::Sender<Packet>> {
        self.outbound.read().clone()
    }

    // ------------------------------------------------------------------------
    // Events and acks
    // ------------------------------------------------------------------------

    pub(crate) fn subscribe(&self) -> Option<broadcast::Receiver<InboundEvent>> {
        self.events.read().as_ref().map(broadcast::Sender::subscribe)
    }

    pub(crate) fn publish(&self, event: InboundEvent) {
        if let Some(events) = self.events.read().as_ref() {
            // No subscribers is fine
            let _ = events.send(event);
        }
    }

    pub(crate) fn register_ack(&self) -> (u64, oneshot::Receiver<Vec<Value>>) {
        let id = self.next_ack.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.acks.insert(id, tx);
        (id, rx)
    }

    pub(crate) fn forget_ack(&self, id: u64) {
        self.acks.remove(&id);
    }

    pub(crate) fn resolve_ack(&self, id: u64, data: Vec<Value>) {
        match self.acks.remove(&id) {
            Some((_, waiter)) => {
                let _ = waiter.send(data);
            }
            None => tracing::debug!(ack_id = id, "Ack for unknown or expired request"),
        }
    }

    // ------------------------------------------------------------------------
    // Rooms
    // ------------------------------------------------------------------------

    /// Returns false if the room was already recorded
    pub(crate) fn remember_room(&self, room_id: &RoomId) -> bool {
        let mut rooms = self.rooms.lock();
        if rooms.contains(room_id) {
            false
        } else {
            rooms.push(room_id.clone());
            true
        }
    }

    pub(crate) fn forget_room(&self, room_id: &RoomId) {
        self.rooms.lock().retain(|r| r != room_id);
    }

    pub(crate) fn rooms(&self) -> Vec<RoomId> {
        self.rooms.lock().clone()
    }

    // ------------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------------

    /// Forced close: stop the driver, drop the connection, and remove all listeners
    ///
    /// Idempotent; `final_state` is what stale handles report afterwards.
    pub(crate) fn close(&self, final_state: ConnectionState) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.cancel.cancel();
        self.detach();
        self.events.write().take();
        self.set_state(final_state);
        self.open_channels.fetch_sub(1, Ordering::AcqRel);
        tracing::debug!(generation = self.generation, "Channel closed");
    }
}

impl Drop for ChannelShared {
    fn drop(&mut self) {
        self.close(ConnectionState::Idle);
    }
}
