//! Connection manager
//!
//! Owns the single live channel of the current session. Every session change tears the
//! previous channel down before a new one is created, so at most one channel is ever open.

use parking_lot::Mutex;
use pulse_cache::RealtimeCache;
use pulse_common::{RealtimeConfig, TimingConfig};
use pulse_core::{RealtimeApi, RoomId};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::driver::Driver;
use super::session::Session;
use super::state::ConnectionState;
use crate::channel::{ChannelHandle, ChannelShared};
use crate::router::EventRouter;
use crate::transport::Connector;

/// The channel currently owned by the manager, with the session it belongs to
struct ActiveChannel {
    session: Session,
    shared: Arc<ChannelShared>,
}

pub(crate) struct ManagerInner {
    pub(super) config: RealtimeConfig,
    timing: TimingConfig,
    pub(super) connector: Arc<dyn Connector>,
    pub(super) api: Arc<dyn RealtimeApi>,
    pub(super) cache: Arc<RealtimeCache>,
    pub(super) router: EventRouter,
    state_tx: watch::Sender<ConnectionState>,
    current: Mutex<Option<ActiveChannel>>,
    next_generation: AtomicU64,
    open_channels: Arc<AtomicUsize>,
    health_probed: AtomicBool,
}

/// Exclusive owner of the realtime channel
///
/// Cheap to clone; all clones control the same channel. `start`, `stop` and `retry` must
/// be called from within a tokio runtime.
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<ManagerInner>,
}

impl ConnectionManager {
    pub fn new(
        config: RealtimeConfig,
        timing: TimingConfig,
        connector: Arc<dyn Connector>,
        api: Arc<dyn RealtimeApi>,
        cache: Arc<RealtimeCache>,
    ) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Idle);
        let router = EventRouter::new(cache.clone());

        Self {
            inner: Arc::new(ManagerInner {
                config,
                timing,
                connector,
                api,
                cache,
                router,
                state_tx,
                current: Mutex::new(None),
                next_generation: AtomicU64::new(1),
                open_channels: Arc::new(AtomicUsize::new(0)),
                health_probed: AtomicBool::new(false),
            }),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Open the channel for a session
    ///
    /// A no-op when the current channel already belongs to the same user and token.
    /// Otherwise the current channel, if any, is force-closed first.
    pub fn start(&self, session: Session) {
        let inner = &self.inner;
        let mut current = inner.current.lock();

        let carried_rooms = match current.take() {
            Some(active) if active.session.same_credentials(&session) => {
                tracing::debug!(user_id = %session.user_id(), "Session unchanged, keeping channel");
                *current = Some(active);
                return;
            }
            Some(active) => {
                let rooms = if active.session.user_id() == session.user_id() {
                    active.shared.rooms()
                } else {
                    Vec::new()
                };
                tracing::info!(
                    generation = active.shared.generation,
                    "Replacing realtime channel for new session"
                );
                active.shared.close(ConnectionState::Idle);
                rooms
            }
            None => Vec::new(),
        };

        inner.cache.bind_user(session.user_id());
        inner.api.authorize(Some(session.token().to_string()));
        self.probe_health_once();

        *current = Some(inner.open_channel(session, &carried_rooms));
    }

    /// Tear down the channel and drop the session's cached state; valid in every state
    ///
    /// An in-flight connect attempt is not aborted, but its result is discarded.
    pub fn stop(&self) {
        let inner = &self.inner;
        let previous = inner.current.lock().take();

        if let Some(active) = previous {
            tracing::info!(
                generation = active.shared.generation,
                user_id = %active.session.user_id(),
                "Stopping realtime channel"
            );
            active.shared.close(ConnectionState::Idle);
        }
        inner.cache.clear();
        inner.api.authorize(None);
        inner.state_tx.send_replace(ConnectionState::Idle);
    }

    /// Reconnect after the manager gave up
    ///
    /// Only valid in `Disconnected`; returns false otherwise.
    pub fn retry(&self) -> bool {
        let inner = &self.inner;
        let mut current = inner.current.lock();

        if *inner.state_tx.borrow() != ConnectionState::Disconnected {
            return false;
        }
        let Some(active) = current.take() else {
            return false;
        };

        tracing::info!(user_id = %active.session.user_id(), "Retrying realtime connection");
        let rooms = active.shared.rooms();
        active.shared.close(ConnectionState::Disconnected);
        *current = Some(inner.open_channel(active.session, &rooms));
        true
    }

    fn probe_health_once(&self) {
        if self.inner.health_probed.swap(true, Ordering::AcqRel) {
            return;
        }
        let api = self.inner.api.clone();
        tokio::spawn(async move {
            if let Err(e) = api.health().await {
                tracing::debug!(error = %e, "Health probe failed");
            }
        });
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> ConnectionState {
        *self.inner.state_tx.borrow()
    }

    /// Watch state transitions; the receiver starts at the current state
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state_tx.subscribe()
    }

    /// Handle to the current channel, if a session is active and the channel is open
    pub fn channel(&self) -> Option<ChannelHandle> {
        self.inner
            .current
            .lock()
            .as_ref()
            .filter(|active| !active.shared.is_closed())
            .map(|active| ChannelHandle::new(active.shared.clone()))
    }

    pub fn session(&self) -> Option<Session> {
        self.inner
            .current
            .lock()
            .as_ref()
            .map(|active| active.session.clone())
    }

    /// Number of channel objects that exist and have not been closed
    pub fn open_channel_count(&self) -> usize {
        self.inner.open_channels.load(Ordering::Acquire)
    }

    /// Rooms re-joined on every reconnect
    pub fn joined_rooms(&self) -> Vec<RoomId> {
        self.channel()
            .map(|channel| channel.joined_rooms())
            .unwrap_or_default()
    }

    pub fn cache(&self) -> &Arc<RealtimeCache> {
        &self.inner.cache
    }

    pub fn api(&self) -> &Arc<dyn RealtimeApi> {
        &self.inner.api
    }

    pub fn config(&self) -> &RealtimeConfig {
        &self.inner.config
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("state", &self.state())
            .field("open_channels", &self.open_channel_count())
            .finish()
    }
}

impl ManagerInner {
    /// Create a channel object and start driving it; caller holds the `current` lock
    fn open_channel(self: &Arc<Self>, session: Session, rooms: &[RoomId]) -> ActiveChannel {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let shared = ChannelShared::new(generation, self.open_channels.clone());
        for room_id in rooms {
            shared.remember_room(room_id);
        }

        shared.set_state(ConnectionState::Connecting);
        self.state_tx.send_replace(ConnectionState::Connecting);
        tracing::info!(
            generation,
            user_id = %session.user_id(),
            "Opening realtime channel"
        );

        let driver = Driver::new(self, shared.clone(), session.auth());
        tokio::spawn(driver.run());
        spawn_pending_sweep(
            self.cache.clone(),
            &self.timing,
            shared.cancel.clone(),
        );

        ActiveChannel { session, shared }
    }

    /// Publish a state change made by the channel's driver
    ///
    /// Ignored (returns false) once the channel has been replaced or closed.
    pub(super) fn transition(&self, shared: &Arc<ChannelShared>, state: ConnectionState) -> bool {
        let current = self.current.lock();
        let is_current = current
            .as_ref()
            .is_some_and(|active| Arc::ptr_eq(&active.shared, shared));
        if !is_current || shared.is_closed() {
            return false;
        }

        shared.set_state(state);
        let previous = self.state_tx.send_replace(state);
        if previous != state {
            tracing::info!(
                generation = shared.generation,
                from = %previous,
                to = %state,
                "Connection state changed"
            );
        }
        true
    }

    /// Give up on the channel: force-close it and show `Disconnected` until a retry
    pub(super) fn disconnect(&self, shared: &Arc<ChannelShared>) {
        let current = self.current.lock();
        let is_current = current
            .as_ref()
            .is_some_and(|active| Arc::ptr_eq(&active.shared, shared));
        if !is_current || shared.is_closed() {
            return;
        }

        shared.close(ConnectionState::Disconnected);
        self.state_tx.send_replace(ConnectionState::Disconnected);
        tracing::info!(generation = shared.generation, "Realtime channel offline");
    }
}

impl Drop for ManagerInner {
    fn drop(&mut self) {
        if let Some(active) = self.current.get_mut().take() {
            active.shared.close(ConnectionState::Idle);
        }
    }
}

/// Periodically expire pending events nobody drained, for the lifetime of one channel
fn spawn_pending_sweep(cache: Arc<RealtimeCache>, timing: &TimingConfig, cancel: CancellationToken) {
    let period = timing.pending_sweep_interval();
    let ttl = timing.pending_ttl();

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    cache.pending.sweep(ttl);
                }
            }
        }
    });
}
