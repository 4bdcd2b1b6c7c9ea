//! Test helpers for integration tests
//!
//! Provides an in-memory connector whose server ends the test drives, a scripted HTTP
//! collaborator that records every call, and a client harness wiring them together.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use pulse_cache::RealtimeCache;
use pulse_common::AppConfig;
use pulse_core::{
    ApiResult, DomainError, LikeState, MediaUploader, MessageId, MessageReactions, PostId,
    ProgressFn, ReadReceiptSet, RealtimeApi, RoomId, UploadError, UploadRequest, UploadedMedia,
    UserSummary,
};
use pulse_realtime::protocol::{DisconnectReason, Packet};
use pulse_realtime::{
    AuthPayload, ConnectionManager, ConnectionState, Connector, Link, LinkEvent, Session,
    TransportError,
};
use pulse_service::ServiceContext;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::fixtures::test_config;

/// Upper bound on waits; virtual under a paused clock
const WAIT: Duration = Duration::from_secs(60);

/// Let every spawned task run until it blocks
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

// ============================================================================
// Transport
// ============================================================================

/// How the mock connector answers connect attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectMode {
    Accept,
    Fail,
    /// Never completes; the connect timeout applies
    Hang,
}

/// Server side of an accepted link
pub struct ServerLink {
    from_client: mpsc::Receiver<Packet>,
    to_client: mpsc::Sender<LinkEvent>,
}

impl ServerLink {
    /// Push an event to the client
    pub async fn push(&self, name: &str, payload: Value) {
        self.to_client
            .send(LinkEvent::Packet(Packet::event(name, payload, None)))
            .await
            .expect("client side of link is gone");
    }

    /// End the connection with `reason`
    pub async fn close(&self, reason: DisconnectReason) {
        let _ = self.to_client.send(LinkEvent::Closed(reason)).await;
    }

    /// Next event the client emitted, waiting for it
    pub async fn next_event(&mut self) -> Option<(String, Value)> {
        loop {
            let packet = tokio::time::timeout(WAIT, self.from_client.recv())
                .await
                .ok()??;
            if let Some(event) = as_event(packet) {
                return Some(event);
            }
        }
    }

    /// Next event the client emitted, with the ack id it asked for
    pub async fn next_request(&mut self) -> Option<(Option<u64>, String, Value)> {
        loop {
            let packet = tokio::time::timeout(WAIT, self.from_client.recv())
                .await
                .ok()??;
            if let Packet::Event { ack, name, data } = packet {
                return Some((ack, name, data.into_iter().next().unwrap_or(Value::Null)));
            }
        }
    }

    /// Answer an acknowledged emit
    pub async fn ack(&self, id: u64, data: Vec<Value>) {
        self.to_client
            .send(LinkEvent::Packet(Packet::Ack { id, data }))
            .await
            .expect("client side of link is gone");
    }

    /// Events the client emitted so far, without waiting
    pub fn emitted(&mut self) -> Vec<(String, Value)> {
        let mut events = Vec::new();
        while let Ok(packet) = self.from_client.try_recv() {
            events.extend(as_event(packet));
        }
        events
    }

    /// Names of the events the client emitted so far
    pub fn emitted_names(&mut self) -> Vec<String> {
        self.emitted().into_iter().map(|(name, _)| name).collect()
    }
}

fn as_event(packet: Packet) -> Option<(String, Value)> {
    match packet {
        Packet::Event { name, data, .. } => {
            Some((name, data.into_iter().next().unwrap_or(Value::Null)))
        }
        _ => None,
    }
}

/// In-memory connector; every accepted link's server end is handed to the test
pub struct MockConnector {
    mode: Mutex<ConnectMode>,
    attempts: AtomicUsize,
    tokens: Mutex<Vec<String>>,
    links: mpsc::UnboundedSender<ServerLink>,
}

impl MockConnector {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<ServerLink>) {
        let (links, rx) = mpsc::unbounded_channel();
        let connector = Arc::new(Self {
            mode: Mutex::new(ConnectMode::Accept),
            attempts: AtomicUsize::new(0),
            tokens: Mutex::new(Vec::new()),
            links,
        });
        (connector, rx)
    }

    pub fn set_mode(&self, mode: ConnectMode) {
        *self.mode.lock() = mode;
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Tokens presented by each connect attempt, in order
    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, auth: &AuthPayload) -> Result<Link, TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.tokens.lock().push(auth.token.clone());

        let mode = *self.mode.lock();
        match mode {
            ConnectMode::Fail => Err(TransportError::WebSocket("connection refused".into())),
            ConnectMode::Hang => std::future::pending().await,
            ConnectMode::Accept => {
                let (outbound, from_client) = mpsc::channel(256);
                let (to_client, inbound) = mpsc::channel(256);
                let _ = self.links.send(ServerLink {
                    from_client,
                    to_client,
                });
                Ok(Link { outbound, inbound })
            }
        }
    }
}

// ============================================================================
// HTTP collaborator
// ============================================================================

/// A call the client made to the HTTP collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Health,
    UnreadCounts,
    Reactions(MessageId),
    Reads(MessageId),
    AddReaction { message_id: MessageId, content: String },
    RemoveReaction(MessageId),
    MarkRead(MessageId),
    DeleteMessage { message_id: MessageId, room_id: RoomId },
    SetLike { post_id: PostId, liked: bool },
}

/// Scripted HTTP collaborator
#[derive(Default)]
pub struct MockApi {
    fail_mutations: AtomicBool,
    notification_count: AtomicU64,
    room_count: AtomicU64,
    reactions: Mutex<HashMap<MessageId, MessageReactions>>,
    reads: Mutex<HashMap<MessageId, ReadReceiptSet>>,
    like_counts: Mutex<HashMap<PostId, u64>>,
    token: Mutex<Option<String>>,
    calls: Mutex<Vec<ApiCall>>,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every mutation fail with a non-transient rejection
    pub fn fail_mutations(&self, fail: bool) {
        self.fail_mutations.store(fail, Ordering::SeqCst);
    }

    pub fn set_unread(&self, notifications: u64, rooms: u64) {
        self.notification_count.store(notifications, Ordering::SeqCst);
        self.room_count.store(rooms, Ordering::SeqCst);
    }

    pub fn set_reactions(&self, message_id: &str, reactions: MessageReactions) {
        self.reactions.lock().insert(MessageId::from(message_id), reactions);
    }

    pub fn set_reads(&self, message_id: &str, reads: ReadReceiptSet) {
        self.reads.lock().insert(MessageId::from(message_id), reads);
    }

    pub fn set_like_count(&self, post_id: &str, count: u64) {
        self.like_counts.lock().insert(PostId::from(post_id), count);
    }

    pub fn token(&self) -> Option<String> {
        self.token.lock().clone()
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().clone()
    }

    /// Calls other than health probes and badge seeding
    pub fn mutation_calls(&self) -> Vec<ApiCall> {
        self.calls()
            .into_iter()
            .filter(|call| {
                matches!(
                    call,
                    ApiCall::AddReaction { .. }
                        | ApiCall::RemoveReaction(_)
                        | ApiCall::MarkRead(_)
                        | ApiCall::DeleteMessage { .. }
                        | ApiCall::SetLike { .. }
                )
            })
            .collect()
    }

    pub fn count(&self, matches: impl Fn(&ApiCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| matches(call)).count()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().push(call);
    }

    fn mutation(&self, call: ApiCall) -> ApiResult<()> {
        self.record(call);
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(DomainError::Rejected("scripted failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RealtimeApi for MockApi {
    fn authorize(&self, token: Option<String>) {
        *self.token.lock() = token;
    }

    async fn health(&self) -> ApiResult<()> {
        self.record(ApiCall::Health);
        Ok(())
    }

    async fn unread_notification_count(&self) -> ApiResult<u64> {
        self.record(ApiCall::UnreadCounts);
        Ok(self.notification_count.load(Ordering::SeqCst))
    }

    async fn unread_room_count(&self) -> ApiResult<u64> {
        Ok(self.room_count.load(Ordering::SeqCst))
    }

    async fn message_reactions(&self, message_id: &MessageId) -> ApiResult<MessageReactions> {
        self.record(ApiCall::Reactions(message_id.clone()));
        Ok(self.reactions.lock().get(message_id).cloned().unwrap_or_default())
    }

    async fn message_reads(&self, message_id: &MessageId) -> ApiResult<ReadReceiptSet> {
        self.record(ApiCall::Reads(message_id.clone()));
        Ok(self.reads.lock().get(message_id).cloned().unwrap_or_default())
    }

    async fn add_reaction(
        &self,
        message_id: &MessageId,
        _room_id: &RoomId,
        content: &str,
    ) -> ApiResult<()> {
        self.mutation(ApiCall::AddReaction {
            message_id: message_id.clone(),
            content: content.to_string(),
        })
    }

    async fn remove_reaction(&self, message_id: &MessageId, _room_id: &RoomId) -> ApiResult<()> {
        self.mutation(ApiCall::RemoveReaction(message_id.clone()))
    }

    async fn mark_message_read(&self, message_id: &MessageId, _room_id: &RoomId) -> ApiResult<()> {
        self.mutation(ApiCall::MarkRead(message_id.clone()))
    }

    async fn delete_message(&self, message_id: &MessageId, room_id: &RoomId) -> ApiResult<()> {
        self.mutation(ApiCall::DeleteMessage {
            message_id: message_id.clone(),
            room_id: room_id.clone(),
        })
    }

    async fn set_post_like(&self, post_id: &PostId, liked: bool) -> ApiResult<LikeState> {
        self.mutation(ApiCall::SetLike {
            post_id: post_id.clone(),
            liked,
        })?;

        let mut counts = self.like_counts.lock();
        let count = counts.entry(post_id.clone()).or_default();
        *count = if liked {
            *count + 1
        } else {
            count.saturating_sub(1)
        };
        Ok(LikeState::new(post_id.clone(), liked, *count))
    }
}

// ============================================================================
// Uploads
// ============================================================================

/// Uploader that reports progress in steps, one virtual tick apart
pub struct MockUploader {
    steps: u64,
    tick: Duration,
    failure: Mutex<Option<UploadError>>,
    calls: AtomicUsize,
}

impl MockUploader {
    pub fn new(steps: u64, tick: Duration) -> Arc<Self> {
        Arc::new(Self {
            steps: steps.max(1),
            tick,
            failure: Mutex::new(None),
            calls: AtomicUsize::new(0),
        })
    }

    /// Fail the next uploads with `error` after the transfer completes
    pub fn fail_with(&self, error: UploadError) {
        *self.failure.lock() = Some(error);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaUploader for MockUploader {
    async fn upload(
        &self,
        request: UploadRequest,
        progress: ProgressFn,
    ) -> Result<UploadedMedia, UploadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let total = request.size();

        for step in 1..=self.steps {
            tokio::time::sleep(self.tick).await;
            progress(total * step / self.steps, total);
        }

        if let Some(error) = self.failure.lock().clone() {
            return Err(error);
        }
        Ok(UploadedMedia {
            url: format!("https://cdn.test/{}", request.file_name),
            file_name: Some(request.file_name),
            mime_type: Some(request.mime_type),
            size: Some(total),
        })
    }
}

// ============================================================================
// Client harness
// ============================================================================

/// A full client stack over the mocks
pub struct TestClient {
    pub ctx: ServiceContext,
    pub connector: Arc<MockConnector>,
    pub api: Arc<MockApi>,
    pub uploader: Arc<MockUploader>,
    links: mpsc::UnboundedReceiver<ServerLink>,
}

impl TestClient {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let (connector, links) = MockConnector::new();
        let api = MockApi::new();
        let uploader = MockUploader::new(4, Duration::from_millis(100));

        let manager = ConnectionManager::new(
            config.realtime.clone(),
            config.timing.clone(),
            connector.clone(),
            api.clone(),
            Arc::new(RealtimeCache::new()),
        );
        let ctx = ServiceContext::new(manager, uploader.clone(), &config);

        Self {
            ctx,
            connector,
            api,
            uploader,
            links,
        }
    }

    pub fn manager(&self) -> &ConnectionManager {
        self.ctx.manager()
    }

    pub fn cache(&self) -> &RealtimeCache {
        self.ctx.cache()
    }

    /// Session for `user` with a token derived from the user id
    pub fn session(user: &str) -> Session {
        Session::new(UserSummary::new(user), format!("token-{user}"))
    }

    /// Start a session and wait until its channel is connected
    pub async fn sign_in(&mut self, user: &str) -> ServerLink {
        self.sign_in_with(Self::session(user)).await
    }

    pub async fn sign_in_with(&mut self, session: Session) -> ServerLink {
        self.manager().start(session);
        let link = self.next_link().await;
        self.wait_for_state(ConnectionState::Connected).await;
        link
    }

    /// Server end of the next accepted connection
    pub async fn next_link(&mut self) -> ServerLink {
        tokio::time::timeout(WAIT, self.links.recv())
            .await
            .expect("no connection within timeout")
            .expect("connector dropped")
    }

    /// Server end of a connection accepted earlier, if any is waiting
    pub fn try_next_link(&mut self) -> Option<ServerLink> {
        self.links.try_recv().ok()
    }

    pub async fn wait_for_state(&self, state: ConnectionState) {
        let mut states = self.manager().subscribe_state();
        tokio::time::timeout(WAIT, states.wait_for(|current| *current == state))
            .await
            .unwrap_or_else(|_| panic!("state never became {state}"))
            .expect("manager dropped");
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}
