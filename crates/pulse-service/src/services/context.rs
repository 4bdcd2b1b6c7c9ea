//! Service context - dependency container for services
//!
//! Holds the connection manager, collaborators, timing, and the per-key registries the
//! services share. Cloning is cheap; every clone sees the same state.

use pulse_cache::{KeyedLocks, RealtimeCache};
use pulse_common::{AppConfig, TimingConfig, UploadConfig};
use pulse_core::{MediaUploader, MessageId, PostId, RealtimeApi, UserSummary};
use pulse_realtime::{ChannelHandle, ConnectionManager, Session};
use std::sync::Arc;
use std::time::Duration;

use super::deletion::DeletionRegistry;
use super::error::{ServiceError, ServiceResult};
use super::notice::NoticeBus;
use super::typing::TypingRegistry;
use crate::upload::UploadRegistry;

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    manager: ConnectionManager,
    uploader: Arc<dyn MediaUploader>,

    // Timing
    timing: TimingConfig,
    upload: UploadConfig,
    ack_timeout: Duration,
    ack_mutations: bool,

    notices: NoticeBus,

    // Per-key serialization of optimistic mutations
    reaction_locks: Arc<KeyedLocks<MessageId>>,
    read_locks: Arc<KeyedLocks<MessageId>>,
    like_locks: Arc<KeyedLocks<PostId>>,

    // Timers and in-flight work
    deletions: Arc<DeletionRegistry>,
    typing: Arc<TypingRegistry>,
    uploads: Arc<UploadRegistry>,
}

impl ServiceContext {
    /// Create a new service context
    pub fn new(
        manager: ConnectionManager,
        uploader: Arc<dyn MediaUploader>,
        config: &AppConfig,
    ) -> Self {
        Self {
            manager,
            uploader,
            timing: config.timing.clone(),
            upload: config.upload.clone(),
            ack_timeout: config.realtime.ack_timeout(),
            ack_mutations: config.realtime.ack_mutations,
            notices: NoticeBus::new(),
            reaction_locks: Arc::new(KeyedLocks::new()),
            read_locks: Arc::new(KeyedLocks::new()),
            like_locks: Arc::new(KeyedLocks::new()),
            deletions: Arc::new(DeletionRegistry::new()),
            typing: Arc::new(TypingRegistry::new()),
            uploads: Arc::new(UploadRegistry::new()),
        }
    }

    /// Sign out: close the channel and clear its caches, then stop every timer and upload
    pub fn shutdown(&self) {
        self.manager.stop();
        self.typing.clear();
        let deletions = self.deletions.shutdown();
        let uploads = self.uploads.cancel_all();
        tracing::info!(deletions, uploads, "Services shut down");
    }

    // === Connection ===

    pub fn manager(&self) -> &ConnectionManager {
        &self.manager
    }

    /// Handle to the live channel, if any
    pub fn channel(&self) -> Option<ChannelHandle> {
        self.manager.channel()
    }

    pub fn session(&self) -> ServiceResult<Session> {
        self.manager.session().ok_or(ServiceError::NotSignedIn)
    }

    /// The signed-in user
    pub fn current_user(&self) -> ServiceResult<UserSummary> {
        self.session().map(|session| session.user)
    }

    // === Collaborators ===

    pub fn cache(&self) -> &RealtimeCache {
        self.manager.cache()
    }

    pub fn api(&self) -> &dyn RealtimeApi {
        self.manager.api().as_ref()
    }

    pub fn uploader(&self) -> &Arc<dyn MediaUploader> {
        &self.uploader
    }

    pub fn notices(&self) -> &NoticeBus {
        &self.notices
    }

    // === Timing ===

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    pub fn upload_config(&self) -> &UploadConfig {
        &self.upload
    }

    pub fn ack_timeout(&self) -> Duration {
        self.ack_timeout
    }

    /// Whether channel mutations wait for the server's acknowledgement
    pub fn ack_mutations(&self) -> bool {
        self.ack_mutations
    }

    // === Registries ===

    pub(crate) fn reaction_locks(&self) -> &KeyedLocks<MessageId> {
        &self.reaction_locks
    }

    pub(crate) fn read_locks(&self) -> &KeyedLocks<MessageId> {
        &self.read_locks
    }

    pub(crate) fn like_locks(&self) -> &KeyedLocks<PostId> {
        &self.like_locks
    }

    pub(crate) fn deletions(&self) -> &Arc<DeletionRegistry> {
        &self.deletions
    }

    pub(crate) fn typing(&self) -> &Arc<TypingRegistry> {
        &self.typing
    }

    pub(crate) fn uploads(&self) -> &Arc<UploadRegistry> {
        &self.uploads
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("manager", &self.manager)
            .finish_non_exhaustive()
    }
}
