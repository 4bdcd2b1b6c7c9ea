//! Non-blocking failure notices
//!
//! Rolled-back optimistic mutations and failed uploads are reported here instead of being
//! returned to whoever triggered them, so a view can show a toast without awaiting.

use serde::Serialize;
use tokio::sync::broadcast;

use super::error::ServiceError;

const NOTICE_BUFFER_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    ReactionFailed,
    ReadReceiptFailed,
    DeletionFailed,
    LikeFailed,
    UploadFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub code: String,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn from_error(kind: NoticeKind, error: &ServiceError) -> Self {
        Self::new(kind, error.error_code(), error.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct NoticeBus {
    sender: broadcast::Sender<Notice>,
}

impl NoticeBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(NOTICE_BUFFER_SIZE);
        Self { sender }
    }

    pub fn publish(&self, notice: Notice) {
        tracing::debug!(kind = ?notice.kind, code = %notice.code, "Notice published");
        // Nobody listening is fine
        let _ = self.sender.send(notice);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.sender.subscribe()
    }
}

impl Default for NoticeBus {
    fn default() -> Self {
        Self::new()
    }
}
