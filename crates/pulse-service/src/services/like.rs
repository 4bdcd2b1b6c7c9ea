//! Post like service
//!
//! Likes are HTTP-primary: the toggle is applied locally, sent over HTTP, and replaced
//! with the server's counts on success or rolled back on failure.

use pulse_core::{LikeState, PostId};
use tracing::instrument;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::notice::{Notice, NoticeKind};

/// Like service
pub struct LikeService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> LikeService<'a> {
    /// Create a new LikeService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Seed states from a loaded feed page; in-flight toggles are not overwritten
    pub fn seed(&self, states: impl IntoIterator<Item = LikeState>) -> usize {
        states
            .into_iter()
            .filter(|state| self.ctx.cache().likes.seed(state.clone()))
            .count()
    }

    pub fn state(&self, post_id: &PostId) -> Option<LikeState> {
        self.ctx.cache().likes.get(post_id)
    }

    /// Flip the signed-in user's like on a post
    #[instrument(skip(self), fields(post_id = %post_id))]
    pub async fn toggle(&self, post_id: &PostId) -> ServiceResult<LikeState> {
        let _guard = self.ctx.like_locks().lock(post_id).await;
        let store = &self.ctx.cache().likes;

        let previous = store
            .get(post_id)
            .ok_or_else(|| ServiceError::not_found("Like state", post_id.as_str()))?;
        let next = previous.toggled();
        let written = store.set(next.clone());

        match self.ctx.api().set_post_like(post_id, next.liked).await {
            Ok(confirmed) => {
                store.set(confirmed.clone());
                Ok(confirmed)
            }
            Err(e) => {
                let restored = store.rollback(post_id, written, Some(previous));
                let error = ServiceError::from(e);
                tracing::warn!(error = %error, restored, "Like toggle failed");
                self.ctx
                    .notices()
                    .publish(Notice::from_error(NoticeKind::LikeFailed, &error));
                Err(error)
            }
        }
    }
}
