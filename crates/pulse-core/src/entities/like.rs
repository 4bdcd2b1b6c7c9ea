//! Like state of a post

use serde::{Deserialize, Serialize};

use crate::value_objects::PostId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeState {
    pub post_id: PostId,
    #[serde(alias = "isLiked")]
    pub liked: bool,
    #[serde(alias = "likesCount", alias = "likeCount")]
    pub count: u64,
}

impl LikeState {
    pub fn new(post_id: impl Into<PostId>, liked: bool, count: u64) -> Self {
        Self {
            post_id: post_id.into(),
            liked,
            count,
        }
    }

    /// State after the current user flips their like
    pub fn toggled(&self) -> Self {
        let count = if self.liked {
            self.count.saturating_sub(1)
        } else {
            self.count + 1
        };
        Self {
            post_id: self.post_id.clone(),
            liked: !self.liked,
            count,
        }
    }
}
