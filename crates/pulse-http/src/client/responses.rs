//! Response bodies of the HTTP collaborator

use pulse_core::{MessageReactions, ReadReceiptSet};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UnreadCountResponse {
    #[serde(alias = "count")]
    pub unread_count: u64,
}

/// Reaction list, either bare or wrapped
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ReactionsResponse {
    Wrapped { reactions: MessageReactions },
    Bare(MessageReactions),
}

impl ReactionsResponse {
    pub fn into_inner(self) -> MessageReactions {
        match self {
            Self::Wrapped { reactions } | Self::Bare(reactions) => reactions,
        }
    }
}

/// Read receipts, either bare or wrapped
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ReadsResponse {
    Wrapped { reads: ReadReceiptSet },
    Bare(ReadReceiptSet),
}

impl ReadsResponse {
    pub fn into_inner(self) -> ReadReceiptSet {
        match self {
            Self::Wrapped { reads } | Self::Bare(reads) => reads,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LikeResponse {
    #[serde(alias = "isLiked")]
    pub liked: bool,
    #[serde(alias = "likesCount", alias = "likeCount")]
    pub count: u64,
}
