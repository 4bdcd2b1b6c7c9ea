//! Reaction entities - per-user emoji reactions on a message and their display aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserSummary;
use crate::value_objects::UserId;

/// A single user's reaction on a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    /// Emoji content
    pub content: String,
    pub user: UserSummary,
    #[serde(rename = "createdAt", alias = "reactedAt", default = "Utc::now")]
    pub reacted_at: DateTime<Utc>,
}

impl Reaction {
    pub fn new(user: UserSummary, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            user,
            reacted_at: Utc::now(),
        }
    }

    #[inline]
    pub fn is_emoji(&self, content: &str) -> bool {
        self.content == content
    }
}

/// Authoritative reaction list for one message
///
/// A user holds at most one reaction per message; reacting with a different emoji
/// replaces the previous one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageReactions(Vec<Reaction>);

impl MessageReactions {
    pub fn new(reactions: Vec<Reaction>) -> Self {
        let mut list = Self::default();
        for reaction in reactions {
            list.0.retain(|r| r.user.id != reaction.user.id);
            list.0.push(reaction);
        }
        list
    }

    pub fn as_slice(&self) -> &[Reaction] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn reaction_of(&self, user_id: &UserId) -> Option<&Reaction> {
        self.0.iter().find(|r| &r.user.id == user_id)
    }

    /// List with `user` reacting `content`, or `None` when the user already has that exact reaction
    pub fn with_reaction(&self, user: &UserSummary, content: &str) -> Option<Self> {
        if self
            .reaction_of(&user.id)
            .is_some_and(|r| r.is_emoji(content))
        {
            return None;
        }

        let mut next = self.clone();
        next.0.retain(|r| r.user.id != user.id);
        next.0.push(Reaction::new(user.clone(), content));
        Some(next)
    }

    /// List without the user's reaction, or `None` when the user has none
    pub fn without_reaction(&self, user_id: &UserId) -> Option<Self> {
        self.reaction_of(user_id)?;

        let mut next = self.clone();
        next.0.retain(|r| &r.user.id != user_id);
        Some(next)
    }

    /// Group reactions by emoji, in order of first appearance
    pub fn aggregate(&self, current_user: Option<&UserId>) -> Vec<ReactionAggregate> {
        let mut groups: Vec<ReactionAggregate> = Vec::new();

        for reaction in &self.0 {
            let user = ReactionUser::from(reaction);
            let mine = current_user == Some(&reaction.user.id);

            if let Some(group) = groups.iter_mut().find(|g| g.content == reaction.content) {
                group.count += 1;
                group.has_current_user_reacted |= mine;
                group.users.push(user);
            } else {
                groups.push(ReactionAggregate {
                    content: reaction.content.clone(),
                    count: 1,
                    has_current_user_reacted: mine,
                    users: vec![user],
                });
            }
        }

        groups
    }
}

/// Reacting user as shown in the reaction tooltip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionUser {
    pub id: UserId,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub username: Option<String>,
    pub reacted_at: DateTime<Utc>,
}

impl From<&Reaction> for ReactionUser {
    fn from(reaction: &Reaction) -> Self {
        Self {
            id: reaction.user.id.clone(),
            display_name: reaction.user.display_name.clone(),
            avatar_url: reaction.user.avatar_url.clone(),
            username: reaction.user.username.clone(),
            reacted_at: reaction.reacted_at,
        }
    }
}

/// Per-emoji aggregate for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionAggregate {
    #[serde(rename = "emojiContent")]
    pub content: String,
    pub count: usize,
    pub has_current_user_reacted: bool,
    pub users: Vec<ReactionUser>,
}
