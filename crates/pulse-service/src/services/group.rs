//! Group administration
//!
//! Fire-and-forget emits; the server answers with room events that reach the caches
//! through the router.

use pulse_core::{RoomId, UserId};
use pulse_realtime::protocol::{GroupMemberPayload, GroupMembersPayload, RoomRef};
use pulse_realtime::OutboundEvent;
use tracing::instrument;

use super::context::ServiceContext;
use super::dispatch::emit_only;
use super::error::{ServiceError, ServiceResult};

/// Group service
pub struct GroupService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> GroupService<'a> {
    /// Create a new GroupService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, user_ids), fields(room_id = %room_id, count = user_ids.len()))]
    pub async fn add_members(&self, room_id: &RoomId, user_ids: Vec<UserId>) -> ServiceResult<()> {
        if user_ids.is_empty() {
            return Err(ServiceError::validation("At least one member is required"));
        }
        emit_only(
            self.ctx,
            OutboundEvent::GroupAddMembers(GroupMembersPayload {
                room_id: room_id.clone(),
                user_ids,
            }),
        )
        .await
    }

    #[instrument(skip(self), fields(room_id = %room_id, user_id = %user_id))]
    pub async fn add_admin(&self, room_id: &RoomId, user_id: &UserId) -> ServiceResult<()> {
        emit_only(self.ctx, OutboundEvent::GroupAddAdmin(member(room_id, user_id))).await
    }

    #[instrument(skip(self), fields(room_id = %room_id, user_id = %user_id))]
    pub async fn remove_member(&self, room_id: &RoomId, user_id: &UserId) -> ServiceResult<()> {
        emit_only(self.ctx, OutboundEvent::GroupRemoveMember(member(room_id, user_id))).await
    }

    #[instrument(skip(self), fields(room_id = %room_id, user_id = %user_id))]
    pub async fn ban_member(&self, room_id: &RoomId, user_id: &UserId) -> ServiceResult<()> {
        emit_only(self.ctx, OutboundEvent::GroupBanMember(member(room_id, user_id))).await
    }

    #[instrument(skip(self), fields(room_id = %room_id, user_id = %user_id))]
    pub async fn restore_member(&self, room_id: &RoomId, user_id: &UserId) -> ServiceResult<()> {
        emit_only(self.ctx, OutboundEvent::GroupRestoreMember(member(room_id, user_id))).await
    }

    /// Leave a group; the room is no longer re-joined on reconnect
    #[instrument(skip(self), fields(room_id = %room_id))]
    pub async fn leave(&self, room_id: &RoomId) -> ServiceResult<()> {
        emit_only(
            self.ctx,
            OutboundEvent::GroupLeave(RoomRef {
                room_id: room_id.clone(),
            }),
        )
        .await?;
        if let Some(channel) = self.ctx.channel() {
            channel.forget_room(room_id);
        }
        Ok(())
    }
}

fn member(room_id: &RoomId, user_id: &UserId) -> GroupMemberPayload {
    GroupMemberPayload {
        room_id: room_id.clone(),
        user_id: user_id.clone(),
    }
}
