//! Presence, pending buffer, room view, and badge integration tests
//!
//! Run with: cargo test -p integration-tests --test realtime_state_tests

use std::time::Duration;

use integration_tests::{fixtures::*, settle, ConnectMode, TestClient};
use pulse_core::{NotificationId, PostId, RoomId, UserId};
use pulse_realtime::{ConnectionState, DisconnectReason, InboundEvent};
use pulse_service::{
    GroupService, NotificationService, PresenceService, ReactionService, RoomService, TypingService,
};
use serde_json::json;

// ============================================================================
// Presence
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_presence_last_arrival_wins_online_then_offline() {
    let mut client = TestClient::new();
    let link = client.sign_in("alice").await;

    link.push("user_online", presence("bob")).await;
    link.push("user_offline", presence("bob")).await;
    settle().await;

    let entry = PresenceService::new(&client.ctx).query(&UserId::from("bob"));
    assert_eq!(entry.map(|e| e.is_online), Some(false));
}

#[tokio::test(start_paused = true)]
async fn test_presence_last_arrival_wins_offline_then_online() {
    let mut client = TestClient::new();
    let link = client.sign_in("alice").await;

    link.push("user_offline", presence("bob")).await;
    link.push("user_status_change", status_change("bob", true))
        .await;
    settle().await;

    assert!(PresenceService::new(&client.ctx).is_online(&UserId::from("bob")));
}

#[tokio::test(start_paused = true)]
async fn test_presence_probe_emits_check_user_status() {
    let mut client = TestClient::new();
    let mut link = client.sign_in("alice").await;
    let presence = PresenceService::new(&client.ctx);

    assert!(presence.query(&UserId::from("bob")).is_none());
    presence.probe(&UserId::from("bob")).await.unwrap();

    assert_eq!(
        link.next_event().await,
        Some(("check_user_status".into(), json!({ "userId": "bob" })))
    );
}

// ============================================================================
// Pending buffer
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_pending_buffer_drains_once() {
    let mut client = TestClient::new();
    let link = client.sign_in("alice").await;
    link.push("receive_message", receive_message("r1", "m1", "bob"))
        .await;
    link.push("receive_message", receive_message("r1", "m2", "bob"))
        .await;
    link.push("receive_message", receive_message("r2", "m3", "bob"))
        .await;
    settle().await;

    let rooms = RoomService::new(&client.ctx);
    let mut view = rooms.open(&RoomId::from("r1")).await.unwrap();
    let pending = view.take_pending();

    let ids: Vec<&str> = pending.iter().map(|e| e.message.id.as_str()).collect();
    assert_eq!(ids, vec!["m1", "m2"]);
    assert_eq!(pending[0].message.room_id, RoomId::from("r1"));
    assert!(view.take_pending().is_empty());
    assert_eq!(client.cache().pending.pending_for(&RoomId::from("r1")), 0);
    assert_eq!(client.cache().pending.pending_for(&RoomId::from("r2")), 1);

    drop(view);
    let mut reopened = rooms.open(&RoomId::from("r1")).await.unwrap();
    assert!(reopened.take_pending().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_pending_events_expire() {
    let mut client = TestClient::new();
    let link = client.sign_in("alice").await;
    link.push("receive_message", receive_message("r1", "m1", "bob"))
        .await;
    settle().await;

    tokio::time::sleep(Duration::from_secs(29)).await;
    assert_eq!(client.cache().pending.total(), 1);

    tokio::time::sleep(Duration::from_secs(32)).await;
    assert_eq!(client.cache().pending.total(), 0);
}

// ============================================================================
// Room view
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_room_view_streams_only_its_room() {
    let mut client = TestClient::new();
    let link = client.sign_in("alice").await;
    let mut view = RoomService::new(&client.ctx)
        .open(&RoomId::from("r1"))
        .await
        .unwrap();

    link.push("receive_message", receive_message("r2", "m0", "bob"))
        .await;
    link.push("receive_message", receive_message("r1", "m1", "bob"))
        .await;

    let event = view.next_event().await.unwrap();
    let InboundEvent::ReceiveMessage(payload) = event else {
        panic!("expected receive_message, got {event:?}");
    };
    assert_eq!(payload.new_message.id.as_str(), "m1");

    // Delivered live, so not left behind for the next mount
    assert_eq!(client.cache().pending.pending_for(&RoomId::from("r1")), 0);
    assert_eq!(client.cache().pending.pending_for(&RoomId::from("r2")), 1);
}

#[tokio::test(start_paused = true)]
async fn test_room_view_follows_reconnect() {
    let mut client = TestClient::new();
    let link = client.sign_in("alice").await;
    let mut view = RoomService::new(&client.ctx)
        .open(&RoomId::from("r1"))
        .await
        .unwrap();

    link.close(DisconnectReason::TransportClose).await;
    let relink = client.next_link().await;
    client.wait_for_state(ConnectionState::Connected).await;

    relink
        .push("typing_update", typing_update("r1", &["bob"]))
        .await;
    let event = view.next_event().await.unwrap();
    assert!(matches!(event, InboundEvent::TypingUpdate(_)));
}

#[tokio::test(start_paused = true)]
async fn test_room_view_resumes_after_manual_retry() {
    let mut client = TestClient::new();
    let link = client.sign_in("alice").await;
    let room = RoomId::from("r1");
    let mut view = RoomService::new(&client.ctx).open(&room).await.unwrap();

    client.connector.set_mode(ConnectMode::Fail);
    link.close(DisconnectReason::TransportError).await;
    client.wait_for_state(ConnectionState::Disconnected).await;
    assert!(client.ctx.channel().is_none());

    let recover = async {
        // The view is parked on the closed channel by now
        settle().await;
        client.connector.set_mode(ConnectMode::Accept);
        assert!(client.manager().retry());
        let relink = client.next_link().await;
        client.wait_for_state(ConnectionState::Connected).await;
        relink
            .push("typing_update", typing_update("r1", &["bob"]))
            .await;
        relink
    };
    let (event, _relink) = tokio::join!(view.next_event(), recover);

    assert!(matches!(event, Some(InboundEvent::TypingUpdate(_))));
    assert_eq!(client.manager().joined_rooms(), vec![room]);
}

#[tokio::test(start_paused = true)]
async fn test_room_view_ends_with_session() {
    let mut client = TestClient::new();
    let _link = client.sign_in("alice").await;
    let mut view = RoomService::new(&client.ctx)
        .open(&RoomId::from("r1"))
        .await
        .unwrap();

    client.manager().stop();
    assert!(view.next_event().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_room_view_drop_unsubscribes_and_clears_typing() {
    let mut client = TestClient::new();
    let link = client.sign_in("alice").await;
    let room = RoomId::from("r1");
    let view = RoomService::new(&client.ctx).open(&room).await.unwrap();

    link.push("typing_update", typing_update("r1", &["alice", "bob"]))
        .await;
    settle().await;

    let typing = TypingService::new(&client.ctx);
    let others: Vec<String> = typing
        .typing_users(&room)
        .into_iter()
        .map(|u| u.user_id.into_inner())
        .collect();
    assert_eq!(others, vec!["bob".to_string()]);

    drop(view);
    assert!(typing.typing_users(&room).is_empty());
    assert!(client.manager().joined_rooms().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_open_room_requires_session() {
    let client = TestClient::new();
    let result = RoomService::new(&client.ctx).open(&RoomId::from("r1")).await;
    assert!(matches!(
        result,
        Err(pulse_service::ServiceError::NotSignedIn)
    ));
}

// ============================================================================
// Pushed state
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_reaction_update_replaces_list() {
    let mut client = TestClient::new();
    let link = client.sign_in("alice").await;

    link.push(
        "message_reaction_update",
        reaction_update("r1", "m1", &[("bob", "👍"), ("carol", "❤️")]),
    )
    .await;
    link.push(
        "message_reaction_update",
        reaction_update("r1", "m1", &[("carol", "❤️")]),
    )
    .await;
    settle().await;

    let reactions = ReactionService::new(&client.ctx).reactions(&"m1".into());
    assert_eq!(reactions.len(), 1);
    assert!(reactions.reaction_of(&UserId::from("carol")).is_some());
}

#[tokio::test(start_paused = true)]
async fn test_notification_badges_follow_pushes() {
    let mut client = TestClient::new();
    client.api.set_unread(1, 0);
    let link = client.sign_in("alice").await;
    settle().await;

    link.push("notification_received", notification("n1")).await;
    link.push("rooms_unreads_update", unread_count(4)).await;
    settle().await;
    let unread = client.cache().unread.snapshot();
    assert_eq!((unread.notifications, unread.rooms), (2, 4));

    link.push("all_notifications_marked_as_read", json!({})).await;
    settle().await;
    assert_eq!(client.cache().unread.snapshot().notifications, 0);
}

// ============================================================================
// Fire-and-forget emits
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_group_leave_emits_and_forgets_room() {
    let mut client = TestClient::new();
    let mut link = client.sign_in("alice").await;
    let room = RoomId::from("g1");
    let view = RoomService::new(&client.ctx).open(&room).await.unwrap();
    let groups = GroupService::new(&client.ctx);

    groups
        .add_members(&room, vec![UserId::from("bob"), UserId::from("carol")])
        .await
        .unwrap();
    groups.leave(&room).await.unwrap();
    settle().await;

    assert_eq!(
        link.emitted(),
        vec![
            ("join_room".to_string(), json!("g1")),
            (
                "group_add_members".to_string(),
                json!({ "roomId": "g1", "userIds": ["bob", "carol"] })
            ),
            ("group_leave".to_string(), json!({ "roomId": "g1" })),
        ]
    );
    assert!(client.manager().joined_rooms().is_empty());
    drop(view);

    assert!(matches!(
        groups.add_members(&room, Vec::new()).await,
        Err(pulse_service::ServiceError::Validation(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_notification_emits_skip_self_and_empty_batches() {
    let mut client = TestClient::new();
    let mut link = client.sign_in("alice").await;
    let notifications = NotificationService::new(&client.ctx);

    notifications
        .create(&UserId::from("bob"), "like", Some(PostId::from("p1")), None)
        .await
        .unwrap();
    notifications
        .create(&UserId::from("alice"), "like", None, None)
        .await
        .unwrap();
    notifications.delete_many(Vec::new()).await.unwrap();
    notifications
        .delete(&NotificationId::from("n1"))
        .await
        .unwrap();
    settle().await;

    assert_eq!(
        link.emitted(),
        vec![
            (
                "create_notification".to_string(),
                json!({ "recipientId": "bob", "type": "like", "postId": "p1" })
            ),
            (
                "delete_notification".to_string(),
                json!({ "notificationId": "n1" })
            ),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_malformed_events_are_dropped() {
    let mut client = TestClient::new();
    let link = client.sign_in("alice").await;

    link.push("receive_message", json!({ "unexpected": true })).await;
    link.push("not_a_real_event", json!({})).await;
    link.push("user_online", presence("bob")).await;
    settle().await;

    assert_eq!(client.manager().state(), ConnectionState::Connected);
    assert_eq!(client.cache().pending.total(), 0);
    assert!(client.cache().presence.is_online(&UserId::from("bob")));
}
