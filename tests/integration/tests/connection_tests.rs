//! Connection manager integration tests
//!
//! Run with: cargo test -p integration-tests --test connection_tests

use std::time::Duration;

use integration_tests::{fixtures::*, settle, ApiCall, ConnectMode, TestClient};
use pulse_core::{MessageId, RoomId, UserId, UserSummary};
use pulse_realtime::{ChannelError, ConnectionState, DisconnectReason, OutboundEvent, Session};
use pulse_service::RoomService;
use serde_json::json;

// ============================================================================
// Channel lifetime
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_single_channel_across_rapid_session_replacements() {
    let client = TestClient::new();

    for i in 0..10 {
        client
            .manager()
            .start(Session::new(UserSummary::new("alice"), format!("token-{i}")));
        assert_eq!(client.manager().open_channel_count(), 1);
    }

    client.wait_for_state(ConnectionState::Connected).await;
    settle().await;

    assert_eq!(client.manager().open_channel_count(), 1);
    assert_eq!(client.manager().session().unwrap().token(), "token-9");
    assert_eq!(client.api.token().as_deref(), Some("token-9"));
}

#[tokio::test(start_paused = true)]
async fn test_same_credentials_keep_channel() {
    let mut client = TestClient::new();
    let _link = client.sign_in("alice").await;
    let generation = client.ctx.channel().unwrap().generation();

    client.manager().start(TestClient::session("alice"));
    settle().await;

    assert_eq!(client.ctx.channel().unwrap().generation(), generation);
    assert_eq!(client.connector.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_health_probed_once_per_manager() {
    let mut client = TestClient::new();
    let _first = client.sign_in("alice").await;
    let _second = client.sign_in("bob").await;
    settle().await;

    assert_eq!(client.api.count(|call| *call == ApiCall::Health), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stop_is_valid_in_every_state() {
    let client = TestClient::new();

    // Idle
    client.manager().stop();
    assert_eq!(client.manager().state(), ConnectionState::Idle);

    // Connecting
    client.connector.set_mode(ConnectMode::Hang);
    client.manager().start(TestClient::session("alice"));
    assert_eq!(client.manager().state(), ConnectionState::Connecting);
    client.manager().stop();

    assert_eq!(client.manager().state(), ConnectionState::Idle);
    assert_eq!(client.manager().open_channel_count(), 0);
    assert!(client.ctx.channel().is_none());
    assert!(client.manager().session().is_none());
    assert!(client.api.token().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_stop_clears_session_state() {
    let mut client = TestClient::new();
    let link = client.sign_in("alice").await;
    link.push("user_online", presence("bob")).await;
    link.push("receive_message", receive_message("r1", "m1", "bob"))
        .await;
    link.push("notifications_unread_update", unread_count(3))
        .await;
    link.push(
        "message_reaction_update",
        reaction_update("r1", "m1", &[("bob", "👍")]),
    )
    .await;
    link.push("message_read_update", read_update("r1", "m1", &["bob"]))
        .await;
    link.push("typing_update", typing_update("r1", &["bob"])).await;
    settle().await;
    assert!(client.cache().presence.is_online(&UserId::from("bob")));

    client.manager().stop();

    let cache = client.cache();
    assert!(cache.presence.query(&UserId::from("bob")).is_none());
    assert_eq!(cache.pending.total(), 0);
    assert_eq!(cache.unread.snapshot().notifications, 0);
    assert!(cache.reactions.get(&MessageId::from("m1")).is_empty());
    assert!(cache.reads.get(&MessageId::from("m1")).is_empty());
    assert!(cache.typing.typing_in(&RoomId::from("r1"), None).is_empty());
    assert!(cache.owner().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_stale_handle_reports_closed() {
    let mut client = TestClient::new();
    let _link = client.sign_in("alice").await;
    let handle = client.ctx.channel().unwrap();

    client.manager().stop();

    assert!(handle.is_closed());
    let result = handle
        .emit(OutboundEvent::typing_start(RoomId::from("r1")))
        .await;
    assert!(matches!(result, Err(ChannelError::Closed)));
}

// ============================================================================
// Reconnection
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_reconnection_bound() {
    let mut client = TestClient::new();
    client.connector.set_mode(ConnectMode::Fail);

    client.manager().start(TestClient::session("alice"));
    client.wait_for_state(ConnectionState::Disconnected).await;
    assert_eq!(client.connector.attempts(), 5);

    // Nothing more happens on its own
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(client.connector.attempts(), 5);
    assert_eq!(client.manager().state(), ConnectionState::Disconnected);
    assert!(client.ctx.channel().is_none());

    client.connector.set_mode(ConnectMode::Accept);
    assert!(client.manager().retry());
    let _link = client.next_link().await;
    client.wait_for_state(ConnectionState::Connected).await;
    assert_eq!(client.connector.attempts(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_connect_timeout_counts_as_failure() {
    let client = TestClient::new();
    client.connector.set_mode(ConnectMode::Hang);

    client.manager().start(TestClient::session("alice"));
    client.wait_for_state(ConnectionState::Disconnected).await;

    assert_eq!(client.connector.attempts(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_retry_only_when_disconnected() {
    let mut client = TestClient::new();
    assert!(!client.manager().retry());

    let _link = client.sign_in("alice").await;
    assert!(!client.manager().retry());
    assert_eq!(client.connector.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_transport_close_reconnects_and_rejoins_rooms() {
    let mut client = TestClient::new();
    let mut link = client.sign_in("alice").await;

    let _view = RoomService::new(&client.ctx)
        .open(&RoomId::from("r1"))
        .await
        .unwrap();
    assert_eq!(link.next_event().await, Some(("join_room".into(), json!("r1"))));

    link.close(DisconnectReason::TransportClose).await;
    client.wait_for_state(ConnectionState::Reconnecting).await;

    let mut relink = client.next_link().await;
    client.wait_for_state(ConnectionState::Connected).await;
    assert_eq!(relink.next_event().await, Some(("join_room".into(), json!("r1"))));
    assert_eq!(client.manager().open_channel_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_server_disconnect_reconnects() {
    let mut client = TestClient::new();
    let link = client.sign_in("alice").await;

    link.close(DisconnectReason::IoServerDisconnect).await;
    let _relink = client.next_link().await;
    client.wait_for_state(ConnectionState::Connected).await;

    assert_eq!(client.connector.attempts(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_client_disconnect_is_final() {
    let mut client = TestClient::new();
    let link = client.sign_in("alice").await;

    link.close(DisconnectReason::IoClientDisconnect).await;
    client.wait_for_state(ConnectionState::Disconnected).await;
    tokio::time::sleep(Duration::from_secs(30)).await;

    assert_eq!(client.connector.attempts(), 1);
}

// ============================================================================
// Session changes
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_token_rotation_carries_rooms() {
    let mut client = TestClient::new();
    let mut link = client.sign_in("alice").await;
    let _view = RoomService::new(&client.ctx)
        .open(&RoomId::from("r1"))
        .await
        .unwrap();
    link.next_event().await;

    let rotated = Session::new(UserSummary::new("alice"), "token-rotated");
    let mut relink = client.sign_in_with(rotated).await;

    assert_eq!(relink.next_event().await, Some(("join_room".into(), json!("r1"))));
    assert_eq!(
        client.connector.tokens().last().map(String::as_str),
        Some("token-rotated")
    );
    assert_eq!(client.manager().open_channel_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_user_change_clears_session_state() {
    let mut client = TestClient::new();
    let link = client.sign_in("alice").await;
    link.push("user_online", presence("bob")).await;
    link.push("receive_message", receive_message("r1", "m1", "bob"))
        .await;
    settle().await;
    assert!(client.cache().presence.is_online(&"bob".into()));
    assert_eq!(client.cache().pending.total(), 1);

    let mut relink = client.sign_in("carol").await;
    settle().await;

    assert!(client.cache().presence.query(&"bob".into()).is_none());
    assert_eq!(client.cache().pending.total(), 0);
    assert!(client.manager().joined_rooms().is_empty());
    assert!(relink.emitted().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_badges_seeded_on_connect() {
    let mut client = TestClient::new();
    client.api.set_unread(3, 2);

    let _link = client.sign_in("alice").await;
    settle().await;

    let unread = client.cache().unread.snapshot();
    assert_eq!(unread.notifications, 3);
    assert_eq!(unread.rooms, 2);
}
