//! Typing indicator and deletion countdown tests
//!
//! Run with: cargo test -p integration-tests --test timer_tests

use std::time::Duration;

use integration_tests::{fixtures::*, settle, ApiCall, ConnectMode, TestClient};
use pulse_core::{MessageId, RoomId};
use pulse_realtime::{ConnectionState, InboundEvent};
use pulse_service::{DeletionService, DeletionState, NoticeKind, RoomService, TypingService};
use serde_json::json;

async fn advance(duration: Duration) {
    tokio::time::sleep(duration).await;
    settle().await;
}

// ============================================================================
// Typing
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_keystrokes_collapse_into_one_typing_start() {
    let mut client = TestClient::new();
    let mut link = client.sign_in("alice").await;
    let typing = TypingService::new(&client.ctx);
    let room = RoomId::from("r1");

    assert!(typing.keystroke(&room).await);
    advance(Duration::from_secs(1)).await;
    assert!(!typing.keystroke(&room).await);
    advance(Duration::from_secs(1)).await;
    assert!(!typing.keystroke(&room).await);

    // Idle deadline is three seconds after the last keystroke
    advance(Duration::from_millis(2900)).await;
    assert!(typing.is_typing(&room));
    assert_eq!(
        link.emitted(),
        vec![("typing_start".to_string(), json!({ "roomId": "r1" }))]
    );

    advance(Duration::from_millis(200)).await;
    assert!(!typing.is_typing(&room));
    assert_eq!(
        link.emitted(),
        vec![("typing_stop".to_string(), json!({ "roomId": "r1" }))]
    );
}

#[tokio::test(start_paused = true)]
async fn test_stop_ends_typing_immediately() {
    let mut client = TestClient::new();
    let mut link = client.sign_in("alice").await;
    let typing = TypingService::new(&client.ctx);
    let room = RoomId::from("r1");

    typing.keystroke(&room).await;
    assert!(typing.stop(&room).await);
    assert!(!typing.stop(&room).await);

    // The idle timer was cancelled and sends no second stop
    advance(Duration::from_secs(5)).await;
    assert_eq!(link.emitted_names(), vec!["typing_start", "typing_stop"]);
}

#[tokio::test(start_paused = true)]
async fn test_leaving_room_stops_typing() {
    let mut client = TestClient::new();
    let mut link = client.sign_in("alice").await;
    let room = RoomId::from("r1");
    let view = RoomService::new(&client.ctx).open(&room).await.unwrap();
    let typing = TypingService::new(&client.ctx);

    typing.keystroke(&room).await;
    drop(view);
    settle().await;

    assert!(!typing.is_typing(&room));
    assert_eq!(
        link.emitted_names(),
        vec!["join_room", "typing_start", "typing_stop"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_typing_needs_a_channel() {
    let client = TestClient::new();
    let typing = TypingService::new(&client.ctx);
    let room = RoomId::from("r1");

    assert!(!typing.keystroke(&room).await);
    assert!(!typing.is_typing(&room));
}

// ============================================================================
// Deletion
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_cancelled_deletion_sends_nothing() {
    let mut client = TestClient::new();
    let mut link = client.sign_in("alice").await;
    let deletions = DeletionService::new(&client.ctx);
    let message = MessageId::from("m1");

    assert!(deletions.request(&message, &RoomId::from("r1")));
    advance(Duration::from_secs(5)).await;
    assert!(deletions
        .remaining(&message)
        .is_some_and(|left| left <= Duration::from_secs(3) && left > Duration::from_millis(2900)));
    assert!(deletions.cancel(&message));

    advance(Duration::from_secs(10)).await;
    assert_eq!(deletions.state(&message), DeletionState::Normal);
    assert!(link.emitted().is_empty());
    assert!(client.api.mutation_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_deletion_fires_once_after_countdown() {
    let mut client = TestClient::new();
    let mut link = client.sign_in("alice").await;
    let room = RoomId::from("r1");
    let mut view = RoomService::new(&client.ctx).open(&room).await.unwrap();
    link.next_event().await;

    let deletions = DeletionService::new(&client.ctx);
    let message = MessageId::from("m1");
    assert!(deletions.request(&message, &room));
    assert!(!deletions.request(&message, &room));

    advance(Duration::from_millis(7900)).await;
    assert!(matches!(
        deletions.state(&message),
        DeletionState::Pending { .. }
    ));
    assert!(link.emitted().is_empty());

    advance(Duration::from_millis(200)).await;
    assert_eq!(deletions.state(&message), DeletionState::Deleted);
    assert!(!deletions.cancel(&message));
    assert!(!deletions.request(&message, &room));
    assert_eq!(
        link.emitted(),
        vec![(
            "delete_message".to_string(),
            json!({ "messageId": "m1", "roomId": "r1" })
        )]
    );

    link.push("message_deleted", message_deleted("r1", "m1")).await;
    let event = view.next_event().await.unwrap();
    assert!(matches!(event, InboundEvent::MessageDeleted(_)));
    assert_eq!(deletions.state(&message), DeletionState::Normal);

    advance(Duration::from_secs(10)).await;
    assert!(link.emitted().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_unconfirmed_deletion_is_forgotten() {
    let mut client = TestClient::new();
    let mut link = client.sign_in("alice").await;
    let deletions = DeletionService::new(&client.ctx);
    let message = MessageId::from("m1");

    assert!(deletions.request(&message, &RoomId::from("r1")));
    advance(Duration::from_millis(8100)).await;
    assert_eq!(deletions.state(&message), DeletionState::Deleted);
    assert_eq!(link.emitted_names(), vec!["delete_message"]);

    // No message_deleted arrives; the sent intent lapses after the confirm window
    advance(Duration::from_secs(29)).await;
    assert_eq!(deletions.state(&message), DeletionState::Deleted);
    advance(Duration::from_secs(2)).await;
    assert_eq!(deletions.state(&message), DeletionState::Normal);
    assert!(link.emitted().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failed_deletion_reverts() {
    let client = TestClient::new();
    client.connector.set_mode(ConnectMode::Fail);
    client.manager().start(TestClient::session("alice"));
    client.wait_for_state(ConnectionState::Disconnected).await;
    client.api.fail_mutations(true);

    let mut notices = client.ctx.notices().subscribe();
    let deletions = DeletionService::new(&client.ctx);
    let message = MessageId::from("m1");

    deletions.request(&message, &RoomId::from("r1"));
    advance(Duration::from_secs(9)).await;

    assert_eq!(deletions.state(&message), DeletionState::Normal);
    assert_eq!(notices.try_recv().unwrap().kind, NoticeKind::DeletionFailed);
    assert_eq!(
        client.api.mutation_calls(),
        vec![ApiCall::DeleteMessage {
            message_id: message.clone(),
            room_id: RoomId::from("r1"),
        }]
    );

    // Reverted, so the user may try again
    assert!(deletions.request(&message, &RoomId::from("r1")));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_countdowns() {
    let mut client = TestClient::new();
    let mut link = client.sign_in("alice").await;
    let deletions = DeletionService::new(&client.ctx);
    let room = RoomId::from("r1");

    deletions.request(&MessageId::from("m1"), &room);
    deletions.request(&MessageId::from("m2"), &room);
    assert_eq!(deletions.shutdown(), 2);

    advance(Duration::from_secs(10)).await;
    assert!(link.emitted().is_empty());
    assert_eq!(
        deletions.state(&MessageId::from("m1")),
        DeletionState::Normal
    );
}
