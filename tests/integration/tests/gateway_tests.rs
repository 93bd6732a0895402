//! Gateway Integration Tests
//!
//! Each test boots its own gateway on an ephemeral port; no external
//! services are needed.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use chat_core::{DeliveryLedger, MessageId, TypingState, UserId};
use chrono::{DateTime, Utc};
use integration_tests::{
    assert_json, persisted_message, seen_signal, test_config, typing_signal, unique_id, TestServer,
};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio_tungstenite::tungstenite::Message;

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");

    for path in ["/health", "/api/health"] {
        let response = server.get(path).await.expect("Request failed");
        let body: Value = assert_json(response, StatusCode::OK).await.unwrap();

        assert_eq!(body["status"], "OK");
        assert_eq!(body["message"], "Server is running");
    }
}

#[tokio::test]
async fn test_health_counts_connections() {
    let server = TestServer::start().await.unwrap();
    let mut a = server.connect_as("A").await.unwrap();
    let mut anonymous = server.connect().await.unwrap();
    a.sync().await.unwrap();
    anonymous.sync().await.unwrap();

    let response = server.get("/health").await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(body["connections"], 2);
    assert_eq!(body["onlineUsers"], 1);
}

// ============================================================================
// Presence Tests
// ============================================================================

#[tokio::test]
async fn test_setup_broadcasts_presence_to_everyone() {
    let server = TestServer::start().await.unwrap();
    let mut a = server.connect().await.unwrap();

    a.emit("setup", json!("A")).await.unwrap();
    assert_eq!(a.expect_event("online_users").await.unwrap(), json!(["A"]));

    let mut b = server.connect().await.unwrap();
    b.emit("setup", json!("B")).await.unwrap();

    assert_eq!(b.expect_event("online_users").await.unwrap(), json!(["A", "B"]));
    assert_eq!(a.expect_event("online_users").await.unwrap(), json!(["A", "B"]));
}

#[tokio::test]
async fn test_get_online_users_answers_requester_only() {
    let server = TestServer::start().await.unwrap();
    let mut a = server.connect_as("A").await.unwrap();
    let mut b = server.connect_as("B").await.unwrap();
    a.expect_event("online_users").await.unwrap();

    b.emit("get_online_users", Value::Null).await.unwrap();
    assert_eq!(b.expect_event("online_users").await.unwrap(), json!(["A", "B"]));

    // A's next event is the reply to its own request, nothing from B's query
    assert!(a.sync().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_disconnect_broadcasts_presence() {
    let server = TestServer::start().await.unwrap();
    let mut a = server.connect_as("A").await.unwrap();
    let b = server.connect_as("B").await.unwrap();
    a.expect_event("online_users").await.unwrap();

    b.close().await.unwrap();

    assert_eq!(a.expect_event("online_users").await.unwrap(), json!(["A"]));
}

#[tokio::test]
async fn test_anonymous_disconnect_is_silent() {
    let server = TestServer::start().await.unwrap();
    let mut a = server.connect_as("A").await.unwrap();

    let anonymous = server.connect().await.unwrap();
    anonymous.close().await.unwrap();

    assert_eq!(a.sync().await.unwrap(), Vec::new());
}

#[tokio::test]
async fn test_reidentify_replaces_presence() {
    let server = TestServer::start().await.unwrap();
    let mut conn = server.connect_as("A").await.unwrap();

    conn.emit("setup", json!("Z")).await.unwrap();

    assert_eq!(conn.expect_event("online_users").await.unwrap(), json!(["Z"]));
}

// ============================================================================
// Delivery Tests
// ============================================================================

#[tokio::test]
async fn test_two_party_conversation() {
    let server = TestServer::start().await.unwrap();
    let chat = unique_id("chat");
    let message_id = unique_id("msg");

    let mut a = server.connect_as("A").await.unwrap();
    let mut b = server.connect_as("B").await.unwrap();
    assert_eq!(a.expect_event("online_users").await.unwrap(), json!(["A", "B"]));

    a.emit("join_chat", json!(chat)).await.unwrap();
    b.emit("join_chat", json!(chat)).await.unwrap();
    assert!(a.sync().await.unwrap().is_empty());
    assert!(b.sync().await.unwrap().is_empty());

    // A sends; B gets the message and the delivered marker
    let message = persisted_message(&message_id, &chat, "A", "hello");
    a.emit("new_message", message.clone()).await.unwrap();

    assert_eq!(b.expect_event("message_received").await.unwrap(), message);
    assert_eq!(
        b.expect_event("message_delivered").await.unwrap(),
        json!({"messageId": message_id})
    );

    // A gets exactly one confirmation and no echo
    let mut a_ledger = DeliveryLedger::new();
    let sender_events = a.sync().await.unwrap();
    assert_eq!(sender_events.len(), 1, "sender saw {sender_events:?}");
    assert_eq!(sender_events[0].event, "message_delivered");
    assert_eq!(sender_events[0].data, json!({"messageId": message_id}));
    a_ledger.mark_delivered(MessageId::parse(message_id.as_str()).unwrap());

    // B reads it; both sides get the receipt
    b.emit("message_seen", seen_signal(&message_id, &chat, "B"))
        .await
        .unwrap();

    for client in [&mut a, &mut b] {
        let update = client.expect_event("message_seen_update").await.unwrap();
        assert_eq!(update["messageId"], message_id.as_str());
        assert_eq!(update["seenBy"], "B");

        let seen_at: DateTime<Utc> = serde_json::from_value(update["timestamp"].clone()).unwrap();
        a_ledger.mark_seen(
            MessageId::parse(message_id.as_str()).unwrap(),
            UserId::parse("B").unwrap(),
            seen_at,
        );
    }

    let state = a_ledger.get(&MessageId::parse(message_id.as_str()).unwrap()).unwrap();
    assert!(state.delivered && state.seen && !state.failed);
    assert_eq!(state.seen_by.as_ref().map(UserId::as_str), Some("B"));

    // B types; only A hears it
    let mut a_typing = TypingState::new();
    b.emit("typing", typing_signal(&chat, "B")).await.unwrap();
    let typing = a.expect_event("typing").await.unwrap();
    assert_eq!(typing, json!({"chatId": chat, "userId": "B"}));
    a_typing.start(
        serde_json::from_value(typing["chatId"].clone()).unwrap(),
        serde_json::from_value(typing["userId"].clone()).unwrap(),
    );
    assert_eq!(a_typing.typing_in(&chat_core::ChatId::parse(chat.as_str()).unwrap()).len(), 1);

    b.emit("stop_typing", typing_signal(&chat, "B")).await.unwrap();
    assert_eq!(
        a.expect_event("stop_typing").await.unwrap(),
        json!({"chatId": chat, "userId": "B"})
    );
    assert!(b.sync().await.unwrap().is_empty());

    // B leaves
    b.close().await.unwrap();
    assert_eq!(a.expect_event("online_users").await.unwrap(), json!(["A"]));
}

#[tokio::test]
async fn test_recipient_not_in_chat_gets_nothing() {
    let server = TestServer::start().await.unwrap();
    let chat = unique_id("chat");

    let mut a = server.connect_as("A").await.unwrap();
    let mut b = server.connect_as("B").await.unwrap();
    a.expect_event("online_users").await.unwrap();

    a.emit("join_chat", json!(chat)).await.unwrap();
    a.emit("new_message", persisted_message("m1", &chat, "A", "anyone?"))
        .await
        .unwrap();
    assert_eq!(a.sync().await.unwrap().len(), 1);

    assert!(b.sync().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_new_message_without_chat_is_dropped() {
    let server = TestServer::start().await.unwrap();
    let mut a = server.connect_as("A").await.unwrap();

    a.emit("new_message", json!({"_id": "m1", "sender": {"_id": "A"}, "content": "x"}))
        .await
        .unwrap();
    a.emit("new_message", json!({"_id": "m2", "chat": "", "sender": {"_id": "A"}}))
        .await
        .unwrap();

    assert!(a.sync().await.unwrap().is_empty());
}

// ============================================================================
// Protocol Tests
// ============================================================================

#[tokio::test]
async fn test_garbage_does_not_close_connection() {
    let server = TestServer::start().await.unwrap();
    let mut a = server.connect_as("A").await.unwrap();

    a.send_raw(Message::Text("definitely not json".to_string()))
        .await
        .unwrap();
    a.emit("launch_missiles", json!({"now": true})).await.unwrap();
    a.emit("online_users", json!(["spoofed"])).await.unwrap();
    a.emit("join_chat", json!("")).await.unwrap();
    a.emit("typing", json!({"chatId": "c1"})).await.unwrap();

    assert!(a.sync().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_binary_frame_closes_with_decode_error() {
    let server = TestServer::start().await.unwrap();
    let mut a = server.connect().await.unwrap();

    a.send_raw(Message::Binary(vec![1, 2, 3])).await.unwrap();

    assert_eq!(a.expect_close().await.unwrap(), Some(4002));
}

#[tokio::test]
async fn test_silent_connection_times_out() {
    let config = test_config(&[
        ("HEARTBEAT_INTERVAL_MS", "100"),
        ("HEARTBEAT_TIMEOUT_MS", "300"),
    ])
    .unwrap();
    let server = TestServer::start_with_config(config).await.unwrap();
    let mut a = server.connect().await.unwrap();

    // Not reading means no pong replies either
    tokio::time::sleep(std::time::Duration::from_millis(800)).await;

    assert_eq!(a.expect_close().await.unwrap(), Some(4009));
}

#[tokio::test]
async fn test_sequence_numbers_are_per_connection() {
    let server = TestServer::start().await.unwrap();
    let mut a = server.connect().await.unwrap();

    a.emit("get_online_users", Value::Null).await.unwrap();
    let first = a.next_event().await.unwrap();
    a.emit("get_online_users", Value::Null).await.unwrap();
    let second = a.next_event().await.unwrap();

    assert_eq!(first.sequence, 1);
    assert_eq!(second.sequence, 2);
    assert_eq!(first.data, json!([]));

    let mut b = server.connect().await.unwrap();
    b.emit("get_online_users", Value::Null).await.unwrap();
    assert_eq!(b.next_event().await.unwrap().sequence, 1);
}
