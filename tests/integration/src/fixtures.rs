//! Test fixtures and data generators
//!
//! Provides reusable event payloads for integration tests.

use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// A unique document-style id with a readable prefix
pub fn unique_id(prefix: &str) -> String {
    format!("{prefix}{:08x}", unique_suffix())
}

/// An already-persisted message, shaped the way the persistence layer
/// returns it (chat and sender populated)
pub fn persisted_message(message_id: &str, chat_id: &str, sender_id: &str, content: &str) -> Value {
    json!({
        "_id": message_id,
        "chat": {"_id": chat_id},
        "sender": {"_id": sender_id, "name": format!("user {sender_id}")},
        "content": content,
        "files": [],
        "createdAt": "2024-01-01T00:00:00.000Z"
    })
}

/// `message_seen` data
pub fn seen_signal(message_id: &str, chat_id: &str, user_id: &str) -> Value {
    json!({"messageId": message_id, "chatId": chat_id, "userId": user_id})
}

/// `typing` / `stop_typing` data
pub fn typing_signal(chat_id: &str, user_id: &str) -> Value {
    json!({"chatId": chat_id, "userId": user_id})
}
