//! Chat message types and the derived per-conversation summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message in the `chats` collection. Immutable once written, except for
/// the `read` flag which only ever flips false → true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

impl ChatMessage {
    /// Membership set matched by the store's participant filter.
    pub fn participants(&self) -> [&str; 2] {
        [&self.sender_id, &self.recipient_id]
    }

    pub fn involves(&self, user_id: &str) -> bool {
        self.participants().contains(&user_id)
    }

    /// The other participant from `user_id`'s point of view.
    pub fn counterpart(&self, user_id: &str) -> Option<&str> {
        if self.sender_id == user_id {
            Some(&self.recipient_id)
        } else if self.recipient_id == user_id {
            Some(&self.sender_id)
        } else {
            None
        }
    }
}

/// A message about to be written to the store (the store assigns the id).
#[derive(Debug, Clone)]
pub struct ChatDraft {
    pub sender_id: String,
    pub recipient_id: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

impl ChatDraft {
    pub fn new(sender_id: &str, recipient_id: &str, message: &str) -> Self {
        ChatDraft {
            sender_id: sender_id.to_string(),
            recipient_id: recipient_id.to_string(),
            message: message.to_string(),
            timestamp: Utc::now(),
            read: false,
        }
    }

    pub fn into_message(self, id: String) -> ChatMessage {
        ChatMessage {
            id,
            sender_id: self.sender_id,
            recipient_id: self.recipient_id,
            message: self.message,
            timestamp: self.timestamp,
            read: self.read,
        }
    }
}

/// Derived summary of a two-party conversation, keyed by the counterpart.
/// Recomputed from the message stream on every snapshot, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub counterpart: String,
    pub last_message: String,
    pub timestamp: DateTime<Utc>,
    pub unread_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counterpart_resolution() {
        let msg = ChatDraft::new("alice", "bob", "hi").into_message("m1".into());
        assert_eq!(msg.counterpart("alice"), Some("bob"));
        assert_eq!(msg.counterpart("bob"), Some("alice"));
        assert_eq!(msg.counterpart("carol"), None);
        assert!(msg.involves("bob"));
        assert!(!msg.involves("carol"));
    }
}
