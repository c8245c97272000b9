//! Chat reconciliation: per-counterpart message lists, chat summaries,
//! unread counters, and the new-message signal.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::chat::{ChatDraft, ChatMessage, ChatSummary};
use crate::error::CalmateResult;
use crate::store::MemoryStore;
use crate::user::Principal;

/// Reconciled chat state for one principal's session.
///
/// The seen-id set is session-scoped: it prevents the same inbound message
/// from bumping the unread counter or firing a notification twice across
/// repeated snapshot deliveries.
#[derive(Debug, Default)]
pub struct ChatCache {
    messages: HashMap<String, Vec<ChatMessage>>,
    chat_list: Vec<ChatSummary>,
    unread: HashMap<String, u32>,
    seen_ids: HashSet<String>,
}

/// Result of folding one snapshot.
#[derive(Debug, Default)]
pub struct SnapshotOutcome {
    /// Whether any derived state consumers can observe changed.
    pub changed: bool,
    /// Counterpart and text of the first newly-seen unread inbound message
    /// in the batch. At most one notification per snapshot is surfaced, to
    /// avoid notification storms.
    pub notification: Option<(String, String)>,
}

impl ChatCache {
    pub fn messages_with(&self, counterpart: &str) -> &[ChatMessage] {
        self.messages
            .get(counterpart)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn chat_list(&self) -> &[ChatSummary] {
        &self.chat_list
    }

    pub fn unread_count(&self, counterpart: &str) -> u32 {
        self.unread.get(counterpart).copied().unwrap_or(0)
    }

    pub fn unread(&self) -> &HashMap<String, u32> {
        &self.unread
    }

    /// Fold a full snapshot (delivered newest first) into the cache.
    pub fn apply_snapshot(&mut self, principal_id: &str, docs: &[ChatMessage]) -> SnapshotOutcome {
        let mut next_messages: HashMap<String, Vec<ChatMessage>> = HashMap::new();
        let mut summaries: Vec<ChatSummary> = Vec::new();
        let mut notification = None;
        let mut unread_changed = false;

        for doc in docs {
            let Some(counterpart) = doc.counterpart(principal_id) else {
                continue;
            };
            let counterpart = counterpart.to_string();

            let list = next_messages.entry(counterpart.clone()).or_default();
            if list.is_empty() {
                // Newest-first delivery: the first document per counterpart
                // carries the summary.
                summaries.push(ChatSummary {
                    counterpart: counterpart.clone(),
                    last_message: doc.message.clone(),
                    timestamp: doc.timestamp,
                    unread_count: 0,
                });
            }
            if !list.iter().any(|m| m.id == doc.id) {
                list.push(doc.clone());
            }

            let inbound = doc.sender_id != principal_id;
            if inbound && !doc.read && self.seen_ids.insert(doc.id.clone()) {
                *self.unread.entry(counterpart.clone()).or_insert(0) += 1;
                unread_changed = true;
                if notification.is_none() {
                    debug!(from = %counterpart, id = %doc.id, "queueing new-message notification");
                    notification = Some((counterpart.clone(), doc.message.clone()));
                }
            }
        }

        for list in next_messages.values_mut() {
            list.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        }
        for summary in &mut summaries {
            summary.unread_count = self.unread_count(&summary.counterpart);
        }
        summaries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let changed =
            unread_changed || next_messages != self.messages || summaries != self.chat_list;
        self.messages = next_messages;
        self.chat_list = summaries;

        SnapshotOutcome {
            changed,
            notification,
        }
    }

    /// Optimistically zero the unread counter for one counterpart. The
    /// backend writes may still be in flight; the next authoritative
    /// snapshot remains ground truth.
    pub fn zero_unread(&mut self, counterpart: &str) {
        self.unread.insert(counterpart.to_string(), 0);
        if let Some(summary) = self
            .chat_list
            .iter_mut()
            .find(|c| c.counterpart == counterpart)
        {
            summary.unread_count = 0;
        }
    }
}

/// Send a message from the signed-in principal.
pub async fn send_message(
    store: &MemoryStore,
    principal: &Principal,
    recipient_id: &str,
    text: &str,
) -> CalmateResult<ChatMessage> {
    let message = store
        .insert_chat(ChatDraft::new(&principal.id, recipient_id, text))
        .await?;
    debug!(to = %recipient_id, "message sent");
    Ok(message)
}

/// Flip every unread inbound message from `counterpart` to read and return
/// how many documents were updated.
///
/// The caller zeroes its local counter before these writes are confirmed
/// for every message — an eventually-consistent read receipt.
pub async fn mark_chat_as_read(
    store: &MemoryStore,
    principal: &Principal,
    counterpart: &str,
) -> CalmateResult<usize> {
    let unread = store.unread_from(&principal.id, counterpart).await?;
    debug!(counterpart, count = unread.len(), "marking chat as read");
    for message in &unread {
        store.mark_read(&message.id).await?;
    }
    Ok(unread.len())
}
