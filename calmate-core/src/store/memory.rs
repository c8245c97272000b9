//! In-memory document store with live-query subscriptions.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use crate::chat::{ChatDraft, ChatMessage};
use crate::error::{CalmateError, CalmateResult};
use crate::event::{CalendarEvent, EventDraft};
use crate::user::UserProfile;

/// Cheaply clonable handle to the shared document collections.
///
/// Subscriptions are `watch` channels: a subscriber always observes the
/// latest full snapshot for its predicate, and mutations that change the
/// result set wake it. Delivery order within an event snapshot is
/// insertion order, not chronological; chat snapshots are ordered newest
/// first.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    events: Vec<CalendarEvent>,
    chats: Vec<ChatMessage>,
    users: Vec<UserProfile>,
    event_watchers: Vec<Watcher<CalendarEvent>>,
    chat_watchers: Vec<Watcher<ChatMessage>>,
}

/// A live query held open by one subscriber.
struct Watcher<T> {
    user_id: String,
    tx: watch::Sender<Vec<T>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Live query over the principal's own events (`user_id == owner`).
    pub fn subscribe_events(&self, user_id: &str) -> watch::Receiver<Vec<CalendarEvent>> {
        let mut inner = self.lock();
        let (tx, rx) = watch::channel(events_for(&inner.events, user_id));
        inner.event_watchers.push(Watcher {
            user_id: user_id.to_string(),
            tx,
        });
        rx
    }

    /// Existence query on `(owner, title, start, end)` used by the
    /// duplicate check before insert.
    pub async fn find_events(
        &self,
        user_id: &str,
        title: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> CalmateResult<Vec<CalendarEvent>> {
        let inner = self.lock();
        Ok(inner
            .events
            .iter()
            .filter(|e| e.user_id == user_id && e.title == title && e.start == start && e.end == end)
            .cloned()
            .collect())
    }

    /// Insert a new event document, assigning its id.
    pub async fn insert_event(
        &self,
        draft: EventDraft,
        user_id: &str,
    ) -> CalmateResult<CalendarEvent> {
        let event = draft.into_event(Uuid::new_v4().to_string(), user_id.to_string());
        let mut inner = self.lock();
        inner.events.push(event.clone());
        debug!(id = %event.id, title = %event.title, "event inserted");
        notify_event_watchers(&mut inner);
        Ok(event)
    }

    /// Full-document replace by id.
    pub async fn update_event(&self, event: &CalendarEvent) -> CalmateResult<()> {
        let mut inner = self.lock();
        let slot = inner
            .events
            .iter_mut()
            .find(|e| e.id == event.id)
            .ok_or_else(|| CalmateError::NotFound(format!("event {}", event.id)))?;
        *slot = event.clone();
        notify_event_watchers(&mut inner);
        Ok(())
    }

    /// Delete by id. Deleting an absent document is a no-op.
    pub async fn delete_event(&self, id: &str) -> CalmateResult<()> {
        let mut inner = self.lock();
        inner.events.retain(|e| e.id != id);
        notify_event_watchers(&mut inner);
        Ok(())
    }

    // =========================================================================
    // Chats
    // =========================================================================

    /// Live query over all messages the principal participates in,
    /// ordered newest first.
    pub fn subscribe_chats(&self, user_id: &str) -> watch::Receiver<Vec<ChatMessage>> {
        let mut inner = self.lock();
        let (tx, rx) = watch::channel(chats_for(&inner.chats, user_id));
        inner.chat_watchers.push(Watcher {
            user_id: user_id.to_string(),
            tx,
        });
        rx
    }

    /// Insert a new chat message, assigning its id.
    pub async fn insert_chat(&self, draft: ChatDraft) -> CalmateResult<ChatMessage> {
        let message = draft.into_message(Uuid::new_v4().to_string());
        let mut inner = self.lock();
        inner.chats.push(message.clone());
        debug!(id = %message.id, to = %message.recipient_id, "chat message inserted");
        notify_chat_watchers(&mut inner);
        Ok(message)
    }

    /// All unread messages sent by `counterpart` in a conversation the
    /// principal participates in.
    pub async fn unread_from(
        &self,
        user_id: &str,
        counterpart: &str,
    ) -> CalmateResult<Vec<ChatMessage>> {
        let inner = self.lock();
        Ok(inner
            .chats
            .iter()
            .filter(|m| m.involves(user_id) && m.sender_id == counterpart && !m.read)
            .cloned()
            .collect())
    }

    /// Flip a message's `read` flag to true. Monotonic: there is no way
    /// back.
    pub async fn mark_read(&self, id: &str) -> CalmateResult<()> {
        let mut inner = self.lock();
        let message = inner
            .chats
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| CalmateError::NotFound(format!("chat message {id}")))?;
        message.read = true;
        notify_chat_watchers(&mut inner);
        Ok(())
    }

    // =========================================================================
    // Users
    // =========================================================================

    pub async fn get_user(&self, id: &str) -> CalmateResult<Option<UserProfile>> {
        let inner = self.lock();
        Ok(inner.users.iter().find(|u| u.uid == id).cloned())
    }

    pub async fn upsert_user(&self, profile: UserProfile) -> CalmateResult<()> {
        let mut inner = self.lock();
        match inner.users.iter_mut().find(|u| u.uid == profile.uid) {
            Some(existing) => *existing = profile,
            None => inner.users.push(profile),
        }
        Ok(())
    }

    pub async fn all_users(&self) -> CalmateResult<Vec<UserProfile>> {
        Ok(self.lock().users.clone())
    }
}

fn events_for(events: &[CalendarEvent], user_id: &str) -> Vec<CalendarEvent> {
    events.iter().filter(|e| e.user_id == user_id).cloned().collect()
}

fn chats_for(chats: &[ChatMessage], user_id: &str) -> Vec<ChatMessage> {
    let mut matching: Vec<ChatMessage> = chats
        .iter()
        .filter(|m| m.involves(user_id))
        .cloned()
        .collect();
    matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    matching
}

fn notify_event_watchers(inner: &mut Inner) {
    inner.event_watchers.retain(|w| w.tx.receiver_count() > 0);
    for watcher in &inner.event_watchers {
        let snapshot = events_for(&inner.events, &watcher.user_id);
        send_if_changed(&watcher.tx, snapshot);
    }
}

fn notify_chat_watchers(inner: &mut Inner) {
    inner.chat_watchers.retain(|w| w.tx.receiver_count() > 0);
    for watcher in &inner.chat_watchers {
        let snapshot = chats_for(&inner.chats, &watcher.user_id);
        send_if_changed(&watcher.tx, snapshot);
    }
}

/// Only wake subscribers whose filtered result set actually changed.
fn send_if_changed<T: PartialEq>(tx: &watch::Sender<Vec<T>>, snapshot: Vec<T>) {
    tx.send_if_modified(|current| {
        if *current == snapshot {
            false
        } else {
            *current = snapshot;
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 20, h, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_event_subscription_sees_own_events_only() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe_events("alice");
        assert!(rx.borrow().is_empty());

        store
            .insert_event(EventDraft::new("Standup", at(9), at(10)), "alice")
            .await
            .unwrap();
        store
            .insert_event(EventDraft::new("Other", at(9), at(10)), "bob")
            .await
            .unwrap();

        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].title, "Standup");

        // Bob's insert did not change Alice's result set, so no wakeup.
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_update_unknown_event_fails() {
        let store = MemoryStore::new();
        let event = EventDraft::new("ghost", at(9), at(10)).into_event("nope".into(), "u".into());
        let err = store.update_event(&event).await.unwrap_err();
        assert!(matches!(err, CalmateError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_absent_event_is_noop() {
        let store = MemoryStore::new();
        store.delete_event("missing").await.unwrap();
    }

    #[tokio::test]
    async fn test_chat_snapshot_ordered_newest_first() {
        let store = MemoryStore::new();
        let mut older = ChatDraft::new("a", "b", "first");
        older.timestamp = at(9);
        let mut newer = ChatDraft::new("b", "a", "second");
        newer.timestamp = at(10);
        store.insert_chat(older).await.unwrap();
        store.insert_chat(newer).await.unwrap();

        let rx = store.subscribe_chats("a");
        let snapshot = rx.borrow().clone();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].message, "second");
        assert_eq!(snapshot[1].message, "first");
    }

    #[tokio::test]
    async fn test_mark_read_is_visible_to_queries() {
        let store = MemoryStore::new();
        let message = store.insert_chat(ChatDraft::new("b", "a", "hi")).await.unwrap();
        assert_eq!(store.unread_from("a", "b").await.unwrap().len(), 1);

        store.mark_read(&message.id).await.unwrap();
        assert!(store.unread_from("a", "b").await.unwrap().is_empty());
    }
}
