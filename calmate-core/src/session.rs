//! Per-principal subscription lifecycle.
//!
//! A [`Session`] owns the live subscriptions for one signed-in principal
//! and the reconciled state they feed. Signing out (or dropping the
//! session) tears the subscriptions down; a principal change means a fresh
//! session with fresh subscriptions — there is no ambient global listener
//! state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::chat::{ChatMessage, ChatSummary};
use crate::error::CalmateResult;
use crate::event::{CalendarEvent, EventDraft};
use crate::selection::Selection;
use crate::store::MemoryStore;
use crate::sync::chat::ChatCache;
use crate::sync::events::EventCache;
use crate::sync::notification::{NOTIFICATION_DEBOUNCE, Notification};
use crate::sync::{chat, events};
use crate::user::{Principal, UserProfile};

pub struct Session {
    principal: Principal,
    store: MemoryStore,
    events: Arc<Mutex<EventCache>>,
    chat: Arc<Mutex<ChatCache>>,
    notification: Arc<Mutex<Notification>>,
    selection: Mutex<Selection>,
    tasks: Vec<JoinHandle<()>>,
}

impl Session {
    /// Sign the principal in: ensure their profile document exists (first
    /// sign-in creates it), then start the live subscriptions.
    pub async fn open(store: MemoryStore, principal: Principal) -> CalmateResult<Self> {
        if store.get_user(&principal.id).await?.is_none() {
            store.upsert_user(principal.profile()).await?;
            debug!(user = %principal.id, "created profile on first sign-in");
        }

        let events = Arc::new(Mutex::new(EventCache::default()));
        let chat = Arc::new(Mutex::new(ChatCache::default()));
        let notification = Arc::new(Mutex::new(Notification::Idle));

        let event_task = tokio::spawn(event_loop(
            store.subscribe_events(&principal.id),
            events.clone(),
        ));
        let chat_task = tokio::spawn(chat_loop(
            principal.clone(),
            store.clone(),
            store.subscribe_chats(&principal.id),
            chat.clone(),
            notification.clone(),
        ));

        Ok(Session {
            principal,
            store,
            events,
            chat,
            notification,
            selection: Mutex::new(Selection::default()),
            tasks: vec![event_task, chat_task],
        })
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    // =========================================================================
    // Reconciled state
    // =========================================================================

    pub fn events(&self) -> Vec<CalendarEvent> {
        lock(&self.events).events().to_vec()
    }

    pub fn chat_list(&self) -> Vec<ChatSummary> {
        lock(&self.chat).chat_list().to_vec()
    }

    pub fn messages_with(&self, counterpart: &str) -> Vec<ChatMessage> {
        lock(&self.chat).messages_with(counterpart).to_vec()
    }

    pub fn unread_count(&self, counterpart: &str) -> u32 {
        lock(&self.chat).unread_count(counterpart)
    }

    pub fn unread(&self) -> HashMap<String, u32> {
        lock(&self.chat).unread().clone()
    }

    pub fn notification(&self) -> Notification {
        lock(&self.notification).clone()
    }

    pub fn mark_notification_displayed(&self) {
        lock(&self.notification).mark_displayed();
    }

    pub fn clear_notification(&self) {
        lock(&self.notification).clear();
    }

    pub fn selection(&self) -> Selection {
        lock(&self.selection).clone()
    }

    pub fn select_event(&self, event: Option<CalendarEvent>) {
        lock(&self.selection).set_event(event);
    }

    pub fn select_participant(&self, participant: Option<UserProfile>) {
        lock(&self.selection).set_participant(participant);
    }

    // =========================================================================
    // Mutations (delegated with this session's principal)
    // =========================================================================

    pub async fn add_event(&self, draft: EventDraft) -> CalmateResult<Option<CalendarEvent>> {
        events::add_event(&self.store, &self.principal, draft).await
    }

    pub async fn update_event(&self, event: &CalendarEvent) -> CalmateResult<()> {
        events::update_event(&self.store, &self.principal, event).await
    }

    pub async fn delete_event(&self, id: &str) -> CalmateResult<()> {
        events::delete_event(&self.store, &self.principal, id).await
    }

    pub async fn send_message(&self, recipient_id: &str, text: &str) -> CalmateResult<ChatMessage> {
        chat::send_message(&self.store, &self.principal, recipient_id, text).await
    }

    /// Mark every unread message from `counterpart` as read, then zero the
    /// local counter for that counterpart only.
    pub async fn mark_chat_as_read(&self, counterpart: &str) -> CalmateResult<usize> {
        let updated = chat::mark_chat_as_read(&self.store, &self.principal, counterpart).await?;
        lock(&self.chat).zero_unread(counterpart);
        Ok(updated)
    }

    /// Tear down the live subscriptions.
    pub fn sign_out(self) {
        debug!(user = %self.principal.id, "signing out");
        // Drop aborts the reconciler tasks.
    }

    fn shutdown(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn lock<T>(cell: &Mutex<T>) -> MutexGuard<'_, T> {
    cell.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Fold every event snapshot into the cache, starting with the current one.
async fn event_loop(
    mut rx: watch::Receiver<Vec<CalendarEvent>>,
    cache: Arc<Mutex<EventCache>>,
) {
    loop {
        let snapshot = rx.borrow_and_update().clone();
        if lock(&cache).apply_snapshot(&snapshot) {
            debug!(count = snapshot.len(), "event state updated");
        }
        if rx.changed().await.is_err() {
            // Store gone; nothing further will arrive.
            break;
        }
    }
}

/// Fold every chat snapshot and drive the notification resolver.
async fn chat_loop(
    principal: Principal,
    store: MemoryStore,
    mut rx: watch::Receiver<Vec<ChatMessage>>,
    cache: Arc<Mutex<ChatCache>>,
    notification: Arc<Mutex<Notification>>,
) {
    loop {
        let snapshot = rx.borrow_and_update().clone();
        let outcome = lock(&cache).apply_snapshot(&principal.id, &snapshot);
        if outcome.changed {
            debug!(count = snapshot.len(), "chat state updated");
        }

        if let Some((counterpart, message)) = outcome.notification {
            lock(&notification).enqueue(counterpart.clone(), message);

            // Resolve the sender's profile after a short debounce; a
            // missing record falls back to a placeholder.
            tokio::time::sleep(NOTIFICATION_DEBOUNCE).await;
            let profile = match store.get_user(&counterpart).await {
                Ok(Some(profile)) => profile,
                Ok(None) => UserProfile::unknown(&counterpart),
                Err(err) => {
                    error!(%err, user = %counterpart, "failed to load user for notification");
                    UserProfile::unknown(&counterpart)
                }
            };
            lock(&notification).resolve(profile);
        }

        if rx.changed().await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    fn principal(id: &str, name: &str) -> Principal {
        Principal {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            display_name: Some(name.to_string()),
            photo_url: None,
        }
    }

    async fn settle() {
        // Paused-clock tests: sleeping lets the reconciler tasks run and
        // auto-advances past the notification debounce.
        tokio::time::sleep(Duration::from_millis(600)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_in_creates_profile_once() {
        let store = MemoryStore::new();
        let alice = principal("alice", "Alice");

        let session = Session::open(store.clone(), alice.clone()).await.unwrap();
        let profile = store.get_user("alice").await.unwrap().expect("profile");
        assert_eq!(profile.label(), "Alice");
        drop(session);

        // Second sign-in keeps the existing record.
        let _session = Session::open(store.clone(), alice).await.unwrap();
        assert_eq!(store.all_users().await.unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_flow_into_session_state() {
        let store = MemoryStore::new();
        let session = Session::open(store.clone(), principal("alice", "Alice"))
            .await
            .unwrap();

        let draft = EventDraft::new(
            "Standup",
            Utc.with_ymd_and_hms(2025, 3, 20, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 20, 9, 30, 0).unwrap(),
        );
        session.add_event(draft.clone()).await.unwrap();
        // Adding the same logical event again is silently skipped.
        assert!(session.add_event(draft).await.unwrap().is_none());
        settle().await;

        let events = session.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Standup");

        session.delete_event(&events[0].id).await.unwrap();
        settle().await;
        assert!(session.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_inbound_message_updates_unread_and_notifies() {
        let store = MemoryStore::new();
        let bob_session = Session::open(store.clone(), principal("bob", "Bob"))
            .await
            .unwrap();
        let alice_session = Session::open(store.clone(), principal("alice", "Alice"))
            .await
            .unwrap();

        alice_session.send_message("bob", "hi").await.unwrap();
        settle().await;

        assert_eq!(bob_session.unread_count("alice"), 1);
        let list = bob_session.chat_list();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].counterpart, "alice");
        assert_eq!(list[0].last_message, "hi");

        // Debounce has passed: the notification is resolved with Alice's
        // profile (created when she signed in).
        match bob_session.notification() {
            Notification::Resolved { counterpart, message, profile } => {
                assert_eq!(counterpart, "alice");
                assert_eq!(message, "hi");
                assert_eq!(profile.label(), "Alice");
            }
            other => panic!("expected resolved notification, got {other:?}"),
        }

        bob_session.mark_chat_as_read("alice").await.unwrap();
        assert_eq!(bob_session.unread_count("alice"), 0);
        settle().await;
        // The document's read flag really flipped.
        assert!(store.unread_from("bob", "alice").await.unwrap().is_empty());
        assert_eq!(bob_session.unread_count("alice"), 0);

        // The sender's own view shows no unread.
        assert_eq!(alice_session.unread_count("bob"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_notification_lifecycle_through_session() {
        let store = MemoryStore::new();
        let bob_session = Session::open(store.clone(), principal("bob", "Bob"))
            .await
            .unwrap();
        let alice_session = Session::open(store.clone(), principal("alice", "Alice"))
            .await
            .unwrap();

        alice_session.send_message("bob", "ping").await.unwrap();
        settle().await;

        bob_session.mark_notification_displayed();
        assert!(matches!(
            bob_session.notification(),
            Notification::Displayed { .. }
        ));
        bob_session.clear_notification();
        assert!(bob_session.notification().is_idle());

        // Redelivery of the same message must not re-notify.
        bob_session.mark_chat_as_read("alice").await.unwrap();
        settle().await;
        assert!(bob_session.notification().is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_out_stops_reconciliation() {
        let store = MemoryStore::new();
        let session = Session::open(store.clone(), principal("alice", "Alice"))
            .await
            .unwrap();
        settle().await;
        session.sign_out();

        // Mutations after sign-out still reach the store, they just have
        // no live session observing them.
        store
            .insert_event(
                EventDraft::new(
                    "Later",
                    Utc.with_ymd_and_hms(2025, 3, 21, 9, 0, 0).unwrap(),
                    Utc.with_ymd_and_hms(2025, 3, 21, 10, 0, 0).unwrap(),
                ),
                "alice",
            )
            .await
            .unwrap();
    }
}
