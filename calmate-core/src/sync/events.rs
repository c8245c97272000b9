//! Event reconciliation and event mutations.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::{CalmateError, CalmateResult};
use crate::event::{CalendarEvent, EventDraft};
use crate::store::MemoryStore;
use crate::user::Principal;

/// Deduplicated, reconciled view of the current user's events.
#[derive(Debug, Default)]
pub struct EventCache {
    events: Vec<CalendarEvent>,
}

impl EventCache {
    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    /// Fold a full snapshot into the cache.
    ///
    /// Documents are keyed by `(title, start, end)`; within a snapshot the
    /// first document wins and later collisions are dropped. Whether two
    /// same-keyed documents with distinct ids are true duplicates or
    /// legitimately distinct events is ambiguous by design — the collapse
    /// is preserved as-is.
    ///
    /// Returns true when consumers should refresh, decided by id identity
    /// alone: a snapshot with the same set of ids (even with content
    /// changes) does not count as a change.
    pub fn apply_snapshot(&mut self, docs: &[CalendarEvent]) -> bool {
        let mut seen = HashSet::new();
        let mut next: Vec<CalendarEvent> = Vec::with_capacity(docs.len());
        for doc in docs {
            if seen.insert(doc.dedup_key()) {
                next.push(doc.clone());
            } else {
                debug!(id = %doc.id, title = %doc.title, "skipping duplicate event");
            }
        }

        let changed = next.len() != self.events.len()
            || next
                .iter()
                .any(|incoming| !self.events.iter().any(|held| held.id == incoming.id));
        if changed {
            self.events = next;
        }
        changed
    }
}

/// Create an event owned by the principal.
///
/// A pre-insert existence query on `(owner, title, start, end)` gives an
/// at-most-once guarantee per logical key: on a match the insert is
/// skipped with a warning and `Ok(None)` is returned. The check and the
/// insert are separate store calls, so a concurrent insert between them
/// can still slip through.
pub async fn add_event(
    store: &MemoryStore,
    principal: &Principal,
    draft: EventDraft,
) -> CalmateResult<Option<CalendarEvent>> {
    let existing = store
        .find_events(&principal.id, &draft.title, draft.start, draft.end)
        .await?;
    if !existing.is_empty() {
        warn!(title = %draft.title, "event already exists, skipping insert");
        return Ok(None);
    }

    let event = store.insert_event(draft, &principal.id).await?;
    Ok(Some(event))
}

/// Replace an event document. Only the owner may update.
pub async fn update_event(
    store: &MemoryStore,
    principal: &Principal,
    event: &CalendarEvent,
) -> CalmateResult<()> {
    if event.user_id != principal.id {
        return Err(CalmateError::NotOwner(event.id.clone()));
    }
    store.update_event(event).await
}

/// Delete an event by id. Requires a signed-in principal; ownership is not
/// re-verified before the delete.
pub async fn delete_event(
    store: &MemoryStore,
    _principal: &Principal,
    id: &str,
) -> CalmateResult<()> {
    store.delete_event(id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 20, h, m, 0).unwrap()
    }

    fn event(id: &str, title: &str, start_h: u32) -> CalendarEvent {
        EventDraft::new(title, at(start_h, 0), at(start_h + 1, 0))
            .into_event(id.to_string(), "alice".to_string())
    }

    fn principal(id: &str) -> Principal {
        Principal {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            display_name: None,
            photo_url: None,
        }
    }

    #[test]
    fn test_first_seen_wins_within_snapshot() {
        let mut cache = EventCache::default();
        let docs = vec![event("1", "Standup", 9), event("2", "Standup", 9), event("3", "Lunch", 12)];
        assert!(cache.apply_snapshot(&docs));

        let held = cache.events();
        assert_eq!(held.len(), 2);
        assert_eq!(held[0].id, "1");
        assert_eq!(held[1].id, "3");
    }

    #[test]
    fn test_same_ids_do_not_count_as_change() {
        let mut cache = EventCache::default();
        assert!(cache.apply_snapshot(&[event("1", "Standup", 9)]));

        // Same id, changed content: still not a change by identity.
        let renamed = event("1", "Standup (moved)", 10);
        assert!(!cache.apply_snapshot(&[renamed]));

        // New id is a change.
        assert!(cache.apply_snapshot(&[event("4", "Review", 14)]));
    }

    #[test]
    fn test_removal_counts_as_change() {
        let mut cache = EventCache::default();
        assert!(cache.apply_snapshot(&[event("1", "Standup", 9), event("2", "Lunch", 12)]));
        assert!(cache.apply_snapshot(&[event("1", "Standup", 9)]));
        assert_eq!(cache.events().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_add_stores_one_document() {
        let store = MemoryStore::new();
        let alice = principal("alice");
        let draft = EventDraft::new("Standup", at(9, 0), at(9, 30));

        let first = add_event(&store, &alice, draft.clone()).await.unwrap();
        assert!(first.is_some());

        let second = add_event(&store, &alice, draft.clone()).await.unwrap();
        assert!(second.is_none());

        let stored = store
            .find_events("alice", "Standup", at(9, 0), at(9, 30))
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn test_update_by_non_owner_fails_without_mutation() {
        let store = MemoryStore::new();
        let alice = principal("alice");
        let mallory = principal("mallory");

        let stored = add_event(&store, &alice, EventDraft::new("Standup", at(9, 0), at(10, 0)))
            .await
            .unwrap()
            .expect("insert");

        let mut tampered = stored.clone();
        tampered.title = "Cancelled".to_string();
        let err = update_event(&store, &mallory, &tampered).await.unwrap_err();
        assert!(matches!(err, CalmateError::NotOwner(_)));

        let after = store
            .find_events("alice", "Standup", at(9, 0), at(10, 0))
            .await
            .unwrap();
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].title, "Standup");
    }

    #[tokio::test]
    async fn test_owner_update_replaces_document() {
        let store = MemoryStore::new();
        let alice = principal("alice");
        let stored = add_event(&store, &alice, EventDraft::new("Standup", at(9, 0), at(10, 0)))
            .await
            .unwrap()
            .expect("insert");

        let mut moved = stored.clone();
        moved.start = at(11, 0);
        moved.end = at(12, 0);
        update_event(&store, &alice, &moved).await.unwrap();

        let after = store
            .find_events("alice", "Standup", at(11, 0), at(12, 0))
            .await
            .unwrap();
        assert_eq!(after.len(), 1);
    }
}
