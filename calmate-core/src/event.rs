//! Calendar event types.
//!
//! Events live in the `events` collection of the document store. The store
//! assigns ids on insert; updates replace the full document; exactly one
//! `user_id` owns each event.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Who can see an event besides its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Public,
}

/// A calendar event as stored in the `events` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    pub user_id: String,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub is_recurring: bool,
}

impl CalendarEvent {
    /// Reconciliation key. Two events with the same title and span are
    /// treated as the same logical event even when their ids differ.
    pub fn dedup_key(&self) -> EventKey {
        EventKey {
            title: self.title.clone(),
            start: self.start,
            end: self.end,
        }
    }

    /// Whether the span is well-formed. Checked at edit time, never at
    /// storage time.
    pub fn span_is_valid(&self) -> bool {
        self.start < self.end
    }

    /// Whether the event shows up on the given calendar date. Timed events
    /// fall on their start date; all-day events cover every date of their
    /// span.
    pub fn occurs_on(&self, day: NaiveDate) -> bool {
        if self.all_day {
            self.start.date_naive() <= day && day <= self.end.date_naive()
        } else {
            self.start.date_naive() == day
        }
    }
}

/// The `(title, start, end)` identity used for deduplication and the
/// pre-insert existence check.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventKey {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Input for creating an event. The store assigns the id and the signed-in
/// principal becomes the owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub is_recurring: bool,
}

impl EventDraft {
    pub fn new(title: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        EventDraft {
            title: title.to_string(),
            start,
            end,
            all_day: false,
            participants: Vec::new(),
            color: None,
            description: None,
            tags: Vec::new(),
            visibility: None,
            is_recurring: false,
        }
    }

    pub fn span_is_valid(&self) -> bool {
        self.start < self.end
    }

    pub fn into_event(self, id: String, user_id: String) -> CalendarEvent {
        CalendarEvent {
            id,
            title: self.title,
            start: self.start,
            end: self.end,
            all_day: self.all_day,
            user_id,
            participants: self.participants,
            color: self.color,
            description: self.description,
            tags: self.tags,
            visibility: self.visibility,
            is_recurring: self.is_recurring,
        }
    }
}
