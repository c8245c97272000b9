//! UI selection slots.

use serde::Serialize;

use crate::event::CalendarEvent;
use crate::user::UserProfile;

/// The currently open event and chat counterpart.
///
/// The two slots are independent: selecting an event does not clear the
/// participant, and both can be set at once. Replace-or-null, nothing
/// else.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Selection {
    pub event: Option<CalendarEvent>,
    pub participant: Option<UserProfile>,
}

impl Selection {
    pub fn set_event(&mut self, event: Option<CalendarEvent>) {
        self.event = event;
    }

    pub fn set_participant(&mut self, participant: Option<UserProfile>) {
        self.participant = participant;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventDraft;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_slots_are_independent() {
        let event = EventDraft::new(
            "Standup",
            Utc.with_ymd_and_hms(2025, 3, 20, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 20, 10, 0, 0).unwrap(),
        )
        .into_event("1".into(), "alice".into());

        let mut selection = Selection::default();
        selection.set_participant(Some(UserProfile::unknown("bob")));
        selection.set_event(Some(event));
        assert!(selection.event.is_some());
        assert!(selection.participant.is_some());

        selection.set_event(None);
        assert!(selection.event.is_none());
        assert!(selection.participant.is_some());
    }
}
