//! Lifecycle of the "new message" signal.

use std::time::Duration;

use serde::Serialize;

use crate::user::UserProfile;

/// Delay before resolving the sender's profile for display.
pub const NOTIFICATION_DEBOUNCE: Duration = Duration::from_millis(500);

/// `Idle → Pending → Resolved → Displayed → (cleared) Idle`.
///
/// A newly queued inbound message replaces whatever state is current; only
/// one notification slot exists per session.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Notification {
    #[default]
    Idle,
    Pending {
        counterpart: String,
        message: String,
    },
    Resolved {
        counterpart: String,
        message: String,
        profile: UserProfile,
    },
    Displayed {
        counterpart: String,
        message: String,
        profile: UserProfile,
    },
}

impl Notification {
    pub fn enqueue(&mut self, counterpart: String, message: String) {
        *self = Notification::Pending { counterpart, message };
    }

    /// Attach the resolved profile. Anything but a pending notification is
    /// left untouched: the pending slot may already have been replaced or
    /// cleared by the time the profile fetch lands.
    pub fn resolve(&mut self, profile: UserProfile) {
        match std::mem::take(self) {
            Notification::Pending { counterpart, message } => {
                *self = Notification::Resolved {
                    counterpart,
                    message,
                    profile,
                };
            }
            other => *self = other,
        }
    }

    /// Record that the resolved notification has been shown.
    pub fn mark_displayed(&mut self) {
        match std::mem::take(self) {
            Notification::Resolved {
                counterpart,
                message,
                profile,
            } => {
                *self = Notification::Displayed {
                    counterpart,
                    message,
                    profile,
                };
            }
            other => *self = other,
        }
    }

    /// Consumer acknowledgement; returns the slot to idle.
    pub fn clear(&mut self) {
        *self = Notification::Idle;
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Notification::Idle)
    }

    pub fn counterpart(&self) -> Option<&str> {
        match self {
            Notification::Idle => None,
            Notification::Pending { counterpart, .. }
            | Notification::Resolved { counterpart, .. }
            | Notification::Displayed { counterpart, .. } => Some(counterpart),
        }
    }
}
