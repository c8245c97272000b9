//! Reconciliation core for the calmate calendar/chat application.
//!
//! The document store delivers full live-query snapshots; the `sync`
//! reconcilers fold them into deduplicated event lists, per-counterpart
//! message lists, chat summaries and unread counters; a [`Session`] owns
//! the subscriptions and reconciled state for one signed-in principal.

pub mod chat;
pub mod error;
pub mod event;
pub mod search;
pub mod selection;
pub mod session;
pub mod store;
pub mod sync;
pub mod user;
pub mod view;

// Re-export the main types at the crate root for convenience
pub use chat::{ChatDraft, ChatMessage, ChatSummary};
pub use error::{CalmateError, CalmateResult};
pub use event::{CalendarEvent, EventDraft, Visibility};
pub use selection::Selection;
pub use session::Session;
pub use store::MemoryStore;
pub use sync::notification::Notification;
pub use user::{Principal, UserProfile};
pub use view::{CalendarDay, ViewKind};
