//! Reconcilers: fold live-query snapshots into derived local state.
//!
//! Each snapshot is the full current result set. The reconcilers treat it
//! as ground truth, rebuilding their collections from scratch and only
//! reporting a change when consumers would observe one — optimistic local
//! guesses (like a zeroed unread counter) survive until the next
//! authoritative snapshot says otherwise.

pub mod chat;
pub mod events;
pub mod notification;
