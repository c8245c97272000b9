//! Document store backing the live queries.
//!
//! The store mirrors the observable contract of a hosted document
//! database: collections of schemaless documents, queries scoped by a
//! server-side predicate, and subscriptions that deliver the *full*
//! current result set whenever it changes (never deltas). Consumers
//! re-derive per-document diffs themselves — that is the reconcilers' job.

mod memory;

pub use memory::MemoryStore;
