//! Domain model for event records.
//!
//! # Responsibility
//! - Define the canonical event document stored in the `events` collection.
//! - Own the status/category vocabularies and their wire labels.
//!
//! # Invariants
//! - Every event is identified by a stable, non-nil `EventId`.
//! - A category is only meaningful on reviewed events.

pub mod event;
