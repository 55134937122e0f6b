//! Repository layer over the `events` collection.
//!
//! # Responsibility
//! - Define data access contracts used by seed and service code.
//! - Keep SQL details out of business orchestration.
//!
//! # Invariants
//! - Writes enforce `Event::validate()` before persistence.
//! - Missing documents surface as `RepoError::NotFound`, not as DB errors.

pub mod event_repo;
