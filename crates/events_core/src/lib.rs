//! Core logic for the events store.
//! Owns the event document model, its SQLite-backed collection, the
//! sample-data seed and the review/classification use-cases.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;

pub use logging::{default_log_level, init_logging};
pub use model::event::{
    now_epoch_ms, Event, EventCategory, EventId, EventStatus, EventValidationError,
};
pub use repo::event_repo::{
    EventListQuery, EventRepository, RepoError, RepoResult, SqliteEventRepository,
};
pub use seed::{seed_database, seed_events};
pub use service::event_service::{
    CreateEventRequest, EventService, EventServiceError, ServiceResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
