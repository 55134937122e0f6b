//! Sample data for a fresh `events_db` database.
//!
//! # Responsibility
//! - Provide the fixed set of sample event documents.
//! - Insert them into the `events` collection with one bulk write.
//!
//! # Invariants
//! - Seeding never deduplicates: running it N times stores 4 * N documents.
//! - Insert failures are returned unchanged; no retry and no partial writes.

use crate::model::event::{Event, EventCategory, EventId, EventStatus};
use crate::repo::event_repo::{EventRepository, RepoResult};
use log::{error, info};

pub use crate::db::DATABASE_NAME;
pub use crate::repo::event_repo::COLLECTION_NAME;

/// One day in epoch milliseconds.
pub const DAY_MS: i64 = 86_400_000;

/// Builds the sample documents relative to `now_ms`.
///
/// Every call generates fresh IDs.
pub fn seed_events(now_ms: i64) -> Vec<Event> {
    vec![
        Event::new(
            "Technology Conference",
            "Conference",
            "Annual technology and innovation event",
            now_ms,
            EventStatus::PendingReview,
        ),
        Event::new(
            "Go Workshop",
            "Workshop",
            "Hands-on Go programming workshop",
            now_ms + DAY_MS,
            EventStatus::PendingReview,
        ),
        Event::new(
            "Team Meeting",
            "Meeting",
            "Monthly development team meeting",
            now_ms - DAY_MS,
            EventStatus::Reviewed,
        )
        .with_category(EventCategory::NoActionNeeded),
        Event::new(
            "Security Incident",
            "Incident",
            "Report of a possible vulnerability",
            now_ms,
            EventStatus::Reviewed,
        )
        .with_category(EventCategory::RequiresAction),
    ]
}

/// Inserts the sample documents and returns their IDs in insertion order.
pub fn seed_database<R: EventRepository>(repo: &R, now_ms: i64) -> RepoResult<Vec<EventId>> {
    let events = seed_events(now_ms);
    match repo.insert_events(&events) {
        Ok(ids) => {
            info!(
                "event=seed module=seed status=ok database={DATABASE_NAME} collection={COLLECTION_NAME} count={}",
                ids.len()
            );
            Ok(ids)
        }
        Err(err) => {
            error!(
                "event=seed module=seed status=error database={DATABASE_NAME} collection={COLLECTION_NAME} error={err}"
            );
            Err(err)
        }
    }
}
