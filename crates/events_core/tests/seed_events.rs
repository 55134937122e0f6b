use events_core::db::{open_db, open_db_in_memory};
use events_core::seed::{seed_database, COLLECTION_NAME, DATABASE_NAME, DAY_MS};
use events_core::{EventCategory, EventListQuery, EventRepository, EventStatus, SqliteEventRepository};

const NOW: i64 = 1_700_000_000_000;

#[test]
fn seed_targets_events_db_and_events_collection() {
    assert_eq!(DATABASE_NAME, "events_db");
    assert_eq!(COLLECTION_NAME, "events");
}

#[test]
fn seeding_empty_collection_stores_four_documents() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let ids = seed_database(&repo, NOW).unwrap();

    assert_eq!(ids.len(), 4);
    assert_eq!(repo.count_events().unwrap(), 4);
}

#[test]
fn seeded_documents_match_literals() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();
    let ids = seed_database(&repo, NOW).unwrap();

    let loaded: Vec<_> = ids
        .iter()
        .map(|id| repo.get_event(*id).unwrap().unwrap())
        .collect();

    let expected = [
        (
            "Technology Conference",
            "Conference",
            "Annual technology and innovation event",
            NOW,
            EventStatus::PendingReview,
            None,
        ),
        (
            "Go Workshop",
            "Workshop",
            "Hands-on Go programming workshop",
            NOW + DAY_MS,
            EventStatus::PendingReview,
            None,
        ),
        (
            "Team Meeting",
            "Meeting",
            "Monthly development team meeting",
            NOW - DAY_MS,
            EventStatus::Reviewed,
            Some(EventCategory::NoActionNeeded),
        ),
        (
            "Security Incident",
            "Incident",
            "Report of a possible vulnerability",
            NOW,
            EventStatus::Reviewed,
            Some(EventCategory::RequiresAction),
        ),
    ];

    for (event, (name, kind, description, date, status, category)) in
        loaded.iter().zip(expected)
    {
        assert_eq!(event.name, name);
        assert_eq!(event.kind, kind);
        assert_eq!(event.description, description);
        assert_eq!(event.date, date);
        assert_eq!(event.status, status);
        assert_eq!(event.category, category);
        assert_eq!(
            event.needs_action,
            category == Some(EventCategory::RequiresAction)
        );
    }
}

#[test]
fn seeding_twice_does_not_deduplicate() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let first = seed_database(&repo, NOW).unwrap();
    let second = seed_database(&repo, NOW).unwrap();

    assert_eq!(repo.count_events().unwrap(), 8);
    assert!(first.iter().all(|id| !second.contains(id)));
}

#[test]
fn only_reviewed_seed_documents_carry_a_category() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();
    seed_database(&repo, NOW).unwrap();

    for event in repo.list_events(&EventListQuery::default()).unwrap() {
        assert_eq!(event.category.is_some(), event.is_reviewed());
    }
}

#[test]
fn seed_persists_to_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events_db.sqlite3");

    {
        let conn = open_db(&path).unwrap();
        let repo = SqliteEventRepository::try_new(&conn).unwrap();
        seed_database(&repo, NOW).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();
    assert_eq!(repo.count_events().unwrap(), 4);
}

#[test]
fn seed_surfaces_insert_failure_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();
    conn.execute_batch("DROP TABLE events;").unwrap();

    let err = seed_database(&repo, NOW).unwrap_err();
    assert!(matches!(err, events_core::RepoError::Db(_)));
}
