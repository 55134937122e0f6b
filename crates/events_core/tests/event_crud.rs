use events_core::db::migrations::latest_version;
use events_core::db::open_db_in_memory;
use events_core::{
    Event, EventCategory, EventListQuery, EventRepository, EventStatus, EventValidationError,
    RepoError, SqliteEventRepository,
};
use rusqlite::Connection;

fn event(name: &str, kind: &str, date: i64, status: EventStatus) -> Event {
    Event::new(name, kind, format!("{name} description"), date, status)
}

#[test]
fn insert_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let stored = event("Team Meeting", "Meeting", 100, EventStatus::Reviewed)
        .with_category(EventCategory::NoActionNeeded);
    let id = repo.insert_event(&stored).unwrap();

    let loaded = repo.get_event(id).unwrap().unwrap();
    assert_eq!(loaded, stored);
}

#[test]
fn get_missing_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let missing = event("ghost", "Meeting", 0, EventStatus::PendingReview);
    assert!(repo.get_event(missing.id).unwrap().is_none());
}

#[test]
fn bulk_insert_is_all_or_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let first = event("a", "Meeting", 1, EventStatus::PendingReview);
    let duplicate = first.clone();
    let err = repo.insert_events(&[first, duplicate]).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert_eq!(repo.count_events().unwrap(), 0);

    let invalid = event("", "Meeting", 1, EventStatus::PendingReview);
    let err = repo
        .insert_events(&[event("b", "Meeting", 2, EventStatus::PendingReview), invalid])
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(repo.count_events().unwrap(), 0);
}

#[test]
fn list_is_sorted_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let old = event("old", "Meeting", 10, EventStatus::PendingReview);
    let new = event("new", "Meeting", 30, EventStatus::PendingReview);
    let mid = event("mid", "Meeting", 20, EventStatus::PendingReview);
    repo.insert_events(&[old, new, mid]).unwrap();

    let names: Vec<_> = repo
        .list_events(&EventListQuery::default())
        .unwrap()
        .into_iter()
        .map(|item| item.name)
        .collect();
    assert_eq!(names, vec!["new", "mid", "old"]);
}

#[test]
fn list_filters_by_status_category_and_needs_action() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let pending = event("pending", "Incident", 1, EventStatus::PendingReview);
    let incident = event("incident", "Incident", 2, EventStatus::Reviewed)
        .with_category(EventCategory::RequiresAction);
    let meeting = event("meeting", "Meeting", 3, EventStatus::Reviewed)
        .with_category(EventCategory::NoActionNeeded);
    repo.insert_events(&[pending.clone(), incident.clone(), meeting.clone()])
        .unwrap();

    let by_status = repo
        .list_events(&EventListQuery {
            status: Some(EventStatus::PendingReview),
            ..EventListQuery::default()
        })
        .unwrap();
    assert_eq!(by_status.len(), 1);
    assert_eq!(by_status[0].id, pending.id);

    let by_category = repo
        .list_events(&EventListQuery {
            category: Some(EventCategory::NoActionNeeded),
            ..EventListQuery::default()
        })
        .unwrap();
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].id, meeting.id);

    let needing_action = repo
        .list_events(&EventListQuery {
            needs_action: Some(true),
            ..EventListQuery::default()
        })
        .unwrap();
    assert_eq!(needing_action.len(), 1);
    assert_eq!(needing_action[0].id, incident.id);
}

#[test]
fn update_existing_event() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let mut stored = event("draft", "Incident", 5, EventStatus::PendingReview);
    repo.insert_event(&stored).unwrap();

    stored.status = EventStatus::Reviewed;
    stored.assign_category(EventCategory::RequiresAction);
    stored.description = "confirmed".to_string();
    repo.update_event(&stored).unwrap();

    let loaded = repo.get_event(stored.id).unwrap().unwrap();
    assert_eq!(loaded.status, EventStatus::Reviewed);
    assert_eq!(loaded.category, Some(EventCategory::RequiresAction));
    assert!(loaded.needs_action);
    assert_eq!(loaded.description, "confirmed");
}

#[test]
fn update_and_delete_missing_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let missing = event("missing", "Meeting", 0, EventStatus::PendingReview);
    let err = repo.update_event(&missing).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing.id));

    let err = repo.delete_event(missing.id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing.id));
}

#[test]
fn delete_removes_document() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let stored = event("gone", "Meeting", 0, EventStatus::PendingReview);
    repo.insert_event(&stored).unwrap();
    repo.delete_event(stored.id).unwrap();

    assert!(repo.get_event(stored.id).unwrap().is_none());
    assert_eq!(repo.count_events().unwrap(), 0);
}

#[test]
fn read_rejects_invalid_persisted_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    conn.execute(
        "INSERT INTO events (id, name, type, description, date, status)
         VALUES ('not-a-uuid', 'n', 't', 'd', 0, 'Reviewed');",
        [],
    )
    .unwrap();

    let err = repo.list_events(&EventListQuery::default()).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteEventRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_events_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteEventRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("events"))
    ));
}

#[test]
fn repository_rejects_events_table_missing_a_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE events (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            type TEXT NOT NULL,
            description TEXT NOT NULL,
            date INTEGER NOT NULL,
            status TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteEventRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "events",
            column: "category"
        })
    ));
}

#[test]
fn writes_reject_needs_action_that_disagrees_with_category() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let mut incident = event("breach", "Incident", 1, EventStatus::Reviewed)
        .with_category(EventCategory::RequiresAction);
    incident.needs_action = false;
    let err = repo.insert_event(&incident).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(EventValidationError::NeedsActionMismatch)
    ));

    let err = repo.insert_events(&[incident]).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(repo.count_events().unwrap(), 0);
}

#[test]
fn read_rejects_persisted_needs_action_mismatch() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();
    let stored = event("meeting", "Meeting", 1, EventStatus::Reviewed)
        .with_category(EventCategory::NoActionNeeded);
    repo.insert_event(&stored).unwrap();

    conn.execute("UPDATE events SET needs_action = 1;", []).unwrap();

    let err = repo.get_event(stored.id).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(EventValidationError::NeedsActionMismatch)
    ));
}
