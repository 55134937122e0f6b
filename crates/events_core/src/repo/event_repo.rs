//! Event repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert/get/list/update/delete over the `events` collection.
//! - Offer an all-or-nothing bulk insert for initialization paths.
//!
//! # Invariants
//! - Write paths call `Event::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Inserts never deduplicate; every call stores new documents.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::event::{Event, EventCategory, EventId, EventStatus, EventValidationError};
use log::{debug, error, info};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

/// Name of the collection (table) holding event documents.
pub const COLLECTION_NAME: &str = "events";

const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "name",
    "type",
    "description",
    "date",
    "status",
    "category",
    "needs_action",
];

const EVENT_SELECT_SQL: &str = "SELECT
    id,
    name,
    type,
    description,
    date,
    status,
    category,
    needs_action
FROM events";

const EVENT_INSERT_SQL: &str = "INSERT INTO events (
    id,
    name,
    type,
    description,
    date,
    status,
    category,
    needs_action
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for event persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Validation(EventValidationError),
    Db(DbError),
    NotFound(EventId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "event not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted event data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EventValidationError> for RepoError {
    fn from(value: EventValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Filter options for listing events. Results are always sorted by
/// `date DESC, id ASC`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventListQuery {
    pub status: Option<EventStatus>,
    pub category: Option<EventCategory>,
    pub needs_action: Option<bool>,
}

/// Repository interface for the `events` collection.
pub trait EventRepository {
    fn insert_event(&self, event: &Event) -> RepoResult<EventId>;
    /// Inserts every event in one transaction; nothing is stored on error.
    fn insert_events(&self, events: &[Event]) -> RepoResult<Vec<EventId>>;
    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>>;
    fn list_events(&self, query: &EventListQuery) -> RepoResult<Vec<Event>>;
    fn count_events(&self) -> RepoResult<u64>;
    fn update_event(&self, event: &Event) -> RepoResult<()>;
    fn delete_event(&self, id: EventId) -> RepoResult<()>;
}

impl<T: EventRepository + ?Sized> EventRepository for &T {
    fn insert_event(&self, event: &Event) -> RepoResult<EventId> {
        (**self).insert_event(event)
    }

    fn insert_events(&self, events: &[Event]) -> RepoResult<Vec<EventId>> {
        (**self).insert_events(events)
    }

    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>> {
        (**self).get_event(id)
    }

    fn list_events(&self, query: &EventListQuery) -> RepoResult<Vec<Event>> {
        (**self).list_events(query)
    }

    fn count_events(&self) -> RepoResult<u64> {
        (**self).count_events()
    }

    fn update_event(&self, event: &Event) -> RepoResult<()> {
        (**self).update_event(event)
    }

    fn delete_event(&self, id: EventId) -> RepoResult<()> {
        (**self).delete_event(id)
    }
}

/// SQLite-backed event repository.
pub struct SqliteEventRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the schema
    ///   does not carry the `events` collection shape.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version: u32 =
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if actual_version < expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        let columns = table_columns(conn, COLLECTION_NAME)?;
        if columns.is_empty() {
            return Err(RepoError::MissingRequiredTable(COLLECTION_NAME));
        }
        if let Some(column) = REQUIRED_COLUMNS
            .iter()
            .find(|column| !columns.contains(**column))
        {
            return Err(RepoError::MissingRequiredColumn {
                table: COLLECTION_NAME,
                column: *column,
            });
        }

        Ok(Self { conn })
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn insert_event(&self, event: &Event) -> RepoResult<EventId> {
        event.validate()?;
        self.conn.execute(EVENT_INSERT_SQL, event_params(event))?;
        debug!("event=event_insert module=repo status=ok id={}", event.id);
        Ok(event.id)
    }

    fn insert_events(&self, events: &[Event]) -> RepoResult<Vec<EventId>> {
        let started_at = Instant::now();
        for event in events {
            event.validate()?;
        }

        let tx = self.conn.unchecked_transaction()?;
        let result = (|| -> RepoResult<Vec<EventId>> {
            let mut stmt = tx.prepare(EVENT_INSERT_SQL)?;
            let mut ids = Vec::with_capacity(events.len());
            for event in events {
                stmt.execute(event_params(event))?;
                ids.push(event.id);
            }
            Ok(ids)
        })();

        match result {
            Ok(ids) => {
                tx.commit()?;
                info!(
                    "event=event_bulk_insert module=repo status=ok count={} duration_ms={}",
                    ids.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(ids)
            }
            Err(err) => {
                error!(
                    "event=event_bulk_insert module=repo status=error count={} error={err}",
                    events.len()
                );
                Err(err)
            }
        }
    }

    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EVENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_event_row(row)?));
        }
        Ok(None)
    }

    fn list_events(&self, query: &EventListQuery) -> RepoResult<Vec<Event>> {
        let mut sql = format!("{EVENT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(category) = query.category {
            sql.push_str(" AND category = ?");
            bind_values.push(Value::Text(category.as_str().to_string()));
        }
        if let Some(needs_action) = query.needs_action {
            sql.push_str(" AND needs_action = ?");
            bind_values.push(Value::Integer(bool_to_int(needs_action)));
        }

        sql.push_str(" ORDER BY date DESC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(parse_event_row(row)?);
        }

        Ok(events)
    }

    fn count_events(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM events;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative event count `{count}`")))
    }

    fn update_event(&self, event: &Event) -> RepoResult<()> {
        event.validate()?;

        let changed = self.conn.execute(
            "UPDATE events
             SET
                name = ?1,
                type = ?2,
                description = ?3,
                date = ?4,
                status = ?5,
                category = ?6,
                needs_action = ?7
             WHERE id = ?8;",
            params![
                event.name.as_str(),
                event.kind.as_str(),
                event.description.as_str(),
                event.date,
                event.status.as_str(),
                event.category.map(EventCategory::as_str),
                bool_to_int(event.needs_action),
                event.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(event.id));
        }
        Ok(())
    }

    fn delete_event(&self, id: EventId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM events WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn event_params(event: &Event) -> [Value; 8] {
    [
        Value::Text(event.id.to_string()),
        Value::Text(event.name.clone()),
        Value::Text(event.kind.clone()),
        Value::Text(event.description.clone()),
        Value::Integer(event.date),
        Value::Text(event.status.as_str().to_string()),
        event
            .category
            .map_or(Value::Null, |category| Value::Text(category.as_str().to_string())),
        Value::Integer(bool_to_int(event.needs_action)),
    ]
}

fn table_columns(conn: &Connection, table: &str) -> RepoResult<HashSet<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<HashSet<_>, _>>()?;
    Ok(names)
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<Event> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|_| RepoError::InvalidData(format!("invalid id `{id_text}` in events.id")))?;

    let status_text: String = row.get("status")?;
    let status = EventStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in events.status"))
    })?;

    let category = match row.get::<_, Option<String>>("category")? {
        Some(value) => Some(EventCategory::parse(&value).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid category `{value}` in events.category"))
        })?),
        None => None,
    };

    let needs_action = match row.get::<_, i64>("needs_action")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid needs_action value `{other}` in events.needs_action"
            )));
        }
    };

    let event = Event {
        id,
        name: row.get("name")?,
        kind: row.get("type")?,
        description: row.get("description")?,
        date: row.get("date")?,
        status,
        category,
        needs_action,
    };
    event.validate()?;
    Ok(event)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
