//! Event use-case service.
//!
//! # Responsibility
//! - Create, query, update and delete event documents.
//! - Classify reviewed events automatically (by type) or manually.
//!
//! # Invariants
//! - Only reviewed events are classified or listed by category.
//! - `needs_action` always mirrors the assigned category.
//! - Service APIs never bypass repository validation.

use crate::model::event::{
    now_epoch_ms, Event, EventCategory, EventId, EventStatus, EventValidationError,
};
use crate::repo::event_repo::{EventListQuery, EventRepository, RepoError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for event use-cases.
#[derive(Debug)]
pub enum EventServiceError {
    /// Input fails field-level validation.
    Validation(EventValidationError),
    /// Target event does not exist.
    EventNotFound(EventId),
    /// Classification requested for an event that is not reviewed yet.
    NotReviewed(EventId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Write succeeded but read-back did not return the document.
    InconsistentState(&'static str),
}

impl Display for EventServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::EventNotFound(id) => write!(f, "event not found: {id}"),
            Self::NotReviewed(id) => write!(f, "only reviewed events can be classified: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent event state: {details}"),
        }
    }
}

impl Error for EventServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for EventServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::EventNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<EventValidationError> for EventServiceError {
    fn from(value: EventValidationError) -> Self {
        Self::Validation(value)
    }
}

pub type ServiceResult<T> = Result<T, EventServiceError>;

/// Input for creating one event. The date is assigned by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateEventRequest {
    pub name: String,
    pub kind: String,
    pub description: String,
    pub status: EventStatus,
    pub category: Option<EventCategory>,
}

/// Event service facade over repository implementations.
pub struct EventService<R: EventRepository> {
    repo: R,
    clock: fn() -> i64,
}

impl<R: EventRepository> EventService<R> {
    /// Creates a service using the wall clock for new event dates.
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, now_epoch_ms)
    }

    /// Creates a service with a caller-provided epoch-millisecond clock.
    pub fn with_clock(repo: R, clock: fn() -> i64) -> Self {
        Self { repo, clock }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Creates one event dated "now" and returns the stored document.
    pub fn create_event(&self, request: CreateEventRequest) -> ServiceResult<Event> {
        let mut event = Event::new(
            request.name,
            request.kind,
            request.description,
            (self.clock)(),
            request.status,
        );
        if let Some(category) = request.category {
            event.assign_category(category);
        }

        if let Err(err) = event.validate() {
            error!("event=event_create module=service status=error error={err}");
            return Err(err.into());
        }

        let id = self.repo.insert_event(&event)?;
        info!("event=event_create module=service status=ok id={id}");
        self.repo
            .get_event(id)?
            .ok_or(EventServiceError::InconsistentState(
                "created event not found in read-back",
            ))
    }

    pub fn get_event(&self, id: EventId) -> ServiceResult<Event> {
        self.repo
            .get_event(id)?
            .ok_or(EventServiceError::EventNotFound(id))
    }

    /// Lists all events, newest first.
    pub fn list_events(&self) -> ServiceResult<Vec<Event>> {
        Ok(self.repo.list_events(&EventListQuery::default())?)
    }

    pub fn list_by_status(&self, status: EventStatus) -> ServiceResult<Vec<Event>> {
        let query = EventListQuery {
            status: Some(status),
            ..EventListQuery::default()
        };
        Ok(self.repo.list_events(&query)?)
    }

    /// Lists reviewed events in `category`.
    pub fn list_by_category(&self, category: EventCategory) -> ServiceResult<Vec<Event>> {
        let query = EventListQuery {
            status: Some(EventStatus::Reviewed),
            category: Some(category),
            ..EventListQuery::default()
        };
        Ok(self.repo.list_events(&query)?)
    }

    /// Lists reviewed events flagged for follow-up.
    pub fn list_needing_action(&self) -> ServiceResult<Vec<Event>> {
        let query = EventListQuery {
            status: Some(EventStatus::Reviewed),
            needs_action: Some(true),
            ..EventListQuery::default()
        };
        Ok(self.repo.list_events(&query)?)
    }

    /// Replaces an existing event.
    ///
    /// A reviewed event submitted without a category is classified by its
    /// type before it is stored. `needs_action` is always re-derived from
    /// the category.
    pub fn update_event(&self, mut event: Event) -> ServiceResult<Event> {
        let category = match event.category {
            Some(category) => Some(category),
            None if event.is_reviewed() => Some(EventCategory::for_event_type(&event.kind)),
            None => None,
        };
        match category {
            Some(category) => event.assign_category(category),
            None => event.needs_action = false,
        }

        event.validate()?;
        if self.repo.get_event(event.id)?.is_none() {
            error!(
                "event=event_update module=service status=error error_code=not_found id={}",
                event.id
            );
            return Err(EventServiceError::EventNotFound(event.id));
        }

        self.repo.update_event(&event)?;
        info!("event=event_update module=service status=ok id={}", event.id);
        Ok(event)
    }

    pub fn delete_event(&self, id: EventId) -> ServiceResult<()> {
        self.repo.delete_event(id)?;
        info!("event=event_delete module=service status=ok id={id}");
        Ok(())
    }

    /// Classifies a reviewed event from its type.
    pub fn classify_event(&self, id: EventId) -> ServiceResult<Event> {
        let event = self.get_reviewed(id)?;
        let category = EventCategory::for_event_type(&event.kind);
        self.store_category(event, category)
    }

    /// Assigns an explicit category to a reviewed event.
    pub fn manual_classify_event(
        &self,
        id: EventId,
        category: EventCategory,
    ) -> ServiceResult<Event> {
        let event = self.get_reviewed(id)?;
        self.store_category(event, category)
    }

    fn get_reviewed(&self, id: EventId) -> ServiceResult<Event> {
        let event = self.get_event(id)?;
        if !event.is_reviewed() {
            error!("event=event_classify module=service status=error error_code=not_reviewed id={id}");
            return Err(EventServiceError::NotReviewed(id));
        }
        Ok(event)
    }

    fn store_category(&self, mut event: Event, category: EventCategory) -> ServiceResult<Event> {
        event.assign_category(category);
        self.repo.update_event(&event)?;
        info!(
            "event=event_classify module=service status=ok id={} category={category}",
            event.id
        );
        Ok(event)
    }
}
