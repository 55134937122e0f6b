//! Event domain model.
//!
//! # Responsibility
//! - Define the event document shared by seed, repository and service code.
//! - Provide field-level validation used before every write.
//!
//! # Invariants
//! - `id` is stable and never reused for another event.
//! - `category` is `None` unless `status == EventStatus::Reviewed`.
//! - `needs_action` is only `true` for `EventCategory::RequiresAction`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier for an event document.
pub type EventId = Uuid;

/// Review lifecycle of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventStatus {
    #[serde(rename = "Pending review")]
    PendingReview,
    #[serde(rename = "Reviewed")]
    Reviewed,
}

impl EventStatus {
    /// Returns the persisted/wire label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PendingReview => "Pending review",
            Self::Reviewed => "Reviewed",
        }
    }

    /// Parses an exact wire label.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Pending review" => Some(Self::PendingReview),
            "Reviewed" => Some(Self::Reviewed),
            _ => None,
        }
    }
}

impl Display for EventStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handling category assigned to reviewed events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    #[serde(rename = "Requires action")]
    RequiresAction,
    #[serde(rename = "No action needed")]
    NoActionNeeded,
}

impl EventCategory {
    /// Returns the persisted/wire label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RequiresAction => "Requires action",
            Self::NoActionNeeded => "No action needed",
        }
    }

    /// Parses an exact wire label.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Requires action" => Some(Self::RequiresAction),
            "No action needed" => Some(Self::NoActionNeeded),
            _ => None,
        }
    }

    /// Whether events in this category must be followed up.
    pub fn needs_action(self) -> bool {
        matches!(self, Self::RequiresAction)
    }

    /// Derives the category from a free-text event type.
    ///
    /// Unknown types fall back to `NoActionNeeded`.
    pub fn for_event_type(kind: &str) -> Self {
        match kind {
            "Incident" | "Problem" | "Emergency" | "Error" | "Critical" => Self::RequiresAction,
            _ => Self::NoActionNeeded,
        }
    }
}

impl Display for EventCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failures for event documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventValidationError {
    NilId,
    EmptyField(&'static str),
    CategoryWithoutReview,
    NeedsActionMismatch,
}

impl Display for EventValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "event id must not be nil"),
            Self::EmptyField(field) => write!(f, "event field `{field}` must not be empty"),
            Self::CategoryWithoutReview => {
                write!(f, "only reviewed events can carry a category")
            }
            Self::NeedsActionMismatch => {
                write!(f, "needs_action must match the assigned category")
            }
        }
    }
}

impl Error for EventValidationError {}

/// Canonical event document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    /// Free-text type label. Serialized as `type`.
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    /// Unix epoch milliseconds.
    pub date: i64,
    pub status: EventStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<EventCategory>,
    #[serde(default)]
    pub needs_action: bool,
}

impl Event {
    /// Creates an uncategorized event with a generated stable ID.
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        description: impl Into<String>,
        date: i64,
        status: EventStatus,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind: kind.into(),
            description: description.into(),
            date,
            status,
            category: None,
            needs_action: false,
        }
    }

    /// Sets the category and keeps `needs_action` consistent with it.
    pub fn with_category(mut self, category: EventCategory) -> Self {
        self.assign_category(category);
        self
    }

    /// Assigns a category in place.
    pub fn assign_category(&mut self, category: EventCategory) {
        self.category = Some(category);
        self.needs_action = category.needs_action();
    }

    pub fn is_reviewed(&self) -> bool {
        self.status == EventStatus::Reviewed
    }

    /// Validates field-level invariants before persistence.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        if self.id.is_nil() {
            return Err(EventValidationError::NilId);
        }
        if self.name.trim().is_empty() {
            return Err(EventValidationError::EmptyField("name"));
        }
        if self.kind.trim().is_empty() {
            return Err(EventValidationError::EmptyField("type"));
        }
        if self.description.trim().is_empty() {
            return Err(EventValidationError::EmptyField("description"));
        }
        if self.category.is_some() && !self.is_reviewed() {
            return Err(EventValidationError::CategoryWithoutReview);
        }
        if self.needs_action != self.category.is_some_and(EventCategory::needs_action) {
            return Err(EventValidationError::NeedsActionMismatch);
        }
        Ok(())
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
