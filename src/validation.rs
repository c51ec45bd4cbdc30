//! Schema validation for inbound payloads.
//!
//! Each input shape gets a declarative set of field rules, checked
//! before any business logic runs. Failures carry the message for the
//! first offending field, mirroring the API's historical error strings.
//!
//! Path identifiers are validated against a UUID (version 1-5) pattern
//! up front so malformed ids never reach the persistence gateway.

use crate::types::{EventId, NewEvent};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;
use uuid::Uuid;

/// UUID v1-5 textual pattern accepted in path parameters.
#[allow(clippy::unwrap_used)] // pattern is a compile-time constant
static UUID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$",
    )
    .unwrap()
});

/// Email address pattern (local part, domain, TLD of 2+ letters).
#[allow(clippy::unwrap_used)] // pattern is a compile-time constant
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

/// Capacity bounds for an event.
pub const MIN_CAPACITY: i64 = 1;
/// Maximum permitted event capacity.
pub const MAX_CAPACITY: i64 = 1000;

/// Error raised when an inbound payload fails schema validation.
///
/// Carries the user-facing message for the first failing field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Validated payload for registering a user for an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterInput {
    /// Attendee name (trimmed)
    pub name: String,
    /// Attendee email (trimmed, lower-cased, pattern-checked)
    pub email: String,
}

/// Validated payload for cancelling a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelInput {
    /// Attendee email (trimmed, lower-cased, pattern-checked)
    pub email: String,
}

// ============================================================================
// Field rules
// ============================================================================

/// Rule for a required, trimmed text field with a minimum length.
struct TextRule {
    label: &'static str,
    min_len: usize,
}

impl TextRule {
    const fn new(label: &'static str, min_len: usize) -> Self {
        Self { label, min_len }
    }

    fn validate(&self, value: Option<&Value>) -> Result<String, ValidationError> {
        let Some(value) = value else {
            return Err(ValidationError::new(format!("{} is required", self.label)));
        };
        let Some(text) = value.as_str() else {
            return Err(ValidationError::new(format!(
                "{} must be a string",
                self.label
            )));
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::new(format!("{} is required", self.label)));
        }
        if trimmed.chars().count() < self.min_len {
            return Err(ValidationError::new(format!(
                "{} length not less than {} characters",
                self.label, self.min_len
            )));
        }
        Ok(trimmed.to_string())
    }
}

const TITLE: TextRule = TextRule::new("Title", 3);
const LOCATION: TextRule = TextRule::new("Location", 3);
const NAME: TextRule = TextRule::new("Name", 3);

fn validate_datetime(value: Option<&Value>) -> Result<DateTime<Utc>, ValidationError> {
    let Some(value) = value else {
        return Err(ValidationError::new("Datetime is required"));
    };
    let Some(text) = value.as_str() else {
        return Err(ValidationError::new("Datetime should be valid"));
    };
    DateTime::parse_from_rfc3339(text.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ValidationError::new("Datetime should be in ISO format"))
}

fn validate_capacity(value: Option<&Value>) -> Result<i32, ValidationError> {
    let Some(value) = value else {
        return Err(ValidationError::new("Capacity is required"));
    };
    let Some(capacity) = value.as_i64() else {
        return Err(ValidationError::new("Capacity must be a number"));
    };
    if capacity < MIN_CAPACITY {
        return Err(ValidationError::new("Capacity not less than 1"));
    }
    if capacity > MAX_CAPACITY {
        return Err(ValidationError::new("Capacity can not exceed 1000"));
    }
    #[allow(clippy::cast_possible_truncation)] // bounded to 1..=1000 above
    Ok(capacity as i32)
}

fn validate_email(value: Option<&Value>) -> Result<String, ValidationError> {
    let Some(value) = value else {
        return Err(ValidationError::new("Email is required"));
    };
    let Some(text) = value.as_str() else {
        return Err(ValidationError::new("Email is required"));
    };
    let normalized = text.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(ValidationError::new("Email is required"));
    }
    if !EMAIL_PATTERN.is_match(&normalized) {
        return Err(ValidationError::new("Please provide a valid email"));
    }
    Ok(normalized)
}

// ============================================================================
// Input schemas
// ============================================================================

/// Validate an event-creation payload.
///
/// # Errors
///
/// Returns the first failing field's message.
pub fn create_event(body: &Value) -> Result<NewEvent, ValidationError> {
    Ok(NewEvent {
        title: TITLE.validate(body.get("title"))?,
        datetime: validate_datetime(body.get("datetime"))?,
        location: LOCATION.validate(body.get("location"))?,
        capacity: validate_capacity(body.get("capacity"))?,
    })
}

/// Validate a registration payload.
///
/// # Errors
///
/// Returns the first failing field's message.
pub fn register(body: &Value) -> Result<RegisterInput, ValidationError> {
    Ok(RegisterInput {
        name: NAME.validate(body.get("name"))?,
        email: validate_email(body.get("email"))?,
    })
}

/// Validate a cancellation payload.
///
/// # Errors
///
/// Returns the first failing field's message.
pub fn cancel(body: &Value) -> Result<CancelInput, ValidationError> {
    Ok(CancelInput {
        email: validate_email(body.get("email"))?,
    })
}

/// Validate a path identifier against the accepted UUID pattern.
///
/// Rejecting malformed ids here saves a storage round trip.
///
/// # Errors
///
/// Returns "Invalid event ID format" when the value does not match a
/// version 1-5 UUID.
pub fn event_id(raw: &str) -> Result<EventId, ValidationError> {
    if !UUID_PATTERN.is_match(raw) {
        return Err(ValidationError::new("Invalid event ID format"));
    }
    Uuid::parse_str(raw)
        .map(EventId::from_uuid)
        .map_err(|_| ValidationError::new("Invalid event ID format"))
}
