//! Event registration API endpoints.
//!
//! - `POST /events` - create an event
//! - `GET /events/upcoming` - list strictly-future events
//! - `GET /events/:id/event-stats` - capacity statistics
//! - `GET /events/:id` - event details with registered users
//! - `POST /events/:id/register` - register a user for an event
//! - `POST /events/:id/cancel` - cancel a user's registration

use crate::api::response::ApiResponse;
use crate::error::ApiError;
use crate::server::state::AppState;
use crate::types::{Event, EventId, RegistrationId, User};
use crate::validation;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// Response types
// ============================================================================

/// Payload of a successful event creation.
#[derive(Debug, Serialize)]
pub struct CreateEventData {
    /// Identifier of the created event
    #[serde(rename = "eventId")]
    pub event_id: EventId,
}

/// Payload of a successful registration.
#[derive(Debug, Serialize)]
pub struct RegisterData {
    /// Identifier of the created registration
    #[serde(rename = "registrationId")]
    pub registration_id: RegistrationId,
}

/// An event as rendered on the wire.
#[derive(Debug, Serialize)]
pub struct EventData {
    /// Event identifier
    pub id: EventId,
    /// Event title
    pub title: String,
    /// When the event takes place
    pub datetime: DateTime<Utc>,
    /// Where the event takes place
    pub location: String,
    /// Maximum permitted registration count
    pub capacity: i32,
}

impl From<Event> for EventData {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            title: event.title,
            datetime: event.datetime,
            location: event.location,
            capacity: event.capacity,
        }
    }
}

/// Event details plus its registered users.
#[derive(Debug, Serialize)]
pub struct EventDetailsData {
    /// Event identifier
    pub id: EventId,
    /// Event title
    pub title: String,
    /// When the event takes place
    pub datetime: DateTime<Utc>,
    /// Where the event takes place
    pub location: String,
    /// Maximum permitted registration count
    pub capacity: i32,
    /// Users holding a registration for this event
    #[serde(rename = "registeredUsers")]
    pub registered_users: Vec<User>,
}

/// Capacity statistics for an event.
#[derive(Debug, Serialize)]
pub struct EventStatsData {
    /// Number of registrations held
    #[serde(rename = "totalRegistrations")]
    pub total_registrations: i64,
    /// Capacity minus registrations
    #[serde(rename = "remainingCapacity")]
    pub remaining_capacity: i64,
    /// Registrations as a percentage of capacity (2 decimal places)
    #[serde(rename = "percentageUsed")]
    pub percentage_used: f64,
}

// ============================================================================
// Handlers
// ============================================================================

fn json_body(body: Option<Json<Value>>) -> Value {
    body.map_or(Value::Null, |Json(value)| value)
}

/// Create a new event.
///
/// # Errors
///
/// 400 with the first failing field's message on invalid input.
pub async fn create_event(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<ApiResponse<CreateEventData>, ApiError> {
    let input = validation::create_event(&json_body(body)).map_err(|e| ApiError::bad_request(e.0))?;
    let event = state
        .engine
        .create_event(input)
        .await
        .map_err(|e| state.api_error(e))?;
    Ok(ApiResponse::created(
        "Event created successfully",
        CreateEventData { event_id: event.id },
    ))
}

/// List all events whose datetime is strictly in the future.
///
/// # Errors
///
/// 500 on storage failure.
pub async fn get_upcoming_events(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<EventData>>, ApiError> {
    let events = state
        .engine
        .upcoming_events()
        .await
        .map_err(|e| state.api_error(e))?;
    Ok(ApiResponse::ok(
        "Upcoming events data fetched successfully",
        events.into_iter().map(EventData::from).collect(),
    ))
}

/// Fetch event details with the list of registered users.
///
/// # Errors
///
/// 400 on a malformed id, 404 when no event matches.
pub async fn get_event_details(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<ApiResponse<EventDetailsData>, ApiError> {
    let details = state
        .engine
        .event_details(&event_id)
        .await
        .map_err(|e| state.api_error(e))?;
    Ok(ApiResponse::ok(
        "Event Details fetched successfully",
        EventDetailsData {
            id: details.event.id,
            title: details.event.title,
            datetime: details.event.datetime,
            location: details.event.location,
            capacity: details.event.capacity,
            registered_users: details.registered_users,
        },
    ))
}

/// Report capacity statistics for an event.
///
/// # Errors
///
/// 400 on a malformed id, 404 when no event matches.
pub async fn get_event_stats(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<ApiResponse<EventStatsData>, ApiError> {
    let stats = state
        .engine
        .event_stats(&event_id)
        .await
        .map_err(|e| state.api_error(e))?;
    Ok(ApiResponse::ok(
        "Event stats fetched successfully",
        EventStatsData {
            total_registrations: stats.total_registrations,
            remaining_capacity: stats.remaining_capacity,
            percentage_used: stats.percentage_used,
        },
    ))
}

/// Register a user for an event, creating the user on first contact.
///
/// # Errors
///
/// 400 on a malformed id, validation failure, past event, full event,
/// or duplicate registration; 404 when no event matches.
pub async fn register_for_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    body: Option<Json<Value>>,
) -> Result<ApiResponse<RegisterData>, ApiError> {
    let input = validation::register(&json_body(body)).map_err(|e| ApiError::bad_request(e.0))?;
    let registration_id = state
        .engine
        .register(&event_id, &input.name, &input.email)
        .await
        .map_err(|e| state.api_error(e))?;
    Ok(ApiResponse::ok(
        "User registered successfully",
        RegisterData { registration_id },
    ))
}

/// Cancel a user's registration for an event.
///
/// # Errors
///
/// 400 on a malformed id or validation failure; 404 when the event,
/// the user, or the registration does not exist.
pub async fn cancel_registration(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    body: Option<Json<Value>>,
) -> Result<ApiResponse<()>, ApiError> {
    let input = validation::cancel(&json_body(body)).map_err(|e| ApiError::bad_request(e.0))?;
    state
        .engine
        .cancel(&event_id, &input.email)
        .await
        .map_err(|e| state.api_error(e))?;
    Ok(ApiResponse::message_only(
        StatusCode::OK,
        "Registration cancel successfully",
    ))
}
