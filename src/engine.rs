//! The event registration engine.
//!
//! Stateless service over an injected [`Store`] and [`Clock`]; every
//! piece of state lives in the persistence gateway, so each call reads
//! the latest committed state.
//!
//! # Capacity under concurrency
//!
//! Capacity is enforced by counting registrations and then inserting,
//! without a transaction spanning both steps. Two concurrent requests
//! can both pass the count before either inserts, so an event can
//! exceed its capacity under contention. Duplicate registrations are
//! not subject to this window: the (user, event) uniqueness constraint
//! rejects the second insert regardless of interleaving.

use crate::store::{Store, StoreError};
use crate::types::{Event, EventId, NewEvent, RegistrationId, User};
use crate::validation::{self, ValidationError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, RegistrationError>;

/// Failure modes of the registration engine.
///
/// All variants except `Storage` are operational: anticipated,
/// user-facing conditions that the boundary maps to 4xx responses.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Malformed or missing input.
    #[error("{0}")]
    Validation(String),

    /// A referenced event, user, or registration does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The request conflicts with current state (full event, duplicate
    /// registration).
    #[error("{0}")]
    Conflict(String),

    /// The event is no longer in a state that accepts the operation.
    #[error("{0}")]
    InvalidState(String),

    /// Unexpected storage failure.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl From<ValidationError> for RegistrationError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.0)
    }
}

/// Source of the current time, injected so tests can pin it.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Event details together with the users registered for it.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDetails {
    /// The event itself.
    pub event: Event,
    /// Users holding a registration, in storage order.
    pub registered_users: Vec<User>,
}

/// Capacity statistics for an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventStats {
    /// Number of registrations held.
    pub total_registrations: i64,
    /// Capacity minus registrations. Not clamped: the capacity race can
    /// drive this negative, and callers decide how to render that.
    pub remaining_capacity: i64,
    /// Registrations as a percentage of capacity, rounded to 2 decimal
    /// places.
    pub percentage_used: f64,
}

/// Decides whether registration and cancellation requests may proceed,
/// and performs the corresponding state change.
#[derive(Clone)]
pub struct RegistrationEngine {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
}

impl RegistrationEngine {
    /// Create an engine over the given store, using wall-clock time.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Create an engine with an explicit clock.
    #[must_use]
    pub fn with_clock(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Create an event from validated input.
    ///
    /// Pure insert; no business-rule checks beyond field validation.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::Storage`] on storage failure.
    pub async fn create_event(&self, event: NewEvent) -> Result<Event> {
        let event = self.store.insert_event(event).await?;
        tracing::info!(event_id = %event.id, title = %event.title, "event created");
        Ok(event)
    }

    /// All events strictly in the future, ordered by datetime then
    /// location.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::Storage`] on storage failure.
    pub async fn upcoming_events(&self) -> Result<Vec<Event>> {
        Ok(self.store.upcoming_events(self.clock.now()).await?)
    }

    /// Event fields plus the list of registered users.
    ///
    /// # Errors
    ///
    /// `Validation` on a malformed id (checked before any storage
    /// access), `NotFound` if the event does not exist.
    pub async fn event_details(&self, event_id: &str) -> Result<EventDetails> {
        let id = validation::event_id(event_id)?;
        let event = self.find_event(id, "No event found with this event ID").await?;
        let registered_users = self.store.registered_users(id).await?;
        Ok(EventDetails {
            event,
            registered_users,
        })
    }

    /// Capacity statistics for an event.
    ///
    /// # Errors
    ///
    /// `Validation` on a malformed id, `NotFound` if the event does not
    /// exist.
    pub async fn event_stats(&self, event_id: &str) -> Result<EventStats> {
        let id = validation::event_id(event_id)?;
        let event = self.find_event(id, "Event not found").await?;
        let total_registrations = self.store.count_registrations(id).await?;

        let remaining_capacity = i64::from(event.capacity) - total_registrations;
        #[allow(clippy::cast_precision_loss)] // counts are far below 2^52
        let percentage_used =
            (total_registrations as f64 / f64::from(event.capacity) * 100.0 * 100.0).round()
                / 100.0;

        Ok(EventStats {
            total_registrations,
            remaining_capacity,
            percentage_used,
        })
    }

    /// Register a user for an event.
    ///
    /// Looks the user up by email and creates one on first contact. The
    /// user row is kept even if a later step fails; nothing compensates
    /// for it.
    ///
    /// # Errors
    ///
    /// `Validation` on a malformed id, `NotFound` for a missing event,
    /// `InvalidState` for a past event, `Conflict` when the event is
    /// full or the user is already registered.
    pub async fn register(&self, event_id: &str, name: &str, email: &str) -> Result<RegistrationId> {
        let id = validation::event_id(event_id)?;
        let event = self.find_event(id, "Event not found").await?;

        if self.clock.now() >= event.datetime {
            return Err(RegistrationError::InvalidState(
                "Cannot register for past event".to_string(),
            ));
        }

        let registered = self.store.count_registrations(id).await?;
        if registered >= i64::from(event.capacity) {
            return Err(RegistrationError::Conflict("Event is full".to_string()));
        }

        let user = match self.store.find_user_by_email(email).await? {
            Some(user) => user,
            None => self.store.insert_user(name, email).await?,
        };

        if self.store.find_registration(user.id, id).await?.is_some() {
            return Err(RegistrationError::Conflict(
                "User already registered for this event".to_string(),
            ));
        }

        let registration = match self.store.insert_registration(user.id, id).await {
            Ok(registration) => registration,
            // Constraint backstop for a concurrent duplicate insert.
            Err(StoreError::DuplicateRegistration) => {
                return Err(RegistrationError::Conflict(
                    "User already registered for this event".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            event_id = %id,
            user_id = %user.id,
            registration_id = %registration.id,
            "user registered"
        );
        Ok(registration.id)
    }

    /// Cancel a user's registration for an event.
    ///
    /// # Errors
    ///
    /// `Validation` on a malformed id, `NotFound` when the event, the
    /// user, or the registration does not exist.
    pub async fn cancel(&self, event_id: &str, email: &str) -> Result<()> {
        let id = validation::event_id(event_id)?;
        self.find_event(id, "Event not found").await?;

        let user = self
            .store
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| RegistrationError::NotFound("User not found".to_string()))?;

        let registration = self
            .store
            .find_registration(user.id, id)
            .await?
            .ok_or_else(|| {
                RegistrationError::NotFound("User is not registered for this event".to_string())
            })?;

        self.store.delete_registration(registration.id).await?;
        tracing::info!(event_id = %id, user_id = %user.id, "registration cancelled");
        Ok(())
    }

    async fn find_event(&self, id: EventId, missing: &str) -> Result<Event> {
        self.store
            .find_event(id)
            .await?
            .ok_or_else(|| RegistrationError::NotFound(missing.to_string()))
    }
}

impl RegistrationError {
    /// Whether this is an anticipated, user-facing failure (as opposed
    /// to an unexpected internal fault).
    #[must_use]
    pub const fn is_operational(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}
