//! Persistence gateway for events, users, and registrations.
//!
//! The [`Store`] trait is the engine's only view of storage. Production
//! code uses [`PostgresStore`]; tests use [`MemoryStore`], which mirrors
//! the same uniqueness semantics in process.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use crate::types::{Event, EventId, NewEvent, Registration, RegistrationId, User, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by the persistence gateway.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The (user, event) uniqueness constraint rejected an insert.
    ///
    /// This is the authoritative duplicate-registration check; the
    /// engine's read-before-insert is only a fast path.
    #[error("registration already exists")]
    DuplicateRegistration,

    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Storage operations required by the registration engine.
///
/// Implementations must enforce uniqueness on `users.email` and on the
/// `(user_id, event_id)` registration pair.
#[async_trait]
pub trait Store: Send + Sync {
    /// Persist a new event and return it with its generated identifier.
    async fn insert_event(&self, event: NewEvent) -> Result<Event>;

    /// Fetch an event by identifier.
    async fn find_event(&self, id: EventId) -> Result<Option<Event>>;

    /// All events strictly after `now`, ordered by datetime then
    /// location as a tie-break for same-instant events.
    async fn upcoming_events(&self, now: DateTime<Utc>) -> Result<Vec<Event>>;

    /// Number of registrations held against an event.
    async fn count_registrations(&self, event: EventId) -> Result<i64>;

    /// Users holding a registration for an event.
    async fn registered_users(&self, event: EventId) -> Result<Vec<User>>;

    /// Look up a user by (normalized) email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Create a user, first-writer-wins on the email constraint.
    ///
    /// If a concurrent insert won the race, the existing row is returned
    /// instead of an error.
    async fn insert_user(&self, name: &str, email: &str) -> Result<User>;

    /// Look up a registration by (user, event).
    async fn find_registration(
        &self,
        user: UserId,
        event: EventId,
    ) -> Result<Option<Registration>>;

    /// Create a registration for (user, event).
    ///
    /// Fails with [`StoreError::DuplicateRegistration`] if one already
    /// exists.
    async fn insert_registration(&self, user: UserId, event: EventId) -> Result<Registration>;

    /// Delete a registration by identifier.
    async fn delete_registration(&self, id: RegistrationId) -> Result<()>;
}
