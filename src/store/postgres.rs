//! `PostgreSQL` implementation of the persistence gateway.
//!
//! Uses runtime-checked sqlx queries over a shared [`PgPool`]. Schema
//! lives in `migrations/` and is applied with [`PostgresStore::migrate`]
//! at startup.

use super::{Result, Store, StoreError};
use crate::types::{Event, EventId, NewEvent, Registration, RegistrationId, User, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// `PostgreSQL`-backed store.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    title: String,
    datetime: DateTime<Utc>,
    location: String,
    capacity: i32,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Self {
            id: EventId::from_uuid(row.id),
            title: row.title,
            datetime: row.datetime,
            location: row.location,
            capacity: row.capacity,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::from_uuid(row.id),
            name: row.name,
            email: row.email,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RegistrationRow {
    id: Uuid,
    user_id: Uuid,
    event_id: Uuid,
}

impl From<RegistrationRow> for Registration {
    fn from(row: RegistrationRow) -> Self {
        Self {
            id: RegistrationId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            event_id: EventId::from_uuid(row.event_id),
        }
    }
}

impl PostgresStore {
    /// Create a new store over an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if a migration fails to apply.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("migration failed: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn insert_event(&self, event: NewEvent) -> Result<Event> {
        let id = EventId::new();
        let row = sqlx::query_as::<_, EventRow>(
            r"
            INSERT INTO events (id, title, datetime, location, capacity)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, datetime, location, capacity
            ",
        )
        .bind(id.as_uuid())
        .bind(&event.title)
        .bind(event.datetime)
        .bind(&event.location)
        .bind(event.capacity)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn find_event(&self, id: EventId) -> Result<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(
            "SELECT id, title, datetime, location, capacity FROM events WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Event::from))
    }

    async fn upcoming_events(&self, now: DateTime<Utc>) -> Result<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(
            r"
            SELECT id, title, datetime, location, capacity
            FROM events
            WHERE datetime > $1
            ORDER BY datetime ASC, location ASC
            ",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn count_registrations(&self, event: EventId) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM registrations WHERE event_id = $1")
                .bind(event.as_uuid())
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn registered_users(&self, event: EventId) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r"
            SELECT u.id, u.name, u.email
            FROM users u
            JOIN registrations r ON r.user_id = u.id
            WHERE r.event_id = $1
            ORDER BY r.created_at ASC
            ",
        )
        .bind(event.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row =
            sqlx::query_as::<_, UserRow>("SELECT id, name, email FROM users WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(User::from))
    }

    async fn insert_user(&self, name: &str, email: &str) -> Result<User> {
        // First-writer-wins: if a concurrent insert took the email, fall
        // back to the row that won.
        let inserted = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (id, name, email)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, name, email
            ",
        )
        .bind(UserId::new().as_uuid())
        .bind(name)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = inserted {
            return Ok(row.into());
        }
        self.find_user_by_email(email).await?.ok_or_else(|| {
            StoreError::Database(format!("user upsert for {email} returned no row"))
        })
    }

    async fn find_registration(
        &self,
        user: UserId,
        event: EventId,
    ) -> Result<Option<Registration>> {
        let row = sqlx::query_as::<_, RegistrationRow>(
            "SELECT id, user_id, event_id FROM registrations WHERE user_id = $1 AND event_id = $2",
        )
        .bind(user.as_uuid())
        .bind(event.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Registration::from))
    }

    async fn insert_registration(&self, user: UserId, event: EventId) -> Result<Registration> {
        let result = sqlx::query_as::<_, RegistrationRow>(
            r"
            INSERT INTO registrations (id, user_id, event_id)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, event_id
            ",
        )
        .bind(RegistrationId::new().as_uuid())
        .bind(user.as_uuid())
        .bind(event.as_uuid())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row.into()),
            Err(e) if e.as_database_error().is_some_and(|db| db.is_unique_violation()) => {
                Err(StoreError::DuplicateRegistration)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_registration(&self, id: RegistrationId) -> Result<()> {
        sqlx::query("DELETE FROM registrations WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
