//! In-memory store used as a test double.
//!
//! Mirrors the uniqueness semantics of the `PostgreSQL` schema (unique
//! email, unique (user, event) pair) and counts every storage call so
//! tests can assert that an operation never touched storage.

use super::{Result, Store, StoreError};
use crate::types::{Event, EventId, NewEvent, Registration, RegistrationId, User, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// In-memory implementation of [`Store`].
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    calls: AtomicUsize,
}

#[derive(Default)]
struct Inner {
    events: Vec<Event>,
    users: Vec<User>,
    registrations: Vec<Registration>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of storage calls made so far.
    ///
    /// Lets tests verify that invalid input short-circuits before any
    /// storage access.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_event(&self, event: NewEvent) -> Result<Event> {
        let mut inner = self.lock();
        let event = Event {
            id: EventId::new(),
            title: event.title,
            datetime: event.datetime,
            location: event.location,
            capacity: event.capacity,
        };
        inner.events.push(event.clone());
        Ok(event)
    }

    async fn find_event(&self, id: EventId) -> Result<Option<Event>> {
        let inner = self.lock();
        Ok(inner.events.iter().find(|e| e.id == id).cloned())
    }

    async fn upcoming_events(&self, now: DateTime<Utc>) -> Result<Vec<Event>> {
        let inner = self.lock();
        let mut events: Vec<Event> = inner
            .events
            .iter()
            .filter(|e| e.datetime > now)
            .cloned()
            .collect();
        events.sort_by(|a, b| {
            a.datetime
                .cmp(&b.datetime)
                .then_with(|| a.location.cmp(&b.location))
        });
        Ok(events)
    }

    async fn count_registrations(&self, event: EventId) -> Result<i64> {
        let inner = self.lock();
        Ok(inner
            .registrations
            .iter()
            .filter(|r| r.event_id == event)
            .count() as i64)
    }

    async fn registered_users(&self, event: EventId) -> Result<Vec<User>> {
        let inner = self.lock();
        let users = inner
            .registrations
            .iter()
            .filter(|r| r.event_id == event)
            .filter_map(|r| inner.users.iter().find(|u| u.id == r.user_id))
            .cloned()
            .collect();
        Ok(users)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let inner = self.lock();
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, name: &str, email: &str) -> Result<User> {
        let mut inner = self.lock();
        if let Some(existing) = inner.users.iter().find(|u| u.email == email) {
            return Ok(existing.clone());
        }
        let user = User {
            id: UserId::new(),
            name: name.to_string(),
            email: email.to_string(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn find_registration(
        &self,
        user: UserId,
        event: EventId,
    ) -> Result<Option<Registration>> {
        let inner = self.lock();
        Ok(inner
            .registrations
            .iter()
            .find(|r| r.user_id == user && r.event_id == event)
            .cloned())
    }

    async fn insert_registration(&self, user: UserId, event: EventId) -> Result<Registration> {
        let mut inner = self.lock();
        if inner
            .registrations
            .iter()
            .any(|r| r.user_id == user && r.event_id == event)
        {
            return Err(StoreError::DuplicateRegistration);
        }
        let registration = Registration {
            id: RegistrationId::new(),
            user_id: user,
            event_id: event,
        };
        inner.registrations.push(registration.clone());
        Ok(registration)
    }

    async fn delete_registration(&self, id: RegistrationId) -> Result<()> {
        let mut inner = self.lock();
        inner.registrations.retain(|r| r.id != id);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_event(title: &str, location: &str, offset_hours: i64) -> NewEvent {
        NewEvent {
            title: title.to_string(),
            datetime: Utc::now() + Duration::hours(offset_hours),
            location: location.to_string(),
            capacity: 10,
        }
    }

    #[tokio::test]
    async fn upcoming_orders_by_datetime_then_location() {
        let store = MemoryStore::new();
        let when = Utc::now() + Duration::hours(5);
        for location in ["Zurich", "Amsterdam"] {
            store
                .insert_event(NewEvent {
                    title: "Same instant".to_string(),
                    datetime: when,
                    location: location.to_string(),
                    capacity: 10,
                })
                .await
                .unwrap();
        }
        store.insert_event(new_event("Earlier", "Berlin", 1)).await.unwrap();
        store.insert_event(new_event("Past", "Berlin", -1)).await.unwrap();

        let upcoming = store.upcoming_events(Utc::now()).await.unwrap();
        let labels: Vec<(&str, &str)> = upcoming
            .iter()
            .map(|e| (e.title.as_str(), e.location.as_str()))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("Earlier", "Berlin"),
                ("Same instant", "Amsterdam"),
                ("Same instant", "Zurich"),
            ]
        );
    }

    #[tokio::test]
    async fn insert_user_is_first_writer_wins() {
        let store = MemoryStore::new();
        let first = store.insert_user("Ada", "ada@example.com").await.unwrap();
        let second = store.insert_user("Imposter", "ada@example.com").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(second.name, "Ada");
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let store = MemoryStore::new();
        let event = store.insert_event(new_event("Meetup", "Berlin", 2)).await.unwrap();
        let user = store.insert_user("Ada", "ada@example.com").await.unwrap();

        store.insert_registration(user.id, event.id).await.unwrap();
        let err = store.insert_registration(user.id, event.id).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateRegistration));
        assert_eq!(store.count_registrations(event.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_registration_removes_the_pair() {
        let store = MemoryStore::new();
        let event = store.insert_event(new_event("Meetup", "Berlin", 2)).await.unwrap();
        let user = store.insert_user("Ada", "ada@example.com").await.unwrap();
        let registration = store.insert_registration(user.id, event.id).await.unwrap();

        store.delete_registration(registration.id).await.unwrap();
        assert!(store
            .find_registration(user.id, event.id)
            .await
            .unwrap()
            .is_none());
    }
}
