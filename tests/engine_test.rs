//! Registration engine integration tests.
//!
//! Exercise the engine's business rules against the in-memory store:
//! temporal gating, capacity enforcement, duplicate prevention, the
//! cancel/re-register cycle, and the no-storage-on-invalid-id check.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Integration tests can use unwrap/expect

use chrono::{DateTime, Duration, Utc};
use event_registry::engine::{Clock, EventStats, RegistrationError};
use event_registry::{MemoryStore, NewEvent, RegistrationEngine};
use std::sync::Arc;
use uuid::Uuid;

/// Clock pinned to a fixed instant.
struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn engine_over(store: Arc<MemoryStore>) -> RegistrationEngine {
    RegistrationEngine::new(store)
}

fn future_event(title: &str, capacity: i32) -> NewEvent {
    NewEvent {
        title: title.to_string(),
        datetime: Utc::now() + Duration::days(7),
        location: "Berlin".to_string(),
        capacity,
    }
}

#[tokio::test]
async fn created_event_details_round_trip() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_over(store);

    let input = future_event("Rust Meetup", 50);
    let created = engine.create_event(input.clone()).await.unwrap();

    let details = engine.event_details(&created.id.to_string()).await.unwrap();
    assert_eq!(details.event.title, input.title);
    assert_eq!(details.event.datetime, input.datetime);
    assert_eq!(details.event.location, input.location);
    assert_eq!(details.event.capacity, input.capacity);
    assert!(details.registered_users.is_empty());
}

#[tokio::test]
async fn registering_for_past_event_fails_regardless_of_capacity() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_over(store);

    let past = engine
        .create_event(NewEvent {
            title: "Yesterday's talk".to_string(),
            datetime: Utc::now() - Duration::hours(1),
            location: "Berlin".to_string(),
            capacity: 1000,
        })
        .await
        .unwrap();

    let err = engine
        .register(&past.id.to_string(), "Ada Lovelace", "ada@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::InvalidState(_)));
    assert_eq!(err.to_string(), "Cannot register for past event");
}

#[tokio::test]
async fn event_datetime_itself_is_already_past() {
    // "at or after" the event instant counts as past
    let store = Arc::new(MemoryStore::new());
    let when = Utc::now() + Duration::days(1);
    let engine = RegistrationEngine::with_clock(store, Arc::new(FixedClock(when)));

    let event = engine
        .create_event(NewEvent {
            title: "Starts right now".to_string(),
            datetime: when,
            location: "Berlin".to_string(),
            capacity: 10,
        })
        .await
        .unwrap();

    let err = engine
        .register(&event.id.to_string(), "Ada Lovelace", "ada@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::InvalidState(_)));
}

#[tokio::test]
async fn capacity_plus_one_sequential_registrations() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_over(store);
    let capacity = 5;
    let event = engine.create_event(future_event("Small venue", capacity)).await.unwrap();
    let id = event.id.to_string();

    for i in 0..capacity {
        engine
            .register(&id, "Guest", &format!("guest{i}@example.com"))
            .await
            .unwrap_or_else(|e| panic!("registration {i} should succeed: {e}"));
    }

    let err = engine
        .register(&id, "Late Guest", "late@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::Conflict(_)));
    assert_eq!(err.to_string(), "Event is full");
}

#[tokio::test]
async fn duplicate_registration_is_rejected_without_a_second_row() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_over(store.clone());
    let event = engine.create_event(future_event("Meetup", 10)).await.unwrap();
    let id = event.id.to_string();

    engine.register(&id, "Ada Lovelace", "ada@example.com").await.unwrap();
    let err = engine
        .register(&id, "Ada Lovelace", "ada@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::Conflict(_)));
    assert_eq!(err.to_string(), "User already registered for this event");

    let stats = engine.event_stats(&id).await.unwrap();
    assert_eq!(stats.total_registrations, 1);
}

#[tokio::test]
async fn cancel_then_register_again_succeeds() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_over(store);
    let event = engine.create_event(future_event("Meetup", 10)).await.unwrap();
    let id = event.id.to_string();

    engine.register(&id, "Ada Lovelace", "ada@example.com").await.unwrap();
    engine.cancel(&id, "ada@example.com").await.unwrap();

    let stats = engine.event_stats(&id).await.unwrap();
    assert_eq!(stats.total_registrations, 0);

    engine.register(&id, "Ada Lovelace", "ada@example.com").await.unwrap();
    let stats = engine.event_stats(&id).await.unwrap();
    assert_eq!(stats.total_registrations, 1);
}

#[tokio::test]
async fn cancel_error_chain() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_over(store);
    let event = engine.create_event(future_event("Meetup", 10)).await.unwrap();
    let id = event.id.to_string();

    // Unknown event
    let missing = Uuid::new_v4().to_string();
    let err = engine.cancel(&missing, "ada@example.com").await.unwrap_err();
    assert_eq!(err.to_string(), "Event not found");

    // Unknown user
    let err = engine.cancel(&id, "nobody@example.com").await.unwrap_err();
    assert_eq!(err.to_string(), "User not found");

    // Known user without a registration for this event
    engine.register(&id, "Ada Lovelace", "ada@example.com").await.unwrap();
    let other = engine.create_event(future_event("Other", 10)).await.unwrap();
    let err = engine
        .cancel(&other.id.to_string(), "ada@example.com")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "User is not registered for this event");
}

#[tokio::test]
async fn stats_report_remaining_and_percentage() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_over(store);
    let event = engine.create_event(future_event("Meetup", 10)).await.unwrap();
    let id = event.id.to_string();

    for i in 0..3 {
        engine
            .register(&id, "Guest", &format!("guest{i}@example.com"))
            .await
            .unwrap();
    }

    let stats = engine.event_stats(&id).await.unwrap();
    assert_eq!(
        stats,
        EventStats {
            total_registrations: 3,
            remaining_capacity: 7,
            percentage_used: 30.0,
        }
    );
}

#[tokio::test]
async fn stats_percentage_rounds_to_two_decimals() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_over(store);
    let event = engine.create_event(future_event("Trio", 3)).await.unwrap();
    let id = event.id.to_string();

    engine.register(&id, "Guest", "guest0@example.com").await.unwrap();

    let stats = engine.event_stats(&id).await.unwrap();
    assert!((stats.percentage_used - 33.33).abs() < f64::EPSILON);
}

#[tokio::test]
async fn upcoming_excludes_past_and_orders_by_datetime_then_location() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_over(store);

    let soon = Utc::now() + Duration::hours(2);
    let later = Utc::now() + Duration::days(3);
    for (title, datetime, location) in [
        ("Tied B", later, "Munich"),
        ("Tied A", later, "Cologne"),
        ("First", soon, "Berlin"),
        ("Gone", Utc::now() - Duration::hours(2), "Berlin"),
    ] {
        engine
            .create_event(NewEvent {
                title: title.to_string(),
                datetime,
                location: location.to_string(),
                capacity: 10,
            })
            .await
            .unwrap();
    }

    let upcoming = engine.upcoming_events().await.unwrap();
    let titles: Vec<&str> = upcoming.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Tied A", "Tied B"]);
    assert!(upcoming.iter().all(|e| e.datetime > Utc::now()));
}

#[tokio::test]
async fn malformed_ids_never_reach_storage() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_over(store.clone());

    let err = engine
        .register("not-a-uuid", "Ada Lovelace", "ada@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::Validation(_)));
    assert_eq!(err.to_string(), "Invalid event ID format");

    assert!(engine.event_details("not-a-uuid").await.is_err());
    assert!(engine.event_stats("not-a-uuid").await.is_err());
    assert!(engine.cancel("not-a-uuid", "ada@example.com").await.is_err());

    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn same_email_across_events_reuses_the_user() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_over(store);
    let first = engine.create_event(future_event("First", 10)).await.unwrap();
    let second = engine.create_event(future_event("Second", 10)).await.unwrap();

    engine
        .register(&first.id.to_string(), "Ada Lovelace", "ada@example.com")
        .await
        .unwrap();
    engine
        .register(&second.id.to_string(), "Ada Lovelace", "ada@example.com")
        .await
        .unwrap();

    let first_users = engine.event_details(&first.id.to_string()).await.unwrap();
    let second_users = engine.event_details(&second.id.to_string()).await.unwrap();
    assert_eq!(
        first_users.registered_users[0].id,
        second_users.registered_users[0].id
    );
}
