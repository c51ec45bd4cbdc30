//! Event registration REST API.
//!
//! A small service for creating events with a fixed attendee capacity,
//! registering and cancelling attendees, and reporting capacity
//! statistics. All state lives in `PostgreSQL`; the service itself is
//! stateless between requests.
//!
//! # Architecture
//!
//! ```text
//! HTTP (axum router, envelope, rate limit, CORS)
//!         │
//!         ▼
//! Validation (declarative field rules, UUID path check)
//!         │
//!         ▼
//! RegistrationEngine (existence, temporal, capacity, duplicate rules)
//!         │
//!         ▼
//! Store trait ── PostgresStore (sqlx) / MemoryStore (tests)
//! ```
//!
//! The engine is a pure service over an injected [`store::Store`] and
//! [`engine::Clock`]; handlers are thin adapters mapping engine results
//! into the `{statusCode, message, data, success, status}` envelope.
//!
//! # Capacity invariant
//!
//! The registration count for an event must never exceed its capacity.
//! Enforcement is check-then-act without a transaction spanning count
//! and insert, so concurrent registrations can overshoot; see
//! [`engine`] for the full caveat. Duplicate registrations are
//! prevented by a database uniqueness constraint and are safe under
//! concurrency.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod middleware;
pub mod server;
pub mod store;
pub mod types;
pub mod validation;

pub use config::Config;
pub use engine::{Clock, RegistrationEngine, RegistrationError, SystemClock};
pub use error::ApiError;
pub use server::{build_router, AppState};
pub use store::{MemoryStore, PostgresStore, Store};
pub use types::{Event, EventId, NewEvent, Registration, RegistrationId, User, UserId};
