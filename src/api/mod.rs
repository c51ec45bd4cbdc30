//! API endpoints for the event registration service.
//!
//! Handlers are thin adapters: they validate the payload, delegate to
//! the registration engine, and wrap the result in the uniform
//! response envelope.

pub mod events;
pub mod response;

pub use events::{
    cancel_registration, create_event, get_event_details, get_event_stats, get_upcoming_events,
    register_for_event,
};
pub use response::ApiResponse;
