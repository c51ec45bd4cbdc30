//! Application state shared across HTTP handlers.

use crate::engine::{RegistrationError, RegistrationEngine};
use crate::error::ApiError;

/// State injected into every handler via `Router::with_state`.
///
/// Holds the registration engine (itself stateless over its store) and
/// the deployment-mode flag controlling internal-error exposure.
#[derive(Clone)]
pub struct AppState {
    /// The registration engine.
    pub engine: RegistrationEngine,
    /// Whether the service runs in development mode.
    ///
    /// In development, unexpected errors expose their real message;
    /// otherwise they are masked with a generic 500.
    pub development: bool,
}

impl AppState {
    /// Create the application state.
    #[must_use]
    pub const fn new(engine: RegistrationEngine, development: bool) -> Self {
        Self {
            engine,
            development,
        }
    }

    /// Map an engine error to its transport representation, honoring
    /// the deployment mode for internal errors.
    #[must_use]
    pub fn api_error(&self, err: RegistrationError) -> ApiError {
        ApiError::from_engine(err, self.development)
    }
}
