//! Application state for the award compilation API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::engine::Engine;

/// Shared application state.
///
/// Contains resources that are shared across all request handlers,
/// such as the engine facade over the staging and compiled stores.
#[derive(Clone)]
pub struct AppState {
    /// The engine facade.
    engine: Arc<Engine>,
}

impl AppState {
    /// Creates a new application state wrapping the given engine.
    pub fn new(engine: Engine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// Returns a reference to the engine facade.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Returns a cloneable handle to the engine for blocking tasks.
    pub fn engine_handle(&self) -> Arc<Engine> {
        Arc::clone(&self.engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        // Verify AppState can be cloned (required for axum state)
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }
}
