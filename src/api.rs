//! HTTP API for the wellness guide
//!
//! JSON endpoints for session actions plus an SSE stream of transcript
//! updates.

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;

use crate::runtime::{SessionSetup, SessionStore};
use std::sync::Arc;
use std::time::Duration;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SessionStore>,
    pub setup: SessionSetup,
}

impl AppState {
    pub fn new(setup: SessionSetup, session_idle: Duration) -> Self {
        Self {
            store: Arc::new(SessionStore::new(setup.clone(), session_idle)),
            setup,
        }
    }
}
