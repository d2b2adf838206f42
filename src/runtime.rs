//! Runtime for live sessions
//!
//! The `SessionStore` maps session ids to running session tasks. Each task
//! owns its controller exclusively; handlers talk to it over channels.
//! Sessions are only started by `create`; a task that stops (idle or
//! removed) drops out of the map.

mod controller;
mod executor;

#[cfg(test)]
pub mod testing;

pub use controller::{ControllerError, ConversationController};
pub use executor::{Command, SessionRequest, SessionRuntime};

use crate::agent::AgentFactory;
use crate::config::ConfigError;
use crate::instructions::Persona;
use crate::session::{Session, Turn};
use crate::state_machine::ConvState;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, RwLock};

/// Everything needed to build a session's controller
#[derive(Clone)]
pub struct SessionSetup {
    pub factory: Arc<dyn AgentFactory>,
    pub persona: Arc<Persona>,
    /// Send the bootstrap greeting to each new agent
    pub prime_memory: bool,
}

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    pub request_tx: mpsc::Sender<SessionRequest>,
    pub broadcast_tx: broadcast::Sender<SseEvent>,
}

/// Events sent to SSE clients
#[derive(Debug, Clone)]
pub enum SseEvent {
    Init { snapshot: SessionSnapshot },
    Turn { turn: Turn },
    StateChange { state: ConvState },
    Reset,
    Error { message: String },
}

/// Point-in-time view of a session for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub state: ConvState,
    pub agent_working: bool,
    pub transcript: Vec<Turn>,
    pub created_at: DateTime<Utc>,
}

impl SessionSnapshot {
    pub fn of(session: &Session) -> Self {
        Self {
            session_id: session.id.clone(),
            state: session.state.clone(),
            agent_working: session.state.is_working(),
            transcript: session.transcript.turns().to_vec(),
            created_at: session.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Controller(#[from] ControllerError),
    #[error("Session not found: {0}")]
    NotFound(String),
    #[error("Session runtime is no longer running")]
    Closed,
}

impl From<ConfigError> for SessionError {
    fn from(error: ConfigError) -> Self {
        SessionError::Controller(ControllerError::Setup(error))
    }
}

/// Manager for all live sessions
pub struct SessionStore {
    setup: SessionSetup,
    idle_timeout: Duration,
    sessions: Arc<RwLock<HashMap<String, SessionHandle>>>,
}

impl SessionStore {
    pub fn new(setup: SessionSetup, idle_timeout: Duration) -> Self {
        Self {
            setup,
            idle_timeout,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Start a session under a fresh id
    pub async fn create(&self) -> Result<String, SessionError> {
        let session_id = uuid::Uuid::new_v4().to_string();
        self.start(&session_id).await?;
        Ok(session_id)
    }

    /// Handle of a live session
    pub async fn get(&self, session_id: &str) -> Result<SessionHandle, SessionError> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))
    }

    async fn start(&self, session_id: &str) -> Result<(), SessionError> {
        let (request_tx, request_rx) = mpsc::channel(32);
        let (broadcast_tx, _) = broadcast::channel(128);

        let controller =
            ConversationController::new(session_id, self.setup.clone(), broadcast_tx.clone())
                .inspect_err(|e| {
                    tracing::warn!(session = %session_id, error = %e, "Session setup failed");
                })?;
        let runtime = SessionRuntime::new(
            controller,
            request_rx,
            broadcast_tx.clone(),
            self.idle_timeout,
        );

        let mut sessions = self.sessions.write().await;
        sessions.insert(
            session_id.to_string(),
            SessionHandle {
                request_tx,
                broadcast_tx,
            },
        );
        tracing::info!(session = %session_id, live = sessions.len(), "Session created");

        // Registered before the task runs, so its exit always finds the entry
        let id = session_id.to_string();
        let live = Arc::clone(&self.sessions);
        tokio::spawn(async move {
            runtime.run().await;
            live.write().await.remove(&id);
            tracing::info!(session = %id, "Session runtime finished");
        });

        Ok(())
    }

    /// Run a command on a session and wait for the resulting snapshot
    pub async fn send(
        &self,
        session_id: &str,
        command: Command,
    ) -> Result<SessionSnapshot, SessionError> {
        let handle = self.get(session_id).await?;
        let (reply, reply_rx) = oneshot::channel();
        // The task may have gone idle between lookup and send
        handle
            .request_tx
            .send(SessionRequest { command, reply })
            .await
            .map_err(|_| SessionError::NotFound(session_id.to_string()))?;
        Ok(reply_rx.await.map_err(|_| SessionError::Closed)??)
    }

    /// Subscribe to session updates
    pub async fn subscribe(
        &self,
        session_id: &str,
    ) -> Result<broadcast::Receiver<SseEvent>, SessionError> {
        let handle = self.get(session_id).await?;
        Ok(handle.broadcast_tx.subscribe())
    }

    /// End a session, dropping its agent and memory
    ///
    /// Returns false if no such session was live.
    pub async fn remove(&self, session_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(session_id).is_some();
        if removed {
            tracing::info!(session = %session_id, "Session removed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
