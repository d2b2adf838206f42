//! Conversation controller
//!
//! Owns one `Session` and drives it through the pure state machine. Effects
//! are executed here in order; the agent call is the only await point.

use super::{SessionSetup, SessionSnapshot, SseEvent};
use crate::config::ConfigError;
use crate::session::{Session, Turn};
use crate::state_machine::{
    transition, Effect, Event, InputSource, SessionContext, TransitionError,
};
use crate::suggestions::is_suggestion;
use thiserror::Error;
use tokio::sync::broadcast;

/// Why a controller operation was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Rejected(#[from] TransitionError),
    #[error("Unknown suggestion: {0}")]
    UnknownSuggestion(String),
    #[error("Session setup failed: {0}")]
    Setup(#[from] ConfigError),
}

pub struct ConversationController {
    session: Session,
    setup: SessionSetup,
    broadcast_tx: broadcast::Sender<SseEvent>,
}

impl ConversationController {
    /// Build a controller around a freshly created agent
    pub fn new(
        session_id: impl Into<String>,
        setup: SessionSetup,
        broadcast_tx: broadcast::Sender<SseEvent>,
    ) -> Result<Self, ConfigError> {
        let agent = setup.factory.create()?;
        Ok(Self {
            session: Session::new(session_id, agent),
            setup,
            broadcast_tx,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::of(&self.session)
    }

    /// Send typed text to the agent
    pub async fn submit_text(&mut self, text: &str) -> Result<(), ControllerError> {
        self.dispatch(Event::UserInput {
            text: text.to_string(),
            source: InputSource::Typed,
        })
        .await
    }

    /// Record a click without dispatching it
    ///
    /// The label is picked up by the next render pass. A second click before
    /// then replaces the first.
    pub fn queue_suggestion(&mut self, label: &str) -> Result<(), ControllerError> {
        if !is_suggestion(label) {
            return Err(ControllerError::UnknownSuggestion(label.to_string()));
        }
        self.session.pending.set(label);
        Ok(())
    }

    pub async fn click_suggestion(&mut self, label: &str) -> Result<(), ControllerError> {
        self.queue_suggestion(label)?;
        self.render_pass().await
    }

    /// Consume a pending click, then make sure a fresh session has its welcome
    pub async fn render_pass(&mut self) -> Result<(), ControllerError> {
        // Cleared before dispatch so a repeated pass cannot send it twice
        if let Some(label) = self.session.pending.take() {
            self.dispatch(Event::UserInput {
                text: label,
                source: InputSource::Suggestion,
            })
            .await?;
        }
        self.dispatch(Event::EnsureWelcome).await
    }

    /// Discard transcript and agent memory
    pub async fn reset(&mut self) -> Result<(), ControllerError> {
        self.dispatch(Event::Reset).await
    }

    fn context(&self) -> SessionContext {
        SessionContext {
            session_id: self.session.id.clone(),
            transcript_empty: self.session.transcript.is_empty(),
            pending_suggestion: self.session.pending.is_set(),
            prime_memory: self.setup.prime_memory,
        }
    }

    /// Run an event and everything it generates to completion
    async fn dispatch(&mut self, event: Event) -> Result<(), ControllerError> {
        let mut events_to_process = vec![event];

        while let Some(current_event) = events_to_process.pop() {
            if let Event::UserInput { source, .. } = &current_event {
                tracing::info!(session = %self.session.id, ?source, "User input");
            }
            let context = self.context();
            let result = transition(&self.session.state, &context, current_event)?;

            let old_state = std::mem::replace(&mut self.session.state, result.new_state);
            if old_state != self.session.state {
                self.notify_state();
            }

            for effect in result.effects {
                if let Some(generated_event) = self.execute_effect(effect).await? {
                    events_to_process.push(generated_event);
                }
            }
        }

        Ok(())
    }

    async fn execute_effect(&mut self, effect: Effect) -> Result<Option<Event>, ControllerError> {
        match effect {
            Effect::AppendTurn { turn } => {
                self.append(turn);
                Ok(None)
            }

            Effect::AppendWelcome => {
                let turn = Turn::assistant(self.setup.persona.welcome.clone());
                self.append(turn);
                Ok(None)
            }

            Effect::AppendFailureNotice { kind, detail } => {
                tracing::warn!(
                    session = %self.session.id,
                    agent = %self.session.agent_handle(),
                    kind = kind.as_str(),
                    retryable = kind.is_retryable(),
                    error = %detail,
                    "Agent call failed, showing failure notice"
                );
                let turn = Turn::assistant(self.setup.persona.failure_notice.clone());
                self.append(turn);
                Ok(None)
            }

            Effect::RequestAgent { prompt } => {
                match self.session.agent.run(&prompt).await {
                    Ok(text) => Ok(Some(Event::AgentReplied { text })),
                    Err(e) => Ok(Some(Event::AgentFailed {
                        message: e.message,
                        kind: e.kind,
                    })),
                }
            }

            Effect::PrimeAgent => {
                // Reply is discarded either way
                let outcome = self
                    .session
                    .agent
                    .run(&self.setup.persona.bootstrap_prompt)
                    .await;
                if let Err(e) = outcome {
                    tracing::warn!(
                        session = %self.session.id,
                        kind = e.kind.as_str(),
                        error = %e.message,
                        "Priming agent memory failed"
                    );
                }
                Ok(None)
            }

            Effect::ResetSession => {
                let agent = self.setup.factory.create()?;
                let old_agent = self.session.agent_handle().to_string();
                self.session.reset(agent);
                tracing::info!(
                    session = %self.session.id,
                    old_agent = %old_agent,
                    new_agent = %self.session.agent_handle(),
                    "Session reset"
                );
                let _ = self.broadcast_tx.send(SseEvent::Reset);
                Ok(None)
            }
        }
    }

    fn append(&mut self, turn: Turn) {
        self.session.transcript.push(turn.clone());
        let _ = self.broadcast_tx.send(SseEvent::Turn { turn });
    }

    fn notify_state(&self) {
        tracing::debug!(
            session = %self.session.id,
            state = self.session.state.name(),
            "State changed"
        );
        let _ = self.broadcast_tx.send(SseEvent::StateChange {
            state: self.session.state.clone(),
        });
    }
}

impl std::fmt::Debug for ConversationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationController")
            .field("session_id", &self.session.id)
            .field("state", &self.session.state)
            .field("turns", &self.session.transcript.len())
            .finish_non_exhaustive()
    }
}
