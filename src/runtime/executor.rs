//! Session runtime executor
//!
//! One task per session. Commands are handled strictly one at a time, so a
//! session never has two turns in flight. A session with no commands for the
//! idle timeout and no SSE subscribers stops on its own.

use super::controller::{ControllerError, ConversationController};
use super::{SessionSnapshot, SseEvent};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};

/// User-facing operations a session accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Consume any pending click and bootstrap the welcome turn
    Render,
    /// Current state without side effects
    Snapshot,
    SubmitText(String),
    ClickSuggestion(String),
    Reset,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Render => "render",
            Command::Snapshot => "snapshot",
            Command::SubmitText(_) => "submit_text",
            Command::ClickSuggestion(_) => "click_suggestion",
            Command::Reset => "reset",
        }
    }
}

/// A command plus the channel its outcome is returned on
#[derive(Debug)]
pub struct SessionRequest {
    pub command: Command,
    pub reply: oneshot::Sender<Result<SessionSnapshot, ControllerError>>,
}

pub struct SessionRuntime {
    controller: ConversationController,
    request_rx: mpsc::Receiver<SessionRequest>,
    broadcast_tx: broadcast::Sender<SseEvent>,
    idle_timeout: Duration,
}

impl SessionRuntime {
    pub fn new(
        controller: ConversationController,
        request_rx: mpsc::Receiver<SessionRequest>,
        broadcast_tx: broadcast::Sender<SseEvent>,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            controller,
            request_rx,
            broadcast_tx,
            idle_timeout,
        }
    }

    pub async fn run(mut self) {
        let session_id = self.controller.session().id.clone();
        tracing::info!(session = %session_id, "Starting session runtime");

        loop {
            let request =
                match tokio::time::timeout(self.idle_timeout, self.request_rx.recv()).await {
                    Ok(Some(request)) => request,
                    Ok(None) => break,
                    Err(_) if self.broadcast_tx.receiver_count() == 0 => {
                        tracing::info!(session = %session_id, "Session idle, stopping");
                        break;
                    }
                    // A client is still watching the stream
                    Err(_) => continue,
                };

            let command = request.command.name();
            let result = self.handle(request.command).await;

            match &result {
                Ok(()) => {
                    let transcript = &self.controller.session().transcript;
                    tracing::debug!(
                        session = %session_id,
                        command,
                        turns = transcript.len(),
                        last_role = ?transcript.last().map(|turn| turn.role),
                        "Command handled"
                    );
                }
                Err(e) => {
                    tracing::debug!(session = %session_id, command, error = %e, "Command rejected");
                    let _ = self.broadcast_tx.send(SseEvent::Error {
                        message: e.to_string(),
                    });
                }
            }

            // Caller may have gone away; the command still ran to completion
            let _ = request
                .reply
                .send(result.map(|()| self.controller.snapshot()));
        }

        tracing::info!(session = %session_id, "Session runtime stopped");
    }

    async fn handle(&mut self, command: Command) -> Result<(), ControllerError> {
        match command {
            Command::Render => self.controller.render_pass().await,
            Command::Snapshot => Ok(()),
            Command::SubmitText(text) => self.controller.submit_text(&text).await,
            Command::ClickSuggestion(label) => self.controller.click_suggestion(&label).await,
            Command::Reset => self.controller.reset().await,
        }
    }
}
