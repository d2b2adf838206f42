//! Events that can occur in a conversation

use crate::llm::LlmErrorKind;
use serde::Serialize;

/// How a user prompt was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    Typed,
    Suggestion,
}

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // User events
    UserInput { text: String, source: InputSource },
    Reset,

    /// Render-cycle check that seeds an empty transcript with the welcome turn
    EnsureWelcome,

    // Agent events
    AgentReplied { text: String },
    AgentFailed { message: String, kind: LlmErrorKind },
}
