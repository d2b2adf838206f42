//! Effects produced by state transitions

use crate::llm::LlmErrorKind;
use crate::session::Turn;

/// Effects to be executed after state transition, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a turn to the transcript and notify clients
    AppendTurn { turn: Turn },

    /// Append the persona's welcome turn
    AppendWelcome,

    /// Append the generic failure notice in place of a reply
    ///
    /// `detail` is for logs only and never reaches the transcript.
    AppendFailureNotice { kind: LlmErrorKind, detail: String },

    /// Run the agent; its outcome comes back as an event
    RequestAgent { prompt: String },

    /// Send the bootstrap greeting to the agent and discard the reply
    PrimeAgent,

    /// Replace transcript and agent with fresh ones
    ResetSession,
}

impl Effect {
    pub fn append_user(text: impl Into<String>) -> Self {
        Effect::AppendTurn {
            turn: Turn::user(text),
        }
    }

    pub fn append_assistant(text: impl Into<String>) -> Self {
        Effect::AppendTurn {
            turn: Turn::assistant(text),
        }
    }

    /// Whether this effect adds a turn to the transcript
    pub fn appends_turn(&self) -> bool {
        matches!(
            self,
            Effect::AppendTurn { .. } | Effect::AppendWelcome | Effect::AppendFailureNotice { .. }
        )
    }
}
