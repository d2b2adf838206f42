//! Conversation state types

use serde::{Deserialize, Serialize};

/// Where the session is in its turn cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConvState {
    /// Ready for input
    #[default]
    Idle,

    /// Agent call in flight for this prompt
    AwaitingResponse { prompt: String },
}

impl ConvState {
    /// Check if agent is currently working
    pub fn is_working(&self) -> bool {
        matches!(self, ConvState::AwaitingResponse { .. })
    }

    /// Short label for logs
    pub fn name(&self) -> &'static str {
        match self {
            ConvState::Idle => "idle",
            ConvState::AwaitingResponse { .. } => "awaiting_response",
        }
    }
}

/// Read-only facts about the session that transitions may depend on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub session_id: String,
    pub transcript_empty: bool,
    pub pending_suggestion: bool,
    /// Whether bootstrap also seeds agent memory with a throwaway greeting
    pub prime_memory: bool,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            transcript_empty: true,
            pending_suggestion: false,
            prime_memory: true,
        }
    }
}
