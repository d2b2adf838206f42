//! Per-session state: transcript, pending suggestion slot, agent handle

use crate::agent::AgentClient;
use crate::state_machine::ConvState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One role-tagged message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Append-only ordered list of turns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }
}

/// One-shot slot for a clicked suggestion
///
/// A later click before consumption overwrites the earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingSuggestion(Option<String>);

impl PendingSuggestion {
    pub fn set(&mut self, label: impl Into<String>) {
        self.0 = Some(label.into());
    }

    /// Consume the pending label, leaving the slot empty
    pub fn take(&mut self) -> Option<String> {
        self.0.take()
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }
}

/// Everything one user conversation owns
pub struct Session {
    pub id: String,
    pub state: ConvState,
    pub transcript: Transcript,
    pub pending: PendingSuggestion,
    pub agent: Box<dyn AgentClient>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: impl Into<String>, agent: Box<dyn AgentClient>) -> Self {
        Self {
            id: id.into(),
            state: ConvState::Idle,
            transcript: Transcript::new(),
            pending: PendingSuggestion::default(),
            agent,
            created_at: Utc::now(),
        }
    }

    /// Replace transcript, pending slot and agent wholesale
    pub fn reset(&mut self, agent: Box<dyn AgentClient>) {
        self.state = ConvState::Idle;
        self.transcript = Transcript::new();
        self.pending = PendingSuggestion::default();
        self.agent = agent;
    }

    pub fn agent_handle(&self) -> &str {
        self.agent.handle_id()
    }
}
