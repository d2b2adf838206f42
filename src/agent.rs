//! Agent client
//!
//! An agent wraps the hosted model and keeps its own conversation memory
//! between calls. The controller only sees `create` and `run`; the memory is
//! never inspected from outside.

use crate::config::{AgentConfig, ConfigError, DEFAULT_HISTORY_RUNS, REQUEST_TIMEOUT};
use crate::instructions::InstructionSet;
use crate::llm::{
    LlmError, LlmMessage, LlmRequest, LlmService, LoggingService, OpenAIService, Sampling,
    SystemContent,
};
use async_trait::async_trait;
use std::sync::Arc;

/// One agent instance with private memory
#[async_trait]
pub trait AgentClient: Send {
    /// Send a prompt and wait for the reply
    ///
    /// On success both the prompt and the reply join the agent's memory.
    async fn run(&mut self, prompt: &str) -> Result<String, LlmError>;

    /// Identifier of this instance, unique per `create`
    fn handle_id(&self) -> &str;
}

/// Builds fresh agents with empty memory
pub trait AgentFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn AgentClient>, ConfigError>;
}

/// Agent whose memory is the recent message history sent to the model
///
/// Only the last `history_runs` exchanges are kept, so a long session never
/// outgrows the model's context window.
pub struct MemoryAgent {
    handle_id: String,
    llm: Arc<dyn LlmService>,
    system: Vec<SystemContent>,
    sampling: Sampling,
    history: Vec<LlmMessage>,
    history_runs: usize,
}

impl MemoryAgent {
    pub fn new(
        llm: Arc<dyn LlmService>,
        system: Vec<SystemContent>,
        sampling: Sampling,
        history_runs: usize,
    ) -> Self {
        Self {
            handle_id: uuid::Uuid::new_v4().to_string(),
            llm,
            system,
            sampling,
            history: Vec::new(),
            history_runs,
        }
    }

    // Each run adds one user and one assistant message
    fn trim_history(&mut self) {
        let keep = self.history_runs * 2;
        if self.history.len() > keep {
            let excess = self.history.len() - keep;
            self.history.drain(..excess);
        }
    }
}

#[async_trait]
impl AgentClient for MemoryAgent {
    async fn run(&mut self, prompt: &str) -> Result<String, LlmError> {
        let mut messages = self.history.clone();
        messages.push(LlmMessage::user(prompt));

        let request = LlmRequest {
            system: self.system.clone(),
            messages,
            sampling: self.sampling,
        };

        tracing::debug!(
            agent = %self.handle_id,
            history = self.history.len(),
            "Running agent"
        );

        // Memory only grows on success, so a failed call leaves no trace.
        let response = self.llm.complete(&request).await?;
        let text = response.text();
        self.history.push(LlmMessage::user(prompt));
        self.history.push(LlmMessage::assistant(text.clone()));
        self.trim_history();
        Ok(text)
    }

    fn handle_id(&self) -> &str {
        &self.handle_id
    }
}

/// Factory for agents backed by one shared model service
pub struct ModelAgentFactory {
    llm: Arc<dyn LlmService>,
    system: Vec<SystemContent>,
    sampling: Sampling,
    history_runs: usize,
}

impl ModelAgentFactory {
    pub fn new(llm: Arc<dyn LlmService>, instructions: &InstructionSet, sampling: Sampling) -> Self {
        Self {
            llm,
            system: instructions.system_prompt(),
            sampling,
            history_runs: DEFAULT_HISTORY_RUNS,
        }
    }

    /// Number of past exchanges each agent replays
    #[must_use]
    pub fn with_history_runs(mut self, runs: usize) -> Self {
        self.history_runs = runs;
        self
    }

    /// Wire the production provider from configuration
    pub fn from_config(
        config: &AgentConfig,
        instructions: &InstructionSet,
    ) -> Result<Self, ConfigError> {
        let service = OpenAIService::new(
            config.api_key.clone(),
            config.model.clone(),
            config.base_url.clone(),
            REQUEST_TIMEOUT,
        )
        .map_err(|e| ConfigError::InvalidParameter {
            name: "http_client",
            reason: e.message,
        })?;

        let sampling = Sampling {
            temperature: Some(config.temperature),
            top_p: Some(config.top_p),
            max_tokens: Some(config.max_tokens),
        };

        Ok(Self::new(
            Arc::new(LoggingService::new(Arc::new(service))),
            instructions,
            sampling,
        )
        .with_history_runs(config.history_runs))
    }

    pub fn model_id(&self) -> &str {
        self.llm.model_id()
    }
}

impl AgentFactory for ModelAgentFactory {
    fn create(&self) -> Result<Box<dyn AgentClient>, ConfigError> {
        let agent = MemoryAgent::new(
            self.llm.clone(),
            self.system.clone(),
            self.sampling,
            self.history_runs,
        );
        tracing::info!(agent = %agent.handle_id, model = %self.llm.model_id(), "Created agent");
        Ok(Box::new(agent))
    }
}

/// Stand-in used when startup configuration was rejected
///
/// Every session creation fails with the original error.
pub struct UnconfiguredFactory {
    error: ConfigError,
}

impl UnconfiguredFactory {
    pub fn new(error: ConfigError) -> Self {
        Self { error }
    }
}

impl AgentFactory for UnconfiguredFactory {
    fn create(&self) -> Result<Box<dyn AgentClient>, ConfigError> {
        Err(self.error.clone())
    }
}
