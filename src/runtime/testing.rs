//! Mock implementations for testing
//!
//! These mocks enable controller and API testing without real I/O.

use crate::agent::{AgentClient, AgentFactory};
use crate::config::ConfigError;
use crate::llm::{LlmError, LlmRequest, LlmResponse, LlmService};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Mock LLM Service
// ============================================================================

/// Mock LLM service that returns queued responses
pub struct MockLlmService {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    model_id: String,
    /// Record of all requests made
    pub requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmService {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Mock Agent Factory
// ============================================================================

#[derive(Default)]
struct MockAgentState {
    created: usize,
    /// `(handle_id, prompt)` for every `run`, in call order
    calls: Vec<(String, String)>,
    replies: VecDeque<Result<String, LlmError>>,
    /// How long each `run` waits before answering
    delay: Duration,
    in_flight: usize,
    max_in_flight: usize,
}

/// Factory whose agents share one reply queue and call log
///
/// With nothing queued an agent echoes `reply to: <prompt>`.
#[derive(Clone, Default)]
pub struct MockAgentFactory {
    state: Arc<Mutex<MockAgentState>>,
}

impl MockAgentFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Agents that take `delay` to answer, leaving room for overlap
    pub fn with_delay(delay: Duration) -> Self {
        let factory = Self::default();
        factory.state.lock().unwrap().delay = delay;
        factory
    }

    /// Queue a reply for the next `run` on any agent
    pub fn queue_reply(&self, text: impl Into<String>) {
        self.state
            .lock()
            .unwrap()
            .replies
            .push_back(Ok(text.into()));
    }

    /// Queue a failure for the next `run` on any agent
    pub fn queue_error(&self, error: LlmError) {
        self.state.lock().unwrap().replies.push_back(Err(error));
    }

    /// Number of agents created so far
    pub fn created_count(&self) -> usize {
        self.state.lock().unwrap().created
    }

    /// Every `(handle_id, prompt)` sent to any agent
    pub fn calls(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Most `run` calls that were ever in progress at once
    pub fn max_in_flight(&self) -> usize {
        self.state.lock().unwrap().max_in_flight
    }

    /// Prompts only, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.calls().into_iter().map(|(_, prompt)| prompt).collect()
    }
}

impl AgentFactory for MockAgentFactory {
    fn create(&self) -> Result<Box<dyn AgentClient>, ConfigError> {
        let mut state = self.state.lock().unwrap();
        state.created += 1;
        Ok(Box::new(MockAgent {
            handle_id: format!("mock-{}", state.created),
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockAgent {
    handle_id: String,
    state: Arc<Mutex<MockAgentState>>,
}

#[async_trait]
impl AgentClient for MockAgent {
    async fn run(&mut self, prompt: &str) -> Result<String, LlmError> {
        let delay = {
            let mut state = self.state.lock().unwrap();
            state
                .calls
                .push((self.handle_id.clone(), prompt.to_string()));
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
            state.delay
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().unwrap();
        state.in_flight -= 1;
        state
            .replies
            .pop_front()
            .unwrap_or_else(|| Ok(format!("reply to: {prompt}")))
    }

    fn handle_id(&self) -> &str {
        &self.handle_id
    }
}
