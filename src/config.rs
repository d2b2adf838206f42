//! Environment configuration
//!
//! Everything here is read once at startup. The agent settings are only
//! passed through to agent creation; nothing else inspects them.

use crate::llm::DEFAULT_BASE_URL;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub const API_KEY_VAR: &str = "GROQ_API_KEY";
pub const MODEL_VAR: &str = "WELLNESS_MODEL";
pub const TEMPERATURE_VAR: &str = "WELLNESS_TEMPERATURE";
pub const TOP_P_VAR: &str = "WELLNESS_TOP_P";
pub const MAX_TOKENS_VAR: &str = "WELLNESS_MAX_TOKENS";
pub const BASE_URL_VAR: &str = "WELLNESS_BASE_URL";
pub const HISTORY_RUNS_VAR: &str = "WELLNESS_HISTORY_RUNS";
pub const PRIME_MEMORY_VAR: &str = "WELLNESS_PRIME_MEMORY";
pub const PORT_VAR: &str = "WELLNESS_PORT";
pub const SESSION_IDLE_VAR: &str = "WELLNESS_SESSION_IDLE_SECS";

const DEFAULT_MODEL: &str = "openai/gpt-oss-120b";
const DEFAULT_TEMPERATURE: f32 = 0.6;
const DEFAULT_TOP_P: f32 = 0.95;
const DEFAULT_MAX_TOKENS: u32 = 2048;
const DEFAULT_PORT: u16 = 8000;

/// Past exchanges an agent replays to the model on each call
pub const DEFAULT_HISTORY_RUNS: usize = 3;

/// How long a session with no commands and no subscribers stays live
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_mins(30);

/// Upper bound on a single agent call
pub const REQUEST_TIMEOUT: Duration = Duration::from_mins(2);

/// Missing or invalid agent configuration
///
/// Fatal for session creation, never for the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing credential: set {0}")]
    MissingCredential(&'static str),
    #[error("Invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Settings handed to the agent factory
#[derive(Clone, PartialEq)]
pub struct AgentConfig {
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub api_key: String,
    pub base_url: String,
    pub history_runs: usize,
}

// Keep the credential out of logs.
impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("max_tokens", &self.max_tokens)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("history_runs", &self.history_runs)
            .finish()
    }
}

impl AgentConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup(API_KEY_VAR)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingCredential(API_KEY_VAR))?;

        let model = lookup(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        if model.trim().is_empty() {
            return Err(ConfigError::invalid(MODEL_VAR, "model identifier is empty"));
        }

        let temperature = parse_or(&lookup, TEMPERATURE_VAR, DEFAULT_TEMPERATURE)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::invalid(
                TEMPERATURE_VAR,
                format!("{temperature} is outside 0..=2"),
            ));
        }

        let top_p = parse_or(&lookup, TOP_P_VAR, DEFAULT_TOP_P)?;
        if !(top_p > 0.0 && top_p <= 1.0) {
            return Err(ConfigError::invalid(
                TOP_P_VAR,
                format!("{top_p} is outside (0, 1]"),
            ));
        }

        let max_tokens = parse_or(&lookup, MAX_TOKENS_VAR, DEFAULT_MAX_TOKENS)?;
        if max_tokens == 0 {
            return Err(ConfigError::invalid(MAX_TOKENS_VAR, "must be greater than 0"));
        }

        let base_url =
            lookup(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let history_runs = parse_or(&lookup, HISTORY_RUNS_VAR, DEFAULT_HISTORY_RUNS)?;
        if history_runs == 0 {
            return Err(ConfigError::invalid(HISTORY_RUNS_VAR, "must be greater than 0"));
        }

        Ok(Self {
            model,
            temperature,
            top_p,
            max_tokens,
            api_key,
            base_url,
            history_runs,
        })
    }
}

/// Process-level settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Send the throwaway greeting that seeds agent memory on bootstrap
    pub prime_memory: bool,
    pub session_idle: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup(PORT_VAR)
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let prime_memory = lookup(PRIME_MEMORY_VAR).is_none_or(|v| {
            !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off")
        });

        let session_idle = lookup(SESSION_IDLE_VAR)
            .and_then(|secs| secs.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_SESSION_IDLE, Duration::from_secs);

        Self {
            port,
            prime_memory,
            session_idle,
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid(name, format!("cannot parse {raw:?}"))),
    }
}
