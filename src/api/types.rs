//! API request and response types

use serde::{Deserialize, Serialize};

/// Request to send a typed message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Request to click a canned suggestion
#[derive(Debug, Deserialize)]
pub struct SuggestionRequest {
    pub label: String,
}

/// Suggestion labels, flat and laid out as rows
#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<&'static str>,
    pub columns: usize,
    pub grid: Vec<Vec<&'static str>>,
}

/// Response for lifecycle actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
