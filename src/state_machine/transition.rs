//! Pure state transition function

use super::{ConvState, Effect, Event, SessionContext};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Message text is empty")]
    EmptyInput,
    #[error("Agent is busy, wait for the current reply before sending another message")]
    AgentBusy,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
/// At most one agent call is ever outstanding: every path into
/// `AwaitingResponse` starts from `Idle`.
pub fn transition(
    state: &ConvState,
    context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // User input
        // ============================================================
        (ConvState::Idle, Event::UserInput { text, .. }) => {
            if text.trim().is_empty() {
                return Err(TransitionError::EmptyInput);
            }
            Ok(TransitionResult::new(ConvState::AwaitingResponse {
                prompt: text.clone(),
            })
            .with_effect(Effect::append_user(text.clone()))
            .with_effect(Effect::RequestAgent { prompt: text }))
        }

        (ConvState::AwaitingResponse { .. }, Event::UserInput { .. } | Event::Reset) => {
            Err(TransitionError::AgentBusy)
        }

        // ============================================================
        // Agent outcome
        // ============================================================
        (ConvState::AwaitingResponse { .. }, Event::AgentReplied { text }) => {
            Ok(TransitionResult::new(ConvState::Idle).with_effect(Effect::append_assistant(text)))
        }

        (ConvState::AwaitingResponse { .. }, Event::AgentFailed { message, kind }) => {
            Ok(TransitionResult::new(ConvState::Idle).with_effect(Effect::AppendFailureNotice {
                kind,
                detail: message,
            }))
        }

        (ConvState::Idle, event @ (Event::AgentReplied { .. } | Event::AgentFailed { .. })) => {
            Err(TransitionError::InvalidTransition(format!(
                "session {}: agent outcome without a pending request: {event:?}",
                context.session_id
            )))
        }

        // ============================================================
        // Session lifecycle
        // ============================================================
        (ConvState::Idle, Event::Reset) => {
            Ok(TransitionResult::new(ConvState::Idle).with_effect(Effect::ResetSession))
        }

        (ConvState::Idle, Event::EnsureWelcome) => {
            if !context.transcript_empty || context.pending_suggestion {
                return Ok(TransitionResult::new(ConvState::Idle));
            }
            let result = TransitionResult::new(ConvState::Idle).with_effect(Effect::AppendWelcome);
            if context.prime_memory {
                Ok(result.with_effect(Effect::PrimeAgent))
            } else {
                Ok(result)
            }
        }

        // Nothing to render while a reply is pending
        (state @ ConvState::AwaitingResponse { .. }, Event::EnsureWelcome) => {
            Ok(TransitionResult::new(state.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmErrorKind;
    use crate::state_machine::InputSource;

    fn test_context() -> SessionContext {
        SessionContext::new("test-session")
    }

    fn non_empty_context() -> SessionContext {
        SessionContext {
            transcript_empty: false,
            ..test_context()
        }
    }

    fn awaiting() -> ConvState {
        ConvState::AwaitingResponse {
            prompt: "I can't sleep".to_string(),
        }
    }

    fn typed(text: &str) -> Event {
        Event::UserInput {
            text: text.to_string(),
            source: InputSource::Typed,
        }
    }

    #[test]
    fn test_idle_to_awaiting_response() {
        let result = transition(&ConvState::Idle, &test_context(), typed("I can't sleep")).unwrap();

        assert_eq!(result.new_state, awaiting());
        assert_eq!(
            result.effects,
            vec![
                Effect::append_user("I can't sleep"),
                Effect::RequestAgent {
                    prompt: "I can't sleep".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_suggestion_same_as_typed() {
        let typed_result = transition(&ConvState::Idle, &test_context(), typed("😰 Worrying")).unwrap();
        let clicked = transition(
            &ConvState::Idle,
            &test_context(),
            Event::UserInput {
                text: "😰 Worrying".to_string(),
                source: InputSource::Suggestion,
            },
        )
        .unwrap();

        assert_eq!(typed_result.new_state, clicked.new_state);
        assert_eq!(typed_result.effects, clicked.effects);
    }

    #[test]
    fn test_reject_empty_input() {
        for text in ["", "   ", "\n\t"] {
            let result = transition(&ConvState::Idle, &test_context(), typed(text));
            assert!(matches!(result, Err(TransitionError::EmptyInput)));
        }
    }

    #[test]
    fn test_reject_input_while_busy() {
        let result = transition(&awaiting(), &test_context(), typed("Hello"));
        assert!(matches!(result, Err(TransitionError::AgentBusy)));

        let result = transition(&awaiting(), &test_context(), Event::Reset);
        assert!(matches!(result, Err(TransitionError::AgentBusy)));
    }

    #[test]
    fn test_reply_returns_to_idle() {
        let result = transition(
            &awaiting(),
            &non_empty_context(),
            Event::AgentReplied {
                text: "Try a wind-down routine.".to_string(),
            },
        )
        .unwrap();

        assert_eq!(result.new_state, ConvState::Idle);
        assert_eq!(
            result.effects,
            vec![Effect::append_assistant("Try a wind-down routine.")]
        );
    }

    #[test]
    fn test_failure_appends_notice_and_returns_to_idle() {
        let result = transition(
            &awaiting(),
            &non_empty_context(),
            Event::AgentFailed {
                message: "connection refused".to_string(),
                kind: LlmErrorKind::Network,
            },
        )
        .unwrap();

        assert_eq!(result.new_state, ConvState::Idle);
        assert_eq!(
            result.effects,
            vec![Effect::AppendFailureNotice {
                kind: LlmErrorKind::Network,
                detail: "connection refused".to_string(),
            }]
        );
    }

    #[test]
    fn test_stray_agent_outcome_rejected() {
        let result = transition(
            &ConvState::Idle,
            &test_context(),
            Event::AgentReplied {
                text: "late".to_string(),
            },
        );
        assert!(matches!(result, Err(TransitionError::InvalidTransition(_))));
    }

    #[test]
    fn test_welcome_on_empty_transcript() {
        let result = transition(&ConvState::Idle, &test_context(), Event::EnsureWelcome).unwrap();

        assert_eq!(result.new_state, ConvState::Idle);
        assert_eq!(result.effects, vec![Effect::AppendWelcome, Effect::PrimeAgent]);
    }

    #[test]
    fn test_welcome_without_priming() {
        let context = SessionContext {
            prime_memory: false,
            ..test_context()
        };
        let result = transition(&ConvState::Idle, &context, Event::EnsureWelcome).unwrap();
        assert_eq!(result.effects, vec![Effect::AppendWelcome]);
    }

    #[test]
    fn test_welcome_skipped_when_not_empty_or_pending() {
        let result = transition(&ConvState::Idle, &non_empty_context(), Event::EnsureWelcome).unwrap();
        assert!(result.effects.is_empty());

        let pending = SessionContext {
            pending_suggestion: true,
            ..test_context()
        };
        let result = transition(&ConvState::Idle, &pending, Event::EnsureWelcome).unwrap();
        assert!(result.effects.is_empty());

        let result = transition(&awaiting(), &test_context(), Event::EnsureWelcome).unwrap();
        assert_eq!(result.new_state, awaiting());
        assert!(result.effects.is_empty());
    }

    #[test]
    fn test_reset_from_idle() {
        let result = transition(&ConvState::Idle, &non_empty_context(), Event::Reset).unwrap();
        assert_eq!(result.new_state, ConvState::Idle);
        assert_eq!(result.effects, vec![Effect::ResetSession]);
    }
}
