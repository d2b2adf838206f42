//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use crate::llm::LlmErrorKind;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_error_kind() -> impl Strategy<Value = LlmErrorKind> {
    prop_oneof![
        Just(LlmErrorKind::Network),
        Just(LlmErrorKind::RateLimit),
        Just(LlmErrorKind::ServerError),
        Just(LlmErrorKind::Auth),
        Just(LlmErrorKind::InvalidRequest),
        Just(LlmErrorKind::Unknown),
    ]
}

fn arb_source() -> impl Strategy<Value = InputSource> {
    prop_oneof![Just(InputSource::Typed), Just(InputSource::Suggestion)]
}

fn arb_state() -> impl Strategy<Value = ConvState> {
    prop_oneof![
        Just(ConvState::Idle),
        "[a-zA-Z ]{1,30}".prop_map(|prompt| ConvState::AwaitingResponse { prompt }),
    ]
}

fn arb_context() -> impl Strategy<Value = SessionContext> {
    (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(transcript_empty, pending_suggestion, prime_memory)| SessionContext {
            session_id: "prop-session".to_string(),
            transcript_empty,
            pending_suggestion,
            prime_memory,
        },
    )
}

fn arb_user_input() -> impl Strategy<Value = Event> {
    ("[a-zA-Z ]{0,30}", arb_source()).prop_map(|(text, source)| Event::UserInput { text, source })
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_user_input(),
        "[a-zA-Z ]{1,30}".prop_map(|text| Event::AgentReplied { text }),
        ("[a-zA-Z ]{1,30}", arb_error_kind())
            .prop_map(|(message, kind)| Event::AgentFailed { message, kind }),
        Just(Event::Reset),
        Just(Event::EnsureWelcome),
    ]
}

fn request_count(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|e| matches!(e, Effect::RequestAgent { .. }))
        .count()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // A request is only issued when entering AwaitingResponse from Idle
    #[test]
    fn prop_at_most_one_request_in_flight(
        state in arb_state(),
        context in arb_context(),
        event in arb_event(),
    ) {
        if let Ok(result) = transition(&state, &context, event) {
            let requests = request_count(&result.effects);
            prop_assert!(requests <= 1);
            if requests == 1 {
                prop_assert_eq!(&state, &ConvState::Idle);
                prop_assert!(result.new_state.is_working());
            }
        }
    }

    // Busy sessions never accept new input or reset
    #[test]
    fn prop_busy_rejects_input(
        prompt in "[a-zA-Z ]{1,30}",
        context in arb_context(),
        event in prop_oneof![arb_user_input(), Just(Event::Reset)],
    ) {
        let state = ConvState::AwaitingResponse { prompt };
        prop_assert!(matches!(
            transition(&state, &context, event),
            Err(TransitionError::AgentBusy)
        ));
    }

    // Every agent outcome adds exactly one turn and frees the session
    #[test]
    fn prop_outcome_adds_one_turn(
        prompt in "[a-zA-Z ]{1,30}",
        context in arb_context(),
        event in prop_oneof![
            "[a-zA-Z ]{1,30}".prop_map(|text| Event::AgentReplied { text }),
            ("[a-zA-Z ]{1,30}", arb_error_kind())
                .prop_map(|(message, kind)| Event::AgentFailed { message, kind }),
        ],
    ) {
        let state = ConvState::AwaitingResponse { prompt };
        let result = transition(&state, &context, event).unwrap();
        prop_assert_eq!(result.new_state, ConvState::Idle);
        prop_assert_eq!(result.effects.len(), 1);
        prop_assert!(result.effects[0].appends_turn());
    }

    // Accepted input adds exactly the user turn before dispatch
    #[test]
    fn prop_input_appends_user_turn_first(
        text in "[a-zA-Z]{1,10}[a-zA-Z ]{0,20}",
        source in arb_source(),
        context in arb_context(),
    ) {
        let result = transition(&ConvState::Idle, &context, Event::UserInput {
            text: text.clone(),
            source,
        }).unwrap();

        prop_assert_eq!(result.effects.len(), 2);
        prop_assert_eq!(&result.effects[0], &Effect::append_user(text.clone()));
        prop_assert_eq!(&result.effects[1], &Effect::RequestAgent { prompt: text });
    }

    // Welcome is only ever produced for an empty transcript with nothing pending
    #[test]
    fn prop_welcome_gated(state in arb_state(), context in arb_context()) {
        let result = transition(&state, &context, Event::EnsureWelcome).unwrap();
        let welcomed = result.effects.contains(&Effect::AppendWelcome);

        prop_assert_eq!(
            welcomed,
            state == ConvState::Idle && context.transcript_empty && !context.pending_suggestion
        );
        prop_assert_eq!(result.new_state, state);
        prop_assert_eq!(request_count(&result.effects), 0);
    }

    // Sequences of events never leave more than one request outstanding
    #[test]
    fn prop_sequences_alternate_request_and_outcome(
        events in proptest::collection::vec(arb_event(), 0..30),
    ) {
        let mut state = ConvState::Idle;
        let mut outstanding = 0usize;
        let context = SessionContext::new("prop-session");

        for event in events {
            let is_outcome = matches!(event, Event::AgentReplied { .. } | Event::AgentFailed { .. });
            if let Ok(result) = transition(&state, &context, event) {
                outstanding += request_count(&result.effects);
                if is_outcome {
                    outstanding -= 1;
                }
                state = result.new_state;
                prop_assert!(outstanding <= 1);
                prop_assert_eq!(outstanding == 1, state.is_working());
            }
        }
    }
}
