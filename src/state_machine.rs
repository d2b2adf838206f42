//! Conversation state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.
//! The controller in `runtime` executes the resulting effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::{Event, InputSource};
pub use state::{ConvState, SessionContext};
pub use transition::{transition, TransitionError};
