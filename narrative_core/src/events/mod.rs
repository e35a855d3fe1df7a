//! Events and paths: the concrete transitions recorded during generation.

mod path;

pub use path::*;

use world_model::{Choice, State};

/// One application of a choice: `(pre-state, post-state, choice)`.
///
/// Two different choices producing the same transition are two different
/// events.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Event {
    pre_state: State,
    post_state: State,
    choice: Choice,
}

impl Event {
    pub fn new(pre_state: State, post_state: State, choice: Choice) -> Self {
        Self {
            pre_state,
            post_state,
            choice,
        }
    }

    /// State the choice was taken in.
    pub fn pre_state(&self) -> &State {
        &self.pre_state
    }

    /// State the choice led to.
    pub fn post_state(&self) -> &State {
        &self.post_state
    }

    pub fn choice(&self) -> &Choice {
        &self.choice
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FROM {} TO {} BY {}",
            self.pre_state, self.post_state, self.choice
        )
    }
}
