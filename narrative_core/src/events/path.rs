//! Paths through a narrative graph.

use world_model::{Choice, State};

use super::Event;
use crate::narrative_graph::EventSet;

/// An ordered sequence of states joined by the choices taken between them.
///
/// A path over `n` states carries exactly `n - 1` choices. A single state is a
/// valid path with no choices.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    states: Vec<State>,
    choices: Vec<Choice>,
}

impl Path {
    /// Build a path. Returns `None` unless `states` is non-empty and holds
    /// exactly one more element than `choices`.
    pub fn new(states: Vec<State>, choices: Vec<Choice>) -> Option<Self> {
        if states.is_empty() || states.len() != choices.len() + 1 {
            return None;
        }
        Some(Self { states, choices })
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    /// First state of the path.
    pub fn start(&self) -> &State {
        &self.states[0]
    }

    /// Last state of the path.
    pub fn end(&self) -> &State {
        &self.states[self.states.len() - 1]
    }

    /// Number of transitions.
    pub fn len(&self) -> usize {
        self.choices.len()
    }

    /// Whether the path is a single state.
    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// One event per consecutive pair of states.
    pub fn events(&self) -> EventSet {
        self.states
            .windows(2)
            .zip(&self.choices)
            .map(|(pair, choice)| Event::new(pair[0].clone(), pair[1].clone(), choice.clone()))
            .collect()
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.start())?;
        for (choice, state) in self.choices.iter().zip(&self.states[1..]) {
            write!(f, " -> BY {} TO {}", choice, state)?;
        }
        Ok(())
    }
}
