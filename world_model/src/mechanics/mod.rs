//! Narrative mechanics: guarded choices and termination conditions.
//!
//! A [`Choice`] is a guard deciding whether it is available in a state and an
//! action producing the successor state. Both are author code and therefore
//! fallible: a guard or action that touches an undeclared entity or assigns a
//! value of the wrong kind fails with a [`ModelError`].

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ModelError, Result};
use crate::world_state::State;

/// Guard deciding whether a choice is enabled.
pub type Guard = dyn Fn(&State) -> Result<bool> + Send + Sync;

/// Action producing the successor state.
pub type Action = dyn Fn(&State) -> Result<State> + Send + Sync;

/// Predicate over a state (termination conditions, query filters).
pub type StatePredicate = dyn Fn(&State) -> Result<bool> + Send + Sync;

/// Unique identifier for choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChoiceId(pub Uuid);

impl ChoiceId {
    /// Create a new random choice ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ChoiceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ChoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A guarded state transition with a display label.
///
/// Cloning a choice keeps its identity: equality and hashing use the
/// [`ChoiceId`] only, never the label.
#[derive(Clone)]
pub struct Choice {
    id: ChoiceId,
    label: String,
    guard: Arc<Guard>,
    action: Arc<Action>,
}

impl Choice {
    /// Create a new choice.
    pub fn new<G, A>(label: impl Into<String>, guard: G, action: A) -> Self
    where
        G: Fn(&State) -> Result<bool> + Send + Sync + 'static,
        A: Fn(&State) -> Result<State> + Send + Sync + 'static,
    {
        Self {
            id: ChoiceId::new(),
            label: label.into(),
            guard: Arc::new(guard),
            action: Arc::new(action),
        }
    }

    pub fn id(&self) -> ChoiceId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the guard holds in `state`.
    pub fn is_enabled(&self, state: &State) -> Result<bool> {
        (self.guard)(state)
    }

    /// Run the action on `state`. The guard is not consulted.
    pub fn apply(&self, state: &State) -> Result<State> {
        (self.action)(state)
    }
}

impl PartialEq for Choice {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Choice {}

impl std::hash::Hash for Choice {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Debug for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Choice")
            .field("id", &self.id)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// A named predicate that stops expansion at the states it holds in.
#[derive(Clone)]
pub struct TerminationCondition {
    name: String,
    predicate: Arc<StatePredicate>,
}

impl TerminationCondition {
    pub fn new<P>(name: impl Into<String>, predicate: P) -> Self
    where
        P: Fn(&State) -> Result<bool> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the condition holds in `state`.
    pub fn holds(&self, state: &State) -> Result<bool> {
        (self.predicate)(state)
    }
}

impl std::fmt::Debug for TerminationCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminationCondition")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// The choices enabled in `state`, numbered from 0 in the order given.
///
/// The numbering is stable for a given input order, so it can be shown to a
/// player and fed back through [`apply`].
pub fn enabled_choices<'a, I>(state: &State, choices: I) -> Result<Vec<(usize, &'a Choice)>>
where
    I: IntoIterator<Item = &'a Choice>,
{
    let mut enabled = Vec::new();
    for choice in choices {
        if choice.is_enabled(state)? {
            enabled.push((enabled.len(), choice));
        }
    }
    Ok(enabled)
}

/// Apply `choice` to `state`, producing the successor state.
pub fn apply(choice: &Choice, state: &State) -> Result<State> {
    choice.apply(state)
}

/// Whether any of `conditions` holds in `state`.
pub fn is_terminal<'a, I>(state: &State, conditions: I) -> Result<bool>
where
    I: IntoIterator<Item = &'a TerminationCondition>,
{
    for condition in conditions {
        if condition.holds(state)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Convenience for guards that only read integers.
pub fn at_least(state: &State, entity: &str, property: &str, minimum: i64) -> Result<bool> {
    Ok(state.int(entity, property)? >= minimum)
}

/// Add `delta` to an integer property.
pub fn adjust(state: &State, entity: &str, property: &str, delta: i64) -> Result<State> {
    let current = state.int(entity, property)?;
    let next = current
        .checked_add(delta)
        .ok_or_else(|| ModelError::ArithmeticOverflow(property.to_string()))?;
    state.with(entity, property, next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{EntityClass, ValueKind};
    use crate::world_state::Context;

    fn context() -> Context {
        let player = EntityClass::new("player")
            .with_property("WOOD", ValueKind::Int, 0)
            .unwrap();
        Context::new().with_entity("PLAYER", &player).unwrap()
    }

    fn cut_tree() -> Choice {
        Choice::new(
            "CUT A TREE",
            |s| Ok(s.int("PLAYER", "WOOD")? < 14),
            |s| adjust(s, "PLAYER", "WOOD", 7),
        )
    }

    fn burn_wood() -> Choice {
        Choice::new(
            "BURN WOOD",
            |s| at_least(s, "PLAYER", "WOOD", 1),
            |s| s.with("PLAYER", "WOOD", 0),
        )
    }

    #[test]
    fn test_choice_identity() {
        let a = cut_tree();
        let b = cut_tree();
        assert_eq!(a, a.clone());
        assert_ne!(a, b, "same label, different rule objects");
    }

    #[test]
    fn test_enabled_choices_are_indexed_in_order() {
        let choices = vec![cut_tree(), burn_wood()];
        let start = context().initial_state();

        let enabled = enabled_choices(&start, &choices).unwrap();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].0, 0);
        assert_eq!(enabled[0].1.label(), "CUT A TREE");

        let next = apply(enabled[0].1, &start).unwrap();
        let enabled = enabled_choices(&next, &choices).unwrap();
        let labels: Vec<_> = enabled.iter().map(|(i, c)| (*i, c.label())).collect();
        assert_eq!(labels, vec![(0, "CUT A TREE"), (1, "BURN WOOD")]);
    }

    #[test]
    fn test_guard_errors_propagate() {
        let broken = Choice::new("BROKEN", |s| s.bool("PLAYER", "WOOD"), |s| Ok(s.clone()));
        let start = context().initial_state();
        assert!(matches!(
            enabled_choices(&start, [&broken]),
            Err(ModelError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_is_terminal() {
        let conditions = vec![
            TerminationCondition::new("rich", |s| at_least(s, "PLAYER", "WOOD", 14)),
            TerminationCondition::new("never", |_| Ok(false)),
        ];
        let start = context().initial_state();
        assert!(!is_terminal(&start, &conditions).unwrap());

        let rich = start.with("PLAYER", "WOOD", 21).unwrap();
        assert!(is_terminal(&rich, &conditions).unwrap());
        let none: Vec<TerminationCondition> = Vec::new();
        assert!(!is_terminal(&rich, &none).unwrap());
    }
}
