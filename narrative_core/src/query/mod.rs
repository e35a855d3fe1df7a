//! Query Algebra - pure projections and filters over models and sets.
//!
//! Every function takes its inputs by reference and returns a new set; no
//! query ever mutates a model or a set. Functions that accept "a model or a
//! set" are generic over a source trait, so the accepted input kinds are
//! fixed at compile time.

mod paths;

pub use paths::*;

use world_model::State;

use crate::error::Result;
use crate::events::Event;
use crate::generator::{Generator, NarrationSetting};
use crate::narrative_graph::{ChoiceSet, EventSet, Model, StateSet};

/// Anything states can be projected out of.
pub trait StateSource {
    fn project_states(&self) -> StateSet;
}

impl StateSource for Model {
    /// Every node of the graph.
    fn project_states(&self) -> StateSet {
        self.states()
    }
}

impl StateSource for StateSet {
    fn project_states(&self) -> StateSet {
        self.clone()
    }
}

impl StateSource for EventSet {
    /// The union of pre- and post-states.
    fn project_states(&self) -> StateSet {
        self.iter()
            .flat_map(|event| [event.pre_state().clone(), event.post_state().clone()])
            .collect()
    }
}

/// Anything choices can be projected out of.
pub trait ChoiceSource {
    fn project_choices(&self) -> ChoiceSet;
}

impl ChoiceSource for EventSet {
    fn project_choices(&self) -> ChoiceSet {
        self.iter().map(|event| event.choice().clone()).collect()
    }
}

impl ChoiceSource for Model {
    /// Choices that were actually applied somewhere in the graph.
    fn project_choices(&self) -> ChoiceSet {
        self.events().project_choices()
    }
}

/// States of a model, a state set, or an event set.
pub fn states_of<S: StateSource + ?Sized>(source: &S) -> StateSet {
    source.project_states()
}

/// Choices applied in an event set or a model.
pub fn choices_of<S: ChoiceSource + ?Sized>(source: &S) -> ChoiceSet {
    source.project_choices()
}

/// The full event set of a model.
pub fn events_in(model: &Model) -> EventSet {
    model.events().clone()
}

/// The state each event started in.
pub fn pre_states_of(events: &EventSet) -> StateSet {
    events.iter().map(|event| event.pre_state().clone()).collect()
}

/// The state each event ended in.
pub fn post_states_of(events: &EventSet) -> StateSet {
    events.iter().map(|event| event.post_state().clone()).collect()
}

/// States satisfying `predicate`.
pub fn filter_states<P>(predicate: P, states: &StateSet) -> Result<StateSet>
where
    P: Fn(&State) -> world_model::Result<bool>,
{
    let mut kept = StateSet::new();
    for state in states {
        if predicate(state)? {
            kept.insert(state.clone());
        }
    }
    Ok(kept)
}

fn filter_events<F>(events: &EventSet, mut keep: F) -> Result<EventSet>
where
    F: FnMut(&Event) -> world_model::Result<bool>,
{
    let mut kept = EventSet::new();
    for event in events {
        if keep(event)? {
            kept.insert(event.clone());
        }
    }
    Ok(kept)
}

/// Events whose pre-state satisfies `predicate`.
pub fn filter_events_by_pre_state<P>(predicate: P, events: &EventSet) -> Result<EventSet>
where
    P: Fn(&State) -> world_model::Result<bool>,
{
    filter_events(events, |event| predicate(event.pre_state()))
}

/// Events whose post-state satisfies `predicate`.
pub fn filter_events_by_post_state<P>(predicate: P, events: &EventSet) -> Result<EventSet>
where
    P: Fn(&State) -> world_model::Result<bool>,
{
    filter_events(events, |event| predicate(event.post_state()))
}

/// Events produced by one of `choices`.
pub fn filter_events_by_choice(choices: &ChoiceSet, events: &EventSet) -> EventSet {
    events
        .iter()
        .filter(|event| choices.contains(event.choice()))
        .cloned()
        .collect()
}

/// Generate a new model rooted at `states`, reusing `model`'s choices,
/// termination conditions and depth bound.
///
/// This is a full generation pass, not a view into `model`.
pub fn sub_model_from(states: &StateSet, model: &Model) -> Result<Model> {
    let setting = NarrationSetting::new(
        states.clone(),
        model.choices().clone(),
        model.termination_conditions().to_vec(),
    );
    Generator::new(model.config().clone()).generate(&setting)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate;
    use world_model::{adjust, Choice, Context, EntityClass, TerminationCondition, ValueKind};

    struct Fixture {
        start: State,
        inc: Choice,
        double: Choice,
        model: Model,
    }

    fn n(state: &State) -> i64 {
        state.int("C", "N").unwrap()
    }

    fn at(start: &State, value: i64) -> State {
        start.with("C", "N", value).unwrap()
    }

    // 0 -INC-> 1 -INC-> 2 -INC-> 3 (terminal), plus 1 -DOUBLE-> 2.
    fn fixture() -> Fixture {
        let class = EntityClass::new("counter")
            .with_property("N", ValueKind::Int, 0)
            .unwrap();
        let start = Context::new()
            .with_entity("C", &class)
            .unwrap()
            .initial_state();
        let inc = Choice::new("INC", |_| Ok(true), |s| adjust(s, "C", "N", 1));
        let double = Choice::new(
            "DOUBLE",
            |s| Ok(s.int("C", "N")? == 1),
            |s| s.with("C", "N", s.int("C", "N")? * 2),
        );
        let done = TerminationCondition::new("three", |s| Ok(s.int("C", "N")? >= 3));
        let model = generate(
            [start.clone()].into(),
            [inc.clone(), double.clone()].into(),
            vec![done],
            None,
        )
        .unwrap();
        Fixture {
            start,
            inc,
            double,
            model,
        }
    }

    #[test]
    fn test_states_of_each_source() {
        let f = fixture();
        assert_eq!(states_of(&f.model).len(), 4);

        let subset = StateSet::from([f.start.clone()]);
        assert_eq!(states_of(&subset), subset);

        let events = filter_events_by_choice(&[f.double.clone()].into(), f.model.events());
        assert_eq!(states_of(&events), StateSet::from([at(&f.start, 1), at(&f.start, 2)]));
    }

    #[test]
    fn test_pre_and_post_projections() {
        let f = fixture();
        let events = events_in(&f.model);
        assert_eq!(events.len(), 4);

        let pre: Vec<_> = pre_states_of(&events).iter().map(n).collect();
        let post: Vec<_> = post_states_of(&events).iter().map(n).collect();
        assert_eq!(pre.len(), 3);
        assert!(!pre.contains(&3));
        assert_eq!(post.len(), 3);
        assert!(!post.contains(&0));
    }

    #[test]
    fn test_filters() {
        let f = fixture();
        let odd = filter_states(|s| Ok(s.int("C", "N")? % 2 == 1), &f.model.states()).unwrap();
        assert_eq!(odd, StateSet::from([at(&f.start, 1), at(&f.start, 3)]));

        let from_one =
            filter_events_by_pre_state(|s| Ok(s.int("C", "N")? == 1), f.model.events()).unwrap();
        assert_eq!(from_one.len(), 2);
        assert_eq!(choices_of(&from_one), ChoiceSet::from([f.inc.clone(), f.double.clone()]));

        let into_two =
            filter_events_by_post_state(|s| Ok(s.int("C", "N")? == 2), f.model.events()).unwrap();
        assert_eq!(pre_states_of(&into_two), StateSet::from([at(&f.start, 1)]));
        assert!(into_two.mentions_choice(&f.double));
        assert!(into_two.mentions_state(&at(&f.start, 2)));
        assert!(!into_two.mentions_state(&f.start));
    }

    #[test]
    fn test_filter_errors_propagate() {
        let f = fixture();
        assert!(filter_states(|s| s.bool("C", "N"), &f.model.states()).is_err());
    }

    #[test]
    fn test_choices_of_model() {
        let f = fixture();
        assert_eq!(choices_of(&f.model), ChoiceSet::from([f.inc.clone(), f.double.clone()]));
        assert!(f.model.contains_choice(&f.double));
    }

    #[test]
    fn test_contains_event() {
        let f = fixture();
        let one = at(&f.start, 1);
        let two = at(&f.start, 2);
        assert!(f.model.contains_event(&Event::new(one.clone(), two.clone(), f.double.clone())));
        assert!(!f.model.contains_event(&Event::new(f.start.clone(), one, f.double.clone())));
        assert_eq!(f.model.out_degree(&two), 1);
        assert_eq!(f.model.successors(&two), vec![&at(&f.start, 3)]);
    }

    #[test]
    fn test_sub_model_from() {
        let f = fixture();
        let two = at(&f.start, 2);
        let three = at(&f.start, 3);

        let sub = sub_model_from(&[two.clone(), three].into(), &f.model).unwrap();
        // The already-terminal root is dropped.
        assert_eq!(sub.initial_states(), &StateSet::from([two]));
        assert_eq!(sub.states().len(), 2);
        assert_eq!(f.model.states().len(), 4);
    }
}
