//! The immutable result of one generation pass.

use serde::Serialize;

use world_model::{Choice, State, TerminationCondition};

use super::{ChoiceSet, EdgeRef, EventSet, NarrativeGraph, StateSet};
use crate::assertions::{validate, Assertion, AssertionReport};
use crate::events::Event;
use crate::generator::GeneratorConfig;

/// A generated narrative space.
///
/// Holds the deduplicated state graph together with the sets derived from it
/// during generation. A model is never extended after it is produced; asking
/// "what if we started elsewhere" runs a new generation pass
/// (see [`sub_model_from`](crate::query::sub_model_from)).
#[derive(Debug, Clone)]
pub struct Model {
    graph: NarrativeGraph,
    initial_states: StateSet,
    termination_states: StateSet,
    dead_ends: StateSet,
    choices: ChoiceSet,
    termination_conditions: Vec<TerminationCondition>,
    events: EventSet,
    config: GeneratorConfig,
}

/// Counts describing a model, for logs and collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelSummary {
    pub nodes: usize,
    pub edges: usize,
    pub events: usize,
    pub initial_states: usize,
    pub termination_states: usize,
    pub dead_ends: usize,
    pub absolute_termination: bool,
}

impl Model {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        graph: NarrativeGraph,
        initial_states: StateSet,
        termination_states: StateSet,
        dead_ends: StateSet,
        choices: ChoiceSet,
        termination_conditions: Vec<TerminationCondition>,
        events: EventSet,
        config: GeneratorConfig,
    ) -> Self {
        Self {
            graph,
            initial_states,
            termination_states,
            dead_ends,
            choices,
            termination_conditions,
            events,
            config,
        }
    }

    /// The underlying state graph.
    pub fn graph(&self) -> &NarrativeGraph {
        &self.graph
    }

    /// Every node of the graph.
    pub fn states(&self) -> StateSet {
        self.graph.nodes().cloned().collect()
    }

    /// Every labelled edge of the graph.
    pub fn edges(&self) -> impl Iterator<Item = EdgeRef<'_>> {
        self.graph.edges()
    }

    /// The roots generation started from.
    pub fn initial_states(&self) -> &StateSet {
        &self.initial_states
    }

    /// Nodes in which at least one termination condition holds.
    pub fn termination_states(&self) -> &StateSet {
        &self.termination_states
    }

    /// Non-terminal nodes without any outgoing edge.
    pub fn dead_ends(&self) -> &StateSet {
        &self.dead_ends
    }

    /// The choice set the model was generated with.
    pub fn choices(&self) -> &ChoiceSet {
        &self.choices
    }

    /// Every recorded choice application.
    pub fn events(&self) -> &EventSet {
        &self.events
    }

    pub fn termination_conditions(&self) -> &[TerminationCondition] {
        &self.termination_conditions
    }

    /// Configuration the model was generated with.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Whether nothing can happen once the story has concluded: every
    /// termination state has zero outgoing edges.
    pub fn has_absolute_termination(&self) -> bool {
        self.termination_states.iter().all(|state| {
            self.graph
                .node_index(state)
                .map_or(true, |index| self.graph.out_degree(index) == 0)
        })
    }

    pub fn contains_state(&self, state: &State) -> bool {
        self.graph.contains(state)
    }

    /// Whether some edge of the graph carries `choice`.
    pub fn contains_choice(&self, choice: &Choice) -> bool {
        self.graph.edges().any(|edge| edge.choices.contains(choice))
    }

    /// Whether the edge `pre -> post` exists and carries the event's choice.
    pub fn contains_event(&self, event: &Event) -> bool {
        self.edge_choices(event.pre_state(), event.post_state())
            .map_or(false, |choices| choices.contains(event.choice()))
    }

    /// Direct successors of `state`, in edge insertion order.
    pub fn successors(&self, state: &State) -> Vec<&State> {
        self.graph
            .node_index(state)
            .map(|index| {
                self.graph
                    .successors(index)
                    .iter()
                    .filter_map(|&succ| self.graph.node(succ))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of distinct successors of `state`.
    pub fn out_degree(&self, state: &State) -> usize {
        self.graph
            .node_index(state)
            .map_or(0, |index| self.graph.out_degree(index))
    }

    /// Choices labelling the edge `from -> to`, if it exists.
    pub fn edge_choices(&self, from: &State, to: &State) -> Option<&ChoiceSet> {
        let from = self.graph.node_index(from)?;
        let to = self.graph.node_index(to)?;
        self.graph.edge_choices(from, to)
    }

    /// Each node paired with its shortest distance from the nearest initial
    /// state, in node order. Nodes no initial state reaches map to `None`.
    pub fn distances_from_initial(&self) -> Vec<(&State, Option<usize>)> {
        let sources = self
            .initial_states
            .iter()
            .filter_map(|state| self.graph.node_index(state));
        let distances = self.graph.distances_from(sources);
        self.graph.nodes().zip(distances).collect()
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            nodes: self.graph.node_count(),
            edges: self.graph.edge_count(),
            events: self.events.len(),
            initial_states: self.initial_states.len(),
            termination_states: self.termination_states.len(),
            dead_ends: self.dead_ends.len(),
            absolute_termination: self.has_absolute_termination(),
        }
    }

    /// Run `assertions` against this model, in order.
    pub fn validate_assertions<'a, I>(&self, assertions: I) -> AssertionReport
    where
        I: IntoIterator<Item = &'a Assertion>,
    {
        validate(assertions, self)
    }
}

impl EventSet {
    /// Whether some event starts or ends in `state`.
    pub fn mentions_state(&self, state: &State) -> bool {
        self.iter()
            .any(|event| event.pre_state() == state || event.post_state() == state)
    }

    /// Whether some event was produced by `choice`.
    pub fn mentions_choice(&self, choice: &Choice) -> bool {
        self.iter().any(|event| event.choice() == choice)
    }
}
