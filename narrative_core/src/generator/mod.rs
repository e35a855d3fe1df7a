//! State Space Generator - exhaustive exploration of a narration setting.
//!
//! Generation works as follows:
//! 1. **Roots**: every initial state in which no termination condition holds
//!    becomes a node at depth 1
//! 2. **Expansion**: for each root, depth-first, every enabled choice is
//!    applied and the resulting state inserted into the graph
//! 3. **Deduplication**: a state equal to an existing node is linked but
//!    never expanded again, so cycles in the rules collapse into a finite graph
//! 4. **Classification**: termination states and dead ends are collected once
//!    expansion is complete

mod config;

pub use config::*;

use tracing::{debug, info};
use world_model::{is_terminal, State, TerminationCondition};

use crate::error::Result;
use crate::events::Event;
use crate::narrative_graph::{ChoiceSet, EventSet, Model, NarrativeGraph, NodeIndex, StateSet};

/// Everything a generation pass starts from.
#[derive(Debug, Clone, Default)]
pub struct NarrationSetting {
    pub initial_states: StateSet,
    pub choices: ChoiceSet,
    /// Evaluated in declared order.
    pub termination_conditions: Vec<TerminationCondition>,
}

impl NarrationSetting {
    pub fn new(
        initial_states: StateSet,
        choices: ChoiceSet,
        termination_conditions: Vec<TerminationCondition>,
    ) -> Self {
        Self {
            initial_states,
            choices,
            termination_conditions,
        }
    }
}

/// A node awaiting (or undergoing) expansion.
struct Frame {
    node: NodeIndex,
    state: State,
    depth: usize,
    next_choice: usize,
}

/// Builds [`Model`]s from narration settings.
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    /// Create a new generator with the given configuration.
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Create a generator with default configuration (unbounded depth).
    pub fn with_defaults() -> Self {
        Self::new(GeneratorConfig::default())
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Explore every state reachable from the setting's initial states.
    ///
    /// Errors raised by guards, actions, or termination conditions abort
    /// generation and are returned unchanged.
    pub fn generate(&self, setting: &NarrationSetting) -> Result<Model> {
        info!(
            initial_states = setting.initial_states.len(),
            choices = setting.choices.len(),
            max_depth = ?self.config.max_depth,
            "Generating narrative model"
        );

        let conditions = &setting.termination_conditions;
        let choices: Vec<_> = setting.choices.iter().collect();
        let mut graph = NarrativeGraph::new();
        let mut events = EventSet::new();
        let mut terminal = Vec::new();

        // All roots are nodes before any of them is expanded.
        let mut roots = Vec::new();
        for state in &setting.initial_states {
            if is_terminal(state, conditions)? {
                debug!(%state, "Skipping initial state that is already terminal");
                continue;
            }
            let (node, inserted) = graph.add_node(state.clone());
            if inserted {
                terminal.push(false);
                roots.push(node);
            }
        }
        let initial_states: StateSet = roots
            .iter()
            .filter_map(|&node| graph.node(node).cloned())
            .collect();

        for root in roots {
            let Some(state) = graph.node(root).cloned() else {
                continue;
            };
            debug!(%state, "Expanding root");

            let mut stack = vec![Frame {
                node: root,
                state,
                depth: 1,
                next_choice: 0,
            }];

            while let Some(frame) = stack.last_mut() {
                let Some(&choice) = choices.get(frame.next_choice) else {
                    stack.pop();
                    continue;
                };
                frame.next_choice += 1;

                if !choice.is_enabled(&frame.state)? {
                    continue;
                }
                let post = choice.apply(&frame.state)?;
                let (from, depth) = (frame.node, frame.depth);
                let pre = frame.state.clone();

                let (to, inserted) = graph.add_node(post.clone());
                let mut expand = false;
                if inserted {
                    let ends = is_terminal(&post, conditions)?;
                    terminal.push(ends);
                    expand = !ends && self.config.allows_expansion(depth);
                }

                graph.add_edge_label(from, to, choice.clone());
                events.insert(Event::new(pre, post.clone(), choice.clone()));

                if expand {
                    stack.push(Frame {
                        node: to,
                        state: post,
                        depth: depth + 1,
                        next_choice: 0,
                    });
                }
            }
        }

        let mut termination_states = StateSet::new();
        let mut dead_ends = StateSet::new();
        for (node, state) in graph.nodes().enumerate() {
            if terminal.get(node).copied().unwrap_or(false) {
                termination_states.insert(state.clone());
            } else if graph.out_degree(node) == 0 {
                debug!(%state, "Dead end");
                dead_ends.insert(state.clone());
            }
        }

        let model = Model::new(
            graph,
            initial_states,
            termination_states,
            dead_ends,
            setting.choices.clone(),
            setting.termination_conditions.clone(),
            events,
            self.config.clone(),
        );

        let summary = model.summary();
        info!(
            nodes = summary.nodes,
            edges = summary.edges,
            events = summary.events,
            termination_states = summary.termination_states,
            dead_ends = summary.dead_ends,
            "Narrative model generated"
        );

        Ok(model)
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Generate a model with an optional depth bound.
pub fn generate(
    initial_states: StateSet,
    choices: ChoiceSet,
    termination_conditions: Vec<TerminationCondition>,
    max_depth: Option<usize>,
) -> Result<Model> {
    let setting = NarrationSetting::new(initial_states, choices, termination_conditions);
    Generator::new(GeneratorConfig { max_depth }).generate(&setting)
}
