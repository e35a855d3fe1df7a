//! Narrative Graph - the deduplicated directed graph of states.

use indexmap::{IndexMap, IndexSet};
use std::collections::VecDeque;

use world_model::{Choice, State};

use super::ChoiceSet;

/// Index of a node within a [`NarrativeGraph`].
pub type NodeIndex = usize;

/// A labelled edge as seen by callers.
#[derive(Debug, Clone, Copy)]
pub struct EdgeRef<'a> {
    pub from: &'a State,
    pub to: &'a State,
    /// Every choice that leads from `from` to `to`.
    pub choices: &'a ChoiceSet,
}

/// Directed graph whose nodes are distinct states.
///
/// Node identity is structural state equality: inserting a state equal to an
/// existing node returns the existing index. Parallel applications between
/// the same two states fold into a single edge whose label set grows.
#[derive(Debug, Clone, Default)]
pub struct NarrativeGraph {
    /// All distinct states, indexed by insertion order.
    nodes: IndexSet<State>,

    /// (from, to) -> choices labelling the edge.
    edges: IndexMap<(NodeIndex, NodeIndex), ChoiceSet>,

    /// Successor lists in edge insertion order.
    outgoing: Vec<Vec<NodeIndex>>,

    /// Predecessor lists in edge insertion order.
    incoming: Vec<Vec<NodeIndex>>,
}

impl NarrativeGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a state. Returns its index and whether it was newly added.
    pub(crate) fn add_node(&mut self, state: State) -> (NodeIndex, bool) {
        let (index, inserted) = self.nodes.insert_full(state);
        if inserted {
            self.outgoing.push(Vec::new());
            self.incoming.push(Vec::new());
        }
        (index, inserted)
    }

    /// Add `choice` to the label set of `from -> to`, creating the edge if
    /// needed. Returns whether the edge is new.
    pub(crate) fn add_edge_label(&mut self, from: NodeIndex, to: NodeIndex, choice: Choice) -> bool {
        let created = !self.edges.contains_key(&(from, to));
        if created {
            self.outgoing[from].push(to);
            self.incoming[to].push(from);
        }
        self.edges.entry((from, to)).or_default().insert(choice);
        created
    }

    /// Index of a state, if it is a node.
    pub fn node_index(&self, state: &State) -> Option<NodeIndex> {
        self.nodes.get_index_of(state)
    }

    /// State stored at `index`.
    pub fn node(&self, index: NodeIndex) -> Option<&State> {
        self.nodes.get_index(index)
    }

    pub fn contains(&self, state: &State) -> bool {
        self.nodes.contains(state)
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &State> {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All edges with their label sets.
    pub fn edges(&self) -> impl Iterator<Item = EdgeRef<'_>> {
        self.edges.iter().filter_map(move |(&(from, to), choices)| {
            Some(EdgeRef {
                from: self.nodes.get_index(from)?,
                to: self.nodes.get_index(to)?,
                choices,
            })
        })
    }

    /// Label set of `from -> to`, if the edge exists.
    pub fn edge_choices(&self, from: NodeIndex, to: NodeIndex) -> Option<&ChoiceSet> {
        self.edges.get(&(from, to))
    }

    pub fn successors(&self, index: NodeIndex) -> &[NodeIndex] {
        self.outgoing.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn predecessors(&self, index: NodeIndex) -> &[NodeIndex] {
        self.incoming.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn out_degree(&self, index: NodeIndex) -> usize {
        self.successors(index).len()
    }

    /// Breadth-first distance of every node from the nearest source.
    ///
    /// Unreachable nodes are `None`.
    pub fn distances_from(&self, sources: impl IntoIterator<Item = NodeIndex>) -> Vec<Option<usize>> {
        let mut distances = vec![None; self.nodes.len()];
        let mut queue = VecDeque::new();

        for source in sources {
            if let Some(slot) = distances.get_mut(source) {
                if slot.is_none() {
                    *slot = Some(0);
                    queue.push_back(source);
                }
            }
        }

        while let Some(node) = queue.pop_front() {
            let next = distances[node].map_or(0, |d| d + 1);
            for &succ in self.successors(node) {
                if distances[succ].is_none() {
                    distances[succ] = Some(next);
                    queue.push_back(succ);
                }
            }
        }

        distances
    }
}
