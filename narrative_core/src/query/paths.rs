//! Path enumeration between state sets.

use world_model::{Choice, State};

use crate::events::Path;
use crate::narrative_graph::{Model, NarrativeGraph, NodeIndex, PathSet, StateSet};

/// Every simple path from a state in `from` to a state in `to`, expanded per
/// choice label.
///
/// A graph path visits no node twice. When an edge on it carries `k` choices,
/// the path is reported `k` times, once per choice, and this multiplies across
/// the edges of the path: a path over edges carrying `k1, k2, .., kn` choices
/// yields `k1 * k2 * .. * kn` paths. The number of simple paths is itself
/// exponential in the worst case, so only call this on small models or narrow
/// `from`/`to` sets.
///
/// A state that is both in `from` and in `to` yields the single-state path.
/// Paths keep extending past a target when further targets are reachable.
/// States of `from` that are not in the model are ignored.
pub fn paths_from_to(model: &Model, from: &StateSet, to: &StateSet) -> PathSet {
    let graph = model.graph();
    let targets: Vec<bool> = graph.nodes().map(|state| to.contains(state)).collect();

    let mut search = PathSearch {
        graph,
        targets: &targets,
        on_path: vec![false; graph.node_count()],
        trail: Vec::new(),
        found: PathSet::new(),
    };

    for state in from {
        if let Some(source) = graph.node_index(state) {
            search.visit(source);
        }
    }

    search.found
}

/// A node on the current trail and the next successor to try from it.
struct Frame {
    node: NodeIndex,
    next_successor: usize,
}

struct PathSearch<'a> {
    graph: &'a NarrativeGraph,
    targets: &'a [bool],
    on_path: Vec<bool>,
    trail: Vec<NodeIndex>,
    found: PathSet,
}

impl PathSearch<'_> {
    /// Depth-first search from `source` with an explicit frame stack, so the
    /// depth of the graph never bounds the depth of the call stack.
    fn visit(&mut self, source: NodeIndex) {
        let graph = self.graph;
        self.enter(source);
        let mut stack = vec![Frame {
            node: source,
            next_successor: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(&next) = graph.successors(frame.node).get(frame.next_successor) else {
                stack.pop();
                self.leave();
                continue;
            };
            frame.next_successor += 1;

            if !self.on_path[next] {
                self.enter(next);
                stack.push(Frame {
                    node: next,
                    next_successor: 0,
                });
            }
        }
    }

    fn enter(&mut self, node: NodeIndex) {
        self.on_path[node] = true;
        self.trail.push(node);
        if self.targets[node] {
            self.record();
        }
    }

    fn leave(&mut self) {
        if let Some(node) = self.trail.pop() {
            self.on_path[node] = false;
        }
    }

    /// Expand the current trail into one path per combination of edge labels.
    fn record(&mut self) {
        let states: Vec<State> = self
            .trail
            .iter()
            .filter_map(|&node| self.graph.node(node).cloned())
            .collect();

        let mut sequences: Vec<Vec<Choice>> = vec![Vec::with_capacity(self.trail.len())];
        for pair in self.trail.windows(2) {
            let Some(labels) = self.graph.edge_choices(pair[0], pair[1]) else {
                return;
            };
            let mut branched = Vec::with_capacity(sequences.len() * labels.len());
            for mut prefix in sequences {
                // The last label reuses the prefix, so single-label edges never copy it.
                for (k, choice) in labels.iter().enumerate() {
                    let mut sequence = if k + 1 == labels.len() {
                        std::mem::take(&mut prefix)
                    } else {
                        prefix.clone()
                    };
                    sequence.push(choice.clone());
                    branched.push(sequence);
                }
            }
            sequences = branched;
        }

        for choices in sequences {
            if let Some(path) = Path::new(states.clone(), choices) {
                self.found.insert(path);
            }
        }
    }
}
