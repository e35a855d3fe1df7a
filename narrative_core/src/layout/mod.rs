//! Spatial Layout Synthesizer - infer a map of locations from a model.
//!
//! The synthesis works as follows:
//! 1. **Tagging**: each edge is tagged with the locations of the choices
//!    labelling it
//! 2. **Observation**: at every node, each (incoming edge, outgoing edge) pair
//!    witnesses the location pairs it crosses
//! 3. **Ranking**: candidate pairs are ranked by how often they were observed,
//!    then by how deep in the story they first appear
//! 4. **Reduction**: the ranked pairs are turned into a sparse connected map
//!    or a dense planar one
//!
//! Both layouts are hints for world design. Nothing here feeds back into
//! generation.

mod planarity;

pub use planarity::is_planar;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::{BTreeSet, VecDeque};
use tracing::debug;

use world_model::{Choice, ChoiceId};

use crate::narrative_graph::{Model, NodeIndex};

/// Mapping from choices to the location they take place in.
///
/// Choices without a tag do not contribute to any layout.
#[derive(Debug, Clone, Default)]
pub struct LocationTags {
    tags: IndexMap<ChoiceId, String>,
}

impl LocationTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag `choice` with `location`, replacing any previous tag.
    pub fn insert(&mut self, choice: &Choice, location: impl Into<String>) {
        self.tags.insert(choice.id(), location.into());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_tag(mut self, choice: &Choice, location: impl Into<String>) -> Self {
        self.insert(choice, location);
        self
    }

    pub fn get(&self, choice: &Choice) -> Option<&str> {
        self.tags.get(&choice.id()).map(String::as_str)
    }

    /// Distinct locations, in first-tagged order.
    pub fn locations(&self) -> Vec<String> {
        self.tags
            .values()
            .cloned()
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect()
    }
}

/// An unordered location pair with the evidence for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdjacencyCandidate {
    /// Lexicographically smaller location.
    pub a: String,
    /// Lexicographically larger location.
    pub b: String,
    /// Number of (incoming edge, node, outgoing edge) observations.
    pub frequency: usize,
    /// Smallest distance from an initial state to a node witnessing the
    /// pair. `None` when the pair was never observed.
    pub depth: Option<usize>,
}

impl AdjacencyCandidate {
    fn ranking_key(&self) -> (Reverse<usize>, Reverse<Option<usize>>, &str, &str) {
        // Option orders None below Some, so unobserved depths rank last.
        (
            Reverse(self.frequency),
            Reverse(self.depth),
            self.a.as_str(),
            self.b.as_str(),
        )
    }
}

fn pair(x: &str, y: &str) -> (String, String) {
    if x <= y {
        (x.to_string(), y.to_string())
    } else {
        (y.to_string(), x.to_string())
    }
}

/// Rank every pair of distinct locations, strongest evidence first.
///
/// Order: frequency descending, then depth descending (unobserved last), then
/// location names ascending.
pub fn rank_adjacencies(model: &Model, tags: &LocationTags) -> Vec<AdjacencyCandidate> {
    let graph = model.graph();
    let locations = tags.locations();

    let mut candidates: IndexMap<(String, String), AdjacencyCandidate> = IndexMap::new();
    for (i, x) in locations.iter().enumerate() {
        for y in &locations[i + 1..] {
            let (a, b) = pair(x, y);
            candidates.insert(
                (a.clone(), b.clone()),
                AdjacencyCandidate {
                    a,
                    b,
                    frequency: 0,
                    depth: None,
                },
            );
        }
    }

    let edge_tags = |from: NodeIndex, to: NodeIndex| {
        graph
            .edge_choices(from, to)
            .map(|choices| {
                choices
                    .iter()
                    .filter_map(|c| tags.get(c))
                    .collect::<IndexSet<_>>()
            })
            .unwrap_or_default()
    };

    let distances = model.distances_from_initial();
    for (node, (_, distance)) in distances.iter().enumerate() {
        for &pred in graph.predecessors(node) {
            let incoming = edge_tags(pred, node);
            if incoming.is_empty() {
                continue;
            }
            for &succ in graph.successors(node) {
                let outgoing = edge_tags(node, succ);

                let witnessed: IndexSet<(String, String)> = incoming
                    .iter()
                    .flat_map(|x| outgoing.iter().map(move |y| (*x, *y)))
                    .filter(|(x, y)| x != y)
                    .map(|(x, y)| pair(x, y))
                    .collect();

                for key in witnessed {
                    if let Some(candidate) = candidates.get_mut(&key) {
                        candidate.frequency += 1;
                        candidate.depth = match (candidate.depth, *distance) {
                            (Some(current), Some(d)) => Some(current.min(d)),
                            (current, d) => current.or(d),
                        };
                    }
                }
            }
        }
    }

    let mut ranked: Vec<_> = candidates.into_values().collect();
    ranked.sort_by(|x, y| x.ranking_key().cmp(&y.ranking_key()));
    ranked
}

/// An undirected graph over location names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutGraph {
    locations: Vec<String>,
    /// Each edge with its endpoints in ascending order.
    edges: BTreeSet<(String, String)>,
}

impl LayoutGraph {
    /// A graph over `locations` without edges.
    pub fn empty(locations: Vec<String>) -> Self {
        Self {
            locations,
            edges: BTreeSet::new(),
        }
    }

    /// The complete graph over `locations`, without self-loops.
    pub fn complete(locations: Vec<String>) -> Self {
        let mut graph = Self::empty(locations);
        let names = graph.locations.clone();
        for (i, x) in names.iter().enumerate() {
            for y in &names[i + 1..] {
                graph.add_edge(x, y);
            }
        }
        graph
    }

    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges.iter().map(|(a, b)| (a.as_str(), b.as_str()))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains_edge(&self, x: &str, y: &str) -> bool {
        self.edges.contains(&pair(x, y))
    }

    /// Add an edge. Self-loops are ignored.
    pub fn add_edge(&mut self, x: &str, y: &str) -> bool {
        x != y && self.edges.insert(pair(x, y))
    }

    pub fn remove_edge(&mut self, x: &str, y: &str) -> bool {
        self.edges.remove(&pair(x, y))
    }

    fn index(&self, location: &str) -> Option<usize> {
        self.locations.iter().position(|l| l == location)
    }

    fn indexed_edges(&self) -> Vec<(usize, usize)> {
        self.edges
            .iter()
            .filter_map(|(a, b)| Some((self.index(a)?, self.index(b)?)))
            .collect()
    }

    /// Whether every location can reach every other one. Graphs with fewer
    /// than two locations are connected.
    pub fn is_connected(&self) -> bool {
        if self.locations.len() < 2 {
            return true;
        }
        let mut adjacency = vec![Vec::new(); self.locations.len()];
        for (a, b) in self.indexed_edges() {
            adjacency[a].push(b);
            adjacency[b].push(a);
        }

        let mut seen = vec![false; self.locations.len()];
        let mut queue = VecDeque::from([0]);
        seen[0] = true;
        let mut reached = 1;
        while let Some(u) = queue.pop_front() {
            for &v in &adjacency[u] {
                if !seen[v] {
                    seen[v] = true;
                    reached += 1;
                    queue.push_back(v);
                }
            }
        }
        reached == self.locations.len()
    }

    pub fn is_planar(&self) -> bool {
        is_planar(self.locations.len(), &self.indexed_edges())
    }
}

/// Greedily add the strongest location pairs until every location is
/// reachable from every other one.
///
/// This is a connectivity heuristic, not a minimum spanning tree: a pair is
/// added even when its locations are already connected.
pub fn sparse_layout(model: &Model, tags: &LocationTags) -> LayoutGraph {
    let mut layout = LayoutGraph::empty(tags.locations());
    for candidate in rank_adjacencies(model, tags) {
        if layout.is_connected() {
            break;
        }
        debug!(a = %candidate.a, b = %candidate.b, frequency = candidate.frequency, "Adding adjacency");
        layout.add_edge(&candidate.a, &candidate.b);
    }
    layout
}

/// Start from every location adjacent to every other one and drop the weakest
/// pairs until the map can be drawn without crossings.
pub fn high_connectivity_layout(model: &Model, tags: &LocationTags) -> LayoutGraph {
    let mut layout = LayoutGraph::complete(tags.locations());
    let ranked = rank_adjacencies(model, tags);
    for candidate in ranked.iter().rev() {
        if layout.is_planar() {
            break;
        }
        debug!(a = %candidate.a, b = %candidate.b, frequency = candidate.frequency, "Removing adjacency");
        layout.remove_edge(&candidate.a, &candidate.b);
    }
    layout
}
