//! Planarity testing for small undirected graphs.
//!
//! The graph is split into biconnected components and each component is
//! embedded incrementally (Demoucron, Malgrange and Pertuiset): starting from
//! a cycle, repeatedly pick a fragment of the not-yet-embedded graph and route
//! one of its paths through a face that contains all of its attachment
//! vertices. A fragment with no such face proves the component non-planar.

use std::collections::{BTreeSet, HashSet, VecDeque};

type Edge = (usize, usize);

fn normalize(a: usize, b: usize) -> Edge {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Whether the simple undirected graph on `vertex_count` vertices with the
/// given edges can be drawn in the plane without crossings.
///
/// Self-loops, duplicates and edges to vertices outside the range are ignored.
pub fn is_planar(vertex_count: usize, edges: &[Edge]) -> bool {
    let edges: BTreeSet<Edge> = edges
        .iter()
        .filter(|&&(a, b)| a != b && a < vertex_count && b < vertex_count)
        .map(|&(a, b)| normalize(a, b))
        .collect();

    if vertex_count < 5 || edges.len() < 9 {
        return true;
    }
    if edges.len() > 3 * vertex_count - 6 {
        return false;
    }

    let mut adjacency = vec![Vec::new(); vertex_count];
    for &(a, b) in &edges {
        adjacency[a].push(b);
        adjacency[b].push(a);
    }

    biconnected_components(&adjacency)
        .iter()
        .all(|block| block_is_planar(block))
}

/// Edge sets of the biconnected components (Tarjan, with an edge stack).
fn biconnected_components(adjacency: &[Vec<usize>]) -> Vec<Vec<Edge>> {
    let mut search = BlockSearch {
        adjacency,
        discovery: vec![None; adjacency.len()],
        low: vec![0; adjacency.len()],
        time: 0,
        stack: Vec::new(),
        blocks: Vec::new(),
    };
    for vertex in 0..adjacency.len() {
        if search.discovery[vertex].is_none() {
            search.visit(vertex, None);
        }
    }
    search.blocks
}

struct BlockSearch<'a> {
    adjacency: &'a [Vec<usize>],
    discovery: Vec<Option<usize>>,
    low: Vec<usize>,
    time: usize,
    stack: Vec<Edge>,
    blocks: Vec<Vec<Edge>>,
}

impl BlockSearch<'_> {
    fn visit(&mut self, u: usize, parent: Option<usize>) {
        self.time += 1;
        let discovered = self.time;
        self.discovery[u] = Some(discovered);
        self.low[u] = discovered;

        let adjacency = self.adjacency;
        for &v in &adjacency[u] {
            match self.discovery[v] {
                None => {
                    self.stack.push((u, v));
                    self.visit(v, Some(u));
                    self.low[u] = self.low[u].min(self.low[v]);
                    if self.low[v] >= discovered {
                        let mut block = Vec::new();
                        while let Some(edge) = self.stack.pop() {
                            block.push(normalize(edge.0, edge.1));
                            if edge == (u, v) {
                                break;
                            }
                        }
                        self.blocks.push(block);
                    }
                }
                Some(seen) if Some(v) != parent && seen < discovered => {
                    self.stack.push((u, v));
                    self.low[u] = self.low[u].min(seen);
                }
                Some(_) => {}
            }
        }
    }
}

fn block_is_planar(block: &[Edge]) -> bool {
    let vertices: BTreeSet<usize> = block.iter().flat_map(|&(a, b)| [a, b]).collect();
    if vertices.len() < 5 || block.len() < 9 {
        return true;
    }
    if block.len() > 3 * vertices.len() - 6 {
        return false;
    }

    // Relabel to 0..n.
    let local: Vec<usize> = vertices.into_iter().collect();
    let index = |v: usize| local.binary_search(&v).unwrap_or(0);
    let mut adjacency = vec![BTreeSet::new(); local.len()];
    for &(a, b) in block {
        let (a, b) = (index(a), index(b));
        adjacency[a].insert(b);
        adjacency[b].insert(a);
    }

    Embedding::new(&adjacency).map_or(true, |embedding| embedding.complete())
}

/// A part of the graph not yet embedded, hanging off embedded vertices.
struct Fragment {
    /// Non-embedded vertices of the fragment; empty for a lone chord.
    interior: BTreeSet<usize>,
    /// Embedded vertices the fragment touches.
    attachments: Vec<usize>,
}

struct Embedding<'a> {
    adjacency: &'a [BTreeSet<usize>],
    embedded_vertices: Vec<bool>,
    embedded_edges: HashSet<Edge>,
    edge_count: usize,
    /// Each face as the cyclic sequence of its boundary vertices.
    faces: Vec<Vec<usize>>,
}

impl<'a> Embedding<'a> {
    /// Embed an initial cycle through the first edge. `None` if the block has
    /// no cycle.
    fn new(adjacency: &'a [BTreeSet<usize>]) -> Option<Self> {
        let edge_count = adjacency.iter().map(BTreeSet::len).sum::<usize>() / 2;
        let a = adjacency.iter().position(|n| !n.is_empty())?;
        let b = *adjacency[a].iter().next()?;
        let cycle = shortest_path_avoiding_edge(adjacency, a, b)?;

        let mut embedding = Self {
            adjacency,
            embedded_vertices: vec![false; adjacency.len()],
            embedded_edges: HashSet::new(),
            edge_count,
            faces: vec![cycle.clone(), cycle.clone()],
        };
        embedding.embed_path(&cycle);
        embedding.embedded_edges.insert(normalize(a, b));
        Some(embedding)
    }

    fn embed_path(&mut self, path: &[usize]) {
        for &v in path {
            self.embedded_vertices[v] = true;
        }
        for pair in path.windows(2) {
            self.embedded_edges.insert(normalize(pair[0], pair[1]));
        }
    }

    /// Run the embedding to completion. Returns `false` as soon as a fragment
    /// fits in no face.
    fn complete(mut self) -> bool {
        while self.embedded_edges.len() < self.edge_count {
            let fragments = self.fragments();
            if fragments.is_empty() {
                return true;
            }

            let mut candidates = Vec::with_capacity(fragments.len());
            for fragment in &fragments {
                let faces = self.admissible_faces(fragment);
                if faces.is_empty() {
                    return false;
                }
                candidates.push(faces);
            }

            let chosen = candidates
                .iter()
                .position(|faces| faces.len() == 1)
                .unwrap_or(0);
            let face = candidates[chosen][0];
            let Some(path) = self.fragment_path(&fragments[chosen]) else {
                return true;
            };

            self.embed_path(&path);
            self.split_face(face, &path);
        }
        true
    }

    fn fragments(&self) -> Vec<Fragment> {
        let mut fragments = Vec::new();

        // Chords: non-embedded edges between two embedded vertices.
        for (u, neighbours) in self.adjacency.iter().enumerate() {
            if !self.embedded_vertices[u] {
                continue;
            }
            for &v in neighbours {
                if u < v
                    && self.embedded_vertices[v]
                    && !self.embedded_edges.contains(&(u, v))
                {
                    fragments.push(Fragment {
                        interior: BTreeSet::new(),
                        attachments: vec![u, v],
                    });
                }
            }
        }

        // Components of non-embedded vertices.
        let mut assigned = vec![false; self.adjacency.len()];
        for start in 0..self.adjacency.len() {
            if self.embedded_vertices[start] || assigned[start] {
                continue;
            }
            let mut interior = BTreeSet::new();
            let mut attachments = BTreeSet::new();
            let mut queue = VecDeque::from([start]);
            assigned[start] = true;

            while let Some(u) = queue.pop_front() {
                interior.insert(u);
                for &v in &self.adjacency[u] {
                    if self.embedded_vertices[v] {
                        attachments.insert(v);
                    } else if !assigned[v] {
                        assigned[v] = true;
                        queue.push_back(v);
                    }
                }
            }

            fragments.push(Fragment {
                interior,
                attachments: attachments.into_iter().collect(),
            });
        }

        fragments.retain(|f| f.attachments.len() >= 2);
        fragments
    }

    fn admissible_faces(&self, fragment: &Fragment) -> Vec<usize> {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, face)| fragment.attachments.iter().all(|a| face.contains(a)))
            .map(|(i, _)| i)
            .collect()
    }

    /// A path through the fragment joining two distinct attachments.
    fn fragment_path(&self, fragment: &Fragment) -> Option<Vec<usize>> {
        let source = *fragment.attachments.first()?;
        if fragment.interior.is_empty() {
            return fragment.attachments.get(1).map(|&b| vec![source, b]);
        }

        let mut previous = vec![None; self.adjacency.len()];
        let mut queue = VecDeque::new();
        for &v in &self.adjacency[source] {
            if fragment.interior.contains(&v) && previous[v].is_none() {
                previous[v] = Some(source);
                queue.push_back(v);
            }
        }

        while let Some(u) = queue.pop_front() {
            for &v in &self.adjacency[u] {
                if v == source || previous[v].is_some() {
                    continue;
                }
                if self.embedded_vertices[v] {
                    let mut path = vec![v, u];
                    let mut current = u;
                    while let Some(p) = previous[current] {
                        path.push(p);
                        if p == source {
                            break;
                        }
                        current = p;
                    }
                    path.reverse();
                    return Some(path);
                }
                if fragment.interior.contains(&v) {
                    previous[v] = Some(u);
                    queue.push_back(v);
                }
            }
        }
        None
    }

    /// Split `face` along `path`, whose end points lie on the face boundary.
    fn split_face(&mut self, face: usize, path: &[usize]) {
        let boundary = &self.faces[face];
        let (Some(&a), Some(&b)) = (path.first(), path.last()) else {
            return;
        };
        let (Some(i), Some(j)) = (
            boundary.iter().position(|&v| v == a),
            boundary.iter().position(|&v| v == b),
        ) else {
            return;
        };
        let interior = &path[1..path.len() - 1];

        let mut first = cyclic_walk(boundary, i, j);
        first.extend(interior.iter().rev());
        let mut second = cyclic_walk(boundary, j, i);
        second.extend(interior.iter());

        self.faces[face] = first;
        self.faces.push(second);
    }
}

/// Boundary vertices from position `from` to position `to`, inclusive,
/// wrapping around.
fn cyclic_walk(boundary: &[usize], from: usize, to: usize) -> Vec<usize> {
    let mut walk = Vec::new();
    let mut k = from;
    loop {
        walk.push(boundary[k]);
        if k == to {
            break;
        }
        k = (k + 1) % boundary.len();
    }
    walk
}

/// Shortest path from `a` to `b` that does not use the edge `a - b` itself.
fn shortest_path_avoiding_edge(adjacency: &[BTreeSet<usize>], a: usize, b: usize) -> Option<Vec<usize>> {
    let mut previous = vec![None; adjacency.len()];
    let mut visited = vec![false; adjacency.len()];
    let mut queue = VecDeque::from([a]);
    visited[a] = true;

    while let Some(u) = queue.pop_front() {
        for &v in &adjacency[u] {
            if visited[v] || (u == a && v == b) {
                continue;
            }
            visited[v] = true;
            previous[v] = Some(u);
            if v == b {
                let mut path = vec![b];
                let mut current = b;
                while let Some(p) = previous[current] {
                    path.push(p);
                    current = p;
                }
                path.reverse();
                return Some(path);
            }
            queue.push_back(v);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(n: usize) -> Vec<Edge> {
        (0..n)
            .flat_map(|a| (a + 1..n).map(move |b| (a, b)))
            .collect()
    }

    #[test]
    fn test_small_graphs_are_planar() {
        assert!(is_planar(0, &[]));
        assert!(is_planar(4, &complete(4)));
    }

    #[test]
    fn test_complete_graphs() {
        assert!(!is_planar(5, &complete(5)));

        let mut k5_minus_edge = complete(5);
        k5_minus_edge.pop();
        assert!(is_planar(5, &k5_minus_edge));
    }

    #[test]
    fn test_k33_is_not_planar() {
        let edges: Vec<Edge> = (0..3)
            .flat_map(|a| (3..6).map(move |b| (a, b)))
            .collect();
        assert!(!is_planar(6, &edges));
    }

    #[test]
    fn test_petersen_graph_is_not_planar() {
        let outer = [(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)];
        let spokes = [(0, 5), (1, 6), (2, 7), (3, 8), (4, 9)];
        let inner = [(5, 7), (7, 9), (9, 6), (6, 8), (8, 5)];
        let edges: Vec<Edge> = outer.into_iter().chain(spokes).chain(inner).collect();
        assert!(!is_planar(10, &edges));
    }

    #[test]
    fn test_cube_is_planar() {
        #[rustfmt::skip]
        let edges = [
            (0, 1), (1, 2), (2, 3), (3, 0),
            (4, 5), (5, 6), (6, 7), (7, 4),
            (0, 4), (1, 5), (2, 6), (3, 7),
        ];
        assert!(is_planar(8, &edges));
    }

    #[test]
    fn test_octahedron_is_planar() {
        // K6 minus a perfect matching: maximal planar with 3V - 6 edges.
        let edges: Vec<Edge> = complete(6)
            .into_iter()
            .filter(|&(a, b)| !matches!((a, b), (0, 1) | (2, 3) | (4, 5)))
            .collect();
        assert_eq!(edges.len(), 12);
        assert!(is_planar(6, &edges));
    }

    #[test]
    fn test_grid_is_planar() {
        let mut edges = Vec::new();
        for row in 0..3 {
            for col in 0..3 {
                let v = row * 3 + col;
                if col < 2 {
                    edges.push((v, v + 1));
                }
                if row < 2 {
                    edges.push((v, v + 3));
                }
            }
        }
        assert!(is_planar(9, &edges));
    }

    #[test]
    fn test_non_planar_block_behind_a_cut_vertex() {
        // K3,3 joined to a triangle through vertex 0.
        let mut edges: Vec<Edge> = (0..3)
            .flat_map(|a| (3..6).map(move |b| (a, b)))
            .collect();
        edges.extend([(0, 6), (6, 7), (7, 0)]);
        assert!(!is_planar(8, &edges));
    }

    #[test]
    fn test_ignores_loops_and_duplicates() {
        let mut edges = complete(4);
        edges.extend([(0, 0), (1, 0), (3, 2), (2, 9)]);
        assert!(is_planar(5, &edges));
    }
}
