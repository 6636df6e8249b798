//! Atom graph: data model plus k-NN topology construction.
//!
//! Topology is frozen at build time. The growth engine only ever mutates the
//! per-edge `cond` and `flow` scalars; nodes and the edge set never change.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::embed;

pub type NodeId = usize;

/// Conductance every edge starts with.
pub const COND_INIT: f64 = 0.10;
/// Conductance floor. Starved edges converge here, never below.
pub const COND_MIN: f64 = 0.001;
/// Conductance ceiling.
pub const COND_MAX: f64 = 1.5;

#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub text: String,
    // Computed once at build time, never mutated.
    pub embedding: Vec<f64>,
}

/// Undirected edge, unique per unordered pair (`u < v`).
#[derive(Debug, Clone)]
pub struct Edge {
    pub u: NodeId,
    pub v: NodeId,
    /// Fixed at creation; cosine clamped to `[0, 1]`.
    pub sim: f64,
    /// Accumulated reinforcement, in `[COND_MIN, COND_MAX]`.
    pub cond: f64,
    /// EMA-smoothed transport signal, in `[0, 1]`.
    pub flow: f64,
}

#[derive(Debug, Clone, Default)]
pub struct AtomGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    // adjacency[i] holds (neighbor id, index into edges).
    adjacency: Vec<Vec<(NodeId, usize)>>,
}

impl AtomGraph {
    /// Build a k-nearest-neighbor graph from index-aligned atoms and
    /// embeddings.
    ///
    /// Each node connects to its `k` most similar peers (ties prefer the
    /// lower index), so every node ends with at least `min(k, n - 1)`
    /// neighbors; being chosen by others can push the degree higher. An empty
    /// atom list yields an empty graph on which every operation is a no-op.
    ///
    /// # Panics
    /// Panics if `atoms` and `embeddings` differ in length or `k == 0`.
    pub fn build(atoms: Vec<String>, embeddings: Vec<Vec<f64>>, k: usize) -> Self {
        assert_eq!(
            atoms.len(),
            embeddings.len(),
            "atoms and embeddings must be index-aligned"
        );
        assert!(k >= 1, "k must be >= 1");

        let n = atoms.len();
        let sims = pairwise_cosine(&embeddings);

        let nodes: Vec<Node> = atoms
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(id, (text, embedding))| Node {
                id,
                text,
                embedding,
            })
            .collect();

        let mut edges: Vec<Edge> = Vec::new();
        let mut adjacency: Vec<Vec<(NodeId, usize)>> = vec![Vec::new(); n];

        for i in 0..n {
            let mut candidates: Vec<(NodeId, f64)> = (0..n)
                .filter(|&j| j != i)
                .map(|j| (j, sims[i * n + j]))
                .collect();
            // Descending similarity, ties broken by lower node index.
            candidates.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(core::cmp::Ordering::Equal)
                    .then(a.0.cmp(&b.0))
            });

            for &(j, s) in candidates.iter().take(k) {
                if adjacency[i].iter().any(|&(nb, _)| nb == j) {
                    continue;
                }
                let idx = edges.len();
                edges.push(Edge {
                    u: i.min(j),
                    v: i.max(j),
                    sim: s.max(0.0),
                    cond: COND_INIT,
                    flow: 0.0,
                });
                adjacency[i].push((j, idx));
                adjacency[j].push((i, idx));
            }
        }

        Self {
            nodes,
            edges,
            adjacency,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, idx: usize) -> &Edge {
        &self.edges[idx]
    }

    pub(crate) fn edges_mut(&mut self) -> &mut [Edge] {
        &mut self.edges
    }

    /// `(neighbor id, edge index)` pairs incident to `i`.
    pub fn neighbors(&self, i: NodeId) -> &[(NodeId, usize)] {
        &self.adjacency[i]
    }

    pub fn degree(&self, i: NodeId) -> usize {
        self.adjacency[i].len()
    }

    /// Sum of conductance over the edges incident to `i`.
    pub fn cond_sum(&self, i: NodeId) -> f64 {
        self.adjacency[i]
            .iter()
            .map(|&(_, idx)| self.edges[idx].cond)
            .sum()
    }
}

/// Dense pairwise cosine matrix (`n * n`, diagonal zero).
///
/// Values are raw cosines; the non-negative clamp happens at edge creation so
/// neighbor selection still sees the full ordering.
fn pairwise_cosine(embeddings: &[Vec<f64>]) -> Vec<f64> {
    let n = embeddings.len();

    #[cfg(feature = "parallel")]
    {
        (0..n)
            .into_par_iter()
            .flat_map_iter(|i| {
                (0..n).map(move |j| {
                    if i == j {
                        0.0
                    } else {
                        embed::cosine(&embeddings[i], &embeddings[j])
                    }
                })
            })
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        let mut sims = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let s = embed::cosine(&embeddings[i], &embeddings[j]);
                sims[i * n + j] = s;
                sims[j * n + i] = s;
            }
        }
        sims
    }
}
