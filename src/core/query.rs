//! Query/trace engine over the stabilized graph.
//!
//! Reads the graph strictly read-only: ranked retrieval biased by accumulated
//! conductance, plus a short greedy walk used as an explanatory path.

use serde::{Deserialize, Serialize};

use crate::embed;
use crate::graph::{AtomGraph, NodeId};

/// Maximum number of hops in the explanatory trace.
const TRACE_HOPS: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedAtom {
    pub text: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    pub query: String,
    pub results: Vec<RankedAtom>,
    pub trace_node_ids: Vec<NodeId>,
    pub trace_text: Vec<String>,
}

/// Rank nodes against a query embedding and trace the strongest path.
///
/// `score = 0.7 * similarity + 0.3 * cond_sum / (1 + cond_sum)`: the second
/// term saturates, so heavily reinforced hubs are favored but can never
/// drown out semantic similarity. Ties rank the lower node id first. A graph
/// with zero nodes returns empty results and an empty trace.
pub fn answer(graph: &AtomGraph, query: &str, query_vec: &[f64], topk: usize) -> QueryOutcome {
    let mut scored: Vec<(f64, NodeId)> = graph
        .nodes()
        .iter()
        .map(|node| {
            let sim = embed::similarity(query_vec, &node.embedding);
            let cond_sum = graph.cond_sum(node.id);
            let score = 0.7 * sim + 0.3 * (cond_sum / (1.0 + cond_sum));
            (score, node.id)
        })
        .collect();
    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(core::cmp::Ordering::Equal)
            .then(a.1.cmp(&b.1))
    });

    let results: Vec<RankedAtom> = scored
        .iter()
        .take(topk)
        .map(|&(score, id)| RankedAtom {
            text: graph.node(id).text.clone(),
            score,
        })
        .collect();

    let trace_node_ids = match scored.first() {
        Some(&(_, best)) => trace_from(graph, best),
        None => Vec::new(),
    };
    let trace_text = trace_node_ids
        .iter()
        .map(|&id| graph.node(id).text.clone())
        .collect();

    QueryOutcome {
        query: query.to_string(),
        results,
        trace_node_ids,
        trace_text,
    }
}

/// Bounded greedy walk along highest-conductance edges.
///
/// At each hop the strongest incident edge wins (ties to the lowest neighbor
/// id); the walk stops at a dead end or as soon as the strongest neighbor was
/// already visited. The start node is always included.
fn trace_from(graph: &AtomGraph, start: NodeId) -> Vec<NodeId> {
    let mut trace = vec![start];
    let mut current = start;

    for _ in 0..TRACE_HOPS {
        let mut best: Option<(f64, NodeId)> = None;
        for &(neighbor, idx) in graph.neighbors(current) {
            let cond = graph.edge(idx).cond;
            let better = match best {
                None => true,
                Some((bc, bn)) => cond > bc || (cond == bc && neighbor < bn),
            };
            if better {
                best = Some((cond, neighbor));
            }
        }

        match best {
            Some((_, next)) if !trace.contains(&next) => {
                trace.push(next);
                current = next;
            }
            // Dead end, or the strongest neighbor would close a cycle.
            _ => break,
        }
    }

    trace
}
