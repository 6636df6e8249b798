//! Uncertainty ("nutrient") estimation.
//!
//! Low average agreement with neighbors or high disagreement among them both
//! signal informational deficit. The value is a pure function of the frozen
//! topology and similarities; it is recomputed fresh every step and never
//! stored on the node.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::graph::{AtomGraph, NodeId};

/// Ceiling of the uncertainty range.
pub const UNCERTAINTY_MAX: f64 = 1.2;

/// Uncertainty for a single node, in `[0, UNCERTAINTY_MAX]`.
///
/// A node with no neighbors returns exactly `1.0`.
pub fn node_uncertainty(graph: &AtomGraph, i: NodeId) -> f64 {
    let neighbors = graph.neighbors(i);
    if neighbors.is_empty() {
        return 1.0;
    }

    // Two-pass mean/variance keeps the reduction order-independent.
    let n = neighbors.len() as f64;
    let mean: f64 = neighbors
        .iter()
        .map(|&(_, idx)| graph.edge(idx).sim)
        .sum::<f64>()
        / n;
    let variance: f64 = neighbors
        .iter()
        .map(|&(_, idx)| {
            let d = graph.edge(idx).sim - mean;
            d * d
        })
        .sum::<f64>()
        / n;

    let u = 0.7 * (1.0 - mean) + 0.3 * (2.0 * variance).min(1.0);
    u.clamp(0.0, UNCERTAINTY_MAX)
}

/// Uncertainty for every node. Empty graph yields an empty vector.
pub fn uncertainty_field(graph: &AtomGraph) -> Vec<f64> {
    #[cfg(feature = "parallel")]
    {
        (0..graph.node_count())
            .into_par_iter()
            .map(|i| node_uncertainty(graph, i))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        (0..graph.node_count())
            .map(|i| node_uncertainty(graph, i))
            .collect()
    }
}
