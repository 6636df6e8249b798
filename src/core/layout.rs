//! Static node positions for the renderer contract.
//!
//! Computed once after topology construction; the simulation itself never
//! reads positions. Plain Fruchterman-Reingold with a linear cooling
//! schedule, seeded for reproducible frames.

use crate::graph::AtomGraph;
use crate::prng::Prng;

const ITERATIONS: usize = 50;
const MIN_DIST: f64 = 1e-9;

/// Seeded force-directed layout; one `(x, y)` per node, roughly in the unit
/// square around the origin.
pub fn spring_layout(graph: &AtomGraph, seed: u64) -> Vec<(f64, f64)> {
    let n = graph.node_count();
    if n == 0 {
        return Vec::new();
    }

    let mut rng = Prng::new(seed);
    let mut pos: Vec<(f64, f64)> = (0..n)
        .map(|_| (rng.gen_range_f64(-0.5, 0.5), rng.gen_range_f64(-0.5, 0.5)))
        .collect();
    if n == 1 {
        return pos;
    }

    // Ideal pairwise distance for unit area.
    let k = (1.0 / n as f64).sqrt();

    for iter in 0..ITERATIONS {
        let temp = 0.1 * (1.0 - iter as f64 / ITERATIONS as f64);
        let mut disp = vec![(0.0f64, 0.0f64); n];

        // Repulsion between every pair.
        for i in 0..n {
            for j in (i + 1)..n {
                let dx = pos[i].0 - pos[j].0;
                let dy = pos[i].1 - pos[j].1;
                let dist = (dx * dx + dy * dy).sqrt().max(MIN_DIST);
                let force = k * k / dist;
                let (ux, uy) = (dx / dist, dy / dist);
                disp[i].0 += ux * force;
                disp[i].1 += uy * force;
                disp[j].0 -= ux * force;
                disp[j].1 -= uy * force;
            }
        }

        // Attraction along edges.
        for e in graph.edges() {
            let dx = pos[e.u].0 - pos[e.v].0;
            let dy = pos[e.u].1 - pos[e.v].1;
            let dist = (dx * dx + dy * dy).sqrt().max(MIN_DIST);
            let force = dist * dist / k;
            let (ux, uy) = (dx / dist, dy / dist);
            disp[e.u].0 -= ux * force;
            disp[e.u].1 -= uy * force;
            disp[e.v].0 += ux * force;
            disp[e.v].1 += uy * force;
        }

        // Apply, capped by the cooling temperature.
        for i in 0..n {
            let (dx, dy) = disp[i];
            let len = (dx * dx + dy * dy).sqrt().max(MIN_DIST);
            let step = len.min(temp);
            pos[i].0 += dx / len * step;
            pos[i].1 += dy / len * step;
        }
    }

    pos
}
