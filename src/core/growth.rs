//! Growth engine: the iterative flow/conductance update rule.
//!
//! Each step reads the frozen similarities plus the current `cond`/`flow`
//! state and produces the next state. Steps are strictly sequential; step
//! `t + 1` depends on the complete result of step `t`.

use crate::graph::{AtomGraph, COND_MAX, COND_MIN};
use crate::nutrient;
use crate::prng::Prng;

/// Guard for max-normalization denominators.
const EPS: f64 = 1e-9;

/// Fixed per-run growth parameters.
#[derive(Debug, Clone, Copy)]
pub struct GrowthConfig {
    /// Flow memory decay for the EMA, in (0, 1).
    pub alpha: f64,
    /// Conductance gained by the edge carrying maximal relative flow.
    pub reinforce: f64,
    /// Constant conductance cost every edge pays every step.
    pub decay: f64,
    /// Scale of the per-edge Gaussian jitter (sigma = noise_scale * 0.02).
    pub noise_scale: f64,
    /// Seed for the jitter source; fixed seed means reproducible runs.
    pub seed: u64,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            alpha: 0.85,
            reinforce: 0.05,
            decay: 0.015,
            noise_scale: 0.02,
            seed: 42,
        }
    }
}

impl GrowthConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_noise_scale(mut self, noise_scale: f64) -> Self {
        self.noise_scale = noise_scale;
        self
    }
}

/// Simulation context owning the graph, configuration and noise source.
///
/// There is deliberately no global state: builder, growth engine and query
/// engine all go through this handle (or the graph it exposes).
pub struct Simulation {
    graph: AtomGraph,
    cfg: GrowthConfig,
    rng: Prng,
    step_index: u64,
    // Renderer feed: the uncertainty field computed by the latest step.
    last_uncertainty: Vec<f64>,
}

impl Simulation {
    pub fn new(graph: AtomGraph, cfg: GrowthConfig) -> Self {
        let rng = Prng::new(cfg.seed);
        Self {
            graph,
            cfg,
            rng,
            step_index: 0,
            last_uncertainty: Vec::new(),
        }
    }

    pub fn graph(&self) -> &AtomGraph {
        &self.graph
    }

    pub fn config(&self) -> &GrowthConfig {
        &self.cfg
    }

    /// Number of completed steps.
    pub fn step_index(&self) -> u64 {
        self.step_index
    }

    /// Uncertainty field from the latest step (empty before the first step).
    pub fn last_uncertainty(&self) -> &[f64] {
        &self.last_uncertainty
    }

    /// Consume the simulation, releasing the stabilized graph.
    pub fn into_graph(self) -> AtomGraph {
        self.graph
    }

    /// Run one growth step and return the step's uncertainty field.
    ///
    /// On a graph with no edges the flow/conductance phases are skipped
    /// entirely; the uncertainty field is still computed and returned.
    pub fn step(&mut self) -> Vec<f64> {
        let field = nutrient::uncertainty_field(&self.graph);
        self.step_index += 1;
        self.last_uncertainty = field.clone();

        if self.graph.edge_count() == 0 {
            return field;
        }

        // Propensity: attraction toward either endpoint's nutrient hotspot,
        // biased toward semantically coherent edges. The +0.4 floor keeps
        // dissimilar edges explorable.
        let props: Vec<f64> = self
            .graph
            .edges()
            .iter()
            .map(|e| field[e.u].max(field[e.v]) * (0.6 * e.sim + 0.4))
            .collect();
        let max_prop = props.iter().cloned().fold(0.0, f64::max);

        let alpha = self.cfg.alpha;
        for (edge, prop) in self.graph.edges_mut().iter_mut().zip(&props) {
            let normalized = prop / (max_prop + EPS);
            edge.flow = alpha * edge.flow + (1.0 - alpha) * normalized;
        }

        // Grow or starve: relative flow reinforces, constant decay starves.
        let max_flow = self
            .graph
            .edges()
            .iter()
            .map(|e| e.flow)
            .fold(0.0, f64::max);
        let reinforce = self.cfg.reinforce;
        let decay = self.cfg.decay;
        for edge in self.graph.edges_mut().iter_mut() {
            let f = edge.flow / (max_flow + EPS);
            edge.cond = (edge.cond + reinforce * f - decay).clamp(COND_MIN, COND_MAX);
        }

        // Jitter keeps minor exploration alive indefinitely. Sequential: the
        // PRNG is not thread-safe and the draw order is part of determinism.
        let sigma = self.cfg.noise_scale * 0.02;
        for edge in self.graph.edges_mut().iter_mut() {
            edge.cond = (edge.cond + self.rng.normal(0.0, sigma)).clamp(COND_MIN, COND_MAX);
        }

        field
    }

    /// Run `steps` sequential growth steps.
    pub fn run(&mut self, steps: usize) {
        for _ in 0..steps {
            self.step();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::WordTable;
    use crate::graph::NodeId;

    fn demo_graph(k: usize) -> AtomGraph {
        let mut table = WordTable::new(7);
        let atoms: Vec<String> = [
            "truth grows from evidence",
            "evidence decays without verification",
            "graph reasoning reinforces paths",
            "physarum explores the network",
            "uncertainty attracts attention",
            "questions deserve answers",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let embeddings: Vec<Vec<f64>> = atoms.iter().map(|a| table.embed(a)).collect();
        AtomGraph::build(atoms, embeddings, k)
    }

    #[test]
    fn state_stays_in_range_over_many_steps() {
        let mut sim = Simulation::new(demo_graph(2), GrowthConfig::default());
        for _ in 0..200 {
            let field = sim.step();
            for u in field {
                assert!((0.0..=nutrient::UNCERTAINTY_MAX).contains(&u));
            }
        }
        for e in sim.graph().edges() {
            assert!(
                (COND_MIN..=COND_MAX).contains(&e.cond),
                "cond {} out of range",
                e.cond
            );
            assert!((0.0..=1.0 + 1e-9).contains(&e.flow), "flow {} out of range", e.flow);
        }
    }

    #[test]
    fn topology_is_frozen_across_steps() {
        let graph = demo_graph(2);
        let before: Vec<(NodeId, NodeId)> = graph.edges().iter().map(|e| (e.u, e.v)).collect();
        let mut sim = Simulation::new(graph, GrowthConfig::default());
        sim.run(75);
        let after: Vec<(NodeId, NodeId)> = sim.graph().edges().iter().map(|e| (e.u, e.v)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn empty_graph_steps_are_noops() {
        let mut sim = Simulation::new(AtomGraph::default(), GrowthConfig::default());
        for _ in 0..10 {
            assert!(sim.step().is_empty());
        }
        assert_eq!(sim.step_index(), 10);
    }

    #[test]
    fn edgeless_graph_still_reports_uncertainty() {
        // One node, zero edges.
        let g = AtomGraph::build(vec!["alone".to_string()], vec![vec![1.0, 0.0]], 1);
        let mut sim = Simulation::new(g, GrowthConfig::default());
        let field = sim.step();
        assert_eq!(field, vec![1.0]);
    }

    #[test]
    fn runs_with_equal_seeds_are_bit_identical() {
        let mut a = Simulation::new(demo_graph(2), GrowthConfig::default().with_seed(99));
        let mut b = Simulation::new(demo_graph(2), GrowthConfig::default().with_seed(99));
        a.run(120);
        b.run(120);
        for (x, y) in a.graph().edges().iter().zip(b.graph().edges()) {
            assert_eq!(x.cond.to_bits(), y.cond.to_bits());
            assert_eq!(x.flow.to_bits(), y.flow.to_bits());
        }
    }

    #[test]
    fn zero_flow_edges_decay_monotonically_to_the_floor() {
        // Two identical pairs. Every node's sole neighbor agrees perfectly, so
        // uncertainty is 0 everywhere, every propensity is 0, and flow never
        // rises. Pure decay must walk conductance down to the floor and stop.
        let atoms = vec![
            "a".to_string(),
            "a".to_string(),
            "b".to_string(),
            "b".to_string(),
        ];
        let e = vec![
            vec![1.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![0.0, 1.0],
        ];
        let g = AtomGraph::build(atoms, e, 1);
        let mut sim = Simulation::new(g, GrowthConfig::default().with_noise_scale(0.0));

        let mut previous: Vec<f64> = sim.graph().edges().iter().map(|e| e.cond).collect();
        for _ in 0..30 {
            sim.step();
            for (e, prev) in sim.graph().edges().iter().zip(&previous) {
                assert!(e.flow == 0.0, "flow must stay zero, got {}", e.flow);
                assert!(e.cond <= *prev, "conductance must not rise under zero flow");
                assert!(e.cond >= COND_MIN);
            }
            previous = sim.graph().edges().iter().map(|e| e.cond).collect();
        }
        for e in sim.graph().edges() {
            assert!(
                (e.cond - COND_MIN).abs() < 1e-12,
                "starved edge should sit at the floor, got {}",
                e.cond
            );
        }
    }

    #[test]
    fn coherent_pair_out_conducts_the_outlier() {
        // Two near-identical atoms plus one outlier. After enough steps the
        // 0-1 edge must dominate every edge touching atom 2.
        let atoms = vec![
            "grow slowly".to_string(),
            "grow slowly".to_string(),
            "decay fast".to_string(),
        ];
        let e = vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]];
        let g = AtomGraph::build(atoms, e, 1);
        let mut sim = Simulation::new(g, GrowthConfig::default().with_noise_scale(0.0));
        sim.run(60);

        let g = sim.graph();
        let pair_cond = g
            .edges()
            .iter()
            .find(|e| (e.u, e.v) == (0, 1))
            .map(|e| e.cond)
            .expect("edge 0-1 must exist");
        for e in g.edges().iter().filter(|e| e.u == 2 || e.v == 2) {
            assert!(
                pair_cond > e.cond,
                "pair cond {} should exceed outlier edge cond {}",
                pair_cond,
                e.cond
            );
        }
    }

    #[test]
    fn flow_rises_for_selected_edges() {
        let mut sim = Simulation::new(demo_graph(2), GrowthConfig::default());
        sim.run(30);
        let max_flow = sim
            .graph()
            .edges()
            .iter()
            .map(|e| e.flow)
            .fold(0.0, f64::max);
        assert!(max_flow > 0.0);
    }
}
