//! Read-only observation adapters.
//!
//! Design intent mirrors the simulation/renderer split:
//! - Observers cannot mutate or steer the simulation.
//! - Snapshotting is on-demand and may allocate; the step loop stays
//!   unchanged.
//! - The flat export is the only persistence surface the core promises.

use serde::{Deserialize, Serialize};

use crate::graph::{AtomGraph, NodeId};
use crate::growth::Simulation;
use crate::layout;

/// Per-step renderer feed: uncertainty per node, conductance per edge.
#[derive(Debug, Clone, Serialize)]
pub struct StepSnapshot {
    pub step_index: u64,
    pub uncertainty: Vec<f64>,
    pub conductance: Vec<EdgeConductance>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EdgeConductance {
    pub u: NodeId,
    pub v: NodeId,
    pub cond: f64,
}

/// Flat export of the stabilized graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphExport {
    pub nodes: Vec<NodeExport>,
    pub edges: Vec<EdgeExport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeExport {
    pub id: NodeId,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeExport {
    pub u: NodeId,
    pub v: NodeId,
    pub cond: f64,
    pub sim: f64,
}

impl GraphExport {
    /// Snapshot the graph with conductance/similarity rounded to 6 decimals.
    pub fn from_graph(graph: &AtomGraph) -> Self {
        Self {
            nodes: graph
                .nodes()
                .iter()
                .map(|n| NodeExport {
                    id: n.id,
                    text: n.text.clone(),
                })
                .collect(),
            edges: graph
                .edges()
                .iter()
                .map(|e| EdgeExport {
                    u: e.u,
                    v: e.v,
                    cond: round6(e.cond),
                    sim: round6(e.sim),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Read-only view over a running simulation.
pub struct SimAdapter<'a> {
    sim: &'a Simulation,
}

impl<'a> SimAdapter<'a> {
    pub fn new(sim: &'a Simulation) -> Self {
        Self { sim }
    }

    /// Renderer feed for the latest completed step.
    pub fn step_snapshot(&self) -> StepSnapshot {
        StepSnapshot {
            step_index: self.sim.step_index(),
            uncertainty: self.sim.last_uncertainty().to_vec(),
            conductance: self
                .sim
                .graph()
                .edges()
                .iter()
                .map(|e| EdgeConductance {
                    u: e.u,
                    v: e.v,
                    cond: e.cond,
                })
                .collect(),
        }
    }

    /// Static node positions, computed on demand from the frozen topology.
    pub fn positions(&self, seed: u64) -> Vec<(f64, f64)> {
        layout::spring_layout(self.sim.graph(), seed)
    }

    pub fn export(&self) -> GraphExport {
        GraphExport::from_graph(self.sim.graph())
    }
}

fn round6(x: f64) -> f64 {
    (x * 1e6).round() / 1e6
}
