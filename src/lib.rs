//! # myxo
//!
//! Physarum-inspired semantic reinforcement over a small graph of text
//! "atoms": a k-nearest-neighbor topology built once from pairwise
//! similarity, then an iterative flow/conductance loop that strengthens
//! coherent, high-confidence paths while starving the rest.
//!
//! ## Quick Start
//!
//! ```
//! use myxo::prelude::*;
//! use myxo::query;
//!
//! let mut table = WordTable::new(7);
//! let atoms: Vec<String> = ["truth grows", "evidence decays", "graph reasoning"]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//! let embeddings: Vec<Vec<f64>> = atoms.iter().map(|a| table.embed(a)).collect();
//!
//! let graph = AtomGraph::build(atoms, embeddings, 2);
//! let mut sim = Simulation::new(graph, GrowthConfig::default().with_seed(42));
//! sim.run(100);
//!
//! let qv = table.embed("what grows?");
//! let answer = query::answer(sim.graph(), "what grows?", &qv, 3);
//! assert!(answer.results.len() <= 3);
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel`: compute the pairwise similarity matrix and the per-node
//!   uncertainty field via rayon. Steps themselves are always sequential;
//!   step `t + 1` depends on the complete result of step `t`.
//!
//! ## Modules
//!
//! - [`graph`]: data model and k-NN topology construction
//! - [`nutrient`]: per-node uncertainty estimation
//! - [`growth`]: the reinforcement/decay simulation loop
//! - [`query`]: ranked retrieval and the explanatory trace
//! - [`embed`]: deterministic word-vector collaborator
//! - [`layout`]: static positions for renderers
//! - [`observer`]: read-only snapshot and export adapters

#[path = "core/prng.rs"]
pub mod prng;

#[path = "core/embed.rs"]
pub mod embed;

#[path = "core/graph.rs"]
pub mod graph;

#[path = "core/nutrient.rs"]
pub mod nutrient;

#[path = "core/growth.rs"]
pub mod growth;

#[path = "core/query.rs"]
pub mod query;

#[path = "core/layout.rs"]
pub mod layout;

pub mod observer;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("atoms file must be a JSON array of strings")]
    AtomsFormat,
}

pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use crate::embed::{cosine, similarity, WordTable, EMBED_DIM};
    pub use crate::graph::{AtomGraph, Edge, Node, NodeId, COND_INIT, COND_MAX, COND_MIN};
    pub use crate::growth::{GrowthConfig, Simulation};
    pub use crate::nutrient::{node_uncertainty, uncertainty_field, UNCERTAINTY_MAX};
    pub use crate::observer::{GraphExport, SimAdapter, StepSnapshot};
    pub use crate::query::{QueryOutcome, RankedAtom};
}
