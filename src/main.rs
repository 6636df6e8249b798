//! Demo binary: load atoms, grow the truth graph, export it, answer a query.
//!
//! Examples:
//!   myxo --atoms atoms.json --steps 100 --export truth_graph.json
//!   myxo --atoms atoms.json --query "what grows?" --topk 3
//!
//! The atoms file is a JSON array of strings, one atom per entry.

use std::fs;
use std::process;

use myxo::observer::SimAdapter;
use myxo::prelude::*;
use myxo::query;

struct Args {
    atoms: String,
    steps: usize,
    k: usize,
    seed: u64,
    export: Option<String>,
    query: Option<String>,
    topk: usize,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            atoms: "atoms.json".to_string(),
            steps: 100,
            k: 6,
            seed: 42,
            export: Some("truth_graph.json".to_string()),
            query: None,
            topk: 3,
        }
    }
}

fn usage() -> ! {
    eprintln!("myxo - physarum-inspired semantic reinforcement graph\n");
    eprintln!("Usage: myxo [options]");
    eprintln!("  --atoms FILE    JSON array of atom strings (default atoms.json)");
    eprintln!("  --steps N       growth steps to run (default 100)");
    eprintln!("  --k K           neighbors per node at build time (default 6)");
    eprintln!("  --seed S        seed for embeddings and jitter (default 42)");
    eprintln!("  --export FILE   write the stabilized graph as JSON (default truth_graph.json)");
    eprintln!("  --query TEXT    rank atoms against TEXT after stabilization");
    eprintln!("  --topk N        results to return for --query (default 3)");
    process::exit(2);
}

fn parse_args() -> Args {
    let mut out = Args::default();
    let mut args = std::env::args().skip(1);

    let missing = |flag: &str| -> ! {
        eprintln!("{} expects a value", flag);
        process::exit(2);
    };

    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--help" | "-h" | "help" => usage(),
            "--atoms" => out.atoms = args.next().unwrap_or_else(|| missing("--atoms")),
            "--steps" => {
                let v = args.next().unwrap_or_else(|| missing("--steps"));
                out.steps = v.parse().unwrap_or_else(|_| missing("--steps"));
            }
            "--k" => {
                let v = args.next().unwrap_or_else(|| missing("--k"));
                out.k = v.parse().unwrap_or_else(|_| missing("--k"));
            }
            "--seed" => {
                let v = args.next().unwrap_or_else(|| missing("--seed"));
                out.seed = v.parse().unwrap_or_else(|_| missing("--seed"));
            }
            "--export" => out.export = Some(args.next().unwrap_or_else(|| missing("--export"))),
            "--query" => out.query = Some(args.next().unwrap_or_else(|| missing("--query"))),
            "--topk" => {
                let v = args.next().unwrap_or_else(|| missing("--topk"));
                out.topk = v.parse().unwrap_or_else(|_| missing("--topk"));
            }
            other => {
                eprintln!("Unknown option: {}", other);
                usage();
            }
        }
    }

    out
}

fn main() {
    let args = parse_args();
    if let Err(e) = run(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(args: Args) -> myxo::Result<()> {
    let text = fs::read_to_string(&args.atoms)?;
    let atoms: Vec<String> =
        serde_json::from_str(&text).map_err(|_| myxo::Error::AtomsFormat)?;

    let mut table = WordTable::new(args.seed);
    let embeddings: Vec<Vec<f64>> = atoms.iter().map(|a| table.embed(a)).collect();
    let graph = AtomGraph::build(atoms, embeddings, args.k.max(1));
    println!(
        "graph: {} atoms, {} edges (k = {})",
        graph.node_count(),
        graph.edge_count(),
        args.k.max(1)
    );

    let mut sim = Simulation::new(graph, GrowthConfig::default().with_seed(args.seed));
    for t in 0..args.steps {
        let field = sim.step();
        if t % 20 == 0 || t + 1 == args.steps {
            let n = field.len().max(1) as f64;
            let mean_u: f64 = field.iter().sum::<f64>() / n;
            let edges = sim.graph().edges();
            let m = edges.len().max(1) as f64;
            let mean_cond: f64 = edges.iter().map(|e| e.cond).sum::<f64>() / m;
            let max_cond: f64 = edges.iter().map(|e| e.cond).fold(0.0, f64::max);
            println!(
                "t={t:4} mean_u={mean_u:.3} mean_cond={mean_cond:.3} max_cond={max_cond:.3}"
            );
        }
    }

    if let Some(path) = &args.export {
        let json = SimAdapter::new(&sim).export().to_json()?;
        fs::write(path, json)?;
        println!("Saved: {}", path);
    }

    if let Some(q) = args.query.as_deref().filter(|q| !q.trim().is_empty()) {
        let qv = table.embed(q);
        let out = query::answer(sim.graph(), q, &qv, args.topk);
        println!("\nInstant answer:");
        for r in &out.results {
            println!("  ({:.3}) {}", r.score, r.text);
        }
        println!("Trace: {}", out.trace_text.join(" -> "));
    }

    Ok(())
}
