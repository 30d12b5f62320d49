use anyhow::Context;
use clap::{Parser, Subcommand};
use graphx::prelude::*;
use graphx::report;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// In-memory weighted graph analytics
#[derive(Parser, Debug)]
#[command(name = "graphx")]
#[command(about = "Graph analytics over a JSON graph document", long_about = None)]
struct Args {
    /// Path to the graph document (JSON)
    #[arg(short, long)]
    input: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank nodes by PageRank
    Pagerank {
        #[arg(long, default_value_t = 0.85)]
        damping_factor: f64,

        #[arg(long, default_value_t = 1e-6)]
        tolerance: f64,

        #[arg(long, default_value_t = 100)]
        max_iterations: usize,
    },

    /// Partition nodes into communities by modularity
    Communities {
        /// Seed for the node visit order
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, default_value_t = 100)]
        max_passes: usize,
    },

    /// Jaccard similarity of every node pair
    Jaccard {
        /// Leave out pairs with no shared neighbour
        #[arg(long)]
        only_non_zero: bool,
    },

    /// Shortest paths from one node to every other
    Paths {
        #[arg(long)]
        source: String,

        /// Sum edge weights (Dijkstra) instead of counting hops (BFS)
        #[arg(long)]
        weighted: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout carries the report
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let document = GraphDocument::from_path(&args.input)
        .with_context(|| format!("failed to read graph from {:?}", args.input))?;
    let graph = document.into_graph();
    info!(
        "Loaded graph: {} nodes, {} edge records (directed: {}, weighted: {})",
        graph.node_count(),
        graph.edge_count(),
        graph.is_directed(),
        graph.is_weighted()
    );

    let output = match args.command {
        Command::Pagerank {
            damping_factor,
            tolerance,
            max_iterations,
        } => {
            let config = PageRankConfig::new()
                .with_damping_factor(damping_factor)
                .with_tolerance(tolerance)
                .with_max_iterations(max_iterations);
            let result = PageRank::with_config(&graph, config)?.compute();
            info!(
                "PageRank finished after {} iterations (converged: {})",
                result.iterations, result.converged
            );
            report::pagerank(&result)
        }
        Command::Communities { seed, max_passes } => {
            let mut config = CommunityConfig::new().with_max_passes(max_passes);
            if let Some(seed) = seed {
                config = config.with_seed(seed);
            }
            let result = CommunityDetection::with_config(&graph, config)?.detect();
            info!(
                "Found {} communities, modularity {:.6}",
                result.num_communities(),
                result.modularity
            );
            report::communities(&result)
        }
        Command::Jaccard { only_non_zero } => {
            let pairs = JaccardSimilarity::new(&graph).pairs(only_non_zero);
            info!("Scored {} node pairs", pairs.len());
            report::jaccard(&pairs)
        }
        Command::Paths { source, weighted } => {
            let search = ShortestPath::new(&graph);
            let paths = if weighted {
                search.dijkstra(&source)?
            } else {
                search.bfs(&source)?
            };
            info!(
                "{} of {} nodes reachable from {}",
                paths.reachable().count(),
                paths.len(),
                source
            );
            report::paths(&paths)
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
