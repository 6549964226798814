//! Murmur CLI: run multi-agent searches over the built-in demo problems.
//!
//! Usage:
//!   mm-search presets
//!   mm-search run --preset neural-network --seed 7
//!   mm-search run --preset toy --config run.json --json
//!   mm-search compare --seed 1

mod presets;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use mm_search::{SearchConfig, SearchCoordinator};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mm-search")]
#[command(about = "Multi-agent configuration search with gossip-style knowledge sharing")]
struct Cli {
    /// Log new bests and knowledge exchanges
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one search on a preset objective
    Run(RunArgs),
    /// Compare all-random, all-greedy and mixed agent pools
    Compare {
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List the built-in presets
    Presets,
}

#[derive(clap::Args)]
struct RunArgs {
    /// Preset objective to optimize
    #[arg(short, long, default_value = "toy")]
    preset: String,

    /// JSON run configuration; replaces the preset's search space and defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    agents: Option<usize>,

    #[arg(long)]
    iterations: Option<usize>,

    /// Rounds between knowledge exchanges
    #[arg(long)]
    interval: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Run(args) => run(args, cli.verbose),
        Command::Compare { seed } => compare(seed),
        Command::Presets => {
            list_presets();
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(args: RunArgs, verbose: bool) -> anyhow::Result<()> {
    let preset = presets::find(&args.preset)
        .ok_or_else(|| anyhow!("unknown preset '{}' (see `mm-search presets`)", args.preset))?;

    let mut config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            SearchConfig::from_json_str(&raw)
                .with_context(|| format!("invalid run configuration in {}", path.display()))?
        }
        None => preset.config(),
    };
    if let Some(n) = args.agents {
        config.num_agents = n;
    }
    if let Some(n) = args.iterations {
        config.num_iterations = n;
    }
    if let Some(n) = args.interval {
        config.communication_interval = n;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    let seed = *config.seed.get_or_insert_with(rand::random);
    config.verbose |= verbose;

    info!("Running preset '{}' with seed {}", preset.name, seed);
    let space = config.search_space.clone();
    let objective = preset.objective(seed.wrapping_add(1));
    let mut coordinator = SearchCoordinator::from_config(config, objective)?;
    let best = coordinator.run()?;
    let stats = coordinator.statistics();

    if args.json {
        let report = serde_json::json!({
            "preset": preset.name,
            "seed": seed,
            "best": best.as_deref(),
            "statistics": stats,
            "status": coordinator.status(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("=== {} ===", preset.description);
    match space.grid_size() {
        Some(size) => println!("Search space: {size} configurations"),
        None => println!("Search space: too large to count"),
    }
    println!("Agents: {}", describe_pool(&coordinator));
    println!();
    match &best {
        Some(best) => println!("Best configuration found: {best}"),
        None => println!("No configuration was evaluated"),
    }
    println!("{stats}");
    if let Some(coverage) = stats.coverage(&space) {
        println!("Coverage:          {:.1}%", coverage * 100.0);
    }
    Ok(())
}

fn describe_pool<O: mm_search::Objective>(coordinator: &SearchCoordinator<O>) -> String {
    coordinator
        .agents()
        .iter()
        .map(|a| a.kind().as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn compare(seed: Option<u64>) -> anyhow::Result<()> {
    let preset = presets::find("comparison")
        .ok_or_else(|| anyhow!("comparison preset is missing"))?;
    let seed = seed.unwrap_or_else(rand::random);

    let pools: [(&str, [&str; 4]); 3] = [
        ("All Random", ["random"; 4]),
        ("All Greedy", ["greedy"; 4]),
        ("Mixed", ["random", "greedy", "random", "greedy"]),
    ];

    println!("Comparison: random vs greedy vs mixed (seed {seed})");
    println!("{:<12} {:>10} {:>12}  best config", "strategy", "best", "evaluations");
    for (label, kinds) in pools {
        let config = preset.config().with_agent_kinds(&kinds).with_seed(seed);
        let mut coordinator =
            SearchCoordinator::from_config(config, preset.objective(seed.wrapping_add(1)))?;
        let best = coordinator.run()?;
        let stats = coordinator.statistics();

        let (score, assignment) = match &best {
            Some(best) => (
                format!("{:.4}", best.score().unwrap_or(f64::NAN)),
                best.to_string(),
            ),
            None => ("-".to_string(), String::new()),
        };
        println!(
            "{:<12} {:>10} {:>12}  {}",
            label, score, stats.num_evaluated, assignment
        );
    }
    Ok(())
}

fn list_presets() {
    for preset in presets::all() {
        let size = preset
            .space()
            .grid_size()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "?".to_string());
        println!("{:<22} {:>6} configs  {}", preset.name, size, preset.description);
    }
}
