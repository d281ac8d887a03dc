//! metaipm - CLI Entry Point
//!
//! Length-structured metapopulation projections.

use clap::{Parser, Subcommand};
use metaipm::export::ExportSystem;
use metaipm::path::project_transitions;
use metaipm::{benchmark, build_network, Config, StochasticRunner};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "metaipm")]
#[command(version)]
#[command(about = "Length-structured integral projection model for fish metapopulations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run stochastic iterations of a network
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of iterations (overrides the config)
        #[arg(short, long)]
        iterations: Option<usize>,

        /// Random seed for reproducibility (overrides the config)
        #[arg(long)]
        seed: Option<u64>,

        /// Output directory for results
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Run iterations in parallel
        #[arg(short, long)]
        parallel: bool,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },

    /// Describe a network and its annual transition probabilities
    Describe {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,
    },

    /// Run performance benchmark
    Benchmark {
        /// Years to project
        #[arg(short, long, default_value = "10")]
        years: usize,

        /// Mesh points
        #[arg(short, long, default_value = "100")]
        mesh_points: usize,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            iterations,
            seed,
            output,
            parallel,
        } => run_simulation(config, iterations, seed, output, parallel),

        Commands::Init { output } => {
            init_logging(None);
            generate_config(output)
        }

        Commands::Describe { config } => describe_network(config),

        Commands::Benchmark { years, mesh_points } => {
            init_logging(None);
            run_benchmark(years, mesh_points)
        }
    }
}

/// `RUST_LOG` wins over the configured level, which wins over `info`
fn init_logging(level: Option<&str>) {
    let default = level.unwrap_or("info");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn load_config(config_path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    if config_path.exists() {
        Ok(Config::from_file(config_path)?)
    } else {
        Ok(Config::default())
    }
}

fn run_simulation(
    config_path: PathBuf,
    iterations: Option<usize>,
    seed: Option<u64>,
    output: PathBuf,
    parallel: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(&config_path)?;
    init_logging(Some(&config.logging.log_level));

    if config_path.exists() {
        println!("Loading config from: {:?}", config_path);
    } else {
        println!("Using default configuration");
    }

    if let Some(n) = iterations {
        config.simulation.iterations = n;
    }
    if let Some(s) = seed {
        config.simulation.seed = Some(s);
    }

    let mut runner = StochasticRunner::new(config.clone())?;
    println!("Using seed: {}", runner.seed());

    println!("Starting projection");
    println!("  Network: {}", config.network.name);
    println!("  Nodes: {}", runner.network().nodes().len());
    println!("  Paths: {}", runner.network().paths().len());
    println!(
        "  Time: {} years x {} months",
        config.network.n_years, config.network.n_months
    );
    println!("  Iterations: {}", config.simulation.iterations);
    println!();

    let start = Instant::now();
    let ensemble = if parallel {
        runner.run_parallel()?
    } else {
        runner.run()?
    };
    let elapsed = start.elapsed();

    println!();
    println!("=== Projection Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Iterations: {}", ensemble.iterations);
    for (iteration, population) in ensemble.final_populations() {
        println!("  Iteration {}: final population {:.1}", iteration, population);
    }

    let manifest = ExportSystem::export_run(&ensemble.records, &ensemble.history, &output)?;
    println!("Populations: {} ({} records)", manifest.populations_file, manifest.records);
    println!("Stats history: {}", manifest.stats_file);

    Ok(())
}

fn describe_network(config_path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&config_path)?;
    init_logging(Some(&config.logging.log_level));

    let seed = config.simulation.seed.unwrap_or(0);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let network = build_network(&config, &mut rng)?;

    print!("{}", network);

    let n_months = network.n_months() as u32;
    println!("--- Annual transitions ({} steps) ---", n_months);
    for path in project_transitions(network.paths(), n_months) {
        println!("  {} -> {}, probability {:.4}", path.start, path.end, path.probability);
    }

    Ok(())
}

fn run_benchmark(years: usize, mesh_points: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== metaipm Benchmark ===");
    println!("Years: {}", years);
    println!("Mesh points: {}", mesh_points);
    println!();

    let result = benchmark(years, mesh_points)?;
    println!("{}", result);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}
