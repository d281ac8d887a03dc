//! # metaipm
//!
//! Length-structured integral projection model for fish metapopulations.
//!
//! ## Features
//!
//! - **Structured**: groups tracked over a length mesh and monthly time steps
//! - **Spatial**: nodes connected by density-coupled migration paths
//! - **Stochastic**: redrawn spawning and candidate parameters per iteration
//! - **Parallel**: ensembles across CPU cores via Rayon
//! - **Configurable**: YAML configuration files
//! - **Reproducible**: Seeded random number generation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use metaipm::{build_network, Config};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let config = Config::default();
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let mut network = build_network(&config, &mut rng).unwrap();
//!
//! network.project();
//!
//! let last = network.n_times() - 1;
//! println!("Population: {:.1}", network.population(last));
//! ```
//!
//! ## Stochastic ensembles
//!
//! ```rust,no_run
//! use metaipm::{Config, StochasticRunner};
//!
//! let mut config = Config::default();
//! config.simulation.iterations = 50;
//!
//! let runner = StochasticRunner::new_with_seed(config, 7).unwrap();
//! let ensemble = runner.run_parallel().unwrap();
//! println!("Records: {}", ensemble.records.len());
//! ```

pub mod builder;
pub mod config;
pub mod curves;
pub mod export;
pub mod group;
pub mod mesh;
pub mod network;
pub mod node;
pub mod params;
pub mod path;
pub mod projection;
pub mod spawning;
pub mod stats;
pub mod stochastic;

// Re-export main types
pub use builder::build_network;
pub use config::{Config, ConfigError};
pub use network::Network;
pub use params::ParameterStrategy;
pub use stochastic::{Ensemble, StochasticRunner};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Time full projections of the default network
pub fn benchmark(years: usize, mesh_points: usize) -> Result<BenchmarkResult, ConfigError> {
    use rand::SeedableRng;
    use std::time::Instant;

    let mut config = Config::default();
    config.network.n_years = years;
    config.network.mesh.n_points = mesh_points;

    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(0);
    let mut network = build_network(&config, &mut rng)?;
    let last = network.n_times() - 1;

    let start = Instant::now();
    network.project();
    let elapsed = start.elapsed();

    let steps = years * network.n_months();
    Ok(BenchmarkResult {
        steps,
        mesh_points,
        nodes: network.nodes().len(),
        initial_population: network.population(0),
        final_population: network.population(last),
        elapsed_secs: elapsed.as_secs_f64(),
        steps_per_second: steps as f64 / elapsed.as_secs_f64(),
    })
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub steps: usize,
    pub mesh_points: usize,
    pub nodes: usize,
    pub initial_population: f64,
    pub final_population: f64,
    pub elapsed_secs: f64,
    pub steps_per_second: f64,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Steps: {}", self.steps)?;
        writeln!(f, "Mesh points: {}", self.mesh_points)?;
        writeln!(f, "Nodes: {}", self.nodes)?;
        writeln!(
            f,
            "Population: {:.1} -> {:.1}",
            self.initial_population, self.final_population
        )?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} steps/s", self.steps_per_second)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_quick_projection() {
        let mut config = Config::default();
        config.network.n_years = 1;
        let mut rng = <rand_chacha::ChaCha8Rng as rand::SeedableRng>::seed_from_u64(1);
        let mut network = build_network(&config, &mut rng).unwrap();

        network.project();

        assert_eq!(network.n_times(), 13);
        assert!(network.population(12) > 0.0);
    }

    #[test]
    fn test_benchmark() {
        let result = benchmark(1, 20).unwrap();

        assert_eq!(result.steps, 12);
        assert_eq!(result.nodes, 2);
        assert!(result.steps_per_second > 0.0);
    }
}
