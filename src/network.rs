//! Network: nodes, paths, mesh and spawning schedule for one simulation run.

use crate::config::ConfigError;
use crate::mesh::{Mesh, MeshConfig};
use crate::node::Node;
use crate::params::{ParameterError, ParameterStrategy};
use crate::path::{MigrationLoad, Path};
use crate::projection::Projection;
use crate::spawning::{Spawning, SpawningConfig};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Network-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
    pub n_years: usize,
    /// Time steps per year
    pub n_months: usize,
    pub mesh: MeshConfig,
    pub spawning: SpawningConfig,
    /// Fraction of spawned eggs that become viable recruits
    pub egg_viability: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: "metaipm".to_string(),
            n_years: 10,
            n_months: 12,
            mesh: MeshConfig::default(),
            spawning: SpawningConfig::default(),
            egg_viability: 0.001,
        }
    }
}

/// Nodes and the paths connecting them
#[derive(Debug, Clone, Default)]
pub struct Topology {
    pub nodes: Vec<Node>,
    pub paths: Vec<Path>,
}

impl Topology {
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name() == name)
    }

    pub fn node_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.node(name).is_some()
    }
}

/// A metapopulation network
#[derive(Debug, Clone)]
pub struct Network {
    name: String,
    pub topology: Topology,
    mesh: Mesh,
    spawning: Spawning,
    projection: Projection,
}

impl Network {
    /// Create an empty network. Spawning must carry a probability for every year.
    pub fn new(
        name: &str,
        n_years: usize,
        n_months: usize,
        mesh: Mesh,
        spawning: Spawning,
        egg_viability: f64,
    ) -> Result<Self, ConfigError> {
        if spawning.probability().len() < n_years {
            return Err(ConfigError::Invalid(format!(
                "{}: spawning probabilities cover {} years, projection needs {}",
                name,
                spawning.probability().len(),
                n_years
            )));
        }

        Ok(Self {
            name: name.to_string(),
            topology: Topology::default(),
            mesh,
            spawning,
            projection: Projection::new(n_years, n_months, egg_viability),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn spawning(&self) -> &Spawning {
        &self.spawning
    }

    pub fn n_years(&self) -> usize {
        self.projection.n_years
    }

    pub fn n_months(&self) -> usize {
        self.projection.n_months
    }

    pub fn egg_viability(&self) -> f64 {
        self.projection.egg_viability
    }

    /// Number of time columns in every group
    pub fn n_times(&self) -> usize {
        self.n_years() * self.n_months() + 1
    }

    pub fn nodes(&self) -> &[Node] {
        &self.topology.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.topology.nodes
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.topology.node(name)
    }

    pub fn paths(&self) -> &[Path] {
        &self.topology.paths
    }

    pub fn add_node(&mut self, node: Node) {
        self.topology.nodes.push(node);
    }

    /// Replace the path set. Paths naming an unknown node are skipped with a warning.
    pub fn set_paths(&mut self, paths: Vec<Path>) {
        let topology = &self.topology;
        let (kept, dropped): (Vec<Path>, Vec<Path>) = paths
            .into_iter()
            .partition(|p| topology.contains(&p.start) && topology.contains(&p.end));

        for path in &dropped {
            log::warn!(
                "path {} -> {} references a node not in network '{}', path omitted",
                path.start,
                path.end,
                self.name
            );
        }

        self.topology.paths = kept;
    }

    /// Project every node and path over all years and months
    pub fn project(&mut self) {
        self.projection
            .run(&mut self.topology, &self.mesh, &self.spawning);
    }

    /// Project a single month
    pub fn project_step(&mut self, year: usize, month: usize) -> Vec<MigrationLoad> {
        self.projection
            .step(&mut self.topology, &self.mesh, &self.spawning, year, month)
    }

    /// Reset every group to its starting distribution
    pub fn clear_nodes(&mut self) {
        for node in &mut self.topology.nodes {
            node.clear();
        }
    }

    /// New yearly spawning probabilities
    pub fn redraw_spawning<R: Rng + ?Sized>(
        &mut self,
        strategy: ParameterStrategy,
        rng: &mut R,
    ) -> Result<(), ParameterError> {
        let n_years = self.n_years();
        self.spawning.redraw(n_years, strategy, rng)
    }

    /// New biology for every node, in node order
    pub fn redraw_nodes<R: Rng + ?Sized>(
        &mut self,
        strategy: ParameterStrategy,
        rng: &mut R,
    ) -> Result<(), ParameterError> {
        let n_months = self.n_months();
        for node in &mut self.topology.nodes {
            node.redraw(strategy, rng, n_months)?;
        }
        Ok(())
    }

    /// Total individuals over every node and group at a time index
    pub fn population(&self, time: usize) -> f64 {
        self.topology.nodes.iter().map(|n| n.population(time)).sum()
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Network: {} ===", self.name)?;
        writeln!(f, "Nodes: {}", self.topology.nodes.len())?;
        writeln!(f, "Paths: {}", self.topology.paths.len())?;
        writeln!(
            f,
            "Mesh: {} points from {} to {}",
            self.mesh.len(),
            self.mesh.min_length(),
            self.mesh.max_length()
        )?;
        writeln!(
            f,
            "Time: {} years x {} months",
            self.n_years(),
            self.n_months()
        )?;
        writeln!(f, "--- Nodes ---")?;
        for node in &self.topology.nodes {
            let groups: Vec<&str> = node.groups().iter().map(|g| g.name()).collect();
            writeln!(f, "  {} [{}]", node.name(), groups.join(", "))?;
        }
        writeln!(f, "--- Paths ---")?;
        for path in &self.topology.paths {
            writeln!(
                f,
                "  {} -> {}, probability {:.3}",
                path.start, path.end, path.probability
            )?;
        }
        Ok(())
    }
}
