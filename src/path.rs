//! Migration paths between nodes.
//!
//! Migration runs in three phases per time step, each over every path before
//! the next begins:
//!
//! 1. [`Path::load`] snapshots the outgoing groups from the start node into a
//!    [`MigrationLoad`] owned by the caller
//! 2. [`MigrationLoad::deliver`] adds the snapshot to the end node
//! 3. [`MigrationLoad::withdraw`] removes it from the start node
//!
//! Because every load is taken before any node changes, no path sees another
//! path's migrants in the same step.

use crate::mesh::Mesh;
use crate::node::Node;
use crate::params::{ParameterError, ParameterStrategy};
use ndarray::{Array1, Array2};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Path definition with candidate probabilities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathConfig {
    pub start: String,
    pub end: String,
    /// Candidate transition probabilities
    pub probabilities: Vec<f64>,
}

/// Directed edge between two nodes
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub start: String,
    pub end: String,
    pub probability: f64,
}

impl Path {
    pub fn new(start: &str, end: &str, probability: f64) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
            probability,
        }
    }

    /// Fraction of a group leaving along this path given start-node biomass
    #[inline]
    pub fn migration_multiplier(&self, g_migration: f64, biomass: f64) -> f64 {
        self.probability * (2.0 - (-g_migration * biomass).exp())
    }

    /// Snapshot every group at `node` scaled by the migration multiplier
    pub fn load(&self, node: &Node, time: usize, mesh: &Mesh) -> MigrationLoad {
        let biomass = node.biomass(time, mesh);
        let multiplier = self.migration_multiplier(node.biology.g_migration, biomass);

        let groups = node
            .groups()
            .iter()
            .map(|g| (g.name().to_string(), g.distribution(time).to_owned() * multiplier))
            .collect();

        MigrationLoad {
            start: self.start.clone(),
            end: self.end.clone(),
            time,
            groups,
        }
    }
}

/// Build paths from their definitions.
///
/// `Stochastic` draws one candidate column used by every path, `Mean` averages
/// each path's candidates. Paths with a single candidate always use it.
pub fn build_paths<R: Rng + ?Sized>(
    configs: &[PathConfig],
    strategy: ParameterStrategy,
    rng: &mut R,
) -> Result<Vec<Path>, ParameterError> {
    let n_candidates = configs
        .iter()
        .map(|c| c.probabilities.len())
        .max()
        .unwrap_or(0);

    for config in configs {
        let found = config.probabilities.len();
        if found == 0 {
            return Err(ParameterError::Empty {
                site: format!("{}->{}", config.start, config.end),
                parameter: "probability".to_string(),
            });
        }
        if found != 1 && found != n_candidates {
            return Err(ParameterError::Inconsistent {
                site: format!("{}->{}", config.start, config.end),
                parameter: "probability".to_string(),
                expected: n_candidates,
                found,
            });
        }
    }

    let column = match strategy {
        ParameterStrategy::Stochastic if n_candidates > 1 => Some(rng.gen_range(0..n_candidates)),
        _ => None,
    };

    Ok(configs
        .iter()
        .map(|config| {
            let candidates = &config.probabilities;
            let probability = match (column, candidates.len()) {
                (_, 1) => candidates[0],
                (Some(index), _) => candidates[index],
                (None, n) => candidates.iter().sum::<f64>() / n as f64,
            };
            Path::new(&config.start, &config.end, probability)
        })
        .collect())
}

/// Groups in transit along one path during one time step
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationLoad {
    pub start: String,
    pub end: String,
    pub time: usize,
    /// (group name, migrants per mesh point)
    pub groups: Vec<(String, Array1<f64>)>,
}

impl MigrationLoad {
    /// Add migrants to matching groups at the end node
    pub fn deliver(&self, node: &mut Node) {
        for (name, migrants) in &self.groups {
            if let Some(group) = node.group_mut(name) {
                let mut column = group.distribution_mut(self.time);
                column += migrants;
            }
        }
    }

    /// Remove migrants from matching groups at the start node.
    ///
    /// If removal would leave any mesh entry negative, the whole group column
    /// is zeroed instead.
    pub fn withdraw(&self, node: &mut Node) {
        let node_name = node.name().to_string();
        for (name, migrants) in &self.groups {
            if let Some(group) = node.group_mut(name) {
                let mut column = group.distribution_mut(self.time);
                let overdrawn = column.iter().zip(migrants.iter()).any(|(&have, &leave)| have - leave < 0.0);
                if overdrawn {
                    log::debug!(
                        "{}/{}: migration to {} exceeds population at t={}, group zeroed",
                        node_name,
                        name,
                        self.end,
                        self.time
                    );
                    column.fill(0.0);
                } else {
                    column -= migrants;
                }
            }
        }
    }

    /// Total migrants over all groups
    pub fn total(&self) -> f64 {
        self.groups.iter().map(|(_, m)| m.sum()).sum()
    }
}

/// Project transition probabilities `n_periods` steps ahead.
///
/// Builds the node-to-node Markov matrix with staying probability
/// `1 - sum(outgoing)` on the diagonal, raises it to `n_periods`, and returns
/// the non-zero off-diagonal entries as paths.
pub fn project_transitions(paths: &[Path], n_periods: u32) -> Vec<Path> {
    let names: Vec<&str> = paths
        .iter()
        .flat_map(|p| [p.start.as_str(), p.end.as_str()])
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let index = |name: &str| names.iter().position(|&n| n == name);
    let n = names.len();

    let mut transition = Array2::<f64>::zeros((n, n));
    for path in paths {
        if let (Some(from), Some(to)) = (index(&path.start), index(&path.end)) {
            transition[[from, to]] = path.probability;
        }
    }
    for row in 0..n {
        let moving: f64 = (0..n).filter(|&col| col != row).map(|col| transition[[row, col]]).sum();
        transition[[row, row]] = 1.0 - moving;
    }

    let mut projected = Array2::<f64>::eye(n);
    for _ in 0..n_periods {
        projected = projected.dot(&transition);
    }

    let mut result = Vec::new();
    for from in 0..n {
        for to in 0..n {
            if from != to && projected[[from, to]] != 0.0 {
                result.push(Path::new(names[from], names[to], projected[[from, to]]));
            }
        }
    }
    result
}
