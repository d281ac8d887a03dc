//! Projection engine: advances a topology one month at a time.
//!
//! Ordering per (year, month):
//! - every node projects (growth, spawning, recruitment, harvest, survival)
//! - every path loads from the same post-projection node state
//! - every load is delivered to its end node
//! - every load is withdrawn from its start node
//!
//! Migration loads, delivers and withdraws at column `t`, after the nodes have
//! already advanced `t` into `t + 1`.

use crate::mesh::Mesh;
use crate::network::Topology;
use crate::node::ProjectionContext;
use crate::path::MigrationLoad;
use crate::spawning::Spawning;

/// Stateless driver for the monthly update
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    pub n_years: usize,
    pub n_months: usize,
    pub egg_viability: f64,
}

impl Projection {
    pub fn new(n_years: usize, n_months: usize, egg_viability: f64) -> Self {
        Self {
            n_years,
            n_months,
            egg_viability,
        }
    }

    /// Global time index for a (year, month) pair
    #[inline]
    pub fn time_index(&self, year: usize, month: usize) -> usize {
        year * self.n_months + month
    }

    /// Run every year and month
    pub fn run(&self, topology: &mut Topology, mesh: &Mesh, spawning: &Spawning) {
        for year in 0..self.n_years {
            for month in 0..self.n_months {
                self.step(topology, mesh, spawning, year, month);
            }
        }
    }

    /// One monthly step; returns the migration loads that were applied
    pub fn step(
        &self,
        topology: &mut Topology,
        mesh: &Mesh,
        spawning: &Spawning,
        year: usize,
        month: usize,
    ) -> Vec<MigrationLoad> {
        let ctx = ProjectionContext {
            mesh,
            n_months: self.n_months,
            spawn_months: spawning.months(),
            spawn_probability: spawning.probability(),
            egg_viability: self.egg_viability,
        };

        // Phase 1: node projection
        for node in &mut topology.nodes {
            node.project(year, month, &ctx);
        }

        let time = self.time_index(year, month);

        // Phase 2: load every path from the same node state
        let loads: Vec<MigrationLoad> = topology
            .paths
            .iter()
            .filter_map(|path| {
                topology
                    .node(&path.start)
                    .map(|node| path.load(node, time, mesh))
            })
            .collect();

        // Phase 3: move in
        for load in &loads {
            if let Some(node) = topology.node_mut(&load.end) {
                load.deliver(node);
            }
        }

        // Phase 4: move out
        for load in &loads {
            if let Some(node) = topology.node_mut(&load.start) {
                load.withdraw(node);
            }
        }

        loads
    }
}
