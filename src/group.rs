//! Groups: length-structured cohorts living at a node.

use crate::curves::{lognormal_pdf, Recruitment};
use crate::mesh::Mesh;
use ndarray::{s, Array1, Array2, ArrayView1, ArrayViewMut1};
use serde::{Deserialize, Serialize};

/// Per-group settings supplied by the network builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Node the group lives at
    pub node: String,
    /// Group name, unique within its node
    pub name: String,
    /// Total individuals at time 0
    pub start_pop: f64,
    /// Median of the initial log-normal length distribution
    pub initial_mu: f64,
    /// Log-scale sd of the initial length distribution
    pub initial_sd: f64,
    /// Fraction of node recruits assigned to this group
    pub ratio_at_birth: f64,
    /// Log-scale sd of the recruit length distribution
    pub sigma_j: f64,
    /// Whether the group produces eggs
    pub produce_eggs: bool,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            node: "Pool_1".to_string(),
            name: "female".to_string(),
            start_pop: 1_000.0,
            initial_mu: 0.4,
            initial_sd: 0.3,
            ratio_at_birth: 0.5,
            sigma_j: 0.1,
            produce_eggs: true,
        }
    }
}

/// A cohort tracked as a population-by-length-by-time array
#[derive(Debug, Clone)]
pub struct Group {
    name: String,
    /// rows = mesh index, columns = time index `0..=n_years * n_months`
    pub population: Array2<f64>,
    /// Recruits waiting to enter at the start of each year
    pub age_0: Array1<f64>,
    pub ratio_at_birth: f64,
    pub sigma_j: f64,
    pub recruitment: Recruitment,
    pub produce_eggs: bool,
    /// Starting length distribution, restored by [`Group::reset`]
    initial: Array1<f64>,
}

impl Group {
    /// Create a group with its initial length distribution in column 0
    pub fn new(
        config: &GroupConfig,
        recruitment: Recruitment,
        mesh: &Mesh,
        n_years: usize,
        n_months: usize,
    ) -> Self {
        let initial = Self::initial_distribution(config, mesh);
        let mut population = Array2::zeros((mesh.len(), n_years * n_months + 1));
        population.column_mut(0).assign(&initial);

        Self {
            name: config.name.clone(),
            population,
            age_0: Array1::zeros(n_years + 1),
            ratio_at_birth: config.ratio_at_birth,
            sigma_j: config.sigma_j,
            recruitment,
            produce_eggs: config.produce_eggs,
            initial,
        }
    }

    /// Log-normal density at the mesh points, rescaled to sum to `start_pop`
    fn initial_distribution(config: &GroupConfig, mesh: &Mesh) -> Array1<f64> {
        let raw = mesh
            .omega()
            .mapv(|z| lognormal_pdf(z, config.initial_mu, config.initial_sd));
        let total = raw.sum();
        raw / total * config.start_pop
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of time columns
    pub fn n_times(&self) -> usize {
        self.population.ncols()
    }

    /// Length distribution at a time index
    #[inline]
    pub fn distribution(&self, time: usize) -> ArrayView1<'_, f64> {
        self.population.column(time)
    }

    #[inline]
    pub fn distribution_mut(&mut self, time: usize) -> ArrayViewMut1<'_, f64> {
        self.population.column_mut(time)
    }

    /// Total individuals at a time index
    #[inline]
    pub fn total(&self, time: usize) -> f64 {
        self.population.column(time).sum()
    }

    /// Biomass at a time index given per-mesh-point weights
    pub fn biomass(&self, time: usize, weights: &Array1<f64>) -> f64 {
        self.population.column(time).dot(weights)
    }

    /// Recruit production at `time`.
    ///
    /// The recruitment curve is applied to the weight at each mesh point and
    /// weighted by the current length distribution. Zero for non-spawning groups.
    pub fn spawn<W, M>(&self, time: usize, length_weight: W, _maturity: M, mesh: &Mesh) -> f64
    where
        W: Fn(f64) -> f64,
        M: Fn(f64) -> f64,
    {
        if !self.produce_eggs {
            return 0.0;
        }
        let weights = mesh.omega().mapv(length_weight);
        self.recruitment
            .recruits_array(&weights)
            .dot(&self.population.column(time))
    }

    /// Take the recruits pending for `year`, leaving zero behind
    pub fn take_age_0(&mut self, year: usize) -> f64 {
        std::mem::replace(&mut self.age_0[year], 0.0)
    }

    /// Restore the starting column, zero every later column and the recruit buffer.
    ///
    /// Migration rewrites column 0 during the first step.
    pub fn reset(&mut self) {
        self.population.column_mut(0).assign(&self.initial);
        self.population.slice_mut(s![.., 1..]).fill(0.0);
        self.age_0.fill(0.0);
    }
}
