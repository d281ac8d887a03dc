//! Nodes: spatial sub-populations holding groups and the per-step projection.
//!
//! One call to [`Node::project`] advances every group at the node from time
//! index `t = year * n_months + month` to `t + 1`:
//!
//! 1. rebuild the growth kernel from the node biomass at `t`
//! 2. spawning into next year's recruit buffer
//! 3. recruit entry (first month only)
//! 4. harvest and survival rates over the mesh
//! 5. `population[:, t + 1] = (K . population[:, t]) * survival * (1 - harvest)`

use crate::curves::{lognormal_pdf, normal_pdf, normalize_or_zero, Logistic, Recruitment, SurvivalCurve};
use crate::group::Group;
use crate::mesh::Mesh;
use crate::params::{CandidateTable, ParameterError, ParameterStrategy};
use ndarray::{Array1, Array2};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Month in which pending recruits enter the population
pub const RECRUIT_ENTRY_MONTH: usize = 0;

/// Inclusive range of simulation years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearWindow {
    pub first_year: usize,
    pub last_year: usize,
}

impl YearWindow {
    #[inline]
    pub fn contains(&self, year: usize) -> bool {
        self.first_year <= year && year <= self.last_year
    }
}

/// Harvest curve and the months/years it is active
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestConfig {
    pub inflection: f64,
    pub slope: f64,
    pub min: f64,
    pub max: f64,
    pub start_year: usize,
    pub end_year: usize,
    pub months: Vec<usize>,
}

impl HarvestConfig {
    /// A harvest that never removes anything
    pub fn none() -> Self {
        Self {
            inflection: 0.0,
            slope: 0.0,
            min: 0.0,
            max: 0.0,
            start_year: 0,
            end_year: 0,
            months: Vec::new(),
        }
    }

    pub fn curve(&self) -> Logistic {
        Logistic::new(self.inflection, self.slope, self.min, self.max)
    }

    #[inline]
    pub fn is_active(&self, year: usize, month: usize) -> bool {
        self.start_year <= year && year <= self.end_year && self.months.contains(&month)
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            inflection: 0.6,
            slope: 15.0,
            min: 0.0,
            max: 0.05,
            start_year: 0,
            end_year: 100,
            months: vec![5, 6, 7],
        }
    }
}

/// Per-node settings supplied by the network builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub name: String,
    /// Whether spawning happens at this node
    pub spawn: bool,
    /// Years in which spawning happens (all years if absent)
    #[serde(default)]
    pub spawn_years: Option<YearWindow>,
    /// Recruitment curve shared by the node's groups
    #[serde(default)]
    pub recruitment: Recruitment,
    pub harvest: HarvestConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            name: "Pool_1".to_string(),
            spawn: true,
            spawn_years: None,
            recruitment: Recruitment::default(),
            harvest: HarvestConfig::default(),
        }
    }
}

/// Candidate tables a node draws its biology from
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTables {
    /// `K`, `Linf`, `sd`, `g_length`, `g_migration`, `surv_min`, `surv_max`, `surv_alpha`, `surv_beta`
    pub growth: CandidateTable,
    /// `beta_1`, `beta_2`
    pub length_weight: CandidateTable,
    /// `alpha`, `beta`
    pub maturity: CandidateTable,
}

/// Growth, survival, length-weight and maturity parameters in per-step units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeBiology {
    /// von Bertalanffy growth coefficient per time step
    pub vonb_k: f64,
    /// Asymptotic length
    pub vonb_linf: f64,
    /// Growth noise sd
    pub growth_sd: f64,
    /// Density-dependent growth suppression per unit biomass
    pub g_length: f64,
    /// Density-dependent migration coupling per unit biomass
    pub g_migration: f64,
    pub survival: SurvivalCurve,
    pub lw_beta1: f64,
    pub lw_beta2: f64,
    pub mat_alpha: f64,
    pub mat_beta: f64,
}

impl NodeBiology {
    /// Resolve node biology from candidate tables.
    ///
    /// Annual rates (`K`, `g_length`, `g_migration` and the four survival
    /// parameters) are divided by `n_months`.
    /// Tables are resolved in a fixed order: maturity, growth, length-weight.
    pub fn resolve<R: Rng + ?Sized>(
        tables: &NodeTables,
        strategy: ParameterStrategy,
        rng: &mut R,
        n_months: usize,
    ) -> Result<Self, ParameterError> {
        let months = n_months as f64;
        let maturity = tables.maturity.resolve(strategy, rng)?;
        let growth = tables.growth.resolve(strategy, rng)?;
        let length_weight = tables.length_weight.resolve(strategy, rng)?;

        Ok(Self {
            vonb_k: growth.get("K")? / months,
            vonb_linf: growth.get("Linf")?,
            growth_sd: growth.get("sd")?,
            g_length: growth.get("g_length")? / months,
            g_migration: growth.get("g_migration")? / months,
            survival: SurvivalCurve {
                min: growth.get("surv_min")? / months,
                max: growth.get("surv_max")? / months,
                alpha: growth.get("surv_alpha")? / months,
                beta: growth.get("surv_beta")? / months,
            },
            lw_beta1: length_weight.get("beta_1")?,
            lw_beta2: length_weight.get("beta_2")?,
            mat_alpha: maturity.get("alpha")?,
            mat_beta: maturity.get("beta")?,
        })
    }

    /// Weight from length: `10^(beta_1 + beta_2 * log10(length))`
    #[inline]
    pub fn length_weight(&self, length: f64) -> f64 {
        10f64.powf(self.lw_beta1 + self.lw_beta2 * length.log10())
    }

    /// Probability of maturity at length
    #[inline]
    pub fn maturity_prob(&self, length: f64) -> f64 {
        1.0 / (1.0 + (-(self.mat_alpha + self.mat_beta * length)).exp())
    }

    /// von Bertalanffy length at age (age in time steps)
    #[inline]
    pub fn length_at_age(&self, age: f64) -> f64 {
        self.vonb_linf * (1.0 - (-self.vonb_k * age).exp())
    }

    /// Expected length one step after `length`: `(K z + (1 - K) Linf)`,
    /// suppressed by node biomass
    #[inline]
    pub fn expected_length(&self, length: f64, biomass: f64) -> f64 {
        (self.vonb_k * length + (1.0 - self.vonb_k) * self.vonb_linf) * (-self.g_length * biomass).exp()
    }
}

/// Shared, read-only inputs for one projection step
#[derive(Debug, Clone, Copy)]
pub struct ProjectionContext<'a> {
    pub mesh: &'a Mesh,
    pub n_months: usize,
    pub spawn_months: &'a [usize],
    /// Spawning probability per year
    pub spawn_probability: &'a [f64],
    pub egg_viability: f64,
}

/// A sub-population location
#[derive(Debug, Clone)]
pub struct Node {
    config: NodeConfig,
    groups: Vec<Group>,
    tables: NodeTables,
    pub biology: NodeBiology,
    /// Growth kernel from the most recent step, `kernel[[i, j]]` = P(j -> i)
    kernel: Array2<f64>,
}

impl Node {
    pub fn new(config: NodeConfig, tables: NodeTables, biology: NodeBiology) -> Self {
        Self {
            config,
            groups: Vec::new(),
            tables,
            biology,
            kernel: Array2::zeros((0, 0)),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn add_group(&mut self, group: Group) {
        self.groups.push(group);
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut [Group] {
        &mut self.groups
    }

    pub fn n_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name() == name)
    }

    pub fn group_mut(&mut self, name: &str) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.name() == name)
    }

    /// Growth kernel computed at the last projection step
    pub fn kernel(&self) -> &Array2<f64> {
        &self.kernel
    }

    /// Total individuals over all groups at a time index
    pub fn population(&self, time: usize) -> f64 {
        self.groups.iter().map(|g| g.total(time)).sum()
    }

    /// Total biomass over all groups at a time index
    pub fn biomass(&self, time: usize, mesh: &Mesh) -> f64 {
        let weights = mesh.omega().mapv(|z| self.biology.length_weight(z));
        self.groups.iter().map(|g| g.biomass(time, &weights)).sum()
    }

    /// Build the growth kernel from the biomass at `time`.
    ///
    /// Each column is a normal density around the expected next length,
    /// normalized to sum to one, or all zeros when the density vanishes on the mesh.
    pub fn growth_kernel(&self, time: usize, mesh: &Mesh) -> Array2<f64> {
        let biomass = self.biomass(time, mesh);
        let omega = mesh.omega();
        let mut kernel = Array2::zeros((omega.len(), omega.len()));
        let mut degenerate = 0usize;

        for (j, &z) in omega.iter().enumerate() {
            let location = self.biology.expected_length(z, biomass);
            let raw = omega.mapv(|z_next| normal_pdf(z_next, location, self.biology.growth_sd));
            if raw.sum() == 0.0 {
                degenerate += 1;
            }
            kernel.column_mut(j).assign(&normalize_or_zero(raw));
        }

        if degenerate > 0 {
            log::trace!(
                "{}: {} degenerate kernel columns at t={} (biomass {:.3})",
                self.name(),
                degenerate,
                time,
                biomass
            );
        }

        kernel
    }

    /// Spawning happens this year and month
    pub fn is_spawning(&self, year: usize, month: usize, spawn_months: &[usize]) -> bool {
        self.config.spawn
            && self.config.spawn_years.map_or(true, |w| w.contains(year))
            && spawn_months.contains(&month)
    }

    /// Harvest rate over the mesh, zero outside the harvest window
    pub fn harvest_rate(&self, year: usize, month: usize, mesh: &Mesh) -> Array1<f64> {
        if self.config.harvest.is_active(year, month) {
            self.config.harvest.curve().eval_array(mesh.omega())
        } else {
            Array1::zeros(mesh.len())
        }
    }

    /// Survival rate over the mesh
    pub fn survival_rate(&self, mesh: &Mesh) -> Array1<f64> {
        self.biology.survival.eval_array(mesh.omega())
    }

    /// Median recruit length: length at age `1 / n_months` with per-step `K`
    pub fn recruit_median(&self, n_months: usize) -> f64 {
        self.biology.length_at_age(1.0 / n_months as f64)
    }

    /// Recruit length distribution for a group, summing to one (or all zeros)
    pub fn recruit_distribution(&self, sigma_j: f64, mesh: &Mesh, n_months: usize) -> Array1<f64> {
        let median = self.recruit_median(n_months);
        let raw = mesh.omega().mapv(|z| lognormal_pdf(z, median, sigma_j));
        normalize_or_zero(raw)
    }

    /// Advance every group from `t` to `t + 1`
    pub fn project(&mut self, year: usize, month: usize, ctx: &ProjectionContext<'_>) {
        let time = year * ctx.n_months + month;
        let mesh = ctx.mesh;

        // Kernel reads the biomass before anything at this node changes
        self.kernel = self.growth_kernel(time, mesh);

        // Spawning fills next year's recruit buffer
        if self.is_spawning(year, month, ctx.spawn_months) {
            let scale = ctx.spawn_probability[year] * ctx.egg_viability;
            let biology = &self.biology;
            for group in &mut self.groups {
                let eggs = group.spawn(
                    time,
                    |z| biology.length_weight(z),
                    |z| biology.maturity_prob(z),
                    mesh,
                );
                group.age_0[year + 1] += eggs * scale;
            }
        }

        // Recruits pooled over the node enter on the first month
        if month == RECRUIT_ENTRY_MONTH {
            let pooled: f64 = self.groups.iter_mut().map(|g| g.take_age_0(year)).sum();
            for index in 0..self.groups.len() {
                let distribution = self.recruit_distribution(self.groups[index].sigma_j, mesh, ctx.n_months);
                let group = &mut self.groups[index];
                let recruits = distribution * (pooled * group.ratio_at_birth);
                let mut column = group.distribution_mut(time);
                column += &recruits;
            }
        }

        let harvest = self.harvest_rate(year, month, mesh);
        let survival = self.survival_rate(mesh);
        let retained = survival * harvest.mapv(|h| 1.0 - h);

        for group in &mut self.groups {
            let next = self.kernel.dot(&group.distribution(time)) * &retained;
            group.distribution_mut(time + 1).assign(&next);
        }
    }

    /// Redraw biology from the node's candidate tables
    pub fn redraw<R: Rng + ?Sized>(
        &mut self,
        strategy: ParameterStrategy,
        rng: &mut R,
        n_months: usize,
    ) -> Result<(), ParameterError> {
        self.biology = NodeBiology::resolve(&self.tables, strategy, rng, n_months)?;
        Ok(())
    }

    /// Reset every group to its initial column
    pub fn clear(&mut self) {
        for group in &mut self.groups {
            group.reset();
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::group::GroupConfig;
    use crate::mesh::MeshConfig;
    use crate::params::CandidateTable;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    pub(crate) fn test_biology() -> NodeBiology {
        NodeBiology {
            vonb_k: 0.9,
            vonb_linf: 1.2,
            growth_sd: 0.05,
            g_length: 0.0,
            g_migration: 0.0,
            survival: SurvivalCurve::constant(1.0),
            lw_beta1: 1.0,
            lw_beta2: 3.0,
            mat_alpha: -5.0,
            mat_beta: 10.0,
        }
    }

    pub(crate) fn test_tables() -> NodeTables {
        NodeTables {
            growth: CandidateTable::new("hyper")
                .with("K", vec![0.8, 1.2])
                .with("Linf", vec![1.0, 1.4])
                .with("sd", vec![0.05])
                .with("g_length", vec![0.0])
                .with("g_migration", vec![0.0])
                .with("surv_min", vec![12.0])
                .with("surv_max", vec![12.0])
                .with("surv_alpha", vec![12.0])
                .with("surv_beta", vec![0.0]),
            length_weight: CandidateTable::new("hyper")
                .with("beta_1", vec![1.0])
                .with("beta_2", vec![3.0]),
            maturity: CandidateTable::new("hyper")
                .with("alpha", vec![-5.0])
                .with("beta", vec![10.0]),
        }
    }

    fn mesh() -> Mesh {
        Mesh::new(MeshConfig {
            n_points: 40,
            min_length: 0.01,
            max_length: 1.5,
        })
    }

    fn closed_node(mesh: &Mesh) -> Node {
        let config = NodeConfig {
            spawn: false,
            harvest: HarvestConfig::none(),
            ..NodeConfig::default()
        };
        let mut node = Node::new(config, test_tables(), test_biology());
        let group_config = GroupConfig {
            produce_eggs: false,
            ..GroupConfig::default()
        };
        node.add_group(Group::new(&group_config, Recruitment::default(), mesh, 2, 12));
        node
    }

    fn context<'a>(mesh: &'a Mesh, spawn_probability: &'a [f64]) -> ProjectionContext<'a> {
        ProjectionContext {
            mesh,
            n_months: 12,
            spawn_months: &[3],
            spawn_probability,
            egg_viability: 0.5,
        }
    }

    #[test]
    fn test_kernel_columns_sum_to_one_or_zero() {
        let mesh = mesh();
        let mut node = closed_node(&mesh);
        node.biology.g_length = 0.5;

        let kernel = node.growth_kernel(0, &mesh);
        for column in kernel.columns() {
            let total = column.sum();
            assert!(total == 0.0 || (total - 1.0).abs() < 1e-9, "column sum {}", total);
        }
    }

    #[test]
    fn test_kernel_degenerate_columns_are_zero() {
        let mesh = mesh();
        let mut node = closed_node(&mesh);
        // Expected length far off the mesh with a tiny sd: density underflows
        node.biology.vonb_linf = 1_000.0;
        node.biology.vonb_k = 50.0;
        node.biology.growth_sd = 1e-3;

        let kernel = node.growth_kernel(0, &mesh);
        assert_eq!(kernel.sum(), 0.0);
    }

    #[test]
    fn test_kernel_nan_propagates() {
        let mesh = mesh();
        let mut node = closed_node(&mesh);
        node.biology.growth_sd = 0.0;

        let kernel = node.growth_kernel(0, &mesh);
        assert!(kernel.iter().any(|v| v.is_nan()));
    }

    #[test]
    fn test_closed_node_conserves_mass() {
        let mesh = mesh();
        let mut node = closed_node(&mesh);
        let probabilities = [0.5, 0.5];
        let ctx = context(&mesh, &probabilities);
        let start = node.population(0);

        for month in 0..12 {
            node.project(0, month, &ctx);
        }

        let end = node.population(12);
        assert!((end - start).abs() / start < 1e-6, "{} vs {}", start, end);
    }

    #[test]
    fn test_harvest_window() {
        let mesh = mesh();
        let mut node = closed_node(&mesh);
        node.config.harvest = HarvestConfig {
            start_year: 1,
            end_year: 2,
            months: vec![4],
            max: 0.5,
            ..HarvestConfig::default()
        };

        assert_eq!(node.harvest_rate(0, 4, &mesh).sum(), 0.0);
        assert_eq!(node.harvest_rate(1, 3, &mesh).sum(), 0.0);
        assert!(node.harvest_rate(1, 4, &mesh).sum() > 0.0);
        assert!(node.harvest_rate(2, 4, &mesh).sum() > 0.0);
        assert_eq!(node.harvest_rate(3, 4, &mesh).sum(), 0.0);
    }

    #[test]
    fn test_spawning_writes_next_year_buffer() {
        let mesh = mesh();
        let mut node = closed_node(&mesh);
        node.config.spawn = true;
        node.groups[0].produce_eggs = true;
        node.groups[0].recruitment = Recruitment::Logistic {
            alpha: 0.0,
            beta: 0.0,
            min_recruit: 0.0,
            max_recruit: 2.0,
        };
        let probabilities = [0.5, 0.5];
        let ctx = context(&mesh, &probabilities);

        for month in 0..=3 {
            node.project(0, month, &ctx);
        }

        let group = &node.groups[0];
        assert_eq!(group.age_0[0], 0.0);
        assert!(group.age_0[1] > 0.0);
        assert_eq!(group.age_0[2], 0.0);
    }

    #[test]
    fn test_spawn_year_window() {
        let mesh = mesh();
        let mut node = closed_node(&mesh);
        node.config.spawn = true;
        node.config.spawn_years = Some(YearWindow {
            first_year: 1,
            last_year: 1,
        });
        assert!(!node.is_spawning(0, 3, &[3]));
        assert!(node.is_spawning(1, 3, &[3]));
        assert!(!node.is_spawning(1, 4, &[3]));
        assert!(!node.is_spawning(2, 3, &[3]));
    }

    #[test]
    fn test_recruit_entry_adds_pooled_recruits() {
        let mesh = mesh();
        let mut node = closed_node(&mesh);
        let second = GroupConfig {
            name: "male".to_string(),
            produce_eggs: false,
            ..GroupConfig::default()
        };
        node.add_group(Group::new(&second, Recruitment::default(), &mesh, 2, 12));
        node.groups[0].age_0[1] = 100.0;
        node.groups[1].age_0[1] = 300.0;
        let before: Vec<f64> = node.groups.iter().map(|g| g.total(12)).collect();
        let probabilities = [0.5, 0.5];
        let ctx = context(&mesh, &probabilities);

        node.project(1, 0, &ctx);

        for (group, prior) in node.groups.iter().zip(before) {
            // 400 pooled recruits, half to each group
            assert!((group.total(12) - prior - 200.0).abs() < 1e-6);
            assert_eq!(group.age_0[1], 0.0);
        }
    }

    #[test]
    fn test_advance_applies_survival_and_harvest() {
        let mesh = mesh();
        let mut node = closed_node(&mesh);
        node.biology.survival = SurvivalCurve::constant(0.8);
        node.config.harvest = HarvestConfig {
            inflection: 0.0,
            slope: 0.0,
            min: 0.0,
            max: 0.5,
            start_year: 0,
            end_year: 0,
            months: vec![2],
        };
        let probabilities = [0.5, 0.5];
        let ctx = context(&mesh, &probabilities);

        for month in 0..=2 {
            node.project(0, month, &ctx);
        }
        assert!(node.groups[0].total(2) > 0.0);

        // Flat harvest of 0.25, survival 0.8
        let expected = node.kernel().dot(&node.groups[0].distribution(2)) * 0.8 * 0.75;
        for (a, b) in node.groups[0].distribution(3).iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_redraw_divides_annual_rates() {
        let mesh = mesh();
        let mut node = closed_node(&mesh);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        node.redraw(ParameterStrategy::Mean, &mut rng, 12).unwrap();
        assert!((node.biology.vonb_k - 1.0 / 12.0).abs() < 1e-12);
        assert!((node.biology.vonb_linf - 1.2).abs() < 1e-12);
        assert_eq!(node.biology.growth_sd, 0.05);
        // Survival parameters are annual too
        assert!((node.biology.survival.min - 1.0).abs() < 1e-12);
        assert!((node.biology.survival.max - 1.0).abs() < 1e-12);
        assert!((node.biology.survival.alpha - 1.0).abs() < 1e-12);
        assert_eq!(node.biology.survival.beta, 0.0);
        assert_eq!(node.group("female").map(|g| g.name()), Some("female"));
    }

    #[test]
    fn test_biology_curves() {
        let biology = test_biology();
        // 10^(1 + 3 * log10(0.1)) = 10^-2
        assert!((biology.length_weight(0.1) - 0.01).abs() < 1e-12);
        assert!((biology.maturity_prob(0.5) - 0.5).abs() < 1e-12);
        assert_eq!(biology.length_at_age(0.0), 0.0);
        assert!(biology.length_at_age(100.0) > 1.19);
        // Fish at asymptotic length stay there without density effects
        assert!((biology.expected_length(1.2, 0.0) - 1.2).abs() < 1e-12);
        // 0.9 * 0.5 + 0.1 * 1.2
        assert!((biology.expected_length(0.5, 0.0) - 0.57).abs() < 1e-12);
        assert!(biology.expected_length(0.5, 1e9) < 1e-6);
    }

    #[test]
    fn test_growth_location_is_linear_in_length() {
        let biology = NodeBiology {
            vonb_k: 0.3 / 12.0,
            g_length: 0.01,
            ..test_biology()
        };
        let z = 0.1566;
        let biomass = 2.0;
        let location = (0.025 * z + 0.975 * 1.2) * (-0.02f64).exp();
        assert!((biology.expected_length(z, biomass) - location).abs() < 1e-12);

        // Kernel columns peak at the mesh point nearest the location
        let mesh = Mesh::new(MeshConfig {
            n_points: 60,
            min_length: 0.01,
            max_length: 1.5,
        });
        let mut node = closed_node(&mesh);
        node.biology = NodeBiology {
            growth_sd: 0.02,
            g_length: 0.0,
            ..biology
        };
        let kernel = node.growth_kernel(0, &mesh);
        let omega = mesh.omega();
        let j = 5;
        let target = node.biology.expected_length(omega[j], 0.0);
        let column = kernel.column(j);
        let peak = (0..omega.len())
            .fold(0, |best, i| if column[i] > column[best] { i } else { best });
        let nearest = (0..omega.len()).fold(0, |best, i| {
            if (omega[i] - target).abs() < (omega[best] - target).abs() {
                i
            } else {
                best
            }
        });
        assert_eq!(peak, nearest);
        assert!(target > 1.1);
    }

    #[test]
    fn test_recruit_median_uses_one_step_of_age() {
        let mesh = Mesh::new(MeshConfig {
            n_points: 400,
            min_length: 0.0001,
            max_length: 0.02,
        });
        let mut node = closed_node(&mesh);
        node.biology.vonb_k = 0.3 / 12.0;
        node.biology.vonb_linf = 1.2;

        // Linf * (1 - exp(-K_step / n_months))
        let median = node.recruit_median(12);
        let expected = 1.2 * (1.0 - (-0.025f64 / 12.0).exp());
        assert!((median - expected).abs() < 1e-15);
        assert!((median - 0.0025).abs() < 1e-5);

        let distribution = node.recruit_distribution(0.3, &mesh, 12);
        assert!((distribution.sum() - 1.0).abs() < 1e-9);
        let omega = mesh.omega();
        let peak = (0..omega.len())
            .fold(0, |best, i| if distribution[i] > distribution[best] { i } else { best });
        // Log-normal mode sits at median * exp(-sigma^2)
        assert!(omega[peak] < median && omega[peak] > 0.8 * median);
    }
}
