//! Configuration system for metaipm networks.
//!
//! Supports YAML configuration files with sensible defaults.

use crate::curves::Recruitment;
use crate::group::GroupConfig;
use crate::network::NetworkConfig;
use crate::node::{HarvestConfig, NodeConfig};
use crate::params::{select_table, CandidateTable, ParameterError, HYPER_SITE};
use crate::path::PathConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub network: NetworkConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    pub nodes: Vec<NodeConfig>,
    pub groups: Vec<GroupConfig>,
    #[serde(default)]
    pub paths: Vec<PathConfig>,
    pub parameters: ParameterTables,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which inputs are redrawn on every stochastic iteration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Draw yearly spawning probabilities from the Beta distribution
    pub stochastic_spawn: bool,
    /// Pick one candidate column per table instead of averaging
    pub stochastic_parameters: bool,
    /// Number of stochastic iterations
    pub iterations: usize,
    /// Base seed; iteration `i` uses `seed + i`
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Candidate tables by kind, each holding per-site tables
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParameterTables {
    pub growth: Vec<CandidateTable>,
    pub length_weight: Vec<CandidateTable>,
    pub maturity: Vec<CandidateTable>,
}

impl ParameterTables {
    /// Every table with the kind it belongs to
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &CandidateTable)> {
        self.growth
            .iter()
            .map(|t| ("growth", t))
            .chain(self.length_weight.iter().map(|t| ("length_weight", t)))
            .chain(self.maturity.iter().map(|t| ("maturity", t)))
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Time steps between stats log lines
    pub stats_interval: usize,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

/// Errors that can occur while loading, validating or building from a config
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    Invalid(String),
    Parameter(ParameterError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Yaml(e) => write!(f, "YAML error: {}", e),
            Self::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
            Self::Parameter(e) => write!(f, "Parameter error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml(e)
    }
}

impl From<ParameterError> for ConfigError {
    fn from(e: ParameterError) -> Self {
        Self::Parameter(e)
    }
}

impl Default for Config {
    fn default() -> Self {
        let pool_1 = NodeConfig {
            name: "Pool_1".to_string(),
            spawn: true,
            spawn_years: None,
            recruitment: Recruitment::default(),
            harvest: HarvestConfig::default(),
        };
        let pool_2 = NodeConfig {
            name: "Pool_2".to_string(),
            spawn: false,
            harvest: HarvestConfig {
                max: 0.02,
                ..HarvestConfig::default()
            },
            ..pool_1.clone()
        };

        let groups = ["Pool_1", "Pool_2"]
            .iter()
            .flat_map(|&node| {
                let female = GroupConfig {
                    node: node.to_string(),
                    ..GroupConfig::default()
                };
                let male = GroupConfig {
                    name: "male".to_string(),
                    produce_eggs: false,
                    ..female.clone()
                };
                [female, male]
            })
            .collect();

        Self {
            network: NetworkConfig::default(),
            simulation: SimulationConfig::default(),
            nodes: vec![pool_1, pool_2],
            groups,
            paths: vec![
                PathConfig {
                    start: "Pool_1".to_string(),
                    end: "Pool_2".to_string(),
                    probabilities: vec![0.02, 0.04, 0.03],
                },
                PathConfig {
                    start: "Pool_2".to_string(),
                    end: "Pool_1".to_string(),
                    probabilities: vec![0.03, 0.01, 0.02],
                },
            ],
            parameters: ParameterTables::default_hyper(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            stochastic_spawn: true,
            stochastic_parameters: true,
            iterations: 10,
            seed: Some(42),
        }
    }
}

impl ParameterTables {
    /// Hyper-site tables only, used by every node
    pub fn default_hyper() -> Self {
        Self {
            growth: vec![CandidateTable::new(HYPER_SITE)
                .with("K", vec![0.25, 0.30, 0.35])
                .with("Linf", vec![1.15, 1.20, 1.25])
                .with("sd", vec![0.02])
                .with("g_length", vec![1e-5])
                .with("g_migration", vec![1e-4])
                .with("surv_min", vec![10.8])
                .with("surv_max", vec![11.88])
                .with("surv_alpha", vec![2.4])
                .with("surv_beta", vec![-60.0])],
            length_weight: vec![CandidateTable::new(HYPER_SITE)
                .with("beta_1", vec![1.0])
                .with("beta_2", vec![3.0])],
            maturity: vec![CandidateTable::new(HYPER_SITE)
                .with("alpha", vec![-10.0])
                .with("beta", vec![15.0])],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            stats_interval: 12,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let network = &self.network;
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if network.n_years == 0 || network.n_months == 0 {
            return invalid("n_years and n_months must be > 0".to_string());
        }
        if network.mesh.n_points < 2 {
            return invalid("mesh needs at least 2 points".to_string());
        }
        if network.mesh.min_length >= network.mesh.max_length {
            return invalid("mesh min_length must be below max_length".to_string());
        }
        if network.spawning.a <= 0.0 || network.spawning.b <= 0.0 {
            return invalid("spawning Beta shapes must be > 0".to_string());
        }
        if let Some(month) = network
            .spawning
            .months
            .iter()
            .find(|&&m| m >= network.n_months)
        {
            return invalid(format!(
                "spawning month {} outside 0..{}",
                month, network.n_months
            ));
        }

        let mut names = BTreeSet::new();
        for node in &self.nodes {
            if !names.insert(node.name.as_str()) {
                return invalid(format!("duplicate node '{}'", node.name));
            }
            if let Some(month) = node
                .harvest
                .months
                .iter()
                .find(|&&m| m >= network.n_months)
            {
                return invalid(format!(
                    "node '{}' harvest month {} outside 0..{}",
                    node.name, month, network.n_months
                ));
            }
        }

        let mut group_keys = BTreeSet::new();
        for group in &self.groups {
            if !group_keys.insert((group.node.as_str(), group.name.as_str())) {
                return invalid(format!(
                    "duplicate group '{}' at node '{}'",
                    group.name, group.node
                ));
            }
        }

        for (_, table) in self.parameters.iter() {
            table.validate()?;
        }
        for path in &self.paths {
            if path.probabilities.is_empty() {
                return invalid(format!(
                    "path {} -> {} has no candidate probabilities",
                    path.start, path.end
                ));
            }
        }
        let lengths: BTreeSet<usize> = self
            .paths
            .iter()
            .map(|p| p.probabilities.len())
            .filter(|&n| n > 1)
            .collect();
        if lengths.len() > 1 {
            return invalid("path candidate lists have inconsistent lengths".to_string());
        }

        for node in &self.nodes {
            select_table(&self.parameters.growth, "growth", &node.name)?;
            select_table(&self.parameters.length_weight, "length_weight", &node.name)?;
            select_table(&self.parameters.maturity, "maturity", &node.name)?;
        }

        Ok(())
    }
}
