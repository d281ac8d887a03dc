//! Network construction from a [`Config`].
//!
//! Randomness is consumed in a fixed order: spawning probabilities, path
//! probabilities, then node biology in node order. A network built from a
//! seed therefore matches one rebuilt in place by the stochastic runner with
//! the same seed.

use crate::config::{Config, ConfigError, ParameterTables};
use crate::group::Group;
use crate::mesh::Mesh;
use crate::network::Network;
use crate::node::{Node, NodeBiology, NodeTables};
use crate::params::{select_table, ParameterError, ParameterStrategy};
use crate::path::build_paths;
use crate::spawning::Spawning;
use rand::Rng;

/// Tables for a node, each falling back to the hyper site
pub fn node_tables(parameters: &ParameterTables, site: &str) -> Result<NodeTables, ParameterError> {
    Ok(NodeTables {
        growth: select_table(&parameters.growth, "growth", site)?.clone(),
        length_weight: select_table(&parameters.length_weight, "length_weight", site)?.clone(),
        maturity: select_table(&parameters.maturity, "maturity", site)?.clone(),
    })
}

/// Build a network. Groups at unknown nodes and paths with unknown endpoints
/// are omitted with a warning.
pub fn build_network<R: Rng + ?Sized>(config: &Config, rng: &mut R) -> Result<Network, ConfigError> {
    config.validate()?;

    let settings = &config.network;
    let spawn_strategy = ParameterStrategy::from_flag(config.simulation.stochastic_spawn);
    let parameter_strategy = ParameterStrategy::from_flag(config.simulation.stochastic_parameters);

    let spawning = Spawning::new(
        settings.spawning.clone(),
        settings.n_years,
        spawn_strategy,
        rng,
    )?;
    let paths = build_paths(&config.paths, parameter_strategy, rng)?;

    let mut network = Network::new(
        &settings.name,
        settings.n_years,
        settings.n_months,
        Mesh::new(settings.mesh.clone()),
        spawning,
        settings.egg_viability,
    )?;

    for node_config in &config.nodes {
        let tables = node_tables(&config.parameters, &node_config.name)?;
        let biology = NodeBiology::resolve(&tables, parameter_strategy, rng, settings.n_months)?;
        let mut node = Node::new(node_config.clone(), tables, biology);

        for group_config in config.groups.iter().filter(|g| g.node == node_config.name) {
            node.add_group(Group::new(
                group_config,
                node_config.recruitment,
                network.mesh(),
                settings.n_years,
                settings.n_months,
            ));
        }

        if node.n_groups() == 0 {
            log::warn!("node '{}' has no groups", node_config.name);
        }
        network.add_node(node);
    }

    for group in &config.groups {
        if !network.topology.contains(&group.node) {
            log::warn!(
                "group '{}' references unknown node '{}', group omitted",
                group.name,
                group.node
            );
        }
    }

    network.set_paths(paths);

    if network.nodes().len() > 1 {
        for node in network.nodes() {
            let connected = network
                .paths()
                .iter()
                .any(|p| p.start == node.name() || p.end == node.name());
            if !connected {
                log::warn!("node '{}' is not connected to any path", node.name());
            }
        }
    }

    log::info!(
        "Built network '{}': {} nodes, {} groups, {} paths, {} mesh points",
        network.name(),
        network.nodes().len(),
        network.nodes().iter().map(|n| n.n_groups()).sum::<usize>(),
        network.paths().len(),
        network.mesh().len()
    );

    Ok(network)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::GroupConfig;
    use crate::params::CandidateTable;
    use crate::path::PathConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_build_default() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let network = build_network(&Config::default(), &mut rng).unwrap();

        assert_eq!(network.nodes().len(), 2);
        assert_eq!(network.paths().len(), 2);
        assert_eq!(network.n_times(), 10 * 12 + 1);
        for node in network.nodes() {
            assert_eq!(node.n_groups(), 2);
            assert!((node.population(0) - 2_000.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_unknown_entities_are_omitted() {
        let mut config = Config::default();
        config.groups.push(GroupConfig {
            node: "Pool_9".to_string(),
            ..GroupConfig::default()
        });
        config.paths.push(PathConfig {
            start: "Pool_1".to_string(),
            end: "Pool_9".to_string(),
            probabilities: vec![0.1],
        });
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let network = build_network(&config, &mut rng).unwrap();

        assert_eq!(network.paths().len(), 2);
        assert!(network.node("Pool_9").is_none());
        assert_eq!(
            network.nodes().iter().map(|n| n.n_groups()).sum::<usize>(),
            4
        );
    }

    #[test]
    fn test_site_table_overrides_hyper() {
        let mut config = Config::default();
        config.simulation.stochastic_parameters = false;
        let site = config.parameters.growth[0]
            .clone()
            .with("Linf", vec![2.4]);
        config.parameters.growth.push(CandidateTable {
            site: "Pool_2".to_string(),
            ..site
        });
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let network = build_network(&config, &mut rng).unwrap();

        let linf = |name: &str| network.node(name).map(|n| n.biology.vonb_linf);
        assert_eq!(linf("Pool_2"), Some(2.4));
        assert!((linf("Pool_1").unwrap() - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_same_seed_same_network() {
        let config = Config::default();
        let biology = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let network = build_network(&config, &mut rng).unwrap();
            (
                network.spawning().probability().to_vec(),
                network.nodes()[0].biology,
                network.paths()[0].probability,
            )
        };
        assert_eq!(biology(5), biology(5));
    }
}
