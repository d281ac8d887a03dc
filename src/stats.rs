//! Statistics tracking for network projections.

use crate::network::Network;
use serde::{Deserialize, Serialize};

/// Totals for one node at one time index
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeStats {
    pub node: String,
    /// Individuals summed over groups
    pub population: f64,
    /// Biomass summed over groups
    pub biomass: f64,
    /// (group name, individuals)
    pub groups: Vec<(String, f64)>,
}

/// Statistics snapshot for a time index
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Stochastic iteration the snapshot belongs to
    pub iteration: usize,
    /// Global time index
    pub time: usize,
    pub year: usize,
    pub month: usize,
    /// Individuals over every node and group
    pub total_population: f64,
    /// Biomass over every node
    pub total_biomass: f64,
    pub nodes: Vec<NodeStats>,
}

impl Stats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Update stats from the network state at `time`
    pub fn update(&mut self, network: &Network, time: usize) {
        let n_months = network.n_months();
        let mesh = network.mesh();

        self.time = time;
        self.year = time / n_months;
        self.month = time % n_months;
        self.nodes = network
            .nodes()
            .iter()
            .map(|node| NodeStats {
                node: node.name().to_string(),
                population: node.population(time),
                biomass: node.biomass(time, mesh),
                groups: node
                    .groups()
                    .iter()
                    .map(|g| (g.name().to_string(), g.total(time)))
                    .collect(),
            })
            .collect();
        self.total_population = self.nodes.iter().map(|n| n.population).sum();
        self.total_biomass = self.nodes.iter().map(|n| n.biomass).sum();
    }

    /// Snapshot of the network at `time`
    pub fn from_network(network: &Network, iteration: usize, time: usize) -> Self {
        let mut stats = Self {
            iteration,
            ..Self::default()
        };
        stats.update(network, time);
        stats
    }

    /// Totals for a node, if present
    pub fn node(&self, name: &str) -> Option<&NodeStats> {
        self.nodes.iter().find(|n| n.node == name)
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        let per_node: Vec<String> = self
            .nodes
            .iter()
            .map(|n| format!("{}:{:.0}", n.node, n.population))
            .collect();
        format!(
            "It:{:3} | T:{:5} (Y{} M{:2}) | Pop:{:10.1} | Bio:{:10.1} | {}",
            self.iteration,
            self.time,
            self.year,
            self.month,
            self.total_population,
            self.total_biomass,
            per_node.join(" ")
        )
    }
}

/// Historical statistics tracker
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsHistory {
    /// All recorded stats snapshots
    pub snapshots: Vec<Stats>,
    /// Recording interval in time steps
    pub interval: usize,
}

impl StatsHistory {
    /// Create new history with recording interval
    pub fn new(interval: usize) -> Self {
        Self {
            snapshots: Vec::new(),
            interval: interval.max(1),
        }
    }

    /// Record a stats snapshot
    pub fn record(&mut self, stats: Stats) {
        self.snapshots.push(stats);
    }

    /// Record every `interval`-th column of a projected network, plus the last one
    pub fn record_network(&mut self, network: &Network, iteration: usize) {
        let last = network.n_times() - 1;
        for time in (0..=last).step_by(self.interval) {
            self.record(Stats::from_network(network, iteration, time));
        }
        if last % self.interval != 0 {
            self.record(Stats::from_network(network, iteration, last));
        }
    }

    /// Append another history's snapshots
    pub fn extend(&mut self, other: StatsHistory) {
        self.snapshots.extend(other.snapshots);
    }

    /// Get total population over time
    pub fn population_series(&self) -> Vec<(usize, f64)> {
        self.snapshots
            .iter()
            .map(|s| (s.time, s.total_population))
            .collect()
    }

    /// Get one node's population over time
    pub fn node_series(&self, name: &str) -> Vec<(usize, f64)> {
        self.snapshots
            .iter()
            .filter_map(|s| s.node(name).map(|n| (s.time, n.population)))
            .collect()
    }

    /// Snapshots of one iteration
    pub fn iteration(&self, iteration: usize) -> impl Iterator<Item = &Stats> {
        self.snapshots.iter().filter(move |s| s.iteration == iteration)
    }

    /// Save history to file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Load history from file
    pub fn load(path: &str) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(iteration: usize, time: usize, population: f64) -> Stats {
        Stats {
            iteration,
            time,
            total_population: population,
            nodes: vec![NodeStats {
                node: "Pool_1".to_string(),
                population,
                ..NodeStats::default()
            }],
            ..Stats::default()
        }
    }

    #[test]
    fn test_stats_history() {
        let mut history = StatsHistory::new(12);

        for i in 0..5 {
            history.record(snapshot(0, i * 12, (i + 1) as f64 * 100.0));
        }

        let series = history.population_series();
        assert_eq!(series.len(), 5);
        assert_eq!(series[0], (0, 100.0));
        assert_eq!(series[4], (48, 500.0));
        assert_eq!(history.node_series("Pool_1").len(), 5);
        assert!(history.node_series("Pool_9").is_empty());
    }

    #[test]
    fn test_iteration_filter() {
        let mut history = StatsHistory::new(0);
        assert_eq!(history.interval, 1);
        history.record(snapshot(0, 0, 1.0));
        history.record(snapshot(1, 0, 2.0));
        history.record(snapshot(1, 1, 3.0));
        assert_eq!(history.iteration(1).count(), 2);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut history = StatsHistory::new(6);
        history.record(snapshot(2, 6, 42.0));
        let path = std::env::temp_dir().join("metaipm_stats_history_test.json");
        let path = path.to_string_lossy().to_string();

        history.save(&path).unwrap();
        let loaded = StatsHistory::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, history);
    }

    #[test]
    fn test_summary() {
        let stats = snapshot(3, 25, 1234.0);
        let line = stats.summary();
        assert!(line.contains("Pool_1:1234"));
        assert!(line.starts_with("It:  3"));
    }
}
