//! Long-format result records and file export.

use crate::network::Network;
use crate::stats::StatsHistory;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Result, Write};
use std::path::Path;

/// Individuals at one mesh point of one group at one time column
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopulationRecord {
    pub iteration: usize,
    pub year: usize,
    pub month: usize,
    pub node: String,
    pub group: String,
    pub length: f64,
    pub population: f64,
}

/// One record per (time column, node, group, mesh point).
///
/// Column `t` maps to `year = t / n_months` and `month = t % n_months`.
pub fn extract_populations(network: &Network, iteration: usize) -> Vec<PopulationRecord> {
    let n_months = network.n_months();
    let omega = network.mesh().omega();
    let mut records = Vec::new();

    for node in network.nodes() {
        for group in node.groups() {
            for (time, column) in group.population.columns().into_iter().enumerate() {
                for (&length, &population) in omega.iter().zip(column.iter()) {
                    records.push(PopulationRecord {
                        iteration,
                        year: time / n_months,
                        month: time % n_months,
                        node: node.name().to_string(),
                        group: group.name().to_string(),
                        length,
                        population,
                    });
                }
            }
        }
    }

    records
}

/// Files written by [`ExportSystem::export_run`]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportManifest {
    pub iterations: usize,
    pub records: usize,
    pub populations_file: String,
    pub stats_file: String,
}

/// Export system for saving projection results
pub struct ExportSystem;

impl ExportSystem {
    /// Write records to CSV with a header row
    pub fn write_csv<P: AsRef<Path>>(records: &[PopulationRecord], path: P) -> Result<()> {
        let mut file = BufWriter::new(File::create(path)?);

        writeln!(file, "iteration,year,month,node,group,length,population")?;

        for record in records {
            writeln!(
                file,
                "{},{},{},{},{},{:.6},{}",
                record.iteration,
                record.year,
                record.month,
                record.node,
                record.group,
                record.length,
                record.population,
            )?;
        }

        file.flush()
    }

    /// Export a stats history to JSON
    pub fn export_stats_json<P: AsRef<Path>>(history: &StatsHistory, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(history)?;
        std::fs::write(path, json)
    }

    /// Write `populations.csv` and `stats_history.json` under `base_path`
    pub fn export_run<P: AsRef<Path>>(
        records: &[PopulationRecord],
        history: &StatsHistory,
        base_path: P,
    ) -> Result<ExportManifest> {
        let base = base_path.as_ref();
        std::fs::create_dir_all(base)?;

        let populations_path = base.join("populations.csv");
        let stats_path = base.join("stats_history.json");

        Self::write_csv(records, &populations_path)?;
        Self::export_stats_json(history, &stats_path)?;

        let iterations = records
            .iter()
            .map(|r| r.iteration + 1)
            .max()
            .unwrap_or(0);

        Ok(ExportManifest {
            iterations,
            records: records.len(),
            populations_file: populations_path.to_string_lossy().to_string(),
            stats_file: stats_path.to_string_lossy().to_string(),
        })
    }

    /// Export a plain-text summary of the network's final state
    pub fn export_summary<P: AsRef<Path>>(network: &Network, path: P) -> Result<()> {
        let mut file = File::create(path)?;
        let last = network.n_times() - 1;

        write!(file, "{}", network)?;
        writeln!(file)?;
        writeln!(file, "=== Final State (t = {}) ===", last)?;
        writeln!(file, "Total Population: {:.1}", network.population(last))?;
        for node in network.nodes() {
            writeln!(
                file,
                "  {}: {:.1} individuals, {:.1} biomass",
                node.name(),
                node.population(last),
                node.biomass(last, network.mesh())
            )?;
        }

        Ok(())
    }
}
