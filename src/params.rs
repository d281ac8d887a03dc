//! Candidate-parameter tables and their resolution to concrete values.
//!
//! A table lists, per parameter, one or more candidate values (for example
//! bootstrap or posterior draws). Resolution either picks one candidate index
//! for the whole table or averages every parameter's candidates, as chosen by
//! an explicit [`ParameterStrategy`].

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Site name used when a node has no table of its own
pub const HYPER_SITE: &str = "hyper";

/// How candidate values are turned into a single value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterStrategy {
    /// Pick one candidate uniformly at random
    Stochastic,
    /// Average all candidates
    Mean,
}

impl ParameterStrategy {
    pub fn from_flag(stochastic: bool) -> Self {
        if stochastic {
            ParameterStrategy::Stochastic
        } else {
            ParameterStrategy::Mean
        }
    }

    pub fn is_stochastic(&self) -> bool {
        matches!(self, ParameterStrategy::Stochastic)
    }
}

/// Errors raised while resolving parameter tables
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// A required parameter is absent from the table
    Missing { site: String, parameter: String },
    /// A parameter has no candidates at all
    Empty { site: String, parameter: String },
    /// Candidate lists of different lengths in one table
    Inconsistent {
        site: String,
        parameter: String,
        expected: usize,
        found: usize,
    },
    /// Neither a site table nor the hyper fallback exists
    NoTable { kind: String, site: String },
    /// Distribution parameters rejected by the sampler
    Distribution { name: String, reason: String },
}

impl std::fmt::Display for ParameterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing { site, parameter } => {
                write!(f, "parameter '{}' missing for site '{}'", parameter, site)
            }
            Self::Empty { site, parameter } => {
                write!(f, "parameter '{}' has no candidates for site '{}'", parameter, site)
            }
            Self::Inconsistent {
                site,
                parameter,
                expected,
                found,
            } => write!(
                f,
                "parameter '{}' for site '{}' has {} candidates, expected 1 or {}",
                parameter, site, found, expected
            ),
            Self::NoTable { kind, site } => write!(
                f,
                "no {} table for site '{}' and no '{}' fallback",
                kind, site, HYPER_SITE
            ),
            Self::Distribution { name, reason } => {
                write!(f, "invalid {} distribution: {}", name, reason)
            }
        }
    }
}

impl std::error::Error for ParameterError {}

/// Candidate values for one site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateTable {
    pub site: String,
    /// Parameter name -> candidate values. Single-valued entries are constants.
    pub values: BTreeMap<String, Vec<f64>>,
}

impl CandidateTable {
    pub fn new(site: &str) -> Self {
        Self {
            site: site.to_string(),
            values: BTreeMap::new(),
        }
    }

    /// Builder-style insertion
    pub fn with(mut self, parameter: &str, candidates: Vec<f64>) -> Self {
        self.values.insert(parameter.to_string(), candidates);
        self
    }

    /// Number of candidate columns (the longest candidate list)
    pub fn n_candidates(&self) -> usize {
        self.values.values().map(Vec::len).max().unwrap_or(0)
    }

    /// Check that every list has either one entry or the full column count
    pub fn validate(&self) -> Result<(), ParameterError> {
        let expected = self.n_candidates();
        for (name, candidates) in &self.values {
            if candidates.is_empty() {
                return Err(ParameterError::Empty {
                    site: self.site.clone(),
                    parameter: name.clone(),
                });
            }
            if candidates.len() != 1 && candidates.len() != expected {
                return Err(ParameterError::Inconsistent {
                    site: self.site.clone(),
                    parameter: name.clone(),
                    expected,
                    found: candidates.len(),
                });
            }
        }
        Ok(())
    }

    /// Resolve every parameter to a single value.
    ///
    /// `Stochastic` draws one column index shared by every multi-valued
    /// parameter; `Mean` consumes no randomness.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        strategy: ParameterStrategy,
        rng: &mut R,
    ) -> Result<ResolvedParameters, ParameterError> {
        self.validate()?;

        let column = match strategy {
            ParameterStrategy::Stochastic if self.n_candidates() > 1 => {
                Some(rng.gen_range(0..self.n_candidates()))
            }
            _ => None,
        };

        let values = self
            .values
            .iter()
            .map(|(name, candidates)| {
                let value = match (column, candidates.len()) {
                    (_, 1) => candidates[0],
                    (Some(index), _) => candidates[index],
                    (None, n) => candidates.iter().sum::<f64>() / n as f64,
                };
                (name.clone(), value)
            })
            .collect();

        Ok(ResolvedParameters {
            site: self.site.clone(),
            values,
        })
    }
}

/// Find the table for `site`, falling back to the hyper site
pub fn select_table<'a>(
    tables: &'a [CandidateTable],
    kind: &str,
    site: &str,
) -> Result<&'a CandidateTable, ParameterError> {
    tables
        .iter()
        .find(|t| t.site == site)
        .or_else(|| tables.iter().find(|t| t.site == HYPER_SITE))
        .ok_or_else(|| ParameterError::NoTable {
            kind: kind.to_string(),
            site: site.to_string(),
        })
}

/// Concrete values for one site
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParameters {
    site: String,
    values: BTreeMap<String, f64>,
}

impl ResolvedParameters {
    pub fn get(&self, parameter: &str) -> Result<f64, ParameterError> {
        self.values
            .get(parameter)
            .copied()
            .ok_or_else(|| ParameterError::Missing {
                site: self.site.clone(),
                parameter: parameter.to_string(),
            })
    }

    pub fn site(&self) -> &str {
        &self.site
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn table() -> CandidateTable {
        CandidateTable::new("pool_a")
            .with("K", vec![0.1, 0.2, 0.3])
            .with("Linf", vec![1.0, 2.0, 3.0])
            .with("sd", vec![0.05])
    }

    #[test]
    fn test_mean_strategy() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let resolved = table().resolve(ParameterStrategy::Mean, &mut rng).unwrap();
        assert!((resolved.get("K").unwrap() - 0.2).abs() < 1e-12);
        assert!((resolved.get("Linf").unwrap() - 2.0).abs() < 1e-12);
        assert_eq!(resolved.get("sd").unwrap(), 0.05);
    }

    #[test]
    fn test_stochastic_uses_one_column() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..20 {
            let resolved = table()
                .resolve(ParameterStrategy::Stochastic, &mut rng)
                .unwrap();
            let k = resolved.get("K").unwrap();
            let linf = resolved.get("Linf").unwrap();
            // Same column index for both parameters
            assert!((linf - k * 10.0).abs() < 1e-9);
            assert_eq!(resolved.get("sd").unwrap(), 0.05);
        }
    }

    #[test]
    fn test_stochastic_is_seeded() {
        let draw = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            table()
                .resolve(ParameterStrategy::Stochastic, &mut rng)
                .unwrap()
                .get("K")
                .unwrap()
        };
        assert_eq!(draw(42), draw(42));
    }

    #[test]
    fn test_missing_parameter() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let resolved = table().resolve(ParameterStrategy::Mean, &mut rng).unwrap();
        assert!(matches!(
            resolved.get("g_length"),
            Err(ParameterError::Missing { .. })
        ));
    }

    #[test]
    fn test_inconsistent_lengths() {
        let bad = table().with("g_length", vec![0.0, 0.1]);
        assert!(matches!(
            bad.validate(),
            Err(ParameterError::Inconsistent { found: 2, .. })
        ));
    }

    #[test]
    fn test_select_table_fallback() {
        let tables = vec![table(), CandidateTable::new(HYPER_SITE).with("K", vec![0.5])];
        assert_eq!(select_table(&tables, "growth", "pool_a").unwrap().site, "pool_a");
        assert_eq!(select_table(&tables, "growth", "pool_b").unwrap().site, HYPER_SITE);
        assert!(select_table(&tables[..1], "growth", "pool_b").is_err());
    }
}
