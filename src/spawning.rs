//! Network-wide spawning schedule and per-year spawning probability.

use crate::params::{ParameterError, ParameterStrategy};
use rand::Rng;
use rand_distr::{Beta, Distribution};
use serde::{Deserialize, Serialize};

/// Spawning configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawningConfig {
    /// Months (0-based) in which spawning nodes spawn
    pub months: Vec<usize>,
    /// Beta shape `a` of the yearly spawning probability
    pub a: f64,
    /// Beta shape `b` of the yearly spawning probability
    pub b: f64,
}

impl Default for SpawningConfig {
    fn default() -> Self {
        Self {
            months: vec![4],
            a: 2.0,
            b: 2.0,
        }
    }
}

/// Spawning months plus the probability that spawning succeeds in each year
#[derive(Debug, Clone, PartialEq)]
pub struct Spawning {
    config: SpawningConfig,
    probability: Vec<f64>,
}

impl Spawning {
    /// Draw (or average) the yearly probabilities for `n_years`
    pub fn new<R: Rng + ?Sized>(
        config: SpawningConfig,
        n_years: usize,
        strategy: ParameterStrategy,
        rng: &mut R,
    ) -> Result<Self, ParameterError> {
        let probability = Self::draw(&config, n_years, strategy, rng)?;
        Ok(Self {
            config,
            probability,
        })
    }

    /// Same probability in every year
    pub fn fixed(months: Vec<usize>, probability: f64, n_years: usize) -> Self {
        Self {
            config: SpawningConfig {
                months,
                a: 1.0,
                b: 1.0,
            },
            probability: vec![probability; n_years],
        }
    }

    /// `Beta(a, b)` draws per year, or the Beta mean `a / (a + b)` repeated
    pub fn draw<R: Rng + ?Sized>(
        config: &SpawningConfig,
        n_years: usize,
        strategy: ParameterStrategy,
        rng: &mut R,
    ) -> Result<Vec<f64>, ParameterError> {
        let beta = Beta::new(config.a, config.b).map_err(|e| ParameterError::Distribution {
            name: "spawning beta".to_string(),
            reason: e.to_string(),
        })?;

        Ok(match strategy {
            ParameterStrategy::Stochastic => (0..n_years).map(|_| beta.sample(rng)).collect(),
            ParameterStrategy::Mean => vec![config.a / (config.a + config.b); n_years],
        })
    }

    /// Replace the yearly probabilities with a fresh draw
    pub fn redraw<R: Rng + ?Sized>(
        &mut self,
        n_years: usize,
        strategy: ParameterStrategy,
        rng: &mut R,
    ) -> Result<(), ParameterError> {
        self.probability = Self::draw(&self.config, n_years, strategy, rng)?;
        Ok(())
    }

    pub fn months(&self) -> &[usize] {
        &self.config.months
    }

    pub fn probability(&self) -> &[f64] {
        &self.probability
    }
}
