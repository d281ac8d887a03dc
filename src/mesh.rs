//! Length mesh over which every population distribution is discretized.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Mesh settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshConfig {
    /// Number of interior mesh points
    pub n_points: usize,
    /// Lower boundary of the length domain
    pub min_length: f64,
    /// Upper boundary of the length domain
    pub max_length: f64,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            n_points: 100,
            min_length: 0.01,
            max_length: 1.5,
        }
    }
}

/// Representative lengths (`omega`).
///
/// The interior knots of an evenly spaced grid of `n_points + 2` points spanning
/// `[min_length, max_length]`, so both boundaries are excluded.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    config: MeshConfig,
    omega: Array1<f64>,
}

impl Mesh {
    pub fn new(config: MeshConfig) -> Self {
        let grid = Array1::linspace(config.min_length, config.max_length, config.n_points + 2);
        let omega = grid.slice(ndarray::s![1..-1]).to_owned();
        Self { config, omega }
    }

    /// Mesh points
    #[inline]
    pub fn omega(&self) -> &Array1<f64> {
        &self.omega
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.omega.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.omega.is_empty()
    }

    /// Spacing between neighbouring mesh points
    pub fn width(&self) -> f64 {
        (self.config.max_length - self.config.min_length) / (self.config.n_points + 1) as f64
    }

    pub fn min_length(&self) -> f64 {
        self.config.min_length
    }

    pub fn max_length(&self) -> f64 {
        self.config.max_length
    }

    pub fn config(&self) -> &MeshConfig {
        &self.config
    }
}
