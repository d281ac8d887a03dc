//! Curve primitives shared by the projection model.
//!
//! - Logistic (sigmoid) curve used for harvest-by-length and size-based recruitment
//! - Survival curve over log length
//! - Stock-recruitment variants (Ricker, Beverton-Holt, size-logistic)
//! - Normal and log-normal densities used to build growth and recruit distributions
//!
//! Nothing here validates its inputs. Non-finite parameters propagate as NaN/inf.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Logistic curve `min + (max - min) / (1 + exp(-slope * (x - inflection)))`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Logistic {
    pub inflection: f64,
    pub slope: f64,
    pub min: f64,
    pub max: f64,
}

impl Logistic {
    pub fn new(inflection: f64, slope: f64, min: f64, max: f64) -> Self {
        Self {
            inflection,
            slope,
            min,
            max,
        }
    }

    /// Evaluate at a single point
    #[inline]
    pub fn eval(&self, x: f64) -> f64 {
        self.min + (self.max - self.min) / (1.0 + (-self.slope * (x - self.inflection)).exp())
    }

    /// Evaluate elementwise over an array
    pub fn eval_array(&self, x: &Array1<f64>) -> Array1<f64> {
        x.mapv(|v| self.eval(v))
    }
}

/// Survival probability per time step as a function of length.
///
/// `min + (max - min) / (1 + exp(beta * (ln(length) - ln(alpha))))`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurvivalCurve {
    pub min: f64,
    pub max: f64,
    pub alpha: f64,
    pub beta: f64,
}

impl SurvivalCurve {
    /// Length-independent survival
    pub fn constant(rate: f64) -> Self {
        Self {
            min: rate,
            max: rate,
            alpha: 1.0,
            beta: 0.0,
        }
    }

    #[inline]
    pub fn eval(&self, length: f64) -> f64 {
        self.min
            + (self.max - self.min) / (1.0 + (self.beta * (length.ln() - self.alpha.ln())).exp())
    }

    pub fn eval_array(&self, lengths: &Array1<f64>) -> Array1<f64> {
        lengths.mapv(|l| self.eval(l))
    }
}

/// Stock-recruitment relationship.
///
/// Ricker and Beverton-Holt map spawning stock biomass to recruits, the
/// logistic variant maps an individual's size (usually weight) to recruits.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recruitment {
    Ricker { r0: f64, s0: f64, h: f64 },
    BevertonHolt { r0: f64, s0: f64, h: f64 },
    Logistic {
        alpha: f64,
        beta: f64,
        min_recruit: f64,
        max_recruit: f64,
    },
}

impl Recruitment {
    /// Recruits produced for the given input
    pub fn recruits(&self, x: f64) -> f64 {
        match *self {
            Recruitment::Ricker { r0, s0, h } => {
                (x / (s0 / r0)) * ((5.0 * h).powf(5.0 / 4.0)).powf(1.0 - x / s0)
            }
            // Steepness term kept as (5h / 4 * h), not the textbook (5h - 1) / 4
            Recruitment::BevertonHolt { r0, s0, h } => {
                ((x / s0) * r0) / (1.0 - ((5.0 * h) / 4.0 * h) * (1.0 - x / s0))
            }
            Recruitment::Logistic {
                alpha,
                beta,
                min_recruit,
                max_recruit,
            } => Logistic::new(alpha, beta, min_recruit, max_recruit).eval(x),
        }
    }

    /// Elementwise recruits over an array of inputs
    pub fn recruits_array(&self, x: &Array1<f64>) -> Array1<f64> {
        x.mapv(|v| self.recruits(v))
    }
}

impl Default for Recruitment {
    fn default() -> Self {
        Recruitment::Logistic {
            alpha: 5.0,
            beta: 1.5,
            min_recruit: 0.0,
            max_recruit: 20_000.0,
        }
    }
}

/// Normal density
#[inline]
pub fn normal_pdf(x: f64, mean: f64, sd: f64) -> f64 {
    let z = (x - mean) / sd;
    (-0.5 * z * z).exp() / (sd * (2.0 * PI).sqrt())
}

/// Log-normal density with median `scale` and log-scale sd `s`.
///
/// Zero for non-positive `x`.
#[inline]
pub fn lognormal_pdf(x: f64, scale: f64, s: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    let z = (x / scale).ln() / s;
    (-0.5 * z * z).exp() / (x * s * (2.0 * PI).sqrt())
}

/// Divide by the sum, or return all zeros when the sum is zero.
///
/// Non-finite sums are divided through, so NaN propagates.
pub fn normalize_or_zero(mut values: Array1<f64>) -> Array1<f64> {
    let total = values.sum();
    if total == 0.0 {
        values.fill(0.0);
    } else {
        values /= total;
    }
    values
}
