use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};

/// One point of a sweep.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ExperimentConfig {
    pub temperature: f64,
    pub top_k: u32,
}

impl ExperimentConfig {
    pub fn new(temperature: f64, top_k: u32) -> Self {
        Self { temperature, top_k }
    }

    /// Exact match, including the bit pattern of the temperature.
    pub fn matches(&self, temperature: f64, top_k: u32) -> bool {
        self.temperature.to_bits() == temperature.to_bits() && self.top_k == top_k
    }
}

impl fmt::Display for ExperimentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T={:.2}, K={}", self.temperature, self.top_k)
    }
}

/// How a single sweep axis is discretised.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum AxisSpec<T> {
    Single { value: T },
    Range { min: T, max: T, steps: u32 },
}

impl<T> AxisSpec<T> {
    pub fn single(value: T) -> Self {
        AxisSpec::Single { value }
    }

    pub fn range(min: T, max: T, steps: u32) -> Self {
        AxisSpec::Range { min, max, steps }
    }
}

impl AxisSpec<f64> {
    /// `steps` values evenly spaced over `[min, max]`, both ends included.
    pub fn values(&self) -> Result<Vec<f64>> {
        match *self {
            AxisSpec::Single { value } => {
                if !value.is_finite() {
                    return Err(CoreError::InvalidRange(format!("non-finite value {}", value)));
                }
                Ok(vec![value])
            }
            AxisSpec::Range { min, max, steps } => {
                check_bounds(min, max, steps)?;
                if steps == 1 {
                    return Ok(vec![min]);
                }
                let span = max - min;
                let last = (steps - 1) as f64;
                Ok((0..steps)
                    .map(|i| {
                        if i == steps - 1 {
                            max
                        } else {
                            min + i as f64 * span / last
                        }
                    })
                    .collect())
            }
        }
    }
}

impl AxisSpec<u32> {
    /// Same spacing as the float axis, rounded to the nearest integer.
    pub fn values(&self) -> Result<Vec<u32>> {
        match *self {
            AxisSpec::Single { value } => Ok(vec![value]),
            AxisSpec::Range { min, max, steps } => {
                let spread = AxisSpec::Range {
                    min: f64::from(min),
                    max: f64::from(max),
                    steps,
                }
                .values()?;
                Ok(spread.into_iter().map(|v| v.round() as u32).collect())
            }
        }
    }
}

fn check_bounds(min: f64, max: f64, steps: u32) -> Result<()> {
    if !min.is_finite() || !max.is_finite() {
        return Err(CoreError::InvalidRange(format!(
            "bounds must be finite (min={}, max={})",
            min, max
        )));
    }
    if steps < 1 {
        return Err(CoreError::InvalidRange("steps must be at least 1".to_string()));
    }
    if max < min {
        return Err(CoreError::InvalidRange(format!(
            "max ({}) is below min ({})",
            max, min
        )));
    }
    Ok(())
}

/// The (temperature, top-K) sweep of one experiment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SweepSpec {
    pub temperature: AxisSpec<f64>,
    pub top_k: AxisSpec<u32>,
}

impl SweepSpec {
    pub fn new(temperature: AxisSpec<f64>, top_k: AxisSpec<u32>) -> Self {
        Self { temperature, top_k }
    }

    /// Cartesian product, temperature outer and top-K inner. Identical input
    /// always produces the identical sequence.
    pub fn expand(&self) -> Result<Vec<ExperimentConfig>> {
        let temperatures = self.temperature.values()?;
        let top_ks = self.top_k.values()?;

        let mut configs = Vec::with_capacity(temperatures.len() * top_ks.len());
        for &temperature in &temperatures {
            for &top_k in &top_ks {
                configs.push(ExperimentConfig::new(temperature, top_k));
            }
        }
        Ok(configs)
    }
}

impl Default for SweepSpec {
    fn default() -> Self {
        Self {
            temperature: AxisSpec::single(1.0),
            top_k: AxisSpec::single(40),
        }
    }
}
