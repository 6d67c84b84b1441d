use std::path::Path;

use serde::Deserialize;

use crate::error::{LbmError, Result};
use crate::stencil::CS2;
use crate::structure_factor::NCOV;

/// Run parameters, read once at startup and immutable afterwards.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationParameters {
    /// cells along each axis of the periodic cube
    pub n: usize,
    /// number of steps performed by `run`
    pub steps: u64,
    /// steps between diagnostic outputs, 0 disables output
    pub plot_int: u64,
    /// shear relaxation time
    pub tau: f64,
    /// bulk relaxation time, defaults to `tau`
    pub tau_bulk: Option<f64>,
    /// relaxation rate of the ghost modes
    pub ghost_rate: f64,
    /// thermal energy `k_B T`; 0 switches the noise off
    pub temperature: f64,
    /// amplitude of the initial shear wave `u_y(x) = A sin(2πx/n)`
    pub amplitude: f64,
    /// global seed of the per-cell random streams
    pub seed: u64,
    /// remove the spatial mean velocity before transforming
    pub subtract_mean: bool,
    /// variance scaling of the structure factor, upper triangle `xx, xy, xz, yy, yz, zz`
    pub var_scaling: [f64; NCOV],
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            n: 16,
            steps: 100,
            plot_int: 10,
            tau: 1.0,
            tau_bulk: None,
            ghost_rate: 1.0,
            temperature: 0.0,
            amplitude: 0.001,
            seed: 0,
            subtract_mean: true,
            var_scaling: [1.0; NCOV],
        }
    }
}

impl SimulationParameters {
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let params: Self = serde_yaml::from_str(contents)?;
        params.validate()?;
        Ok(params)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        log::info!("loading parameters from {}", path.display());
        Self::from_yaml_str(&contents)
    }

    pub fn bulk_tau(&self) -> f64 {
        self.tau_bulk.unwrap_or(self.tau)
    }

    /// reject parameters that make the run meaningless before it starts
    pub fn validate(&self) -> Result<()> {
        fn invalid(msg: String) -> Result<()> {
            Err(LbmError::InvalidConfig(msg))
        }

        if self.n == 0 {
            return invalid("grid size must be positive".into());
        }
        if !(self.tau.is_finite() && self.tau >= 0.5) {
            return invalid(format!("tau must be at least 0.5, got {}", self.tau));
        }
        let tau_bulk = self.bulk_tau();
        if !(tau_bulk.is_finite() && tau_bulk >= 0.5) {
            return invalid(format!("tau_bulk must be at least 0.5, got {tau_bulk}"));
        }
        if !(self.ghost_rate.is_finite() && self.ghost_rate > 0.0 && self.ghost_rate < 2.0) {
            return invalid(format!(
                "ghost_rate must lie in (0, 2), got {}",
                self.ghost_rate
            ));
        }
        if !(self.temperature.is_finite() && self.temperature >= 0.0) {
            return invalid(format!(
                "temperature must be non-negative, got {}",
                self.temperature
            ));
        }
        if !self.amplitude.is_finite() {
            return invalid(format!("amplitude must be finite, got {}", self.amplitude));
        }
        if self.var_scaling.iter().any(|s| !s.is_finite() || *s == 0.0) {
            return invalid(format!(
                "var_scaling entries must be finite and non-zero, got {:?}",
                self.var_scaling
            ));
        }

        // legal but suspicious
        if self.tau < 0.51 {
            log::warn!("tau = {} is close to the stability limit", self.tau);
        }
        if self.amplitude.abs() >= CS2.sqrt() {
            log::warn!(
                "shear wave amplitude {} exceeds the lattice sound speed",
                self.amplitude
            );
        }

        Ok(())
    }
}
