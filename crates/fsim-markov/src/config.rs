use std::fs;
use std::path::Path;

use fsim_core::errors::{ErrorInfo, SimError};
use fsim_core::{ParameterSource, D, MAX_ORDER};
use serde::{Deserialize, Serialize};

/// Lattice geometry seen by the sampler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatticeConfig {
    /// Linear size along each axis.
    pub size: [i32; D],
    /// Number of sublattices per unit cell.
    #[serde(default = "default_n_sublat")]
    pub n_sublat: usize,
}

fn default_n_sublat() -> usize {
    1
}

/// Parameters of one Monte Carlo run, loaded from YAML or JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParaMc {
    /// Lattice geometry.
    pub lattice: LatticeConfig,
    /// Inverse temperature at which annealing starts.
    pub initial_beta: f64,
    /// Annealing step in inverse temperature.
    #[serde(default)]
    pub delta_beta: f64,
    /// Inverse temperature at which annealing stops.
    pub final_beta: f64,
    /// Current inverse temperature; defaults to `initial_beta`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beta: Option<f64>,
    /// Highest perturbation order sampled.
    pub order: usize,
    /// Thermalisation steps before measuring.
    #[serde(default = "default_toss")]
    pub toss: u64,
    /// Number of measured steps.
    #[serde(default = "default_sample")]
    pub sample: u64,
    /// Updates between two measurements.
    #[serde(default = "default_sweep")]
    pub sweep: u64,
    /// Master seed.
    pub seed: u64,
    /// Relative weight of the worm sector.
    #[serde(default = "default_worm_space_reweight")]
    pub worm_space_reweight: f64,
    /// Reweighting factor per order, `order + 1` entries.
    pub order_reweight: Vec<f64>,
    /// Number of imaginary-time bins.
    #[serde(default = "default_max_tau_bin")]
    pub max_tau_bin: usize,
    /// Steps executed so far.
    #[serde(default)]
    pub counter: u64,
    /// Parameter version, bumped by the controller between annealing steps.
    #[serde(default)]
    pub version: u64,
}

fn default_toss() -> u64 {
    10_000
}

fn default_sample() -> u64 {
    5_000_000
}

fn default_sweep() -> u64 {
    10
}

fn default_worm_space_reweight() -> f64 {
    0.1
}

fn default_max_tau_bin() -> usize {
    32
}

impl ParaMc {
    /// Parameter set used by tests and smoke runs: an 8x8 lattice with two
    /// sublattices at `beta = 1`, first order.
    pub fn test_defaults() -> Self {
        Self {
            lattice: LatticeConfig {
                size: [8, 8],
                n_sublat: 2,
            },
            initial_beta: 1.0,
            delta_beta: 0.0,
            final_beta: 1.0,
            beta: Some(1.0),
            order: 1,
            toss: default_toss(),
            sample: default_sample(),
            sweep: default_sweep(),
            seed: 519_180_543,
            worm_space_reweight: default_worm_space_reweight(),
            order_reweight: vec![1.0, 1.0],
            max_tau_bin: default_max_tau_bin(),
            counter: 0,
            version: 0,
        }
    }

    /// Loads and validates parameters. `.json` files are read as JSON, every
    /// other extension as YAML.
    pub fn from_path(path: &Path) -> Result<Self, SimError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            SimError::Config(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let parsed = if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        };
        parsed.map_err(|err| match err {
            SimError::Config(info) => {
                SimError::Config(info.with_context("path", path.display().to_string()))
            }
            other => other,
        })
    }

    /// Parses and validates YAML parameters.
    pub fn from_yaml_str(contents: &str) -> Result<Self, SimError> {
        let para: Self = serde_yaml::from_str(contents)
            .map_err(|err| SimError::Config(ErrorInfo::new("config-parse", err.to_string())))?;
        para.validate()?;
        Ok(para)
    }

    /// Parses and validates JSON parameters.
    pub fn from_json_str(contents: &str) -> Result<Self, SimError> {
        let para: Self = serde_json::from_str(contents)
            .map_err(|err| SimError::Config(ErrorInfo::new("config-parse", err.to_string())))?;
        para.validate()?;
        Ok(para)
    }

    /// Serializes the parameters to YAML.
    pub fn to_yaml(&self) -> Result<String, SimError> {
        serde_yaml::to_string(self)
            .map_err(|err| SimError::Serde(ErrorInfo::new("config-serialize", err.to_string())))
    }

    /// Checks the constraints every run relies on.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.order >= MAX_ORDER {
            return Err(config_error(
                ErrorInfo::new("order-too-large", "order must stay below MAX_ORDER")
                    .with_context("order", self.order.to_string())
                    .with_context("max_order", MAX_ORDER.to_string()),
            ));
        }
        if self.order_reweight.len() != self.order + 1 {
            return Err(config_error(
                ErrorInfo::new("reweight-length", "order_reweight needs order + 1 entries")
                    .with_context("order", self.order.to_string())
                    .with_context("entries", self.order_reweight.len().to_string()),
            ));
        }
        let beta = self.current_beta();
        if beta.is_nan() || beta <= 0.0 {
            return Err(config_error(
                ErrorInfo::new("beta-nonpositive", "beta must be positive")
                    .with_context("beta", beta.to_string()),
            ));
        }
        if beta < self.initial_beta || beta > self.final_beta {
            return Err(config_error(
                ErrorInfo::new("beta-out-of-range", "beta should be between initial and final beta")
                    .with_context("beta", beta.to_string())
                    .with_context("initial_beta", self.initial_beta.to_string())
                    .with_context("final_beta", self.final_beta.to_string())
                    .with_hint("omit beta to start from initial_beta"),
            ));
        }
        if self.lattice.size.iter().any(|&l| l <= 0) || self.lattice.n_sublat == 0 {
            return Err(config_error(
                ErrorInfo::new("lattice-empty", "lattice needs a positive size on every axis")
                    .with_context("size", format!("{:?}", self.lattice.size))
                    .with_context("n_sublat", self.lattice.n_sublat.to_string()),
            ));
        }
        Ok(())
    }

    /// Inverse temperature the run currently samples at.
    pub fn current_beta(&self) -> f64 {
        self.beta.unwrap_or(self.initial_beta)
    }

    /// Temperature matching [`ParaMc::current_beta`].
    pub fn temperature(&self) -> f64 {
        1.0 / self.current_beta()
    }
}

impl ParameterSource for ParaMc {
    fn order(&self) -> usize {
        self.order
    }

    fn beta(&self) -> f64 {
        self.current_beta()
    }

    fn seed(&self) -> u64 {
        self.seed
    }

    fn order_reweight(&self) -> &[f64] {
        &self.order_reweight
    }
}

fn config_error(info: ErrorInfo) -> SimError {
    SimError::Config(info)
}
