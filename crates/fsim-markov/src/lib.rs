#![deny(missing_docs)]
#![doc = include_str!("../docs/monitor-api.md")]

//! Markov-chain bookkeeping for the diagrammatic sampler: run parameters,
//! observables and per-trajectory state.

/// Checkpoint manifest and file helpers.
pub mod checkpoint;
/// YAML/JSON run parameters and validation.
pub mod config;
/// Deterministic seed derivation helpers.
pub mod determinism;
/// Observable bundles and the sampling-loop hooks.
pub mod monitor;
/// Per-trajectory ownership of diagram, random stream and monitor.
pub mod trajectory;

pub use checkpoint::TrajectoryManifest;
pub use config::{LatticeConfig, ParaMc};
pub use determinism::{resume_seed, trajectory_seed};
pub use monitor::{order_estimator_name, MarkovMonitor, C_ESTIMATOR, R_ESTIMATOR, UNIT_ESTIMATOR};
pub use trajectory::Trajectory;
