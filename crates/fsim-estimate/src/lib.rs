#![deny(missing_docs)]

//! Running estimators for Monte Carlo observables with trimmed-range error
//! bars and checkpointing into a named binary archive.

mod archive;
mod bundle;
mod estimator;
mod sample;
mod trimmed;

pub use archive::{Archive, ArrayEntry, SaveMode};
pub use bundle::EstimatorBundle;
pub use estimator::{Estimate, Estimator};
pub use sample::Sample;
pub use trimmed::{discarded, trimmed_range, TrimmedRange, THROW_RATIO};

/// Estimator of a real observable.
pub type RealEstimator = Estimator<f64>;

/// Estimator of a complex observable.
pub type ComplexEstimator = Estimator<fsim_core::Complex64>;
