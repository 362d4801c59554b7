#![deny(missing_docs)]

//! Core conventions, error types, randomness and collaborator contracts shared
//! by the diagrammatic Monte Carlo crates.

use serde::{Deserialize, Serialize};

mod convention;
pub mod errors;
pub mod rng;
mod site;

pub use convention::{Dir, Spin, D, MAX_K, MAX_ORDER};
pub use errors::{ErrorInfo, SimError};
pub use num_complex::Complex64;
pub use rng::{derive_substream_seed, RngHandle};
pub use site::Site;

/// Selects between the bare and the dressed amplitude of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dressing {
    /// Bare (non-interacting) amplitude.
    Bare,
    /// Dressed amplitude including self-energy or polarization corrections.
    Dressed,
}

/// One end of a line as seen by a weight table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Endpoint<S> {
    /// Lattice site of the end vertex.
    pub site: Site,
    /// Imaginary time of the end vertex.
    pub tau: f64,
    /// Spin state read from the end vertex.
    pub spin: S,
}

/// Amplitude returned for an interaction line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionWeight {
    /// Complex amplitude of the line.
    pub amplitude: Complex64,
    /// Perturbation order carried by the line.
    pub order: usize,
}

/// Opaque weight collaborator.
///
/// Implementations are pure functions of their arguments; the diagram layer
/// never inspects how amplitudes are tabulated.
pub trait WeightTable {
    /// Amplitude of a fermionic propagator between two ends.
    fn g_weight(&self, from: Endpoint<Spin>, to: Endpoint<Spin>, dressing: Dressing) -> Complex64;

    /// Amplitude of an interaction line; each end carries its vertex's
    /// `[IN, OUT]` spin pair.
    fn w_weight(
        &self,
        from: Endpoint<[Spin; 2]>,
        to: Endpoint<[Spin; 2]>,
        is_worm: bool,
        dressing: Dressing,
    ) -> InteractionWeight;
}

/// Trivial weight table: every line has unit amplitude.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitWeight;

impl WeightTable for UnitWeight {
    fn g_weight(&self, _from: Endpoint<Spin>, _to: Endpoint<Spin>, _dressing: Dressing) -> Complex64 {
        Complex64::new(1.0, 0.0)
    }

    fn w_weight(
        &self,
        _from: Endpoint<[Spin; 2]>,
        _to: Endpoint<[Spin; 2]>,
        _is_worm: bool,
        _dressing: Dressing,
    ) -> InteractionWeight {
        InteractionWeight {
            amplitude: Complex64::new(1.0, 0.0),
            order: 1,
        }
    }
}

/// Read-only view on the run parameters consumed by the core.
pub trait ParameterSource {
    /// Maximum perturbation order sampled by the run.
    fn order(&self) -> usize;

    /// Inverse temperature.
    fn beta(&self) -> f64;

    /// Master RNG seed.
    fn seed(&self) -> u64;

    /// Reweighting factor per order; length is `order() + 1`.
    fn order_reweight(&self) -> &[f64];
}
