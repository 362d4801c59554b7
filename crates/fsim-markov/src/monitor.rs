use std::path::{Path, PathBuf};

use fsim_core::errors::SimError;
use fsim_core::{Complex64, ParameterSource};
use fsim_diagram::Diagram;
use fsim_estimate::{EstimatorBundle, SaveMode};
use tracing::{debug, info};

/// Bundle of complex-valued observables.
pub const C_ESTIMATOR: &str = "cEstimator";
/// Bundle of real-valued observables.
pub const R_ESTIMATOR: &str = "rEstimator";
/// Name of the estimator present in both bundles from construction on.
pub const UNIT_ESTIMATOR: &str = "1";

const UNIT_SLOT: usize = 0;

/// Name of the real estimator tracking how often `order` is visited.
pub fn order_estimator_name(order: usize) -> String {
    format!("Order{order}")
}

/// Checkpoint file holding one bundle inside a checkpoint directory.
pub fn bundle_path(dir: &Path, bundle: &str) -> PathBuf {
    dir.join(format!("{bundle}.zip"))
}

/// Observables of one trajectory and the hooks the sampling loop calls on
/// them.
///
/// `cEstimator["1"]` accumulates the diagram phase outside worm space,
/// `rEstimator["1"]` the fraction of steps spent in worm space and
/// `rEstimator["Order<n>"]` the frequency of order `n` outside worm space.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkovMonitor {
    /// Complex observables.
    pub c_estimator: EstimatorBundle<Complex64>,
    /// Real observables.
    pub r_estimator: EstimatorBundle<f64>,
    order_slots: Vec<usize>,
}

impl Default for MarkovMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkovMonitor {
    /// Creates a monitor holding only the two `"1"` estimators.
    pub fn new() -> Self {
        Self {
            c_estimator: EstimatorBundle::with_estimator(UNIT_ESTIMATOR),
            r_estimator: EstimatorBundle::with_estimator(UNIT_ESTIMATOR),
            order_slots: Vec::new(),
        }
    }

    /// Creates a monitor with cleared statistics and one order estimator per
    /// order up to `para.order()`.
    pub fn build_new(para: &dyn ParameterSource) -> Result<Self, SimError> {
        let mut monitor = Self::new();
        for order in 0..=para.order() {
            let slot = monitor.r_estimator.add_estimator(order_estimator_name(order))?;
            monitor.order_slots.push(slot);
        }
        monitor.clear_statistics();
        info!(
            order = para.order(),
            complex = monitor.c_estimator.len(),
            real = monitor.r_estimator.len(),
            "monitor built"
        );
        Ok(monitor)
    }

    /// Builds a monitor for `para` and restores both bundles from `dir`.
    ///
    /// Succeeds only if both bundles load.
    pub fn load(para: &dyn ParameterSource, dir: &Path) -> Result<Self, SimError> {
        let mut monitor = Self::build_new(para)?;
        monitor
            .c_estimator
            .load_state(&bundle_path(dir, C_ESTIMATOR))?;
        monitor
            .r_estimator
            .load_state(&bundle_path(dir, R_ESTIMATOR))?;
        info!(dir = %dir.display(), "monitor loaded");
        Ok(monitor)
    }

    /// Writes both bundles into `dir`, each into its own archive.
    pub fn save(&self, dir: &Path) -> Result<(), SimError> {
        self.c_estimator
            .save_state(&bundle_path(dir, C_ESTIMATOR), SaveMode::Create)?;
        self.r_estimator
            .save_state(&bundle_path(dir, R_ESTIMATOR), SaveMode::Create)?;
        info!(dir = %dir.display(), "monitor saved");
        Ok(())
    }

    /// Records the observables of the current diagram.
    pub fn measure(&mut self, diagram: &Diagram) {
        let in_worm_space = diagram.worm.exist;
        self.r_estimator[UNIT_SLOT].measure(if in_worm_space { 1.0 } else { 0.0 });
        if in_worm_space {
            return;
        }
        self.c_estimator[UNIT_SLOT].measure(diagram.phase);
        for (order, &slot) in self.order_slots.iter().enumerate() {
            let hit = if order == diagram.order { 1.0 } else { 0.0 };
            self.r_estimator[slot].measure(hit);
        }
    }

    /// Flushes every running average into its history.
    pub fn add_statistics(&mut self) {
        self.c_estimator.add_statistics();
        self.r_estimator.add_statistics();
    }

    /// Empties every history and resets the running sums.
    pub fn clear_statistics(&mut self) {
        self.c_estimator.clear_statistics();
        self.r_estimator.clear_statistics();
    }

    /// Down-weights everything measured so far by `factor`.
    pub fn squeeze_statistics(&mut self, factor: f64) {
        debug!(factor, "squeezing statistics");
        self.c_estimator.squeeze_statistics(factor);
        self.r_estimator.squeeze_statistics(factor);
    }

    /// Hook called when the controller changes beta; statistics collected at
    /// the previous temperature are squeezed by `factor`, which must be
    /// positive.
    pub fn annealing(&mut self, factor: f64) {
        self.squeeze_statistics(factor);
    }

    /// Frequency of each order measured so far, or `None` for orders without
    /// an estimator.
    pub fn order_frequencies(&self, max_order: usize) -> Vec<Option<f64>> {
        (0..=max_order)
            .map(|order| {
                self.order_slots.get(order).map(|&slot| {
                    let estimator = &self.r_estimator[slot];
                    estimator.accumulator() / estimator.normalization()
                })
            })
            .collect()
    }

    /// Suggests an order reweighting that flattens the order histogram.
    ///
    /// Each factor is divided by the measured frequency of its order, then all
    /// factors are rescaled so that order zero keeps its current factor.
    /// Orders never visited keep their current factor.
    pub fn reweight_each_order(&self, para: &dyn ParameterSource) -> Vec<f64> {
        let current = para.order_reweight();
        let frequencies = self.order_frequencies(para.order());
        let mut suggested: Vec<f64> = current
            .iter()
            .zip(&frequencies)
            .map(|(&factor, frequency)| match frequency {
                Some(f) if *f > 0.0 => factor / f,
                _ => factor,
            })
            .collect();
        if let (Some(&first), Some(&reference)) = (suggested.first(), current.first()) {
            if first > 0.0 {
                let scale = reference / first;
                suggested.iter_mut().for_each(|factor| *factor *= scale);
            }
        }
        debug!(?current, ?suggested, "order reweighting suggested");
        suggested
    }
}
