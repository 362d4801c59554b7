use std::fmt;
use std::path::Path;

use fsim_core::errors::SimError;
use tracing::{info, warn};

use crate::archive::{Archive, ArrayEntry, SaveMode};
use crate::sample::Sample;
use crate::trimmed::trimmed_range;

/// Mean and error bar of an observable.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Estimate<T> {
    /// Running average.
    pub mean: T,
    /// Half the spread of the trimmed history.
    pub error: T,
}

impl<T> Estimate<T> {
    /// Creates an estimate from its parts.
    pub fn new(mean: T, error: T) -> Self {
        Self { mean, error }
    }
}

impl<T: Sample> fmt::Display for Estimate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&T::render_estimate(&self.mean, &self.error))
    }
}

/// Running statistics of one named observable.
///
/// `history` holds the cumulative average `accumulator / normalization` at
/// every flush. Flushes do not reset the running sums.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimator<T: Sample> {
    name: String,
    history: Vec<T>,
    accumulator: T,
    normalization: f64,
    ratio: f64,
    value: Estimate<T>,
}

impl<T: Sample> Estimator<T> {
    /// Creates an estimator with cleared statistics.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            history: Vec::new(),
            accumulator: T::default(),
            normalization: 1.0,
            ratio: 1.0,
            value: Estimate::default(),
        }
    }

    /// Observable name, also the checkpoint key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cumulative averages recorded so far.
    pub fn history(&self) -> &[T] {
        &self.history
    }

    /// Sum of measured values since the last clear.
    pub fn accumulator(&self) -> T {
        self.accumulator
    }

    /// Weight of the accumulated values.
    pub fn normalization(&self) -> f64 {
        self.normalization
    }

    /// Dispersion ratio computed by the last [`Estimator::estimate`].
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Estimate cached by the last [`Estimator::estimate`].
    pub fn last_estimate(&self) -> Estimate<T> {
        self.value
    }

    /// Records one sample.
    #[inline]
    pub fn measure(&mut self, value: T) {
        self.accumulator += value;
        self.normalization += 1.0;
    }

    /// Appends the current running average to the history.
    pub fn add_statistics(&mut self) {
        self.history.push(self.accumulator / self.normalization);
    }

    /// Empties the history and resets the running sums.
    ///
    /// The normalisation restarts at one, not zero, so the running average is
    /// defined before the first sample.
    pub fn clear_statistics(&mut self) {
        self.history.clear();
        self.accumulator = T::default();
        self.normalization = 1.0;
        self.ratio = 1.0;
    }

    /// Divides the running sums by `factor`, keeping the running average while
    /// down-weighting everything measured so far.
    ///
    /// `factor` must be positive; zero or a negative value would turn the sums
    /// into infinities or flip the sign of the normalisation.
    pub fn squeeze_statistics(&mut self, factor: f64) {
        debug_assert!(factor > 0.0, "squeeze factor must be positive, got {factor}");
        self.accumulator = self.accumulator / factor;
        self.normalization /= factor;
    }

    /// Recomputes mean, error and ratio from the running sums and the history.
    ///
    /// An empty history leaves the cached estimate and ratio untouched.
    pub fn estimate(&mut self) -> Estimate<T> {
        let Some(range) = trimmed_range(&self.history) else {
            warn!(estimator = %self.name, "estimate requested with empty history");
            return self.value;
        };
        self.value = Estimate::new(self.accumulator / self.normalization, range.error);
        self.ratio = range.ratio;
        self.value
    }

    /// Archive keys this estimator occupies: `<name>`, `<name>_Norm` and
    /// `<name>_Accu`.
    pub fn checkpoint_keys(&self) -> [String; 3] {
        [self.name.clone(), norm_key(&self.name), accu_key(&self.name)]
    }

    /// Stores history, normalisation and accumulator under
    /// [`Estimator::checkpoint_keys`].
    pub fn write_state(&self, archive: &mut Archive) {
        let [history_key, norm_key, accu_key] = self.checkpoint_keys();
        archive.insert(history_key, ArrayEntry::from_samples(&self.history));
        archive.insert(norm_key, ArrayEntry::from_samples(&[self.normalization]));
        archive.insert(accu_key, ArrayEntry::from_samples(&[self.accumulator]));
    }

    /// Restores the state written by [`Estimator::write_state`] and
    /// recomputes the estimate. Any missing key aborts the read and leaves the
    /// estimator unchanged.
    pub fn read_state(&mut self, archive: &Archive) -> Result<(), SimError> {
        let history = archive.get(&self.name)?.to_samples::<T>(&self.name)?;
        let norm_key = norm_key(&self.name);
        let normalization = archive.get(&norm_key)?.to_scalar::<f64>(&norm_key)?;
        let accu_key = accu_key(&self.name);
        let accumulator = archive.get(&accu_key)?.to_scalar::<T>(&accu_key)?;

        self.clear_statistics();
        self.history = history;
        self.normalization = normalization;
        self.accumulator = accumulator;
        self.estimate();
        Ok(())
    }

    /// Saves this estimator alone into the archive at `path`.
    pub fn save_state(&self, path: &Path, mode: SaveMode) -> Result<(), SimError> {
        let mut archive = Archive::open(path, mode)?;
        self.write_state(&mut archive);
        archive.commit()?;
        info!(estimator = %self.name, path = %path.display(), "estimator saved");
        Ok(())
    }

    /// Loads this estimator from the archive at `path`.
    pub fn load_state(&mut self, path: &Path) -> Result<(), SimError> {
        let archive = Archive::load(path)?;
        self.read_state(&archive).map_err(|err| tag_estimator(err, &self.name))
    }
}

fn norm_key(name: &str) -> String {
    format!("{name}_Norm")
}

fn accu_key(name: &str) -> String {
    format!("{name}_Accu")
}

pub(crate) fn tag_estimator(err: SimError, name: &str) -> SimError {
    match err {
        SimError::Checkpoint(info) => SimError::Checkpoint(info.with_context("estimator", name)),
        other => other,
    }
}

