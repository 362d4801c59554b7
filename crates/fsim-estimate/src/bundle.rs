use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};
use std::path::Path;

use fsim_core::errors::{ErrorInfo, SimError};
use tracing::info;

use crate::archive::{Archive, SaveMode};
use crate::estimator::{tag_estimator, Estimate, Estimator};
use crate::sample::Sample;

/// Insertion-ordered estimators addressable by position and by name.
///
/// The name lookup stores positions, never references into the backing
/// vector, so growing the bundle keeps every name bound to its estimator.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorBundle<T: Sample> {
    estimators: Vec<Estimator<T>>,
    index: BTreeMap<String, usize>,
}

impl<T: Sample> Default for EstimatorBundle<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Sample> EstimatorBundle<T> {
    /// Creates an empty bundle.
    pub fn new() -> Self {
        Self {
            estimators: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    /// Creates a bundle holding one fresh estimator.
    pub fn with_estimator(name: impl Into<String>) -> Self {
        let estimator = Estimator::new(name);
        let mut index = BTreeMap::new();
        index.insert(estimator.name().to_string(), 0);
        Self {
            estimators: vec![estimator],
            index,
        }
    }

    /// Adds a fresh estimator under `name` and returns its position.
    pub fn add_estimator(&mut self, name: impl Into<String>) -> Result<usize, SimError> {
        self.push(Estimator::new(name))
    }

    /// Adds a copy of an existing estimator, history included.
    ///
    /// Fails if the name is taken or if any of its checkpoint keys is already
    /// used by another member.
    pub fn push(&mut self, estimator: Estimator<T>) -> Result<usize, SimError> {
        if let Some(position) = self.index.get(estimator.name()) {
            return Err(SimError::Estimator(
                ErrorInfo::new("duplicate-estimator", "estimator names must be unique in a bundle")
                    .with_context("name", estimator.name())
                    .with_context("position", position.to_string()),
            ));
        }
        let keys = estimator.checkpoint_keys();
        for member in &self.estimators {
            if let Some(key) = member.checkpoint_keys().into_iter().find(|key| keys.contains(key)) {
                return Err(SimError::Estimator(
                    ErrorInfo::new(
                        "estimator-key-collision",
                        "estimator would share a checkpoint key with another member",
                    )
                    .with_context("name", estimator.name())
                    .with_context("member", member.name())
                    .with_context("key", key)
                    .with_hint("avoid names ending in _Norm or _Accu"),
                ));
            }
        }
        let position = self.estimators.len();
        self.index.insert(estimator.name().to_string(), position);
        self.estimators.push(estimator);
        Ok(position)
    }

    /// Number of estimators.
    pub fn len(&self) -> usize {
        self.estimators.len()
    }

    /// Whether the bundle is empty.
    pub fn is_empty(&self) -> bool {
        self.estimators.is_empty()
    }

    /// Position of the estimator registered under `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Estimator registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Estimator<T>> {
        self.position(name).map(|position| &self.estimators[position])
    }

    /// Mutable estimator registered under `name`.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Estimator<T>> {
        match self.position(name) {
            Some(position) => Some(&mut self.estimators[position]),
            None => None,
        }
    }

    /// Estimators in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Estimator<T>> {
        self.estimators.iter()
    }

    /// Mutable estimators in insertion order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Estimator<T>> {
        self.estimators.iter_mut()
    }

    /// Flushes every estimator's running average into its history.
    pub fn add_statistics(&mut self) {
        self.estimators.iter_mut().for_each(Estimator::add_statistics);
    }

    /// Clears every estimator. Members stay registered.
    pub fn clear_statistics(&mut self) {
        self.estimators.iter_mut().for_each(Estimator::clear_statistics);
    }

    /// Squeezes every estimator by `factor`.
    pub fn squeeze_statistics(&mut self, factor: f64) {
        for estimator in &mut self.estimators {
            estimator.squeeze_statistics(factor);
        }
    }

    /// Recomputes and returns every estimate, keyed by name in insertion order.
    pub fn estimates(&mut self) -> Vec<(String, Estimate<T>)> {
        self.estimators
            .iter_mut()
            .map(|estimator| (estimator.name().to_string(), estimator.estimate()))
            .collect()
    }

    /// Writes every member into the archive at `path`.
    ///
    /// The first member is written with `mode` and the rest are appended to
    /// it; the file is replaced once, after all members are written.
    pub fn save_state(&self, path: &Path, mode: SaveMode) -> Result<(), SimError> {
        let mut archive = Archive::open(path, mode)?;
        for estimator in &self.estimators {
            estimator.write_state(&mut archive);
        }
        archive.commit()?;
        info!(
            path = %path.display(),
            estimators = self.estimators.len(),
            "estimator bundle saved"
        );
        Ok(())
    }

    /// Restores every registered member from the archive at `path`.
    ///
    /// Members are matched by name. All members are decoded before any of
    /// them is modified, so a missing key leaves the bundle unchanged.
    pub fn load_state(&mut self, path: &Path) -> Result<(), SimError> {
        let archive = Archive::load(path)?;
        let mut restored = self.estimators.clone();
        for estimator in &mut restored {
            let name = estimator.name().to_string();
            estimator
                .read_state(&archive)
                .map_err(|err| tag_estimator(err, &name))?;
        }
        self.estimators = restored;
        info!(
            path = %path.display(),
            estimators = self.estimators.len(),
            "estimator bundle loaded"
        );
        Ok(())
    }
}

impl<T: Sample> Index<usize> for EstimatorBundle<T> {
    type Output = Estimator<T>;

    fn index(&self, position: usize) -> &Estimator<T> {
        &self.estimators[position]
    }
}

impl<T: Sample> IndexMut<usize> for EstimatorBundle<T> {
    fn index_mut(&mut self, position: usize) -> &mut Estimator<T> {
        &mut self.estimators[position]
    }
}

impl<T: Sample> Index<&str> for EstimatorBundle<T> {
    type Output = Estimator<T>;

    fn index(&self, name: &str) -> &Estimator<T> {
        match self.position(name) {
            Some(position) => &self.estimators[position],
            None => panic!("no estimator named {name} in bundle"),
        }
    }
}

impl<T: Sample> IndexMut<&str> for EstimatorBundle<T> {
    fn index_mut(&mut self, name: &str) -> &mut Estimator<T> {
        match self.position(name) {
            Some(position) => &mut self.estimators[position],
            None => panic!("no estimator named {name} in bundle"),
        }
    }
}
