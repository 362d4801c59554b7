use std::fs;
use std::path::Path;

use fsim_core::errors::{ErrorInfo, SimError};
use fsim_core::RngHandle;
use fsim_diagram::{canonical_hash, diagram_from_json, diagram_to_json, random_ring_diagram, Diagram};
use tracing::info;

use crate::checkpoint::{read_checkpoint_file, write_checkpoint_file, TrajectoryManifest, DIAGRAM_FILE};
use crate::config::ParaMc;
use crate::determinism::{resume_seed, trajectory_seed};
use crate::monitor::MarkovMonitor;

/// One Monte Carlo trajectory: the diagram, its random stream and its
/// observables, owned together so that independent trajectories never share
/// mutable state.
#[derive(Debug)]
pub struct Trajectory {
    para: ParaMc,
    index: usize,
    seed: u64,
    /// Diagram being sampled.
    pub diagram: Diagram,
    /// Random stream of this trajectory.
    pub rng: RngHandle,
    /// Observables of this trajectory.
    pub monitor: MarkovMonitor,
}

impl Trajectory {
    /// Starts trajectory `index` of an ensemble from a first-order ring diagram.
    pub fn new(para: ParaMc, index: usize) -> Result<Self, SimError> {
        para.validate()?;
        let seed = trajectory_seed(para.seed, index);
        let mut rng = RngHandle::from_seed(seed);
        let diagram = random_ring_diagram(
            1,
            para.current_beta(),
            para.lattice.size,
            para.lattice.n_sublat,
            &mut rng,
        )?;
        let monitor = MarkovMonitor::build_new(&para)?;
        info!(index, seed, order = diagram.order, "trajectory started");
        Ok(Self {
            para,
            index,
            seed,
            diagram,
            rng,
            monitor,
        })
    }

    /// Restores a trajectory from a checkpoint directory written by
    /// [`Trajectory::save`].
    ///
    /// The random stream is reseeded from the step counter rather than
    /// restored.
    pub fn resume(dir: &Path) -> Result<Self, SimError> {
        let manifest = TrajectoryManifest::load(&TrajectoryManifest::path(dir))?;
        let diagram = diagram_from_json(&read_checkpoint_file(&dir.join(DIAGRAM_FILE))?)?;
        let hash = canonical_hash(&diagram);
        if hash != manifest.diagram_hash {
            return Err(SimError::Checkpoint(
                ErrorInfo::new("checkpoint-hash-mismatch", "diagram snapshot does not match manifest")
                    .with_context("expected", manifest.diagram_hash.clone())
                    .with_context("found", hash)
                    .with_context("dir", dir.display().to_string()),
            ));
        }
        let monitor = MarkovMonitor::load(&manifest.para, dir)?;
        let rng = RngHandle::from_seed(resume_seed(
            manifest.para.seed,
            manifest.index,
            manifest.para.counter,
        ));
        info!(
            index = manifest.index,
            counter = manifest.para.counter,
            dir = %dir.display(),
            "trajectory resumed"
        );
        Ok(Self {
            para: manifest.para,
            index: manifest.index,
            seed: manifest.seed,
            diagram,
            rng,
            monitor,
        })
    }

    /// Parameters of the run, with `counter` tracking the steps done.
    pub fn para(&self) -> &ParaMc {
        &self.para
    }

    /// Position within the ensemble.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Seed the trajectory started from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Steps recorded so far.
    pub fn counter(&self) -> u64 {
        self.para.counter
    }

    /// Measures the current diagram and advances the step counter.
    pub fn record(&mut self) {
        self.monitor.measure(&self.diagram);
        self.para.counter += 1;
    }

    /// Flushes the monitor's running averages into the histories.
    pub fn add_statistics(&mut self) {
        self.monitor.add_statistics();
    }

    /// Replaces the order reweighting with the monitor's flat-histogram
    /// suggestion and returns it.
    pub fn reweight_each_order(&mut self) -> &[f64] {
        self.para.order_reweight = self.monitor.reweight_each_order(&self.para);
        &self.para.order_reweight
    }

    /// Writes the estimator archives, the diagram snapshot and the manifest
    /// into `dir`. The manifest goes last, so a directory with a manifest
    /// holds a complete checkpoint.
    pub fn save(&self, dir: &Path) -> Result<(), SimError> {
        fs::create_dir_all(dir).map_err(|err| {
            SimError::Checkpoint(
                ErrorInfo::new("checkpoint-mkdir", err.to_string())
                    .with_context("path", dir.display().to_string()),
            )
        })?;
        self.monitor.save(dir)?;
        write_checkpoint_file(&dir.join(DIAGRAM_FILE), &diagram_to_json(&self.diagram)?)?;
        let manifest = TrajectoryManifest {
            para: self.para.clone(),
            index: self.index,
            seed: self.seed,
            diagram_hash: canonical_hash(&self.diagram),
        };
        manifest.write(&TrajectoryManifest::path(dir))?;
        info!(index = self.index, counter = self.para.counter, dir = %dir.display(), "trajectory saved");
        Ok(())
    }
}
