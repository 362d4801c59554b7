use std::fs;
use std::path::{Path, PathBuf};

use fsim_core::errors::{ErrorInfo, SimError};
use serde::{Deserialize, Serialize};

use crate::config::ParaMc;

/// Manifest file inside a checkpoint directory.
pub const MANIFEST_FILE: &str = "trajectory.json";
/// Diagram snapshot file inside a checkpoint directory.
pub const DIAGRAM_FILE: &str = "diagram.json";

/// Everything besides the estimator archives needed to resume a trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryManifest {
    /// Parameters the trajectory ran with; `counter` holds the steps done.
    pub para: ParaMc,
    /// Position of the trajectory within its ensemble.
    pub index: usize,
    /// Seed the trajectory started from.
    pub seed: u64,
    /// Canonical hash of the saved diagram snapshot.
    pub diagram_hash: String,
}

impl TrajectoryManifest {
    /// Path of the manifest inside `dir`.
    pub fn path(dir: &Path) -> PathBuf {
        dir.join(MANIFEST_FILE)
    }

    /// Writes the manifest to a JSON file.
    pub fn write(&self, path: &Path) -> Result<(), SimError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                SimError::Checkpoint(
                    ErrorInfo::new("manifest-mkdir", err.to_string())
                        .with_context("path", parent.display().to_string()),
                )
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            SimError::Serde(
                ErrorInfo::new("manifest-serialize", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        fs::write(path, json).map_err(|err| {
            SimError::Checkpoint(
                ErrorInfo::new("manifest-write", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }

    /// Loads a manifest from disk and validates the stored parameters.
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            SimError::Checkpoint(
                ErrorInfo::new("manifest-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        let manifest: Self = serde_json::from_str(&contents).map_err(|err| {
            SimError::Serde(
                ErrorInfo::new("manifest-parse", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        manifest.para.validate()?;
        Ok(manifest)
    }
}

/// Reads a text file that belongs to a checkpoint.
pub(crate) fn read_checkpoint_file(path: &Path) -> Result<String, SimError> {
    fs::read_to_string(path).map_err(|err| {
        SimError::Checkpoint(
            ErrorInfo::new("checkpoint-read", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })
}

/// Writes a text file that belongs to a checkpoint.
pub(crate) fn write_checkpoint_file(path: &Path, contents: &str) -> Result<(), SimError> {
    fs::write(path, contents).map_err(|err| {
        SimError::Checkpoint(
            ErrorInfo::new("checkpoint-write", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })
}
