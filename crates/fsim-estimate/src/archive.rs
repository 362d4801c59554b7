use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use fsim_core::errors::{ErrorInfo, SimError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;
use zip::write::FileOptions;
use zip::ZipArchive;

use crate::sample::Sample;

const ENTRY_SUFFIX: &str = ".bin";

/// How a save treats an archive that already exists on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Start from an empty archive, discarding whatever the file held.
    Create,
    /// Keep existing entries and add or replace the written keys.
    Append,
}

/// Float64 array stored under one archive key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayEntry {
    /// Array dimensions; the trailing dimension is the component count for
    /// multi-component samples.
    pub shape: Vec<usize>,
    /// Row-major values.
    pub data: Vec<f64>,
}

impl ArrayEntry {
    /// Encodes a sequence of samples. Complex values become `[n, 2]` arrays.
    pub fn from_samples<T: Sample>(values: &[T]) -> Self {
        let mut data = Vec::with_capacity(values.len() * T::COMPONENTS);
        for value in values {
            for component in 0..T::COMPONENTS {
                data.push(value.component(component));
            }
        }
        let shape = if T::COMPONENTS == 1 {
            vec![values.len()]
        } else {
            vec![values.len(), T::COMPONENTS]
        };
        Self { shape, data }
    }

    /// Decodes a sequence of samples, checking the array layout.
    pub fn to_samples<T: Sample>(&self, key: &str) -> Result<Vec<T>, SimError> {
        let rows = self.shape.first().copied().unwrap_or(0);
        let expected_shape = if T::COMPONENTS == 1 {
            vec![rows]
        } else {
            vec![rows, T::COMPONENTS]
        };
        if self.shape != expected_shape || self.data.len() != rows * T::COMPONENTS {
            return Err(SimError::Checkpoint(
                ErrorInfo::new("checkpoint-shape", "array layout does not match the sample type")
                    .with_context("key", key)
                    .with_context("shape", format!("{:?}", self.shape))
                    .with_context("values", self.data.len().to_string()),
            ));
        }
        Ok(self
            .data
            .chunks(T::COMPONENTS)
            .map(T::from_components)
            .collect())
    }

    /// Decodes a single sample stored as a one-row array.
    pub fn to_scalar<T: Sample>(&self, key: &str) -> Result<T, SimError> {
        let values = self.to_samples::<T>(key)?;
        match values.as_slice() {
            [value] => Ok(*value),
            _ => Err(SimError::Checkpoint(
                ErrorInfo::new("checkpoint-shape", "expected a single value")
                    .with_context("key", key)
                    .with_context("rows", values.len().to_string()),
            )),
        }
    }
}

/// Named binary container of float64 arrays, persisted as a zip file with one
/// bincode-encoded entry per key.
///
/// Keys keep the order in which they were first written. [`Archive::commit`]
/// replaces the file atomically.
#[derive(Debug, Clone)]
pub struct Archive {
    path: PathBuf,
    entries: IndexMap<String, ArrayEntry>,
}

impl Archive {
    /// Opens an archive for writing.
    ///
    /// With [`SaveMode::Create`] the archive starts empty. With
    /// [`SaveMode::Append`] existing entries are loaded if the file exists.
    pub fn open(path: &Path, mode: SaveMode) -> Result<Self, SimError> {
        match mode {
            SaveMode::Append if path.exists() => Self::load(path),
            _ => Ok(Self {
                path: path.to_path_buf(),
                entries: IndexMap::new(),
            }),
        }
    }

    /// Reads every entry of an existing archive.
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let file = File::open(path).map_err(|err| checkpoint_error("checkpoint-read", err, path))?;
        let mut zip = ZipArchive::new(file).map_err(|err| checkpoint_error("checkpoint-read", err, path))?;
        let mut entries = IndexMap::new();
        for index in 0..zip.len() {
            let mut file = zip
                .by_index(index)
                .map_err(|err| checkpoint_error("checkpoint-read", err, path))?;
            let Some(key) = file.name().strip_suffix(ENTRY_SUFFIX).map(str::to_string) else {
                continue;
            };
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)
                .map_err(|err| checkpoint_error("checkpoint-read", err, path))?;
            let entry: ArrayEntry = bincode::deserialize(&bytes).map_err(|err| {
                SimError::Serde(
                    ErrorInfo::new("checkpoint-decode", err.to_string())
                        .with_context("path", path.display().to_string())
                        .with_context("key", key.clone()),
                )
            })?;
            entries.insert(key, entry);
        }
        debug!(path = %path.display(), entries = entries.len(), "archive loaded");
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// File the archive is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored keys in write order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the archive holds no key.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stores an array, replacing any previous value under the same key.
    pub fn insert(&mut self, key: impl Into<String>, entry: ArrayEntry) {
        self.entries.insert(key.into(), entry);
    }

    /// Returns the array stored under `key`; a missing key is a checkpoint error.
    pub fn get(&self, key: &str) -> Result<&ArrayEntry, SimError> {
        self.entries.get(key).ok_or_else(|| {
            SimError::Checkpoint(
                ErrorInfo::new("checkpoint-missing-key", format!("can't find {key} in archive"))
                    .with_context("key", key)
                    .with_context("path", self.path.display().to_string())
                    .with_hint("checkpoint was written by a run with different observables"),
            )
        })
    }

    /// Writes the archive to a temporary file next to it and persists it into
    /// place. On failure the previous file is untouched and no staging file
    /// is left behind.
    pub fn commit(&self) -> Result<(), SimError> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent)
                    .map_err(|err| checkpoint_error("checkpoint-mkdir", err, parent))?;
                parent.to_path_buf()
            }
            None => PathBuf::from("."),
        };

        // Dropped on any early return, which removes the partial file.
        let tmp = NamedTempFile::new_in(&dir)
            .map_err(|err| checkpoint_error("checkpoint-write", err, &dir))?;
        let tmp_path = tmp.path().to_path_buf();
        let mut writer = zip::ZipWriter::new(tmp);
        let options = FileOptions::default();
        for (key, entry) in &self.entries {
            let bytes = bincode::serialize(entry).map_err(|err| {
                SimError::Serde(
                    ErrorInfo::new("checkpoint-encode", err.to_string()).with_context("key", key.clone()),
                )
            })?;
            writer
                .start_file(format!("{key}{ENTRY_SUFFIX}"), options)
                .map_err(|err| checkpoint_error("checkpoint-write", err, &tmp_path))?;
            writer
                .write_all(&bytes)
                .map_err(|err| checkpoint_error("checkpoint-write", err, &tmp_path))?;
        }
        let tmp = writer
            .finish()
            .map_err(|err| checkpoint_error("checkpoint-write", err, &tmp_path))?;
        tmp.persist(&self.path)
            .map_err(|err| checkpoint_error("checkpoint-rename", err, &self.path))?;
        debug!(path = %self.path.display(), entries = self.entries.len(), "archive written");
        Ok(())
    }
}

fn checkpoint_error(code: &str, err: impl ToString, path: &Path) -> SimError {
    SimError::Checkpoint(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
    )
}
