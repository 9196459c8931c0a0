// ============================================================
// Layer 7 — Checkpoint Manager
// ============================================================
// Loads model weights with burn's CompactRecorder and keeps a
// JSON snapshot of the run configuration next to the results.
//
// CompactRecorder:
//   - Serialises module records to named MessagePack, half precision
//   - File extension .mpk
//   - Type-safe: loading fails if the architecture doesn't match
//
// Weight paths in the configuration are stems: the recorder adds
// the extension itself, so "checkpoints/stylegan_fmnist_32x32"
// refers to "checkpoints/stylegan_fmnist_32x32.mpk".
//
// Files written per run:
//   {frontier_pairs}/
//     run_config.json   ← configuration the run used

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::config::RunConfig;
use crate::domain::error::FrontierError;

/// Extension CompactRecorder appends to every record
pub const RECORD_EXTENSION: &str = "mpk";

/// The file a weight stem refers to on disk.
/// Any extension already on the stem is replaced, as the recorder does.
pub fn record_file(stem: &Path) -> PathBuf {
    stem.with_extension(RECORD_EXTENSION)
}

/// Load a record saved by CompactRecorder into a freshly built module.
/// The module must have the same architecture as the saved one.
pub fn load_module<B: Backend, M: Module<B>>(
    module: M,
    stem:   &Path,
    device: &B::Device,
) -> Result<M> {
    let record = Recorder::<B>::load(&CompactRecorder::new(), stem.to_path_buf(), device)
        .with_context(|| {
            format!(
                "Cannot load weights from '{}'. Does the architecture match the config?",
                record_file(stem).display()
            )
        })?;
    tracing::debug!("Loaded weights from '{}'", record_file(stem).display());
    Ok(module.load_record(record))
}

/// Save a module's weights; the inverse of load_module
#[cfg(test)]
pub fn save_module<B: Backend, M: Module<B>>(module: M, stem: &Path) -> Result<()> {
    if let Some(parent) = stem.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create '{}'", parent.display()))?;
    }
    Recorder::<B>::record(&CompactRecorder::new(), module.into_record(), stem.to_path_buf())
        .with_context(|| format!("Failed to save weights to '{}'", record_file(stem).display()))?;
    Ok(())
}

/// Read a configuration JSON file
pub fn read_config(path: &Path) -> Result<RunConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("'{}' is not a valid run configuration", path.display()))
}

/// Write a configuration as pretty JSON, creating parent directories
pub fn write_config(path: &Path, cfg: &RunConfig) -> Result<(), FrontierError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| FrontierError::storage(parent, e))?;
    }
    let json = serde_json::to_string_pretty(cfg)?;
    fs::write(path, json).map_err(|e| FrontierError::storage(path, e))?;
    Ok(())
}

/// Keeps the configuration snapshot of a run in its output directory
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join("run_config.json")
    }

    pub fn save_config(&self, cfg: &RunConfig) -> Result<(), FrontierError> {
        let path = self.config_path();
        write_config(&path, cfg)?;
        tracing::debug!("Saved run config to '{}'", path.display());
        Ok(())
    }
}
