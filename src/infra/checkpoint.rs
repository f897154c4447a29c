// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Persists model state at epoch boundaries using Burn's
// CompactRecorder (MessagePack). Per training run the directory
// holds:
//
//   model_epoch_{n}.mpk — full parameter state after epoch n
//   latest_epoch.json   — which epoch to load for inference
//   train_config.json   — architecture hyperparameters, needed
//                         to rebuild the exact model before the
//                         record can be loaded into it
//
// There is no schema versioning: a record that does not match the
// rebuilt architecture is a fatal load error, by design.

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use serde_json;

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::Spell2PronModel;

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Creates the checkpoint directory if it does not exist yet.
    pub fn new(dir: impl Into<String>) -> Self {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    /// Save full model state for one epoch and advance the
    /// latest-epoch pointer.
    pub fn save_model<B: Backend>(
        &self,
        model: &Spell2PronModel<B>,
        epoch: usize,
    ) -> Result<()> {
        let path = self.dir.join(format!("model_epoch_{epoch}"));

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        let latest_path = self.dir.join("latest_epoch.json");
        fs::write(&latest_path, serde_json::to_string(&epoch)?)
            .with_context(|| "Failed to write latest_epoch.json")?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Restore weights from the latest checkpoint into `model`.
    /// The model must already have the architecture the record was
    /// saved from; any mismatch fails the load.
    pub fn load_model<B: Backend>(
        &self,
        model:  Spell2PronModel<B>,
        device: &B::Device,
    ) -> Result<Spell2PronModel<B>> {
        let epoch = self.latest_epoch()?;
        let path  = self.dir.join(format!("model_epoch_{epoch}"));

        tracing::info!("Loading checkpoint from epoch {}", epoch);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display()
                )
            })?;

        Ok(model.load_record(record))
    }

    /// Persist the training configuration. Must happen before
    /// training so a crash mid-run still leaves inference able to
    /// rebuild the architecture for earlier epochs.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("train_config.json");
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join("train_config.json");
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. Make sure you have run 'train' before 'predict'.",
                path.display()
            )
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    fn latest_epoch(&self) -> Result<usize> {
        let path = self.dir.join("latest_epoch.json");
        let s = fs::read_to_string(&path)
            .with_context(|| "Cannot find 'latest_epoch.json'. Have you run 'train' first?")?;
        Ok(serde_json::from_str::<usize>(&s)?)
    }
}
