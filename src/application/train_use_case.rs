// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates a training run in order:
//
//   Step 1: Validate the configuration
//   Step 2: Load the MNIST train and test splits  (Layer 4 - data)
//   Step 3: Build datasets                        (Layer 4 - data)
//   Step 4: Save config, open metrics log         (Layer 6 - infra)
//   Step 5: Run the training loop                 (Layer 5 - ml)

use anyhow::{bail, Result};
use burn::tensor::backend::AutodiffBackend;
use serde::{Deserialize, Serialize};

use crate::data::{dataset::DigitDataset, source::{load_split, Split}};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::MetricsLogger,
    plot::EmbeddingPlotter,
};
use crate::ml::lr_schedule::LrMode;
use crate::ml::trainer::{run_training, TrainOutputs};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run. Saved next to the
// checkpoints so `eval` can rebuild the same model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Directory with MNIST IDX files; None uses burn's download
    pub data_dir:       Option<String>,
    pub checkpoint_dir: String,
    pub plot_dir:       String,
    pub epochs:         usize,
    pub batch_size:     usize,
    pub lr:             f64,
    pub target_lr:      f64,
    pub warmup_epochs:  usize,
    pub warmup_lr:      f64,
    pub lr_mode:        LrMode,
    pub momentum:       f64,
    pub weight_decay:   f64,
    pub plot_period:    usize,
    pub embedding_size: usize,
    pub center_weight:  f64,
    pub seed:           u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:       None,
            checkpoint_dir: "checkpoints".to_string(),
            plot_dir:       "resources".to_string(),
            epochs:         101,
            batch_size:     256,
            lr:             0.1,
            target_lr:      1e-8,
            warmup_epochs:  10,
            warmup_lr:      0.001,
            lr_mode:        LrMode::Cosine,
            momentum:       0.9,
            weight_decay:   5e-4,
            plot_period:    20,
            embedding_size: 2,
            center_weight:  1.0,
            seed:           42,
        }
    }
}

impl TrainConfig {
    /// Reject settings the training loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            bail!("epochs must be at least 1");
        }
        if self.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }
        if self.plot_period == 0 {
            bail!("plot_period must be at least 1");
        }
        if self.embedding_size < 2 {
            bail!("embedding_size must be at least 2 to plot embeddings");
        }
        Ok(())
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end on backend B.
    pub fn execute<B: AutodiffBackend>(&self, device: B::Device) -> Result<()> {
        let cfg = &self.config;

        // ── Step 1: Validate ──────────────────────────────────────────────────
        cfg.validate()?;

        // ── Step 2: Load both splits ──────────────────────────────────────────
        let train_samples = load_split(cfg.data_dir.as_deref(), Split::Train)?;
        let val_samples   = load_split(cfg.data_dir.as_deref(), Split::Test)?;

        // ── Step 3: Burn datasets ─────────────────────────────────────────────
        let train_dataset = DigitDataset::new(train_samples);
        let val_dataset   = DigitDataset::new(val_samples);

        // ── Step 4: Artefact writers ──────────────────────────────────────────
        let checkpoints = CheckpointManager::new(&cfg.checkpoint_dir);
        checkpoints.save_config(cfg)?;
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;
        tracing::info!("Logging epoch metrics to '{}'", metrics.csv_path().display());
        let plotter = EmbeddingPlotter::new(&cfg.plot_dir);

        // ── Step 5: Training loop (Layer 5) ───────────────────────────────────
        let outputs = TrainOutputs {
            checkpoints: &checkpoints,
            metrics:     &metrics,
            plotter:     &plotter,
        };
        run_training::<B>(cfg, train_dataset, val_dataset, outputs, device)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(TrainConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_settings() {
        let base = TrainConfig::default();
        assert!(TrainConfig { epochs: 0, ..base.clone() }.validate().is_err());
        assert!(TrainConfig { batch_size: 0, ..base.clone() }.validate().is_err());
        assert!(TrainConfig { plot_period: 0, ..base.clone() }.validate().is_err());
        assert!(TrainConfig { embedding_size: 1, ..base }.validate().is_err());
    }

    #[test]
    fn test_config_json_round_trip_keeps_lr_mode() {
        let cfg = TrainConfig {
            lr_mode: LrMode::Step { epochs: vec![30, 60], factor: 0.1 },
            ..TrainConfig::default()
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: TrainConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.lr_mode, cfg.lr_mode);
        assert_eq!(back.data_dir, None);
    }
}
