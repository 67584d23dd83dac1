// ============================================================
// Layer 2 — Eval Use Case
// ============================================================
// Rebuilds the model from train_config.json, loads the newest
// checkpoint and runs one validation pass over the test split,
// optionally plotting the test embeddings.

use anyhow::{bail, Result};
use burn::tensor::backend::Backend;

use crate::data::{dataset::DigitDataset, source::{load_split, Split}};
use crate::domain::stats::EpochStats;
use crate::infra::{checkpoint::CheckpointManager, plot::EmbeddingPlotter};
use crate::ml::center_loss::CenterLossModel;
use crate::ml::trainer::{eval_loader, model_config, validate};

pub struct EvalUseCase {
    data_dir:   Option<String>,
    checkpoint: CheckpointManager,
    plot_dir:   Option<String>,
    batch_size: usize,
}

impl EvalUseCase {
    /// `plot_dir` set means the test embeddings are drawn.
    pub fn new(
        data_dir:       Option<String>,
        checkpoint_dir: &str,
        plot_dir:       Option<String>,
        batch_size:     usize,
    ) -> Self {
        Self {
            data_dir,
            checkpoint: CheckpointManager::new(checkpoint_dir),
            plot_dir,
            batch_size,
        }
    }

    pub fn execute<B: Backend>(&self, device: B::Device) -> Result<EpochStats> {
        if self.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }

        let cfg   = self.checkpoint.load_config()?;
        let epoch = self.checkpoint.latest_epoch()?;

        let model: CenterLossModel<B> = model_config(&cfg).init(&device);
        let model = self.checkpoint.load_model(model, &device)?;

        let samples = load_split(self.data_dir.as_deref(), Split::Test)?;
        let loader  = eval_loader::<B>(DigitDataset::new(samples), self.batch_size, &device);

        let validation = validate(&model, &loader, self.plot_dir.is_some())?;

        if let Some(dir) = &self.plot_dir {
            EmbeddingPlotter::new(dir.as_str())
                .save(&validation.embeddings, &format!("center-eval-epoch{epoch}.png"))?;
        }

        Ok(validation.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::TrainConfig;
    use crate::data::idx::{self, tests::{image_file, label_file}};
    use burn::backend::NdArray;
    use std::fs;

    type TestBackend = NdArray;

    #[test]
    fn test_eval_reports_stats_for_saved_checkpoint() {
        let root = std::env::temp_dir()
            .join(format!("mnist-center-loss-eval-{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);
        let data = root.join("data");
        fs::create_dir_all(&data).unwrap();
        fs::write(data.join(idx::TEST_IMAGES), image_file(&vec![vec![0u8; 784]; 5])).unwrap();
        fs::write(data.join(idx::TEST_LABELS), label_file(&[0, 1, 2, 3, 4])).unwrap();

        let ckpt_dir = root.join("ckpt").display().to_string();
        let cfg = TrainConfig::default();
        let ckpt = CheckpointManager::new(&ckpt_dir);
        ckpt.save_config(&cfg).unwrap();
        let device = Default::default();
        let model: CenterLossModel<TestBackend> = model_config(&cfg).init(&device);
        ckpt.save_model(&model, 0).unwrap();

        let plots = root.join("plots").display().to_string();
        let use_case = EvalUseCase::new(Some(data.display().to_string()), &ckpt_dir, Some(plots), 2);
        let stats = use_case.execute::<TestBackend>(device).unwrap();

        assert_eq!(stats.samples(), 5);
        assert_eq!(stats.batches(), 3);
        assert!(root.join("plots").join("center-eval-epoch0.png").is_file());
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_zero_batch_size_is_rejected_without_touching_disk() {
        let root = std::env::temp_dir()
            .join(format!("mnist-center-loss-eval-zero-{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);
        let ckpt_dir = root.join("ckpt").display().to_string();

        let use_case = EvalUseCase::new(None, &ckpt_dir, None, 0);
        let err = use_case.execute::<TestBackend>(Default::default()).unwrap_err();

        assert!(err.to_string().contains("batch_size"), "{err}");
        assert!(!root.join("ckpt").exists());
    }
}
