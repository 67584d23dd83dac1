// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Custom epoch loop over Burn's DataLoader:
//
//   - training runs on the autodiff backend B
//   - model.valid() hands back the same weights on B::InnerBackend,
//     and validation batches are built on that inner backend
//   - every plot_period epochs the 2-D embeddings of both splits
//     are collected and drawn, and a checkpoint is written
//
// Optimiser: SGD with Nesterov momentum and L2 weight decay.
// The learning rate comes from WarmupLrScheduler, stepped once
// per batch.

use anyhow::{bail, Result};
use burn::{
    data::{
        dataloader::{DataLoader, DataLoaderBuilder},
        dataset::Dataset,
    },
    lr_scheduler::LrScheduler,
    module::AutodiffModule,
    optim::{decay::WeightDecayConfig, momentum::MomentumConfig, GradientsParams, Optimizer, SgdConfig},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use std::{sync::Arc, time::Instant};

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{DigitBatch, DigitBatcher},
    dataset::DigitDataset,
};
use crate::domain::{embedding::EmbeddingSet, stats::EpochStats};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
    plot::EmbeddingPlotter,
};
use crate::ml::center_loss::{count_correct, CenterLossModel, CenterLossModelConfig};
use crate::ml::lr_schedule::WarmupLrSchedulerConfig;
use crate::ml::model::MnistNetConfig;

pub type Loader<B> = Arc<dyn DataLoader<B, DigitBatch<B>>>;

/// Result of one pass over the validation set.
pub struct Validation {
    pub stats:      EpochStats,
    pub embeddings: EmbeddingSet,
}

/// Where the training loop writes its artefacts.
pub struct TrainOutputs<'a> {
    pub checkpoints: &'a CheckpointManager,
    pub metrics:     &'a MetricsLogger,
    pub plotter:     &'a EmbeddingPlotter,
}

pub fn model_config(cfg: &TrainConfig) -> CenterLossModelConfig {
    let net = MnistNetConfig::new().with_embedding_size(cfg.embedding_size);
    CenterLossModelConfig::new(net).with_center_weight(cfg.center_weight)
}

// Both loaders run on the calling thread. Burn's worker pool gives each
// worker its own slice of the dataset, which leaves a partial batch per
// worker and interleaves batches in completion order.

/// Unshuffled loader keeping the final partial batch.
pub fn eval_loader<B: Backend>(
    dataset:    DigitDataset,
    batch_size: usize,
    device:     &B::Device,
) -> Loader<B> {
    DataLoaderBuilder::new(DigitBatcher::new())
        .batch_size(batch_size)
        .set_device(device.clone())
        .build(dataset)
}

/// Shuffled loader for one training epoch; every batch is full.
pub fn train_loader<B: Backend>(
    dataset:    &DigitDataset,
    seed:       u64,
    epoch:      usize,
    batch_size: usize,
    device:     &B::Device,
) -> Loader<B> {
    DataLoaderBuilder::new(DigitBatcher::new())
        .batch_size(batch_size)
        .set_device(device.clone())
        .build(dataset.epoch_view(seed, epoch, batch_size))
}

pub fn run_training<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    train_dataset: DigitDataset,
    val_dataset:   DigitDataset,
    outputs:       TrainOutputs<'_>,
    device:        B::Device,
) -> Result<CenterLossModel<B>> {
    B::seed(cfg.seed);

    let num_batches = train_dataset.full_batches(cfg.batch_size);
    if num_batches == 0 {
        bail!(
            "Training set has {} samples, fewer than one batch of {}",
            train_dataset.len(),
            cfg.batch_size
        );
    }

    // ── Model: network + center-loss centroids ───────────────────────────────
    let mut model: CenterLossModel<B> = model_config(cfg).init(&device);
    tracing::info!(
        "Model ready: embedding_size={}, center_weight={}",
        cfg.embedding_size,
        cfg.center_weight
    );

    // ── Learning-rate schedule ───────────────────────────────────────────────
    let mut scheduler = WarmupLrSchedulerConfig::new(cfg.lr_mode.clone(), cfg.lr, num_batches, cfg.epochs)
        .with_target_lr(cfg.target_lr)
        .with_warmup_epochs(cfg.warmup_epochs)
        .with_warmup_lr(cfg.warmup_lr)
        .init()?;

    // ── SGD + Nesterov momentum + weight decay ────────────────────────────────
    let momentum = MomentumConfig::new()
        .with_momentum(cfg.momentum)
        .with_dampening(0.0)
        .with_nesterov(true);
    let mut optim = SgdConfig::new()
        .with_momentum(Some(momentum))
        .with_weight_decay(Some(WeightDecayConfig::new(cfg.weight_decay as f32)))
        .init();

    // ── Validation loader (inner backend, no autodiff overhead) ──────────────
    let val_loader = eval_loader::<B::InnerBackend>(val_dataset, cfg.batch_size, &device);

    tracing::info!("{} iterations per epoch, {} epochs", num_batches, cfg.epochs);

    let mut stats         = EpochStats::new();
    let mut best_val_loss = f64::INFINITY;

    for epoch in 0..cfg.epochs {
        let plot = epoch % cfg.plot_period == 0;
        let tic  = Instant::now();

        stats.reset();
        let mut train_embeddings = EmbeddingSet::new();

        // A fresh drop-last permutation every epoch
        let loader = train_loader::<B>(&train_dataset, cfg.seed, epoch, cfg.batch_size, &device);

        for batch in loader.iter() {
            let batch_size = batch.labels.dims()[0];
            let labels     = batch.labels.clone();

            let output = model.forward_step(batch.images, batch.labels);
            let loss   = output.loss.mean();
            let loss_value: f64 = loss.clone().into_scalar().elem::<f64>();

            if plot {
                collect_embeddings(&mut train_embeddings, output.embeddings.clone(), labels.clone())?;
            }
            let correct = count_correct(output.logits, labels);

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            let lr    = scheduler.step();
            model     = optim.step(lr, model, grads);

            stats.record_batch(loss_value, correct, batch_size);
        }

        let validation = validate(&model.valid(), &val_loader, plot)?;
        let seconds    = tic.elapsed().as_secs_f64();

        println!(
            "[epoch {:>3}] train accuracy: {:.6}, train loss: {:.6} | val accuracy: {:.6}, val loss: {:.6}, time: {:.6}",
            epoch,
            stats.accuracy(),
            stats.loss(),
            validation.stats.accuracy(),
            validation.stats.loss(),
            seconds,
        );

        let metrics = EpochMetrics {
            epoch,
            train_acc:  stats.accuracy(),
            train_loss: stats.loss(),
            val_acc:    validation.stats.accuracy(),
            val_loss:   validation.stats.loss(),
            seconds,
        };
        outputs.metrics.log(&metrics)?;
        if metrics.is_improvement(best_val_loss) {
            best_val_loss = metrics.val_loss;
            tracing::debug!("New best validation loss {:.6} at epoch {}", best_val_loss, epoch);
        }

        if plot {
            outputs.plotter.save(&train_embeddings, &format!("center-train-epoch{epoch}.png"))?;
            outputs.plotter.save(&validation.embeddings, &format!("center-val-epoch{epoch}.png"))?;
            outputs.checkpoints.save_model(&model, epoch)?;
        }
    }

    // Make sure the final weights are on disk even off the plot period
    let last_epoch = cfg.epochs - 1;
    if last_epoch % cfg.plot_period != 0 {
        outputs.checkpoints.save_model(&model, last_epoch)?;
    }

    tracing::info!("Training complete after {} iterations", scheduler.iteration());
    Ok(model)
}

/// One pass over `loader` without gradients.
pub fn validate<B: Backend>(
    model:  &CenterLossModel<B>,
    loader: &Loader<B>,
    plot:   bool,
) -> Result<Validation> {
    let mut stats      = EpochStats::new();
    let mut embeddings = EmbeddingSet::new();

    for batch in loader.iter() {
        let batch_size = batch.labels.dims()[0];
        let labels     = batch.labels.clone();

        let output     = model.forward_step(batch.images, batch.labels);
        let loss_value = output.loss.mean().into_scalar().elem::<f64>();

        if plot {
            collect_embeddings(&mut embeddings, output.embeddings, labels.clone())?;
        }
        let correct = count_correct(output.logits, labels);
        stats.record_batch(loss_value, correct, batch_size);
    }

    Ok(Validation { stats, embeddings })
}

/// Copy the first two embedding components of a batch to the host.
fn collect_embeddings<B: Backend>(
    set:        &mut EmbeddingSet,
    embeddings: Tensor<B, 2>,
    labels:     Tensor<B, 1, Int>,
) -> Result<()> {
    let [batch_size, _] = embeddings.dims();
    let coords: Vec<f32> = embeddings
        .slice([0..batch_size, 0..2])
        .into_data()
        .iter::<f32>()
        .collect();
    let labels: Vec<u8> = labels.into_data().iter::<i64>().map(|l| l as u8).collect();
    set.extend_batch(&coords, &labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::digit::DigitSample;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = NdArray;
    type TestAutodiffBackend = Autodiff<NdArray>;

    fn tiny_dataset(n: usize) -> DigitDataset {
        DigitDataset::new(
            (0..n)
                .map(|i| {
                    let mut pixels = vec![0u8; 784];
                    pixels[(i * 37) % 784] = 255;
                    DigitSample::new(pixels, (i % 10) as u8)
                })
                .collect(),
        )
    }

    #[test]
    fn test_validate_counts_every_sample_and_collects_embeddings() {
        let device = Default::default();
        let cfg    = TrainConfig::default();
        let model: CenterLossModel<TestBackend> = model_config(&cfg).init(&device);
        let loader = eval_loader::<TestBackend>(tiny_dataset(7), 3, &device);

        let v = validate(&model, &loader, true).unwrap();
        // Partial last batch is kept: 3 + 3 + 1
        assert_eq!(v.stats.batches(), 3);
        assert_eq!(v.stats.samples(), 7);
        assert_eq!(v.embeddings.len(), 7);
        assert!(v.stats.loss().is_finite());
        assert!((0.0..=1.0).contains(&v.stats.accuracy()));
    }

    #[test]
    fn test_validate_without_plot_skips_embeddings() {
        let device = Default::default();
        let model: CenterLossModel<TestBackend> = model_config(&TrainConfig::default()).init(&device);
        let loader = eval_loader::<TestBackend>(tiny_dataset(4), 4, &device);
        assert!(validate(&model, &loader, false).unwrap().embeddings.is_empty());
    }

    fn epoch_batches(dataset: &DigitDataset, epoch: usize, batch_size: usize) -> Vec<Vec<i64>> {
        let device = Default::default();
        train_loader::<TestBackend>(dataset, 42, epoch, batch_size, &device)
            .iter()
            .map(|batch| batch.labels.into_data().iter::<i64>().collect())
            .collect()
    }

    #[test]
    fn test_train_loader_yields_only_full_batches() {
        let dataset = tiny_dataset(44);
        let batches = epoch_batches(&dataset, 0, 8);

        assert_eq!(batches.len(), dataset.full_batches(8));
        assert!(batches.iter().all(|b| b.len() == 8), "{batches:?}");
    }

    #[test]
    fn test_train_loader_order_depends_only_on_seed_and_epoch() {
        let dataset = tiny_dataset(44);
        assert_eq!(epoch_batches(&dataset, 3, 8), epoch_batches(&dataset, 3, 8));
        assert_ne!(epoch_batches(&dataset, 3, 8), epoch_batches(&dataset, 4, 8));
    }

    #[test]
    fn test_eval_loader_keeps_batch_boundaries_in_order() {
        let device = Default::default();
        let sizes: Vec<usize> = eval_loader::<TestBackend>(tiny_dataset(20), 8, &device)
            .iter()
            .map(|batch| batch.labels.dims()[0])
            .collect();
        assert_eq!(sizes, vec![8, 8, 4]);
    }

    #[test]
    fn test_short_training_run_writes_artefacts() {
        let root = std::env::temp_dir()
            .join(format!("mnist-center-loss-train-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&root);

        let cfg = TrainConfig {
            checkpoint_dir: root.join("ckpt").display().to_string(),
            plot_dir:       root.join("plots").display().to_string(),
            epochs:         2,
            batch_size:     4,
            warmup_epochs:  1,
            plot_period:    1,
            ..TrainConfig::default()
        };

        let checkpoints = CheckpointManager::new(&cfg.checkpoint_dir);
        let metrics     = MetricsLogger::new(&cfg.checkpoint_dir).unwrap();
        let plotter     = EmbeddingPlotter::new(&cfg.plot_dir);
        let outputs     = TrainOutputs { checkpoints: &checkpoints, metrics: &metrics, plotter: &plotter };

        let device = Default::default();
        run_training::<TestAutodiffBackend>(&cfg, tiny_dataset(10), tiny_dataset(5), outputs, device)
            .unwrap();

        let plots = root.join("plots");
        assert!(plots.join("center-train-epoch0.png").is_file());
        assert!(plots.join("center-val-epoch1.png").is_file());
        assert_eq!(checkpoints.latest_epoch().unwrap(), 1);

        let csv = std::fs::read_to_string(metrics.csv_path()).unwrap();
        assert_eq!(csv.lines().count(), 3);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_training_set_smaller_than_a_batch_is_rejected() {
        let root = std::env::temp_dir()
            .join(format!("mnist-center-loss-small-{}", std::process::id()));
        let cfg = TrainConfig {
            checkpoint_dir: root.display().to_string(),
            batch_size: 16,
            ..TrainConfig::default()
        };
        let checkpoints = CheckpointManager::new(&cfg.checkpoint_dir);
        let metrics     = MetricsLogger::new(&cfg.checkpoint_dir).unwrap();
        let plotter     = EmbeddingPlotter::new(root.join("plots").display().to_string());
        let outputs     = TrainOutputs { checkpoints: &checkpoints, metrics: &metrics, plotter: &plotter };

        let result = run_training::<TestAutodiffBackend>(
            &cfg, tiny_dataset(5), tiny_dataset(5), outputs, Default::default(),
        );
        assert!(result.is_err());
        let _ = std::fs::remove_dir_all(&root);
    }
}
