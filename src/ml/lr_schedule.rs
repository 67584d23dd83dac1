// ============================================================
// Layer 5 — Warmup Learning-Rate Schedule
// ============================================================
// Per-iteration schedule with a linear warmup followed by one of
// four decay modes. With T the global iteration,
// N = nepochs · niters and W = warmup_epochs · niters:
//
//   T < W      lr = warmup_lr + (base_lr − warmup_lr) · T / W
//   constant   lr = base_lr
//   step       lr = base_lr · factor^(#step epochs ≤ current epoch)
//   poly       lr = target + (base − target) · (1 − p)^power
//   cosine     lr = target + (base − target) · (1 + cos(π·p)) / 2
//
// where p = (T − W) / (N − W). T never exceeds N.

use anyhow::{bail, Result};
use burn::{config::Config, lr_scheduler::LrScheduler, tensor::backend::Backend, LearningRate};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Decay applied once warmup is over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LrMode {
    Constant,
    /// Multiply by `factor` at each listed epoch
    Step { epochs: Vec<usize>, factor: f64 },
    Poly { power: f64 },
    Cosine,
}

#[derive(Config, Debug)]
pub struct WarmupLrSchedulerConfig {
    pub mode:    LrMode,
    pub base_lr: LearningRate,
    /// Iterations (batches) per epoch
    pub niters:  usize,
    pub nepochs: usize,
    #[config(default = 0.0)]
    pub target_lr: LearningRate,
    #[config(default = 0)]
    pub warmup_epochs: usize,
    #[config(default = 0.0)]
    pub warmup_lr: LearningRate,
}

impl WarmupLrSchedulerConfig {
    pub fn init(&self) -> Result<WarmupLrScheduler> {
        if self.base_lr <= 0.0 {
            bail!("Base learning rate must be greater than 0");
        }
        if self.target_lr < 0.0 || self.target_lr > self.base_lr {
            bail!("Target learning rate must be between 0 and the base learning rate");
        }
        if self.warmup_lr < 0.0 {
            bail!("Warmup learning rate must not be negative");
        }
        if self.niters == 0 || self.nepochs == 0 {
            bail!("Schedule needs at least one epoch of at least one iteration");
        }
        if self.warmup_epochs > self.nepochs {
            bail!(
                "Warmup epochs ({}) exceed the number of epochs ({})",
                self.warmup_epochs,
                self.nepochs
            );
        }
        if let LrMode::Step { factor, .. } = &self.mode {
            if *factor <= 0.0 {
                bail!("Step factor must be greater than 0");
            }
        }

        Ok(WarmupLrScheduler {
            mode:         self.mode.clone(),
            base_lr:      self.base_lr,
            target_lr:    self.target_lr,
            warmup_lr:    self.warmup_lr,
            niters:       self.niters,
            total_iters:  self.nepochs * self.niters,
            warmup_iters: self.warmup_epochs * self.niters,
            current_iter: usize::MAX,
        })
    }
}

#[derive(Clone, Debug)]
pub struct WarmupLrScheduler {
    mode:         LrMode,
    base_lr:      LearningRate,
    target_lr:    LearningRate,
    warmup_lr:    LearningRate,
    niters:       usize,
    total_iters:  usize,
    warmup_iters: usize,
    current_iter: usize,
}

impl WarmupLrScheduler {
    /// Learning rate at global iteration `t`.
    pub fn lr_at(&self, t: usize) -> LearningRate {
        let t = t.min(self.total_iters);

        if t < self.warmup_iters {
            return self.warmup_lr
                + (self.base_lr - self.warmup_lr) * t as f64 / self.warmup_iters as f64;
        }

        let span     = self.total_iters - self.warmup_iters;
        let progress = if span == 0 { 1.0 } else { (t - self.warmup_iters) as f64 / span as f64 };
        let range    = self.base_lr - self.target_lr;

        match &self.mode {
            LrMode::Constant => self.base_lr,
            LrMode::Step { epochs, factor } => {
                let epoch = t / self.niters;
                let drops = epochs.iter().filter(|&&e| e <= epoch).count();
                self.base_lr * factor.powi(drops as i32)
            }
            LrMode::Poly { power } => self.target_lr + range * (1.0 - progress).powf(*power),
            LrMode::Cosine => self.target_lr + range * (1.0 + (PI * progress).cos()) / 2.0,
        }
    }

    /// Iterations already consumed by `step`.
    pub fn iteration(&self) -> usize {
        self.current_iter.wrapping_add(1)
    }
}

impl LrScheduler for WarmupLrScheduler {
    type Record<B: Backend> = usize;

    fn step(&mut self) -> LearningRate {
        // Starts at usize::MAX so the first call yields the lr for T = 0
        self.current_iter = self.current_iter.wrapping_add(1);
        self.lr_at(self.current_iter)
    }

    fn to_record<B: Backend>(&self) -> Self::Record<B> {
        self.current_iter
    }

    fn load_record<B: Backend>(mut self, record: Self::Record<B>) -> Self {
        self.current_iter = record;
        self
    }
}
