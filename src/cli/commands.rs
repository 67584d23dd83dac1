// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `eval`
// and all their configurable flags. Defaults reproduce the
// reference center-loss MNIST run.

use clap::{Args, Subcommand, ValueEnum};
use crate::application::train_use_case::TrainConfig;
use crate::ml::lr_schedule::LrMode;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the network with center loss and plot embeddings
    Train(TrainArgs),

    /// Evaluate the latest checkpoint on the MNIST test split
    Eval(EvalArgs),
}

/// Learning-rate decay after warmup
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LrModeArg {
    Constant,
    Step,
    Poly,
    Cosine,
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory with MNIST IDX files (optionally .gz).
    /// Without it the dataset is downloaded into burn's cache.
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Directory for checkpoints, config and metrics.csv
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Directory the embedding PNGs are written to
    #[arg(long, default_value = "resources")]
    pub plot_dir: String,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 101)]
    pub epochs: usize,

    /// Samples per batch; the trailing partial batch is dropped
    #[arg(long, default_value_t = 256)]
    pub batch_size: usize,

    /// Peak learning rate reached after warmup
    #[arg(long, default_value_t = 0.1)]
    pub lr: f64,

    /// Final learning rate for cosine / poly decay
    #[arg(long, default_value_t = 1e-8)]
    pub target_lr: f64,

    /// Epochs of linear warmup
    #[arg(long, default_value_t = 10)]
    pub warmup_epochs: usize,

    /// Learning rate at the start of warmup
    #[arg(long, default_value_t = 0.001)]
    pub warmup_lr: f64,

    /// Decay after warmup
    #[arg(long, value_enum, default_value_t = LrModeArg::Cosine)]
    pub lr_mode: LrModeArg,

    /// Epochs at which `step` mode multiplies the rate by --lr-factor
    #[arg(long, value_delimiter = ',', default_value = "30,60,90")]
    pub lr_steps: Vec<usize>,

    /// Multiplier applied at each `step` epoch
    #[arg(long, default_value_t = 0.1)]
    pub lr_factor: f64,

    /// Exponent of `poly` decay
    #[arg(long, default_value_t = 0.9)]
    pub lr_power: f64,

    /// Nesterov momentum
    #[arg(long, default_value_t = 0.9)]
    pub momentum: f64,

    /// L2 weight decay, applied to weights and class centers
    #[arg(long, default_value_t = 5e-4)]
    pub weight_decay: f64,

    /// Plot embeddings and checkpoint every N epochs
    #[arg(long, default_value_t = 20)]
    pub plot_period: usize,

    /// Dimension of the learned embedding
    #[arg(long, default_value_t = 2)]
    pub embedding_size: usize,

    /// Weight of the center term relative to cross-entropy
    #[arg(long, default_value_t = 1.0)]
    pub center_weight: f64,


    /// Seed for weight init and epoch shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl TrainArgs {
    fn lr_mode(&self) -> LrMode {
        match self.lr_mode {
            LrModeArg::Constant => LrMode::Constant,
            LrModeArg::Step     => LrMode::Step { epochs: self.lr_steps.clone(), factor: self.lr_factor },
            LrModeArg::Poly     => LrMode::Poly { power: self.lr_power },
            LrModeArg::Cosine   => LrMode::Cosine,
        }
    }
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        let lr_mode = a.lr_mode();
        TrainConfig {
            data_dir:       a.data_dir,
            checkpoint_dir: a.checkpoint_dir,
            plot_dir:       a.plot_dir,
            epochs:         a.epochs,
            batch_size:     a.batch_size,
            lr:             a.lr,
            target_lr:      a.target_lr,
            warmup_epochs:  a.warmup_epochs,
            warmup_lr:      a.warmup_lr,
            lr_mode,
            momentum:       a.momentum,
            weight_decay:   a.weight_decay,
            plot_period:    a.plot_period,
            embedding_size: a.embedding_size,
            center_weight:  a.center_weight,
            seed:           a.seed,
        }
    }
}

/// All arguments for the `eval` command
#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Directory with MNIST IDX files (same as used during training)
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Also plot the test embeddings
    #[arg(long)]
    pub plot: bool,

    /// Directory for the embedding plot
    #[arg(long, default_value = "resources")]
    pub plot_dir: String,

    /// Samples per evaluation batch; the last batch may be smaller
    #[arg(long, default_value_t = 256)]
    pub batch_size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    fn train_config(args: &[&str]) -> TrainConfig {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Train(a) => a.into(),
            other => panic!("expected train, got {other:?}"),
        }
    }

    #[test]
    fn test_train_defaults_match_config_defaults() {
        let from_cli = train_config(&["center-loss", "train"]);
        let default  = TrainConfig::default();
        assert_eq!(from_cli.epochs, default.epochs);
        assert_eq!(from_cli.batch_size, default.batch_size);
        assert_eq!(from_cli.lr, default.lr);
        assert_eq!(from_cli.target_lr, default.target_lr);
        assert_eq!(from_cli.warmup_epochs, default.warmup_epochs);
        assert_eq!(from_cli.warmup_lr, default.warmup_lr);
        assert_eq!(from_cli.lr_mode, default.lr_mode);
        assert_eq!(from_cli.momentum, default.momentum);
        assert_eq!(from_cli.weight_decay, default.weight_decay);
        assert_eq!(from_cli.plot_period, default.plot_period);
        assert_eq!(from_cli.plot_dir, default.plot_dir);
        assert_eq!(from_cli.data_dir, None);
    }

    #[test]
    fn test_step_mode_collects_epochs() {
        let cfg = train_config(&[
            "center-loss", "train", "--lr-mode", "step", "--lr-steps", "5,8", "--lr-factor", "0.5",
        ]);
        assert_eq!(cfg.lr_mode, LrMode::Step { epochs: vec![5, 8], factor: 0.5 });
    }

    #[test]
    fn test_eval_args() {
        let cli = Cli::try_parse_from(["center-loss", "eval", "--plot", "--data-dir", "mnist"]).unwrap();
        match cli.command {
            Commands::Eval(a) => {
                assert!(a.plot);
                assert_eq!(a.data_dir.as_deref(), Some("mnist"));
                assert_eq!(a.checkpoint_dir, "checkpoints");
            }
            other => panic!("expected eval, got {other:?}"),
        }
    }
}
