// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with clap.
// All work is delegated to Layer 2 (application).
//
//   1. `train` — trains the network and writes plots/checkpoints
//   2. `eval`  — loads the latest checkpoint and scores the test split

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvalArgs, TrainArgs};

use crate::{AppAutodiffBackend, AppBackend};

#[derive(Parser, Debug)]
#[command(
    name = "center-loss",
    version = "0.1.0",
    about = "Train an MNIST CNN with center loss and plot its 2-D embeddings."
)]
pub struct Cli {
    /// The subcommand to run (train or eval)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args) => run_train(args),
            Commands::Eval(args)  => run_eval(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!(
        "Starting training: {} epochs, batch size {}, plots in '{}'",
        args.epochs,
        args.batch_size,
        args.plot_dir
    );

    let use_case = TrainUseCase::new(args.into());
    use_case.execute::<AppAutodiffBackend>(Default::default())?;

    println!("Training complete. Checkpoint saved.");
    Ok(())
}

fn run_eval(args: EvalArgs) -> Result<()> {
    use crate::application::eval_use_case::EvalUseCase;

    let plot_dir = args.plot.then_some(args.plot_dir);
    let use_case = EvalUseCase::new(args.data_dir, &args.checkpoint_dir, plot_dir, args.batch_size);
    let stats    = use_case.execute::<AppBackend>(Default::default())?;

    println!(
        "test accuracy: {:.6}, test loss: {:.6} ({} samples)",
        stats.accuracy(),
        stats.loss(),
        stats.samples()
    );
    Ok(())
}
