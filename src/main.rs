#![recursion_limit = "256"]

mod cli;
mod application;
mod domain;
mod data;
mod ml;
mod infra;

use anyhow::Result;
use cli::Cli;
use clap::Parser;

#[cfg(feature = "wgpu")]
pub type AppBackend = burn::backend::Wgpu;

#[cfg(all(feature = "ndarray", not(feature = "wgpu")))]
pub type AppBackend = burn::backend::NdArray;

#[cfg(not(any(feature = "wgpu", feature = "ndarray")))]
compile_error!("enable the `wgpu` or `ndarray` feature to select a backend");

pub type AppAutodiffBackend = burn::backend::Autodiff<AppBackend>;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("center_loss=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    cli.run()
}
