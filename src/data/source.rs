// ============================================================
// Layer 4 — MNIST Source Selection
// ============================================================
// Two ways to obtain a split:
//
//   1. A local directory of IDX files (--data-dir), read by IdxDirSource
//   2. Burn's MnistDataset, which downloads the CVDF mirror into
//      the burn-dataset cache on first use
//
// The local directory wins when it holds the requested split.

use anyhow::{bail, Result};
use burn::data::dataset::{vision::MnistDataset, Dataset};
use std::fmt;

use crate::data::idx::IdxDirSource;
use crate::domain::digit::{DigitSample, HEIGHT, WIDTH};
use crate::domain::traits::DigitSource;

/// Which half of MNIST to load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    /// 60,000 training images
    Train,
    /// 10,000 test images, used for validation
    Test,
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Split::Train => write!(f, "train"),
            Split::Test  => write!(f, "test"),
        }
    }
}

// ─── BurnMnistSource ──────────────────────────────────────────────────────────
/// MNIST as provided (and cached) by burn's vision datasets.
pub struct BurnMnistSource {
    split: Split,
}

impl BurnMnistSource {
    pub fn new(split: Split) -> Self {
        Self { split }
    }
}

impl DigitSource for BurnMnistSource {
    fn load_all(&self) -> Result<Vec<DigitSample>> {
        let dataset = match self.split {
            Split::Train => MnistDataset::train(),
            Split::Test  => MnistDataset::test(),
        };

        // Items come back as [[f32; 28]; 28] holding the raw byte values
        let samples = dataset
            .iter()
            .map(|item| {
                let mut pixels = Vec::with_capacity(WIDTH * HEIGHT);
                for row in item.image.iter() {
                    pixels.extend(row.iter().map(|&p| p.clamp(0.0, 255.0) as u8));
                }
                DigitSample::new(pixels, item.label)
            })
            .collect();

        Ok(samples)
    }

    fn describe(&self) -> String {
        format!("burn MNIST download ({})", self.split)
    }
}

/// Pick the source for `split`: local IDX files when `data_dir` has them,
/// otherwise burn's downloaded copy.
pub fn select_source(data_dir: Option<&str>, split: Split) -> Box<dyn DigitSource> {
    if let Some(dir) = data_dir {
        let local = IdxDirSource::new(dir, split);
        if local.is_available() {
            return Box::new(local);
        }
        tracing::warn!(
            "No {} IDX files in '{}', falling back to the burn MNIST download",
            split,
            dir
        );
    }
    Box::new(BurnMnistSource::new(split))
}

/// Load every sample of `split`.
pub fn load_split(data_dir: Option<&str>, split: Split) -> Result<Vec<DigitSample>> {
    let source = select_source(data_dir, split);
    tracing::info!("Loading MNIST {} split from {}", split, source.describe());
    let samples = source.load_all()?;
    if let Some(pos) = samples.iter().position(|s| !s.is_well_formed()) {
        bail!("Sample {pos} of the {split} split is malformed");
    }
    tracing::info!("Loaded {} {} samples", samples.len(), split);
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::idx::{self, tests::{image_file, label_file}};
    use std::fs;

    #[test]
    fn test_local_directory_is_preferred() {
        let dir = std::env::temp_dir()
            .join(format!("mnist-center-loss-source-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(idx::TRAIN_IMAGES), image_file(&[vec![0u8; 784], vec![1u8; 784]])).unwrap();
        fs::write(dir.join(idx::TRAIN_LABELS), label_file(&[2, 3])).unwrap();

        let samples = load_split(dir.to_str(), Split::Train).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].label, 3);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_split_display() {
        assert_eq!(Split::Train.to_string(), "train");
        assert_eq!(Split::Test.to_string(), "test");
    }
}
