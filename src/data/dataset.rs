// ============================================================
// Layer 4 — Digit Dataset
// ============================================================
// DigitDataset implements Burn's Dataset trait over an in-memory
// Vec<DigitSample>. MNIST is small enough to keep fully resident
// (60,000 * 784 bytes ≈ 47 MB for the training split).
//
// Training iterates an EpochView instead of the dataset itself:
//
//   1. the sample indices are shuffled with a seed derived from
//      (run seed, epoch), so every epoch sees a new order while
//      a rerun with the same seed sees the same orders
//   2. the shuffled order is cut to a multiple of the batch size,
//      dropping the trailing partial batch
//
// Validation iterates DigitDataset directly (unshuffled, last
// partial batch kept).

use burn::data::dataset::Dataset;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::sync::Arc;

use crate::domain::digit::DigitSample;

#[derive(Clone)]
pub struct DigitDataset {
    samples: Arc<Vec<DigitSample>>,
}

impl DigitDataset {
    pub fn new(samples: Vec<DigitSample>) -> Self {
        Self { samples: Arc::new(samples) }
    }

    /// Number of full batches of `batch_size` in one epoch.
    pub fn full_batches(&self, batch_size: usize) -> usize {
        if batch_size == 0 { 0 } else { self.samples.len() / batch_size }
    }

    /// A shuffled, drop-last ordering of the samples for one epoch.
    pub fn epoch_view(&self, seed: u64, epoch: usize, batch_size: usize) -> EpochView {
        let mut order: Vec<usize> = (0..self.samples.len()).collect();
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(epoch as u64));
        order.shuffle(&mut rng);
        order.truncate(self.full_batches(batch_size) * batch_size);

        EpochView {
            samples: Arc::clone(&self.samples),
            order,
        }
    }
}

impl Dataset<DigitSample> for DigitDataset {
    fn get(&self, index: usize) -> Option<DigitSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

// ─── EpochView ────────────────────────────────────────────────────────────────
/// One epoch's permutation of a DigitDataset, sharing its samples.
pub struct EpochView {
    samples: Arc<Vec<DigitSample>>,
    order:   Vec<usize>,
}

impl Dataset<DigitSample> for EpochView {
    fn get(&self, index: usize) -> Option<DigitSample> {
        self.order
            .get(index)
            .and_then(|&i| self.samples.get(i))
            .cloned()
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(n: usize) -> DigitDataset {
        DigitDataset::new(
            (0..n).map(|i| DigitSample::new(vec![i as u8; 784], (i % 10) as u8)).collect(),
        )
    }

    fn first_pixels(view: &EpochView) -> Vec<u8> {
        (0..view.len()).map(|i| view.get(i).unwrap().pixels[0]).collect()
    }

    #[test]
    fn test_epoch_view_drops_partial_batch() {
        let ds = dataset(10);
        assert_eq!(ds.full_batches(4), 2);
        assert_eq!(ds.epoch_view(1, 0, 4).len(), 8);
        assert_eq!(ds.epoch_view(1, 0, 5).len(), 10);
        assert_eq!(ds.epoch_view(1, 0, 11).len(), 0);
    }

    #[test]
    fn test_epoch_view_is_a_permutation_without_repeats() {
        let view = dataset(50).epoch_view(7, 3, 10);
        let mut seen = first_pixels(&view);
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 50);
    }

    #[test]
    fn test_epoch_view_is_deterministic_per_epoch() {
        let ds = dataset(64);
        assert_eq!(first_pixels(&ds.epoch_view(42, 5, 8)), first_pixels(&ds.epoch_view(42, 5, 8)));
        assert_ne!(first_pixels(&ds.epoch_view(42, 5, 8)), first_pixels(&ds.epoch_view(42, 6, 8)));
    }

    #[test]
    fn test_out_of_range_get() {
        let ds = dataset(3);
        assert!(ds.get(3).is_none());
        assert!(ds.epoch_view(0, 0, 2).get(2).is_none());
    }

    #[test]
    fn test_zero_batch_size() {
        assert_eq!(dataset(5).epoch_view(0, 0, 0).len(), 0);
    }
}
