// ============================================================
// Layer 4 — Digit Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<DigitSample>
// into tensors on the target device:
//
//   images: [N, 1, 28, 28]  normalised floats
//   labels: [N]             class indices
//
// All pixels of the batch are normalised into one flat buffer
// and uploaded with a single from_data call, then viewed as NCHW.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::transform::normalize_into;
use crate::domain::digit::{DigitSample, HEIGHT, WIDTH};

// ─── DigitBatch ───────────────────────────────────────────────────────────────
/// A batch of digits ready for the network forward pass.
#[derive(Debug, Clone)]
pub struct DigitBatch<B: Backend> {
    /// Normalised images — shape: [batch_size, 1, HEIGHT, WIDTH]
    pub images: Tensor<B, 4>,

    /// Ground truth classes — shape: [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

// ─── DigitBatcher ─────────────────────────────────────────────────────────────
#[derive(Clone, Debug, Default)]
pub struct DigitBatcher;

impl DigitBatcher {
    pub fn new() -> Self {
        Self
    }
}

impl<B: Backend> Batcher<B, DigitSample, DigitBatch<B>> for DigitBatcher {
    fn batch(&self, items: Vec<DigitSample>, device: &B::Device) -> DigitBatch<B> {
        let batch_size = items.len();

        let mut pixels = Vec::with_capacity(batch_size * WIDTH * HEIGHT);
        for item in &items {
            normalize_into(&item.pixels, &mut pixels);
        }

        let labels: Vec<i64> = items.iter().map(|s| s.label as i64).collect();

        let images = Tensor::<B, 4>::from_data(
            TensorData::new(pixels, [batch_size, 1, HEIGHT, WIDTH]),
            device,
        );
        let labels = Tensor::<B, 1, Int>::from_data(
            TensorData::new(labels, [batch_size]),
            device,
        );

        DigitBatch { images, labels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::transform::normalize;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_batch_shapes_and_values() {
        let device = Default::default();
        let mut pixels = vec![0u8; WIDTH * HEIGHT];
        pixels[WIDTH + 2] = 255;
        let items = vec![
            DigitSample::new(pixels, 4),
            DigitSample::new(vec![0u8; WIDTH * HEIGHT], 9),
        ];

        let batch: DigitBatch<TestBackend> = DigitBatcher::new().batch(items, &device);

        assert_eq!(batch.images.dims(), [2, 1, HEIGHT, WIDTH]);
        assert_eq!(batch.labels.dims(), [2]);

        let labels: Vec<i64> = batch.labels.into_data().iter::<i64>().collect();
        assert_eq!(labels, vec![4, 9]);

        let values: Vec<f32> = batch.images.into_data().iter::<f32>().collect();
        assert!((values[WIDTH + 2] - normalize(255)).abs() < 1e-5);
        assert!((values[0] - normalize(0)).abs() < 1e-5);
    }
}
