// ============================================================
// Layer 3 — DigitSample Domain Type
// ============================================================
// One handwritten digit: 784 raw pixel intensities (0..=255)
// stored row-major, plus the class label 0..=9.
//
// Pixels stay as bytes here. Normalisation to floats happens
// in the batcher, right before the tensors are built.

/// Image width in pixels
pub const WIDTH: usize = 28;

/// Image height in pixels
pub const HEIGHT: usize = 28;

/// Number of digit classes
pub const NUM_CLASSES: usize = 10;

/// A labelled 28x28 grayscale digit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitSample {
    /// Row-major pixel intensities, length WIDTH * HEIGHT
    pub pixels: Vec<u8>,

    /// Digit class in 0..NUM_CLASSES
    pub label: u8,
}

impl DigitSample {
    pub fn new(pixels: Vec<u8>, label: u8) -> Self {
        Self { pixels, label }
    }

    /// True when the sample has the expected geometry and a valid label.
    pub fn is_well_formed(&self) -> bool {
        self.pixels.len() == WIDTH * HEIGHT && (self.label as usize) < NUM_CLASSES
    }
}
