// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer asks for digits through DigitSource and
// never learns whether they came from local IDX files or from
// the framework's downloaded copy of MNIST.
//
// Implementations:
//   - IdxDirSource   → reads (optionally gzipped) IDX files from a directory
//   - BurnMnistSource → Burn's cached MNIST download

use anyhow::Result;
use crate::domain::digit::DigitSample;

// ─── DigitSource ──────────────────────────────────────────────────────────────
/// Any component that can produce a split of labelled digits.
pub trait DigitSource {
    /// Load every sample of this source into memory.
    fn load_all(&self) -> Result<Vec<DigitSample>>;

    /// Human readable origin, used in log lines.
    fn describe(&self) -> String;
}
