// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between MNIST on disk and tensor batches:
//
//   IDX files / burn download
//       │
//       ▼
//   source.rs / idx.rs  → Vec<DigitSample>
//       │
//       ▼
//   DigitDataset        → Burn Dataset, per-epoch shuffled drop-last views
//       │
//       ▼
//   DigitBatcher        → normalised [N,1,28,28] images + [N] labels
//       │
//       ▼
//   DataLoader          → feeds batches to the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// IDX file parsing and the local-directory source
pub mod idx;

/// Chooses between local IDX files and burn's MNIST download
pub mod source;

/// Pixel normalisation
pub mod transform;

/// Burn Dataset over in-memory samples
pub mod dataset;

/// Burn Batcher producing image/label tensors
pub mod batcher;
