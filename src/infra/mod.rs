// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by the ML and application layers:
//
//   checkpoint.rs — model weights via Burn's CompactRecorder,
//                   plus the run configuration as JSON so `eval`
//                   can rebuild the exact architecture
//
//   metrics.rs    — one CSV row of loss / accuracy per epoch
//
//   plot.rs       — PNG scatter plots of 2-D embeddings
//
// Reference: Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;

/// Embedding scatter plots
pub mod plot;
