// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits describing what the system
// works with. Nothing in here touches Burn or the filesystem.
//
//   digit.rs     — one labelled 28x28 grayscale image
//   embedding.rs — 2-D embedding points collected for plotting
//   stats.rs     — per-epoch loss / accuracy accumulators
//   traits.rs    — abstractions implemented by other layers

// A labelled handwritten digit
pub mod digit;

// Embedding points gathered during a plotting epoch
pub mod embedding;

// Running loss and accuracy bookkeeping
pub mod stats;

// Core abstractions (traits) that other layers implement
pub mod traits;
