// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No argument parsing (that's Layer 1)
//   - Only workflow coordination

// The training workflow
pub mod train_use_case;

// Evaluate a saved checkpoint on the test split
pub mod eval_use_case;
