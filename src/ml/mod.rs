// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// Network, loss, schedule and the loop that ties them together:
//
//   model.rs       — three conv stages (5x5 convs + PReLU + max pool),
//                    a linear embedding layer and a bias-free classifier
//
//   center_loss.rs — learnable class centers and the combined
//                    softmax-cross-entropy + center objective
//
//   lr_schedule.rs — linear warmup followed by step / poly /
//                    cosine / constant decay, per iteration
//
//   trainer.rs     — the training loop: forward pass, backward pass,
//                    SGD step, validation, plots and checkpoints
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Wen et al. (2016) A Discriminative Feature Learning
//            Approach for Deep Face Recognition

/// Convolutional embedding network
pub mod model;

/// Center loss and the model that bundles it with the network
pub mod center_loss;

/// Warmup learning-rate scheduler
pub mod lr_schedule;

/// Training loop and validation
pub mod trainer;
