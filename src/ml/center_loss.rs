// ============================================================
// Layer 5 — Center Loss
// ============================================================
// Softmax cross-entropy plus a pull of every embedding towards a
// learned centroid of its class:
//
//   loss_i = CE(logits_i, y_i) + λ · ½ · ‖e_i − c_{y_i}‖² / n_{y_i}
//
// where n_y is how many samples of class y are in the batch.
//
// The centroids are ordinary parameters of the module tree, so
// the same optimizer step that updates the network moves them.

use burn::{
    module::Param,
    nn::Initializer,
    prelude::*,
    tensor::activation::log_softmax,
};

use crate::ml::model::{MnistNet, MnistNetConfig};

/// Centroids start close to the origin, uniform in ±CENTER_INIT_RANGE.
const CENTER_INIT_RANGE: f64 = 0.07;

#[derive(Config, Debug)]
pub struct CenterLossConfig {
    pub num_classes:    usize,
    pub embedding_size: usize,
    /// Weight of the center term relative to cross-entropy
    #[config(default = 1.0)]
    pub lambda: f64,
}

impl CenterLossConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> CenterLoss<B> {
        let centers = Initializer::Uniform {
            min: -CENTER_INIT_RANGE,
            max: CENTER_INIT_RANGE,
        }
        .init([self.num_classes, self.embedding_size], device);

        CenterLoss {
            centers,
            num_classes: self.num_classes,
            lambda: self.lambda,
        }
    }
}

#[derive(Module, Debug)]
pub struct CenterLoss<B: Backend> {
    /// [num_classes, embedding_size]
    pub centers:     Param<Tensor<B, 2>>,
    pub num_classes: usize,
    pub lambda:      f64,
}

impl<B: Backend> CenterLoss<B> {
    /// Per-sample loss, shape [batch].
    ///
    /// logits: [batch, num_classes], labels: [batch], embeddings: [batch, embedding_size]
    pub fn forward(
        &self,
        logits:     Tensor<B, 2>,
        labels:     Tensor<B, 1, Int>,
        embeddings: Tensor<B, 2>,
    ) -> Tensor<B, 1> {
        let [batch_size, _] = logits.dims();
        let device = logits.device();

        let targets = labels.clone().unsqueeze_dim::<2>(1);
        let cross_entropy = log_softmax(logits, 1)
            .gather(1, targets)
            .reshape([batch_size])
            .neg();

        let host_labels: Vec<i64> = labels.to_data().iter::<i64>().collect();
        let counts = batch_class_counts(&host_labels, self.num_classes);
        let counts = Tensor::<B, 1>::from_data(TensorData::new(counts, [batch_size]), &device);

        let selected = self.centers.val().select(0, labels);
        let sq_dist = (embeddings - selected)
            .powf_scalar(2.0)
            .sum_dim(1)
            .reshape([batch_size]);

        cross_entropy + (sq_dist / counts).mul_scalar(0.5 * self.lambda)
    }
}

/// For every label, how many samples in the batch share it.
pub fn batch_class_counts(labels: &[i64], num_classes: usize) -> Vec<f32> {
    let mut hist = vec![0usize; num_classes];
    for &l in labels {
        hist[l as usize] += 1;
    }
    labels.iter().map(|&l| hist[l as usize] as f32).collect()
}

// ─── CenterLossModel ──────────────────────────────────────────────────────────
// The network and the loss (with its centroids) trained as one module.

#[derive(Config, Debug)]
pub struct CenterLossModelConfig {
    pub net: MnistNetConfig,
    #[config(default = 1.0)]
    pub center_weight: f64,
}

impl CenterLossModelConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> CenterLossModel<B> {
        let net  = self.net.init(device);
        let loss = CenterLossConfig::new(self.net.num_classes, self.net.embedding_size)
            .with_lambda(self.center_weight)
            .init(device);
        CenterLossModel { net, loss }
    }
}

#[derive(Module, Debug)]
pub struct CenterLossModel<B: Backend> {
    pub net:  MnistNet<B>,
    pub loss: CenterLoss<B>,
}

pub struct StepOutput<B: Backend> {
    /// Per-sample loss, [batch]
    pub loss:       Tensor<B, 1>,
    /// [batch, embedding_size]
    pub embeddings: Tensor<B, 2>,
    /// [batch, num_classes]
    pub logits:     Tensor<B, 2>,
}

impl<B: Backend> CenterLossModel<B> {
    pub fn forward_step(&self, images: Tensor<B, 4>, labels: Tensor<B, 1, Int>) -> StepOutput<B> {
        let out  = self.net.forward(images);
        let loss = self.loss.forward(out.logits.clone(), labels, out.embeddings.clone());
        StepOutput { loss, embeddings: out.embeddings, logits: out.logits }
    }
}

/// Number of rows whose argmax matches the label.
pub fn count_correct<B: Backend>(logits: Tensor<B, 2>, labels: Tensor<B, 1, Int>) -> usize {
    logits
        .argmax(1)
        .squeeze::<1>(1)
        .equal(labels)
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>() as usize
}
