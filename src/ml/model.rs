use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
        Initializer, Linear, LinearConfig, PaddingConfig2d, PRelu, PReluConfig,
    },
    prelude::*,
};

use crate::domain::digit::{HEIGHT, WIDTH};

/// Output channels of the three convolution stages.
const STAGE_CHANNELS: [usize; 3] = [32, 64, 128];
const KERNEL: usize = 5;

#[derive(Config, Debug)]
pub struct MnistNetConfig {
    #[config(default = 2)]
    pub embedding_size: usize,
    #[config(default = 10)]
    pub num_classes: usize,
    /// Initial PReLU slope, also used to scale the MSRA initialisation.
    #[config(default = 0.25)]
    pub prelu_slope: f64,
}

impl MnistNetConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> MnistNet<B> {
        let mut in_channels = 1;
        let stages = STAGE_CHANNELS
            .iter()
            .map(|&out_channels| {
                let stage = self.build_stage(in_channels, out_channels, device);
                in_channels = out_channels;
                stage
            })
            .collect();

        // Three 2x2 poolings: 28 -> 14 -> 7 -> 3
        let side = STAGE_CHANNELS.iter().fold(HEIGHT.min(WIDTH), |s, _| s / 2);
        let flat = STAGE_CHANNELS[STAGE_CHANNELS.len() - 1] * side * side;

        let embedding = LinearConfig::new(flat, self.embedding_size)
            .with_initializer(self.initializer())
            .init(device);
        let embedding_act = self.prelu(device);
        let classifier = LinearConfig::new(self.embedding_size, self.num_classes)
            .with_bias(false)
            .with_initializer(self.initializer())
            .init(device);

        MnistNet { stages, embedding, embedding_act, classifier }
    }

    /// MSRA initialisation adjusted for PReLU: gain = sqrt(2 / (1 + a^2)).
    fn initializer(&self) -> Initializer {
        Initializer::KaimingNormal {
            gain: (2.0 / (1.0 + self.prelu_slope * self.prelu_slope)).sqrt(),
            fan_out_only: false,
        }
    }

    fn prelu<B: Backend>(&self, device: &B::Device) -> PRelu<B> {
        PReluConfig::new().with_alpha(self.prelu_slope).init(device)
    }

    fn conv<B: Backend>(&self, in_ch: usize, out_ch: usize, device: &B::Device) -> Conv2d<B> {
        Conv2dConfig::new([in_ch, out_ch], [KERNEL, KERNEL])
            .with_padding(PaddingConfig2d::Explicit(KERNEL / 2, KERNEL / 2))
            .with_initializer(self.initializer())
            .init(device)
    }

    fn build_stage<B: Backend>(&self, in_ch: usize, out_ch: usize, device: &B::Device) -> ConvStage<B> {
        ConvStage {
            conv1: self.conv(in_ch, out_ch, device),
            act1:  self.prelu(device),
            conv2: self.conv(out_ch, out_ch, device),
            act2:  self.prelu(device),
            pool:  MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
        }
    }
}

/// (conv 5x5 -> PReLU) x2 -> max pool 2x2
#[derive(Module, Debug)]
pub struct ConvStage<B: Backend> {
    pub conv1: Conv2d<B>,
    pub act1:  PRelu<B>,
    pub conv2: Conv2d<B>,
    pub act2:  PRelu<B>,
    pub pool:  MaxPool2d,
}

impl<B: Backend> ConvStage<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.act1.forward(self.conv1.forward(x));
        let x = self.act2.forward(self.conv2.forward(x));
        self.pool.forward(x)
    }
}

#[derive(Module, Debug)]
pub struct MnistNet<B: Backend> {
    pub stages:        Vec<ConvStage<B>>,
    pub embedding:     Linear<B>,
    pub embedding_act: PRelu<B>,
    pub classifier:    Linear<B>,
}

pub struct NetOutput<B: Backend> {
    /// [batch, embedding_size]
    pub embeddings: Tensor<B, 2>,
    /// [batch, num_classes]
    pub logits: Tensor<B, 2>,
}

impl<B: Backend> MnistNet<B> {
    /// images: [batch, 1, 28, 28]
    pub fn forward(&self, images: Tensor<B, 4>) -> NetOutput<B> {
        let mut x = images;
        for stage in &self.stages {
            x = stage.forward(x);
        }

        let x = x.flatten::<2>(1, 3);
        let embeddings = self.embedding_act.forward(self.embedding.forward(x));
        let logits = self.classifier.forward(embeddings.clone());

        NetOutput { embeddings, logits }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_forward_shapes() {
        let device = Default::default();
        let net: MnistNet<TestBackend> = MnistNetConfig::new().init(&device);
        let images = Tensor::<TestBackend, 4>::zeros([3, 1, HEIGHT, WIDTH], &device);

        let out = net.forward(images);
        assert_eq!(out.embeddings.dims(), [3, 2]);
        assert_eq!(out.logits.dims(), [3, 10]);
    }

    #[test]
    fn test_custom_embedding_size() {
        let device = Default::default();
        let net: MnistNet<TestBackend> = MnistNetConfig::new()
            .with_embedding_size(3)
            .with_num_classes(4)
            .init(&device);
        let out = net.forward(Tensor::zeros([1, 1, HEIGHT, WIDTH], &device));
        assert_eq!(out.embeddings.dims(), [1, 3]);
        assert_eq!(out.logits.dims(), [1, 4]);
    }

    #[test]
    fn test_classifier_has_no_bias() {
        let device = Default::default();
        let net: MnistNet<TestBackend> = MnistNetConfig::new().init(&device);
        assert!(net.classifier.bias.is_none());
        assert_eq!(net.stages.len(), 3);
    }
}
