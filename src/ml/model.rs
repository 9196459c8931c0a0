// ============================================================
// Layer 6 — All-CNN Classifier Architecture
// ============================================================
// All-CNN-A from Springenberg et al. (2015), "Striving for
// simplicity: the all convolutional net". The SVHN and F-MNIST
// classifiers under test both use this network on single-channel
// inputs.
//
//   conv 5x5  96        relu
//   conv 3x3  96  s2    relu   dropout 0.5
//   conv 5x5  192       relu
//   conv 3x3  192 s2    relu   dropout 0.5
//   conv 3x3  192       relu
//   conv 1x1  192       relu
//   conv 1x1  classes   relu
//   global average pool → softmax
//
// Padding is k/2 on every conv, which keeps 'same' sizes at
// stride 1 and halves them at stride 2 (32 → 16 → 8, 28 → 14 → 7).
//
// Training happens elsewhere; this module only rebuilds the
// network so a saved record can be loaded into it.

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig},
        Dropout, DropoutConfig, PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::{relu, softmax},
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
#[derive(Config, Debug)]
pub struct AllCnnConfig {
    pub num_classes: usize,
    #[config(default = 1)]
    pub input_channels: usize,
    #[config(default = 0.5)]
    pub dropout: f64,
}

impl AllCnnConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> AllCnn<B> {
        AllCnn {
            conv1:   conv(self.input_channels, 96, 5, 1, device),
            conv2:   conv(96, 96, 3, 2, device),
            conv3:   conv(96, 192, 5, 1, device),
            conv4:   conv(192, 192, 3, 2, device),
            conv5:   conv(192, 192, 3, 1, device),
            conv6:   conv(192, 192, 1, 1, device),
            conv7:   conv(192, self.num_classes, 1, 1, device),
            dropout: DropoutConfig::new(self.dropout).init(),
            pool:    AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            num_classes: self.num_classes,
        }
    }
}

fn conv<B: Backend>(
    channels_in:  usize,
    channels_out: usize,
    kernel:       usize,
    stride:       usize,
    device:       &B::Device,
) -> Conv2d<B> {
    Conv2dConfig::new([channels_in, channels_out], [kernel, kernel])
        .with_stride([stride, stride])
        .with_padding(PaddingConfig2d::Explicit(kernel / 2, kernel / 2))
        .init(device)
}

#[derive(Module, Debug)]
pub struct AllCnn<B: Backend> {
    pub conv1:       Conv2d<B>,
    pub conv2:       Conv2d<B>,
    pub conv3:       Conv2d<B>,
    pub conv4:       Conv2d<B>,
    pub conv5:       Conv2d<B>,
    pub conv6:       Conv2d<B>,
    pub conv7:       Conv2d<B>,
    pub dropout:     Dropout,
    pub pool:        AdaptiveAvgPool2d,
    pub num_classes: usize,
}

impl<B: Backend> AllCnn<B> {
    /// images: [batch, channels, height, width] → class scores [batch, num_classes]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = relu(self.conv1.forward(images));
        let x = relu(self.conv2.forward(x));
        let x = self.dropout.forward(x);
        let x = relu(self.conv3.forward(x));
        let x = relu(self.conv4.forward(x));
        let x = self.dropout.forward(x);
        let x = relu(self.conv5.forward(x));
        let x = relu(self.conv6.forward(x));
        let x = relu(self.conv7.forward(x));

        let x = self.pool.forward(x); // [batch, classes, 1, 1]
        let [batch, classes, _, _] = x.dims();
        x.reshape([batch, classes])
    }

    /// Softmax over the class dimension
    pub fn predict_proba(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        softmax(self.forward(images), 1)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    #[test]
    fn test_output_shape_svhn() {
        let device = Default::default();
        let model: AllCnn<TestBackend> = AllCnnConfig::new(10).init(&device);
        let images = Tensor::<TestBackend, 4>::zeros([2, 1, 32, 32], &device);
        assert_eq!(model.forward(images).dims(), [2, 10]);
    }

    #[test]
    fn test_probabilities_sum_to_one_fmnist() {
        let device = Default::default();
        let model: AllCnn<TestBackend> = AllCnnConfig::new(10).init(&device);
        let images = Tensor::<TestBackend, 4>::ones([1, 1, 28, 28], &device);
        let probs: Vec<f32> = model
            .predict_proba(images)
            .into_data()
            .to_vec::<f32>()
            .unwrap();
        assert_eq!(probs.len(), 10);
        let total: f32 = probs.iter().sum();
        assert!((total - 1.0).abs() < 1e-4);
    }
}
