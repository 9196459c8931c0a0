// ============================================================
// Layer 6 — Style-Based Generator
// ============================================================
// A compact style-based generator with the latent controls the
// frontier search needs:
//
//   seed ──StdRng──► z ~ N(0, I) ──mapping MLP──► w
//
//   ws = [w; num_ws]                       one style per layer
//   ws[i] = w_avg + psi·(ws[i] − w_avg)    truncation, i < cutoff
//   ws[l] = ws_mix[l]  for l in spec       style mixing
//
//   const 4x4 ─► [styled conv ×2] ─► up ─► [styled conv ×2] ─► … ─► to_image ─► tanh
//
// Each styled conv scales its input channels by (1 + affine(w_i)),
// convolves, adds per-pixel noise and applies LeakyReLU(0.2).
// num_ws = 8 gives four blocks and a 32x32 image.
//
// Truncation and style mixing work on host-side style vectors so
// they can be checked without a backend.

use anyhow::{anyhow, bail, Result};
use burn::{
    module::Param,
    nn::{
        conv::{Conv2d, Conv2dConfig},
        LeakyRelu, LeakyReluConfig, Linear, LinearConfig, PaddingConfig2d,
    },
    prelude::*,
    tensor::{activation::tanh, Distribution},
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::domain::candidate::{GenerationRequest, StyleMixSpec, Truncation};
use crate::domain::image::Image;
use crate::domain::traits::ImageGenerator;

/// Per-layer noise behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseMode {
    /// Noise drawn from the run's random seed
    #[default]
    Random,
    /// One fixed noise buffer shared by every call
    Const,
    /// No noise injection
    None,
}

/// Seed used for the fixed buffer in `NoiseMode::Const`
const CONST_NOISE_SEED: u64 = 0;

// ─── Architecture ─────────────────────────────────────────────────────────────
#[derive(Config, Debug)]
pub struct StyleGeneratorConfig {
    #[config(default = 64)]
    pub z_dim: usize,
    #[config(default = 64)]
    pub w_dim: usize,
    /// Number of style layers; must be even
    #[config(default = 8)]
    pub num_ws: usize,
    #[config(default = 64)]
    pub channels: usize,
    #[config(default = 1)]
    pub img_channels: usize,
}

impl StyleGeneratorConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> StyleGenerator<B> {
        let mapping = vec![
            LinearConfig::new(self.z_dim, self.w_dim).init(device),
            LinearConfig::new(self.w_dim, self.w_dim).init(device),
        ];
        let layers = (0..self.num_ws)
            .map(|_| StyledConv::new(self.w_dim, self.channels, device))
            .collect();

        StyleGenerator {
            mapping,
            w_avg:    Param::from_tensor(Tensor::zeros([self.w_dim], device)),
            constant: Param::from_tensor(Tensor::random(
                [1, self.channels, 4, 4],
                Distribution::Normal(0.0, 1.0),
                device,
            )),
            layers,
            to_image: Conv2dConfig::new([self.channels, self.img_channels], [1, 1]).init(device),
            activation: LeakyReluConfig::new().with_negative_slope(0.2).init(),
            z_dim:        self.z_dim,
            w_dim:        self.w_dim,
            img_channels: self.img_channels,
        }
    }
}

#[derive(Module, Debug)]
pub struct StyledConv<B: Backend> {
    affine:         Linear<B>,
    conv:           Conv2d<B>,
    noise_strength: Param<Tensor<B, 1>>,
    activation:     LeakyRelu,
}

impl<B: Backend> StyledConv<B> {
    fn new(w_dim: usize, channels: usize, device: &B::Device) -> Self {
        Self {
            affine: LinearConfig::new(w_dim, channels).init(device),
            conv: Conv2dConfig::new([channels, channels], [3, 3])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .init(device),
            noise_strength: Param::from_tensor(Tensor::full([1], 0.1, device)),
            activation: LeakyReluConfig::new().with_negative_slope(0.2).init(),
        }
    }

    /// x: [1, C, H, W], w: [1, w_dim], noise: [1, 1, H, W]
    fn forward(&self, x: Tensor<B, 4>, w: Tensor<B, 2>, noise: Option<Tensor<B, 4>>) -> Tensor<B, 4> {
        let style = self.affine.forward(w);
        let [n, c] = style.dims();
        let x = x.mul(style.reshape([n, c, 1, 1]).add_scalar(1.0));
        let x = self.conv.forward(x);
        let x = match noise {
            Some(noise) => x.add(noise.mul(self.noise_strength.val().reshape([1, 1, 1, 1]))),
            None => x,
        };
        self.activation.forward(x)
    }
}

#[derive(Module, Debug)]
pub struct StyleGenerator<B: Backend> {
    mapping:      Vec<Linear<B>>,
    w_avg:        Param<Tensor<B, 1>>,
    constant:     Param<Tensor<B, 4>>,
    layers:       Vec<StyledConv<B>>,
    to_image:     Conv2d<B>,
    activation:   LeakyRelu,
    z_dim:        usize,
    w_dim:        usize,
    img_channels: usize,
}

impl<B: Backend> StyleGenerator<B> {
    pub fn num_ws(&self) -> usize {
        self.layers.len()
    }

    /// z: [1, z_dim] → w: [1, w_dim]
    pub fn map_latent(&self, z: Tensor<B, 2>) -> Tensor<B, 2> {
        self.mapping
            .iter()
            .fold(z, |x, linear| self.activation.forward(linear.forward(x)))
    }

    /// Render one image from per-layer styles.
    /// ws: num_ws tensors of shape [1, w_dim]; noise: one plane per layer.
    pub fn synthesize(
        &self,
        ws:    Vec<Tensor<B, 2>>,
        noise: Vec<Option<Tensor<B, 4>>>,
    ) -> Tensor<B, 4> {
        let mut x = self.constant.val();
        for (i, ((layer, w), n)) in self.layers.iter().zip(ws).zip(noise).enumerate() {
            if i >= 2 && i % 2 == 0 {
                x = upsample2(x);
            }
            x = layer.forward(x, w, n);
        }
        tanh(self.to_image.forward(x))
    }

    pub fn w_avg(&self) -> Tensor<B, 1> {
        self.w_avg.val()
    }
}

/// Nearest-neighbour 2x upsampling
fn upsample2<B: Backend>(x: Tensor<B, 4>) -> Tensor<B, 4> {
    let [n, c, h, w] = x.dims();
    x.reshape([n, c, h, 1, w, 1])
        .repeat_dim(3, 2)
        .repeat_dim(5, 2)
        .reshape([n, c, h * 2, w * 2])
}

// ─── Host-side latent helpers ─────────────────────────────────────────────────

/// z ~ N(0, I) from a seed, normalised to unit second moment
pub fn latent_from_seed(seed: u64, z_dim: usize) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let z: Vec<f32> = (0..z_dim).map(|_| rng.sample::<f32, _>(StandardNormal)).collect();
    let mean_sq = z.iter().map(|v| v * v).sum::<f32>() / z_dim.max(1) as f32;
    let scale = 1.0 / (mean_sq + 1e-8).sqrt();
    z.into_iter().map(|v| v * scale).collect()
}

/// Pull the selected layers towards w_avg
pub fn truncate(ws: &mut [Vec<f32>], w_avg: &[f32], truncation: &Truncation) {
    for (layer, w) in ws.iter_mut().enumerate() {
        if truncation.applies_to(layer) {
            for (v, avg) in w.iter_mut().zip(w_avg) {
                *v = avg + truncation.psi * (*v - avg);
            }
        }
    }
}

/// Replace the styles at the spec's layers with the mixing seed's styles
pub fn style_mix(ws: &mut [Vec<f32>], mix_ws: &[Vec<f32>], spec: &StyleMixSpec) -> Result<()> {
    for &layer in spec.layers() {
        if layer >= ws.len() || layer >= mix_ws.len() {
            bail!("style-mix layer {} out of range (generator has {} layers)", layer, ws.len());
        }
        ws[layer] = mix_ws[layer].clone();
    }
    Ok(())
}

/// One noise plane per style layer, sized to that layer's resolution
fn noise_planes(mode: NoiseMode, random_seed: u64, num_ws: usize) -> Vec<Option<(usize, Vec<f32>)>> {
    let seed = match mode {
        NoiseMode::Random => random_seed,
        NoiseMode::Const  => CONST_NOISE_SEED,
        NoiseMode::None   => return vec![None; num_ws],
    };
    let mut rng = StdRng::seed_from_u64(seed);
    (0..num_ws)
        .map(|i| {
            let side = 4 << (i / 2);
            let plane = (0..side * side).map(|_| rng.sample::<f32, _>(StandardNormal)).collect();
            Some((side, plane))
        })
        .collect()
}

// ─── Adapter ──────────────────────────────────────────────────────────────────

/// Knobs the generator adapter consumes from the run configuration
#[derive(Debug, Clone, Copy)]
pub struct GeneratorSettings {
    pub noise_mode:    NoiseMode,
    pub random_seed:   u64,
    /// Map tanh output from [-1, 1] to [0, 1]; otherwise clamp
    pub img_normalize: bool,
}

/// Implements ImageGenerator on top of a loaded StyleGenerator
pub struct BurnGenerator<B: Backend> {
    model:    StyleGenerator<B>,
    device:   B::Device,
    w_avg:    Vec<f32>,
    settings: GeneratorSettings,
}

impl<B: Backend> BurnGenerator<B> {
    pub fn new(model: StyleGenerator<B>, device: B::Device, settings: GeneratorSettings) -> Result<Self> {
        let w_avg = model
            .w_avg()
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow!("cannot read w_avg: {e:?}"))?;
        Ok(Self { model, device, w_avg, settings })
    }

    /// Per-layer styles for one seed, truncation applied
    fn styles_for_seed(&self, seed: u64, truncation: &Truncation) -> Result<Vec<Vec<f32>>> {
        let z_dim = self.model.z_dim;
        let z = Tensor::<B, 2>::from_data(
            TensorData::new(latent_from_seed(seed, z_dim), [1, z_dim]),
            &self.device,
        );
        let w = self
            .model
            .map_latent(z)
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow!("cannot read w for seed {seed}: {e:?}"))?;

        let mut ws = vec![w; self.model.num_ws()];
        truncate(&mut ws, &self.w_avg, truncation);
        Ok(ws)
    }
}

impl<B: Backend> ImageGenerator for BurnGenerator<B> {
    fn generate(&self, request: &GenerationRequest) -> Result<Image> {
        let mut ws = self.styles_for_seed(request.seed, &request.truncation)?;
        if let Some((mix_seed, spec)) = &request.mix {
            let mix_ws = self.styles_for_seed(*mix_seed, &request.truncation)?;
            style_mix(&mut ws, &mix_ws, spec)?;
        }

        let w_dim = self.model.w_dim;
        let ws: Vec<Tensor<B, 2>> = ws
            .into_iter()
            .map(|w| Tensor::from_data(TensorData::new(w, [1, w_dim]), &self.device))
            .collect();
        let noise: Vec<Option<Tensor<B, 4>>> =
            noise_planes(self.settings.noise_mode, self.settings.random_seed, self.model.num_ws())
                .into_iter()
                .map(|plane| {
                    plane.map(|(side, values)| {
                        Tensor::from_data(TensorData::new(values, [1, 1, side, side]), &self.device)
                    })
                })
                .collect();

        let output = self.model.synthesize(ws, noise);
        let [_, channels, height, width] = output.dims();
        let raw = output
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow!("cannot read image for seed {}: {e:?}", request.seed))?;

        let pixels = if self.settings.img_normalize {
            raw.into_iter().map(|v| ((v + 1.0) / 2.0).clamp(0.0, 1.0)).collect()
        } else {
            raw.into_iter().map(|v| v.clamp(0.0, 1.0)).collect()
        };
        Ok(Image::new(width, height, channels, pixels)?)
    }

    fn num_layers(&self) -> usize {
        self.model.num_ws()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    fn settings() -> GeneratorSettings {
        GeneratorSettings { noise_mode: NoiseMode::Random, random_seed: 0, img_normalize: true }
    }

    fn small_generator() -> BurnGenerator<TestBackend> {
        let device = Default::default();
        let model  = StyleGeneratorConfig::new()
            .with_z_dim(8)
            .with_w_dim(8)
            .with_channels(4)
            .init::<TestBackend>(&device);
        BurnGenerator::new(model, device, settings()).unwrap()
    }

    #[test]
    fn test_latent_is_deterministic_and_normalised() {
        let a = latent_from_seed(3, 64);
        assert_eq!(a, latent_from_seed(3, 64));
        assert_ne!(a, latent_from_seed(4, 64));
        let mean_sq: f32 = a.iter().map(|v| v * v).sum::<f32>() / 64.0;
        assert!((mean_sq - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_truncation_respects_cutoff() {
        let mut ws = vec![vec![2.0, 4.0]; 4];
        truncate(&mut ws, &[0.0, 0.0], &Truncation::new(0.5, Some(2)));
        assert_eq!(ws[0], vec![1.0, 2.0]);
        assert_eq!(ws[1], vec![1.0, 2.0]);
        assert_eq!(ws[2], vec![2.0, 4.0]);
    }

    #[test]
    fn test_zero_psi_collapses_to_average() {
        let mut ws = vec![vec![5.0, -3.0]; 2];
        truncate(&mut ws, &[1.0, 1.0], &Truncation::new(0.0, None));
        assert!(ws.iter().all(|w| w == &vec![1.0, 1.0]));
    }

    #[test]
    fn test_style_mix_replaces_only_listed_layers() {
        let mut ws = vec![vec![0.0]; 8];
        let mix    = vec![vec![1.0]; 8];
        style_mix(&mut ws, &mix, &StyleMixSpec::new(vec![3, 4])).unwrap();
        let flat: Vec<f32> = ws.iter().map(|w| w[0]).collect();
        assert_eq!(flat, vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_style_mix_out_of_range() {
        let mut ws = vec![vec![0.0]; 8];
        let mix    = vec![vec![1.0]; 8];
        assert!(style_mix(&mut ws, &mix, &StyleMixSpec::new(vec![8])).is_err());
    }

    #[test]
    fn test_noise_planes_match_layer_resolution() {
        let planes = noise_planes(NoiseMode::Const, 99, 8);
        let sides: Vec<usize> = planes.iter().map(|p| p.as_ref().unwrap().0).collect();
        assert_eq!(sides, vec![4, 4, 8, 8, 16, 16, 32, 32]);
        assert!(noise_planes(NoiseMode::None, 0, 8).iter().all(Option::is_none));
    }

    #[test]
    fn test_map_latent_shape() {
        let device = Default::default();
        let model  = StyleGeneratorConfig::new()
            .with_z_dim(8)
            .with_w_dim(6)
            .with_channels(4)
            .init::<TestBackend>(&device);
        let z = Tensor::<TestBackend, 2>::from_data(
            TensorData::new(latent_from_seed(1, 8), [1, 8]),
            &device,
        );
        assert_eq!(model.map_latent(z).dims(), [1, 6]);
    }

    #[test]
    fn test_generate_shape_and_range() {
        let generator = small_generator();
        let request = GenerationRequest { seed: 0, mix: None, truncation: Truncation::new(1.0, None) };
        let image = generator.generate(&request).unwrap();
        assert_eq!(image.shape_label(), "1x32x32");
        assert!(image.pixels().iter().all(|&p| (0.0..=1.0).contains(&p)));
    }

    #[test]
    fn test_generate_is_deterministic() {
        let generator = small_generator();
        let request = GenerationRequest {
            seed:       5,
            mix:        Some((9, StyleMixSpec::new(vec![6, 7]))),
            truncation: Truncation::new(0.7, Some(4)),
        };
        assert_eq!(generator.generate(&request).unwrap(), generator.generate(&request).unwrap());
    }

    #[test]
    fn test_mixing_with_itself_changes_nothing() {
        let generator = small_generator();
        let plain = GenerationRequest { seed: 2, mix: None, truncation: Truncation::new(1.0, None) };
        let self_mixed = GenerationRequest {
            seed:       2,
            mix:        Some((2, StyleMixSpec::new(vec![7]))),
            truncation: Truncation::new(1.0, None),
        };
        assert_eq!(generator.generate(&plain).unwrap(), generator.generate(&self_mixed).unwrap());
    }
}
