// ============================================================
// Layer 6 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL burn specific code.
// No other layer imports from burn directly, only this one
// and the checkpoint loader in infra.
//
//   model.rs      — All-CNN classifier architecture
//   generator.rs  — style-based generator, truncation, style mixing,
//                   and the ImageGenerator adapter around it
//   classifier.rs — the ImageClassifier adapter around All-CNN
//
// Backends: NdArray on the CPU, Wgpu on the GPU. The run config
// picks one; the adapters are generic over either.

/// All-CNN classifier architecture
pub mod model;

/// Style-based generator and its adapter
pub mod generator;

/// Classifier adapter: preprocessing, softmax, argmax
pub mod classifier;

pub use burn::prelude::Backend;

pub type CpuBackend = burn::backend::NdArray;
pub type GpuBackend = burn::backend::Wgpu;
pub type CpuDevice  = burn::backend::ndarray::NdArrayDevice;
pub type GpuDevice  = burn::backend::wgpu::WgpuDevice;
