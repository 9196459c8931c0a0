// ============================================================
// Layer 6 — Classifier Adapter
// ============================================================
// Wraps a loaded AllCnn so the engine can call predict() on a
// domain Image:
//
//   Image ─► Preprocessor (channels, resize, clamp)
//         ─► tensor [1, C, S, S]
//         ─► softmax probabilities
//         ─► (argmax, probability vector)

use anyhow::{anyhow, Result};
use burn::prelude::*;

use crate::data::preprocessor::Preprocessor;
use crate::domain::candidate::Prediction;
use crate::domain::image::Image;
use crate::domain::traits::ImageClassifier;
use crate::ml::model::AllCnn;

pub struct BurnClassifier<B: Backend> {
    model:        AllCnn<B>,
    device:       B::Device,
    preprocessor: Preprocessor,
}

impl<B: Backend> BurnClassifier<B> {
    pub fn new(model: AllCnn<B>, device: B::Device, input_size: usize, input_channels: usize) -> Self {
        Self {
            model,
            device,
            preprocessor: Preprocessor::new(input_size, input_channels),
        }
    }
}

impl<B: Backend> ImageClassifier for BurnClassifier<B> {
    fn predict(&self, image: &Image) -> Result<Prediction> {
        let prepared = self.preprocessor.prepare(image)?;
        let shape = [1, prepared.channels(), prepared.height(), prepared.width()];
        let input = Tensor::<B, 4>::from_data(
            TensorData::new(prepared.into_pixels(), shape),
            &self.device,
        );

        let confidences = self
            .model
            .predict_proba(input)
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow!("cannot read class probabilities: {e:?}"))?;

        let label = argmax(&confidences)
            .ok_or_else(|| anyhow!("classifier returned no class scores"))?;

        tracing::debug!("Predicted class {} (p={:.4})", label, confidences[label]);
        Ok(Prediction { label, confidences })
    }

    fn num_classes(&self) -> usize {
        self.model.num_classes
    }
}

/// Index of the largest value; the first one wins on ties, NaN never wins
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::AllCnnConfig;

    type TestBackend = burn::backend::NdArray;

    #[test]
    fn test_argmax_first_wins() {
        assert_eq!(argmax(&[0.1, 0.7, 0.7, 0.2]), Some(1));
        assert_eq!(argmax(&[f32::NAN, 0.3]), Some(1));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_predict_on_generator_sized_image() {
        let device = Default::default();
        let model: AllCnn<TestBackend> = AllCnnConfig::new(10).init(&device);
        let classifier = BurnClassifier::new(model, device, 28, 1);

        // 32x32 generator output gets resized to 28x28 first
        let prediction = classifier.predict(&Image::filled(32, 32, 0.5)).unwrap();
        assert_eq!(prediction.confidences.len(), 10);
        assert!(prediction.label < 10);
        assert_eq!(classifier.num_classes(), 10);
    }
}
