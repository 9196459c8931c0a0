// ============================================================
// Layer 3 — Core Traits (Adapters)
// ============================================================
// The frontier engine only ever sees these three traits.
//
//   ImageGenerator   → BurnGenerator (ml layer), test stubs
//   ImageClassifier  → BurnClassifier (ml layer), test stubs
//   SimilarityScorer → SsimScorer (data layer), test stubs
//
// Adapters are loaded once per run and used read-only, so every
// method takes &self.

use anyhow::Result;

use crate::domain::candidate::{GenerationRequest, Prediction, Similarity};
use crate::domain::image::Image;

// ─── ImageGenerator ───────────────────────────────────────────────────────────
/// Maps a seed (plus optional style mix and truncation) to an image.
pub trait ImageGenerator {
    /// Render one image. The same request must always yield the same image.
    fn generate(&self, request: &GenerationRequest) -> Result<Image>;

    /// Number of style layers; valid style-mix indices are below this
    fn num_layers(&self) -> usize;
}

// ─── ImageClassifier ──────────────────────────────────────────────────────────
/// Predicts a class index and a confidence vector for an image.
pub trait ImageClassifier {
    fn predict(&self, image: &Image) -> Result<Prediction>;

    fn num_classes(&self) -> usize;
}

// ─── SimilarityScorer ─────────────────────────────────────────────────────────
/// Compares two equal-shaped images.
pub trait SimilarityScorer {
    fn score(&self, a: &Image, b: &Image) -> Result<Similarity>;
}
