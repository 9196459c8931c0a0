// ============================================================
// Layer 3 — Candidate and FrontierPair Domain Types
// ============================================================
// A Candidate fully determines two generated images:
//
//   image A = generator(s0)                        (base seed)
//   image B = generator(s0, styles of s1 at layers) (style-mixed)
//
// both under the same truncation settings. The classifier labels
// both images (Verdict), the scorer compares them (Similarity),
// and the acceptance policy decides whether the triple becomes
// a FrontierPair: two near-identical images on opposite sides
// of a decision boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

// ─── SeedPair ─────────────────────────────────────────────────────────────────
/// Two latent seeds: the base seed and the style-mix seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeedPair {
    pub s0: u64,
    pub s1: u64,
}

impl SeedPair {
    pub fn new(s0: u64, s1: u64) -> Self {
        Self { s0, s1 }
    }
}

impl fmt::Display for SeedPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.s0, self.s1)
    }
}

// ─── StyleMixSpec ─────────────────────────────────────────────────────────────
/// The generator layers at which the style-mix seed's styles
/// replace the base seed's. Order is kept as configured.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleMixSpec(Vec<usize>);

impl StyleMixSpec {
    pub fn new(layers: impl Into<Vec<usize>>) -> Self {
        Self(layers.into())
    }

    pub fn layers(&self) -> &[usize] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Highest layer index, None for an empty spec
    pub fn max_layer(&self) -> Option<usize> {
        self.0.iter().copied().max()
    }
}

impl From<Vec<usize>> for StyleMixSpec {
    fn from(layers: Vec<usize>) -> Self {
        Self(layers)
    }
}

impl fmt::Display for StyleMixSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|l| l.to_string()).collect();
        write!(f, "[{}]", parts.join(","))
    }
}

// ─── Truncation ───────────────────────────────────────────────────────────────
/// Truncation trick settings: pull w towards w_avg by `psi`
/// on the first `cutoff` style layers (every layer when None).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Truncation {
    pub psi:    f32,
    pub cutoff: Option<usize>,
}

impl Truncation {
    pub fn new(psi: f32, cutoff: Option<usize>) -> Self {
        Self { psi, cutoff }
    }

    /// True when style layer `layer` is pulled towards w_avg
    pub fn applies_to(&self, layer: usize) -> bool {
        self.cutoff.map_or(true, |c| layer < c)
    }
}

// ─── GenerationRequest ────────────────────────────────────────────────────────
/// One call to the generator: a seed, optionally mixed with the
/// styles of a second seed at some layers, under truncation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub seed:       u64,
    pub mix:        Option<(u64, StyleMixSpec)>,
    pub truncation: Truncation,
}

// ─── Candidate ────────────────────────────────────────────────────────────────
/// Everything needed to regenerate both images of a pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub seeds:      SeedPair,
    pub style_mix:  StyleMixSpec,
    pub truncation: Truncation,
}

impl Candidate {
    pub fn new(seeds: SeedPair, style_mix: StyleMixSpec, truncation: Truncation) -> Self {
        Self { seeds, style_mix, truncation }
    }

    /// Request for image A: the base seed, unmixed
    pub fn base_request(&self) -> GenerationRequest {
        GenerationRequest {
            seed:       self.seeds.s0,
            mix:        None,
            truncation: self.truncation,
        }
    }

    /// Request for image B: the base seed with s1's styles at the spec's layers
    pub fn mixed_request(&self) -> GenerationRequest {
        GenerationRequest {
            seed:       self.seeds.s0,
            mix:        Some((self.seeds.s1, self.style_mix.clone())),
            truncation: self.truncation,
        }
    }
}

// ─── Prediction / Verdict ─────────────────────────────────────────────────────
/// Output of the classifier for a single image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label:       usize,
    pub confidences: Vec<f32>,
}

/// Classifier output for both images of a candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub label_a:      usize,
    pub label_b:      usize,
    pub confidence_a: Vec<f32>,
    pub confidence_b: Vec<f32>,
}

impl Verdict {
    pub fn from_predictions(a: Prediction, b: Prediction) -> Self {
        Self {
            label_a:      a.label,
            label_b:      b.label,
            confidence_a: a.confidences,
            confidence_b: b.confidences,
        }
    }

    /// True when the two images land in different classes
    pub fn is_split(&self) -> bool {
        self.label_a != self.label_b
    }
}

// ─── Similarity ───────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Similarity {
    /// Structural similarity in [0, 1]
    pub ssim: f64,
    /// Root-mean-square pixel distance, non-negative
    pub l2:   f64,
}

// ─── FrontierPair ─────────────────────────────────────────────────────────────
/// An accepted candidate. Fields are private so a pair cannot be
/// altered after the engine builds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontierPair {
    candidate:  Candidate,
    verdict:    Verdict,
    similarity: Similarity,
}

impl FrontierPair {
    pub(crate) fn new(candidate: Candidate, verdict: Verdict, similarity: Similarity) -> Self {
        Self { candidate, verdict, similarity }
    }

    pub fn candidate(&self) -> &Candidate { &self.candidate }

    pub fn verdict(&self) -> &Verdict { &self.verdict }

    pub fn similarity(&self) -> Similarity { self.similarity }

    pub fn seeds(&self) -> SeedPair { self.candidate.seeds }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_share_base_seed() {
        let c = Candidate::new(SeedPair::new(0, 1), StyleMixSpec::new(vec![7]), Truncation::new(1.0, None));
        let a = c.base_request();
        let b = c.mixed_request();
        assert_eq!(a.seed, 0);
        assert_eq!(b.seed, 0);
        assert!(a.mix.is_none());
        assert_eq!(b.mix, Some((1, StyleMixSpec::new(vec![7]))));
    }

    #[test]
    fn test_truncation_cutoff() {
        let t = Truncation::new(0.7, Some(4));
        assert!(t.applies_to(3));
        assert!(!t.applies_to(4));
        assert!(Truncation::new(0.7, None).applies_to(100));
    }

    #[test]
    fn test_spec_display_keeps_order() {
        assert_eq!(StyleMixSpec::new(vec![3, 2]).to_string(), "[3,2]");
    }

    #[test]
    fn test_spec_serialises_as_plain_list() {
        let json = serde_json::to_string(&StyleMixSpec::new(vec![5, 6])).unwrap();
        assert_eq!(json, "[5,6]");
    }

    #[test]
    fn test_verdict_split() {
        let a = Prediction { label: 3, confidences: vec![0.0; 10] };
        let b = Prediction { label: 8, confidences: vec![0.0; 10] };
        assert!(Verdict::from_predictions(a.clone(), b).is_split());
        assert!(!Verdict::from_predictions(a.clone(), a).is_split());
    }
}
