// ============================================================
// Layer 5 — Image Data Pipeline
// ============================================================
// Pure-Rust image handling between the models:
//
//   generator output (CHW, [0, 1])
//       │
//       ├──► Preprocessor  → grayscale / resize / clamp for the classifier
//       │
//       └──► SsimScorer    → SSIM + L2 between the two images of a pair
//
// Nothing here depends on burn, so every step is testable on
// plain buffers.

/// Channel conversion and resizing for classifier input
pub mod preprocessor;

/// SSIM and L2 similarity between two images
pub mod similarity;
