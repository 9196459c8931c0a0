// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs and traits describing a frontier search:
// what a candidate is, what the classifier said about it,
// how similar its two images are, and which pairs survive.
//
// Rules for this layer:
//   - NO burn types allowed here
//   - NO file I/O
//   - Only plain structs, enums, traits and the error taxonomy
//
// The generator, the classifier and the similarity metric are
// external collaborators. They appear here only as traits so
// the engine can be driven by stub fixtures in tests and by
// burn models in a real run.

// A normalised image buffer (CHW, values in [0, 1])
pub mod image;

// Seeds, style-mix specs, candidates, verdicts and frontier pairs
pub mod candidate;

// Adapter traits that the ml and data layers implement
pub mod traits;

// Error taxonomy shared by every layer
pub mod error;
