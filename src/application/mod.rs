// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers for one frontier search run.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No printing here (that's Layer 1)
//   - File access only through Layer 7 (infra)
//
// The run configuration lives here too: it is built once from a
// preset or JSON file, validated, and never mutated afterwards.

/// Run configuration, presets, and validation
pub mod config;

/// The frontier search workflow
pub mod search_use_case;
