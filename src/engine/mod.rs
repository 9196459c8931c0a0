// ============================================================
// Layer 4 — Search Engine
// ============================================================
// Everything that decides which candidates to try and which to
// keep. Talks to the generator, classifier and scorer only
// through the domain traits.
//
//   acceptance.rs — the ssim / l2 / label predicate
//   seeds.rs      — deterministic seed pair schedules
//   frontier.rs   — the catalog × seed search loop

pub mod acceptance;

pub mod seeds;

pub mod frontier;
