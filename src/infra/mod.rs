// ============================================================
// Layer 7 — Infrastructure Layer
// ============================================================
// Everything that touches the filesystem:
//
//   checkpoint.rs — Loading generator/classifier weights with
//                   burn's CompactRecorder, and the JSON
//                   snapshot of the run configuration.
//
//   archive.rs    — One JSON file per accepted frontier pair,
//                   plus a manifest for the run.
//
//   report.rs     — One CSV row per run: thresholds, counts,
//                   stop reason, elapsed time.
//
// Failures here are StorageErrors. They end the run, but files
// already written by the same run are left in place.

/// Weight loading and configuration snapshots
pub mod checkpoint;

/// Frontier pair archive
pub mod archive;

/// Run report CSV logger
pub mod report;
