// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// Three families of failure matter to a run:
//
//   Adapter       — the generator or classifier could not produce
//                   a result for one candidate. The engine skips
//                   that candidate and keeps searching.
//   Configuration — invalid thresholds, catalog or weight paths.
//                   Fatal, raised before any generation work.
//   Storage       — the archive or report could not be written.
//                   Fatal, but pairs already on disk stay there.
//
// Shape and Serialization are the remaining low-level cases the
// data and infra layers report through the same enum.

use std::{fmt, path::PathBuf};
use thiserror::Error;

/// Which adapter call failed while evaluating a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Generate,
    Classify,
    Score,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Generate => "generate",
            Stage::Classify => "classify",
            Stage::Score    => "score",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum FrontierError {
    #[error("{stage} failed: {reason}")]
    Adapter { stage: Stage, reason: String },

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("cannot write '{}': {source}", path.display())]
    Storage {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialisation failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("shape mismatch: {0}")]
    Shape(String),
}

impl FrontierError {
    /// Wrap any adapter error with the stage it came from.
    /// Uses the alternate format so anyhow context chains are kept.
    pub fn adapter(stage: Stage, err: impl fmt::Display) -> Self {
        FrontierError::Adapter { stage, reason: format!("{err:#}") }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        FrontierError::Configuration(msg.into())
    }

    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FrontierError::Storage { path: path.into(), source }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_message_names_stage() {
        let err = FrontierError::adapter(Stage::Classify, "weights not loaded");
        assert_eq!(err.to_string(), "classify failed: weights not loaded");
    }

    #[test]
    fn test_storage_message_names_path() {
        let io  = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = FrontierError::storage("/tmp/out/pair_0000.json", io);
        assert!(err.to_string().contains("/tmp/out/pair_0000.json"));
    }
}
