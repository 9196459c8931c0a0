// ============================================================
// Layer 7 — Frontier Pair Archive
// ============================================================
// Every run gets its own directory, so later runs never touch
// the pairs an earlier run archived:
//
//   {frontier_pairs}/
//     {run_id}/
//       pair_0000.json   ← seeds, style-mix layers, truncation,
//       pair_0001.json     labels, confidences, ssim, l2
//       manifest.json    ← run id + the pair files of this run
//       run_config.json  ← written by the checkpoint manager
//
// A pair is identified by its seeds and style-mix layers; with the
// same generator weights and random seed the two images can always
// be regenerated, so no pixels are stored.
//
// Files are written one at a time. If a later write fails the
// earlier files stay on disk.

use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::domain::candidate::FrontierPair;
use crate::domain::error::FrontierError;

pub const MANIFEST_FILE: &str = "manifest.json";

/// Index of the files one run wrote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub run_id: String,
    pub pairs:  Vec<String>,
}

pub struct FrontierArchive {
    dir: PathBuf,
}

impl FrontierArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn run_dir(&self, run_id: &str) -> PathBuf {
        self.dir.join(run_id)
    }

    /// Create a fresh directory for one run and return its id.
    /// If `run_id` is taken (two runs in the same second) a
    /// numeric suffix is added.
    pub fn start_run(&self, run_id: &str) -> Result<String, FrontierError> {
        fs::create_dir_all(&self.dir).map_err(|e| FrontierError::storage(&self.dir, e))?;

        let mut suffix = 0usize;
        loop {
            let id = match suffix {
                0 => run_id.to_string(),
                n => format!("{run_id}-{n}"),
            };
            let path = self.run_dir(&id);
            match fs::create_dir(&path) {
                Ok(()) => {
                    tracing::debug!("Archiving run {} in '{}'", id, path.display());
                    return Ok(id);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => suffix += 1,
                Err(e) => return Err(FrontierError::storage(path, e)),
            }
        }
    }

    pub fn pair_file_name(index: usize) -> String {
        format!("pair_{index:04}.json")
    }

    /// Write each pair of a started run, then its manifest.
    /// Returns the pair files written.
    pub fn persist(&self, pairs: &[FrontierPair], run_id: &str) -> Result<Vec<PathBuf>, FrontierError> {
        let dir = self.run_dir(run_id);
        fs::create_dir_all(&dir).map_err(|e| FrontierError::storage(&dir, e))?;

        let mut written = Vec::with_capacity(pairs.len());
        let mut names   = Vec::with_capacity(pairs.len());
        for (i, pair) in pairs.iter().enumerate() {
            let name = Self::pair_file_name(i);
            let path = dir.join(&name);
            write_json(&path, pair)?;
            tracing::debug!(
                "Archived pair {} at {} (labels {}/{}, ssim={:.4}) as '{}'",
                pair.seeds(),
                pair.candidate().style_mix,
                pair.verdict().label_a,
                pair.verdict().label_b,
                pair.similarity().ssim,
                path.display()
            );
            written.push(path);
            names.push(name);
        }

        let manifest = Manifest { run_id: run_id.to_string(), pairs: names };
        write_json(&dir.join(MANIFEST_FILE), &manifest)?;

        tracing::info!("Archived {} frontier pairs in '{}'", written.len(), dir.display());
        Ok(written)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), FrontierError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|e| FrontierError::storage(path, e))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candidate::{
        Candidate, Prediction, SeedPair, Similarity, StyleMixSpec, Truncation, Verdict,
    };

    fn read<T: serde::de::DeserializeOwned>(path: &Path) -> T {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    fn pair(s1: u64) -> FrontierPair {
        let verdict = Verdict::from_predictions(
            Prediction { label: 3, confidences: vec![0.1, 0.9] },
            Prediction { label: 8, confidences: vec![0.6, 0.4] },
        );
        FrontierPair::new(
            Candidate::new(SeedPair::new(0, s1), StyleMixSpec::new(vec![7]), Truncation::new(1.0, None)),
            verdict,
            Similarity { ssim: 0.97, l2: 0.1 },
        )
    }

    #[test]
    fn test_persist_writes_pairs_and_manifest() {
        let dir     = tempfile::tempdir().unwrap();
        let archive = FrontierArchive::new(dir.path().join("eval"));
        let pairs   = vec![pair(1), pair(2)];

        let run_id  = archive.start_run("20261019-142501").unwrap();
        let written = archive.persist(&pairs, &run_id).unwrap();
        assert_eq!(written.len(), 2);
        assert!(written[1].ends_with("20261019-142501/pair_0001.json"));

        let manifest: Manifest = read(&archive.run_dir(&run_id).join(MANIFEST_FILE));
        assert_eq!(manifest.run_id, "20261019-142501");
        assert_eq!(manifest.pairs, vec!["pair_0000.json", "pair_0001.json"]);
        let second: FrontierPair = read(&written[1]);
        assert_eq!(second, pairs[1]);
    }

    #[test]
    fn test_second_run_keeps_first_runs_pairs() {
        let dir     = tempfile::tempdir().unwrap();
        let archive = FrontierArchive::new(dir.path());

        let first = archive.start_run("run").unwrap();
        archive.persist(&[pair(1), pair(2), pair(3)], &first).unwrap();
        // Same second, same base id
        let second = archive.start_run("run").unwrap();
        archive.persist(&[pair(40)], &second).unwrap();

        assert_eq!(first, "run");
        assert_eq!(second, "run-1");

        let kept: FrontierPair = read(&archive.run_dir(&first).join("pair_0000.json"));
        assert_eq!(kept.seeds().s1, 1);
        let first_manifest: Manifest = read(&archive.run_dir(&first).join(MANIFEST_FILE));
        assert_eq!(first_manifest.pairs.len(), 3);

        let newer: FrontierPair = read(&archive.run_dir(&second).join("pair_0000.json"));
        assert_eq!(newer.seeds().s1, 40);
        assert!(!archive.run_dir(&second).join("pair_0001.json").exists());
    }

    #[test]
    fn test_pair_json_carries_identifying_fields() {
        let dir     = tempfile::tempdir().unwrap();
        let archive = FrontierArchive::new(dir.path());
        let run_id  = archive.start_run("run").unwrap();
        let written = archive.persist(&[pair(1)], &run_id).unwrap();

        let json = fs::read_to_string(&written[0]).unwrap();
        for field in ["\"s0\"", "\"s1\"", "\"style_mix\"", "\"label_a\"", "\"ssim\"", "\"l2\""] {
            assert!(json.contains(field), "missing {field}");
        }
    }

    #[test]
    fn test_empty_run_still_writes_manifest() {
        let dir     = tempfile::tempdir().unwrap();
        let archive = FrontierArchive::new(dir.path().join("empty"));
        let run_id  = archive.start_run("run").unwrap();
        assert!(archive.persist(&[], &run_id).unwrap().is_empty());

        let manifest: Manifest = read(&archive.run_dir(&run_id).join(MANIFEST_FILE));
        assert!(manifest.pairs.is_empty());
    }

    #[test]
    fn test_unwritable_destination_is_storage_error() {
        let dir  = tempfile::tempdir().unwrap();
        let file = dir.path().join("occupied");
        fs::write(&file, "not a directory").unwrap();

        let archive = FrontierArchive::new(file.join("pairs"));
        let err = archive.start_run("run").unwrap_err();
        assert!(matches!(err, FrontierError::Storage { .. }));
    }
}
