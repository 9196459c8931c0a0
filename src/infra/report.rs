// ============================================================
// Layer 7 — Run Report Logger
// ============================================================
// Appends one row per search run to a CSV file so runs with
// different thresholds or catalogs can be compared later.
//
// Output file: {results_path}/{report_name}, stats.csv by default
//
// Example CSV output:
//   run_id,timestamp,preset,catalog_len,search_limit,seed_limit,ssim_threshold,l2_range,evaluated,accepted,rejected,adapter_failures,stop_reason,elapsed_secs
//   20261019-142501,2026-10-19T14:25:31Z,fmnist,10,3,50,0.950000,0.200000,37,3,34,0,limit_reached,29.500
//
// The header is written once, when the file is created; later
// runs append below the rows already there.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use crate::domain::error::FrontierError;
use crate::engine::frontier::SearchStats;

const HEADER: &str = "run_id,timestamp,preset,catalog_len,search_limit,seed_limit,\
ssim_threshold,l2_range,evaluated,accepted,rejected,adapter_failures,stop_reason,elapsed_secs";

/// Run id derived from the start time, e.g. "20261019-142501"
pub fn run_id(started: DateTime<Utc>) -> String {
    started.format("%Y%m%d-%H%M%S").to_string()
}

/// One row of the run report
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id:         String,
    pub timestamp:      DateTime<Utc>,
    pub preset:         String,
    pub catalog_len:    usize,
    pub search_limit:   usize,
    pub seed_limit:     usize,
    pub ssim_threshold: f64,
    pub l2_range:       f64,
    pub stats:          SearchStats,
}

impl RunReport {
    fn to_csv_row(&self) -> String {
        let s = &self.stats;
        format!(
            "{},{},{},{},{},{},{:.6},{:.6},{},{},{},{},{},{:.3}",
            self.run_id,
            self.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            self.preset,
            self.catalog_len,
            self.search_limit,
            self.seed_limit,
            self.ssim_threshold,
            self.l2_range,
            s.evaluated,
            s.accepted,
            s.rejected,
            s.adapter_failures,
            s.stop_reason.as_str(),
            s.elapsed_secs,
        )
    }
}

/// Appends run rows to the report CSV
pub struct ReportLogger {
    csv_path: PathBuf,
}

impl ReportLogger {
    /// Create the report directory and write the header if the file is new.
    pub fn new(dir: &Path, name: &str) -> Result<Self, FrontierError> {
        fs::create_dir_all(dir).map_err(|e| FrontierError::storage(dir, e))?;

        let csv_path = dir.join(name);
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .map_err(|e| FrontierError::storage(&csv_path, e))?;
            writeln!(f, "{HEADER}").map_err(|e| FrontierError::storage(&csv_path, e))?;
            tracing::debug!("Created run report: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one run as a new row
    pub fn log(&self, report: &RunReport) -> Result<(), FrontierError> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .map_err(|e| FrontierError::storage(&self.csv_path, e))?;

        writeln!(f, "{}", report.to_csv_row())
            .map_err(|e| FrontierError::storage(&self.csv_path, e))?;

        tracing::debug!(
            "Logged run {}: {} accepted of {} evaluated",
            report.run_id,
            report.stats.accepted,
            report.stats.evaluated,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}
