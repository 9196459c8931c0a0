// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `search` and `init-config`,
// and their flags.
//
// A search run starts from a preset (or a JSON config file) and
// every flag given on the command line overrides one field of it.
// Flags left out keep the value from the preset or file.

use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::application::config::{Device, Preset, RunConfig, StopCondition};

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search for frontier pairs and write them to the archive
    Search(SearchArgs),

    /// Write a preset configuration as JSON for editing
    InitConfig(InitConfigArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetArg {
    Fmnist,
    Svhn,
}

impl From<PresetArg> for Preset {
    fn from(p: PresetArg) -> Self {
        match p {
            PresetArg::Fmnist => Preset::Fmnist,
            PresetArg::Svhn   => Preset::Svhn,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceArg {
    Cpu,
    Gpu,
}

impl From<DeviceArg> for Device {
    fn from(d: DeviceArg) -> Self {
        match d {
            DeviceArg::Cpu => Device::Cpu,
            DeviceArg::Gpu => Device::Gpu,
        }
    }
}

/// All arguments for the `search` command
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// JSON run configuration; takes precedence over --preset
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Dataset preset used when no --config is given
    #[arg(long, value_enum, default_value_t = PresetArg::Fmnist)]
    pub preset: PresetArg,

    /// Number of frontier pairs to collect
    #[arg(long)]
    pub search_limit: Option<usize>,

    /// Seed pairs tried per style-mix layer set
    #[arg(long)]
    pub seed_limit: Option<usize>,

    /// Minimum SSIM between the two images of a pair, in [0, 1]
    #[arg(long)]
    pub ssim_threshold: Option<f64>,

    /// Maximum RMS pixel distance between the two images of a pair
    #[arg(long)]
    pub l2_range: Option<f64>,

    #[arg(long, value_enum)]
    pub device: Option<DeviceArg>,

    /// Directory receiving the frontier pair files
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Stop after this many seconds even if seeds remain
    #[arg(long)]
    pub runtime_secs: Option<u64>,
}

impl SearchArgs {
    /// Apply the flags that were given on top of `cfg`
    pub fn apply(&self, mut cfg: RunConfig) -> RunConfig {
        if let Some(n) = self.search_limit {
            cfg.search.search_limit = n;
        }
        if let Some(n) = self.seed_limit {
            cfg.search.stylemix_seed_limit = n;
        }
        if let Some(t) = self.ssim_threshold {
            cfg.search.ssim_threshold = t;
        }
        if let Some(r) = self.l2_range {
            cfg.search.l2_range = r;
        }
        if let Some(d) = self.device {
            cfg.device = d.into();
        }
        if let Some(dir) = &self.out_dir {
            cfg.output.frontier_pairs = dir.clone();
        }
        if let Some(secs) = self.runtime_secs {
            cfg.search.stop_condition = StopCondition::Time;
            cfg.search.runtime_secs   = secs;
        }
        cfg
    }
}

/// All arguments for the `init-config` command
#[derive(Args, Debug)]
pub struct InitConfigArgs {
    #[arg(long, value_enum, default_value_t = PresetArg::Fmnist)]
    pub preset: PresetArg,

    /// Where to write the JSON file
    #[arg(long, default_value = "run_config.json")]
    pub out: PathBuf,
}
