// ============================================================
// Layer 2 — Run Configuration
// ============================================================
// Every knob of a frontier search run, in one serialisable struct.
// A run starts from a dataset preset (F-MNIST or SVHN), optionally
// loads a JSON file, applies CLI overrides, and then calls
// validate() before any model is loaded or any image generated.
//
// The struct is passed by reference into the use case and never
// mutated once the run starts.

use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

use crate::domain::candidate::{StyleMixSpec, Truncation};
use crate::domain::error::FrontierError;
use crate::engine::{acceptance::AcceptancePolicy, frontier::SearchPlan, seeds::SeedStrategy};
use crate::infra::checkpoint::record_file;
use crate::ml::generator::{GeneratorSettings, NoiseMode, StyleGeneratorConfig};
use crate::ml::model::AllCnnConfig;

// ─── Enums ────────────────────────────────────────────────────────────────────

/// Dataset the generator and classifier were trained on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    Fmnist,
    Svhn,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Fmnist => "f-mnist",
            Preset::Svhn   => "svhn",
        }
    }
}

/// Where inference runs: burn's NdArray backend or its Wgpu backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    #[default]
    Cpu,
    Gpu,
}

/// `iter` runs until the seed budget is spent; `time` also stops after runtime_secs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopCondition {
    #[default]
    Iter,
    Time,
}

// ─── Sections ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorParams {
    /// burn record of the generator, without the .mpk extension
    pub pretrained_weight: PathBuf,
    pub z_dim:             usize,
    pub w_dim:             usize,
    /// Number of style layers; style-mix indices must be below this
    pub num_ws:            usize,
    pub channels:          usize,
    pub img_channels:      usize,
    /// Base seed shared by every candidate
    pub w0_seed:           u64,
    pub trunc_psi:         f32,
    /// Truncate the first N layers; null truncates every layer
    pub trunc_cutoff:      Option<usize>,
    pub random_seed:       u64,
    pub noise_mode:        NoiseMode,
    pub img_normalize:     bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierParams {
    /// burn record of the classifier, without the .mpk extension
    pub model:          PathBuf,
    pub num_classes:    usize,
    /// Side length the classifier was trained on
    pub input_size:     usize,
    pub input_channels: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Style-mix layer sets, tried in this order
    pub stylemix_layers:     Vec<StyleMixSpec>,
    /// Number of frontier pairs to collect
    pub search_limit:        usize,
    /// Seed pairs tried per style-mix spec
    pub stylemix_seed_limit: usize,
    pub ssim_threshold:      f64,
    pub l2_range:            f64,
    pub seed_strategy:       SeedStrategy,
    pub stop_condition:      StopCondition,
    pub runtime_secs:        u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputParams {
    /// Directory receiving one JSON file per frontier pair
    pub frontier_pairs: PathBuf,
    /// Directory holding the run report
    pub results_path:   PathBuf,
    pub report_name:    String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub preset:     Preset,
    pub device:     Device,
    pub generator:  GeneratorParams,
    pub classifier: ClassifierParams,
    pub search:     SearchParams,
    pub output:     OutputParams,
}

/// Style-mix catalog, most productive mixes first
fn default_catalog() -> Vec<StyleMixSpec> {
    [
        vec![7], vec![6], vec![5], vec![4], vec![3],
        vec![5, 6], vec![3, 4], vec![3, 4, 5, 6], vec![2], vec![3, 2],
    ]
    .into_iter()
    .map(StyleMixSpec::new)
    .collect()
}

impl RunConfig {
    /// Configuration matching one of the two trained datasets
    pub fn preset(preset: Preset) -> Self {
        let (generator_weight, classifier_weight, input_size, frontier_pairs) = match preset {
            Preset::Fmnist => (
                "checkpoints/stylegan_fmnist_32x32",
                "f-mnist/models/model1_fmnist",
                28,
                "f-mnist/eval",
            ),
            Preset::Svhn => (
                "checkpoints/stylegan_svhn_32x32",
                "svhn/models/model1_svhn_gray",
                32,
                "svhn/eval",
            ),
        };

        Self {
            preset,
            device: Device::Cpu,
            generator: GeneratorParams {
                pretrained_weight: PathBuf::from(generator_weight),
                z_dim:             64,
                w_dim:             64,
                num_ws:            8,
                channels:          64,
                img_channels:      1,
                w0_seed:           0,
                trunc_psi:         0.0,
                trunc_cutoff:      Some(0),
                random_seed:       0,
                noise_mode:        NoiseMode::Random,
                img_normalize:     true,
            },
            classifier: ClassifierParams {
                model:          PathBuf::from(classifier_weight),
                num_classes:    10,
                input_size,
                input_channels: 1,
            },
            search: SearchParams {
                stylemix_layers:     default_catalog(),
                search_limit:        10,
                stylemix_seed_limit: 100,
                ssim_threshold:      0.95,
                l2_range:            0.2,
                seed_strategy:       SeedStrategy::Sequential,
                stop_condition:      StopCondition::Iter,
                runtime_secs:        3600,
            },
            output: OutputParams {
                frontier_pairs: PathBuf::from(frontier_pairs),
                results_path:   PathBuf::from("results"),
                report_name:    "stats.csv".to_string(),
            },
        }
    }

    /// Check every value that does not need the filesystem
    pub fn validate(&self) -> Result<(), FrontierError> {
        let g = &self.generator;
        let c = &self.classifier;
        let s = &self.search;

        if g.z_dim == 0 || g.w_dim == 0 || g.channels == 0 {
            return Err(FrontierError::config("generator dimensions must be positive"));
        }
        if g.num_ws < 2 || g.num_ws % 2 != 0 {
            return Err(FrontierError::config(format!(
                "num_ws must be an even number >= 2, got {}",
                g.num_ws
            )));
        }
        if !matches!(g.img_channels, 1 | 3) || !matches!(c.input_channels, 1 | 3) {
            return Err(FrontierError::config("image channels must be 1 or 3"));
        }
        if !g.trunc_psi.is_finite() {
            return Err(FrontierError::config("trunc_psi must be finite"));
        }
        if let Some(cutoff) = g.trunc_cutoff {
            if cutoff > g.num_ws {
                return Err(FrontierError::config(format!(
                    "trunc_cutoff {} exceeds the {} style layers",
                    cutoff, g.num_ws
                )));
            }
        }

        if c.num_classes < 2 {
            return Err(FrontierError::config("classifier needs at least 2 classes"));
        }
        if c.input_size == 0 {
            return Err(FrontierError::config("classifier input_size must be positive"));
        }

        if s.stylemix_layers.is_empty() {
            return Err(FrontierError::config("style-mix catalog is empty"));
        }
        for spec in &s.stylemix_layers {
            if spec.is_empty() {
                return Err(FrontierError::config("style-mix catalog contains an empty layer set"));
            }
            if let Some(max) = spec.max_layer() {
                if max >= g.num_ws {
                    return Err(FrontierError::config(format!(
                        "style-mix spec {} uses layer {} but the generator has {} layers",
                        spec, max, g.num_ws
                    )));
                }
            }
            let mut layers = spec.layers().to_vec();
            layers.sort_unstable();
            layers.dedup();
            if layers.len() != spec.layers().len() {
                return Err(FrontierError::config(format!(
                    "style-mix spec {spec} repeats a layer"
                )));
            }
        }

        // Threshold checks live with the policy itself
        AcceptancePolicy::new(s.ssim_threshold, s.l2_range)?;

        if s.stop_condition == StopCondition::Time && s.runtime_secs == 0 {
            return Err(FrontierError::config("stop_condition 'time' needs runtime_secs > 0"));
        }
        if self.output.report_name.trim().is_empty() {
            return Err(FrontierError::config("report_name is empty"));
        }
        Ok(())
    }

    /// Both weight records must exist before any model is built
    pub fn validate_weights(&self) -> Result<(), FrontierError> {
        for (what, stem) in [
            ("generator", &self.generator.pretrained_weight),
            ("classifier", &self.classifier.model),
        ] {
            let file = record_file(stem);
            if !file.is_file() {
                return Err(FrontierError::config(format!(
                    "{} weights not found at '{}'",
                    what,
                    file.display()
                )));
            }
        }
        Ok(())
    }

    pub fn truncation(&self) -> Truncation {
        Truncation::new(self.generator.trunc_psi, self.generator.trunc_cutoff)
    }

    pub fn deadline(&self) -> Option<Duration> {
        match self.search.stop_condition {
            StopCondition::Iter => None,
            StopCondition::Time => Some(Duration::from_secs(self.search.runtime_secs)),
        }
    }

    /// The engine's view of this configuration
    pub fn search_plan(&self) -> Result<SearchPlan, FrontierError> {
        Ok(SearchPlan {
            catalog:       self.search.stylemix_layers.clone(),
            search_limit:  self.search.search_limit,
            seed_limit:    self.search.stylemix_seed_limit,
            policy:        AcceptancePolicy::new(self.search.ssim_threshold, self.search.l2_range)?,
            truncation:    self.truncation(),
            base_seed:     self.generator.w0_seed,
            random_seed:   self.generator.random_seed,
            seed_strategy: self.search.seed_strategy,
            deadline:      self.deadline(),
        })
    }

    pub fn generator_config(&self) -> StyleGeneratorConfig {
        StyleGeneratorConfig::new()
            .with_z_dim(self.generator.z_dim)
            .with_w_dim(self.generator.w_dim)
            .with_num_ws(self.generator.num_ws)
            .with_channels(self.generator.channels)
            .with_img_channels(self.generator.img_channels)
    }

    pub fn generator_settings(&self) -> GeneratorSettings {
        GeneratorSettings {
            noise_mode:    self.generator.noise_mode,
            random_seed:   self.generator.random_seed,
            img_normalize: self.generator.img_normalize,
        }
    }

    pub fn classifier_config(&self) -> AllCnnConfig {
        AllCnnConfig::new(self.classifier.num_classes)
            .with_input_channels(self.classifier.input_channels)
    }

    pub fn report_path(&self) -> PathBuf {
        self.output.results_path.join(&self.output.report_name)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        RunConfig::preset(Preset::Fmnist).validate().unwrap();
        RunConfig::preset(Preset::Svhn).validate().unwrap();
    }

    #[test]
    fn test_preset_input_sizes() {
        assert_eq!(RunConfig::preset(Preset::Fmnist).classifier.input_size, 28);
        assert_eq!(RunConfig::preset(Preset::Svhn).classifier.input_size, 32);
    }

    #[test]
    fn test_negative_l2_range_rejected() {
        let mut cfg = RunConfig::preset(Preset::Fmnist);
        cfg.search.l2_range = -0.1;
        assert!(matches!(cfg.validate(), Err(FrontierError::Configuration(_))));
    }

    #[test]
    fn test_layer_beyond_generator_rejected() {
        let mut cfg = RunConfig::preset(Preset::Fmnist);
        cfg.search.stylemix_layers.push(StyleMixSpec::new(vec![8]));
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("layer 8"));
    }

    #[test]
    fn test_empty_catalog_and_empty_spec_rejected() {
        let mut cfg = RunConfig::preset(Preset::Svhn);
        cfg.search.stylemix_layers.clear();
        assert!(cfg.validate().is_err());

        cfg.search.stylemix_layers = vec![StyleMixSpec::new(Vec::new())];
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_repeated_layer_rejected() {
        let mut cfg = RunConfig::preset(Preset::Svhn);
        cfg.search.stylemix_layers = vec![StyleMixSpec::new(vec![3, 3])];
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_time_stop_needs_runtime() {
        let mut cfg = RunConfig::preset(Preset::Fmnist);
        cfg.search.stop_condition = StopCondition::Time;
        cfg.search.runtime_secs = 0;
        assert!(cfg.validate().is_err());

        cfg.search.runtime_secs = 60;
        assert_eq!(cfg.deadline(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_missing_weights_is_configuration_error() {
        let mut cfg = RunConfig::preset(Preset::Fmnist);
        cfg.generator.pretrained_weight = PathBuf::from("/nonexistent/generator");
        let err = cfg.validate_weights().unwrap_err();
        assert!(err.to_string().contains("generator weights not found"));
    }

    #[test]
    fn test_json_uses_lowercase_enums() {
        let json = serde_json::to_string(&RunConfig::preset(Preset::Svhn)).unwrap();
        assert!(json.contains("\"preset\":\"svhn\""));
        assert!(json.contains("\"noise_mode\":\"random\""));
        assert!(json.contains("\"stylemix_layers\":[[7],[6]"));
        let back: RunConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, RunConfig::preset(Preset::Svhn));
    }

    #[test]
    fn test_search_plan_mirrors_config() {
        let cfg  = RunConfig::preset(Preset::Fmnist);
        let plan = cfg.search_plan().unwrap();
        assert_eq!(plan.catalog.len(), 10);
        assert_eq!(plan.search_limit, 10);
        assert_eq!(plan.seed_limit, 100);
        assert_eq!(plan.deadline, None);
    }
}
