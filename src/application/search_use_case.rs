// ============================================================
// Layer 2 — Search Use Case
// ============================================================
// One frontier search run, start to finish:
//   1. Validate the configuration (thresholds, catalog, weights)
//   2. Load generator + classifier on the configured device
//   3. Open the archive and report so storage problems show
//      up before any image is generated
//   4. Run the frontier search
//   5. Persist accepted pairs, the config snapshot, the report row

use anyhow::Result;
use chrono::Utc;
use std::path::PathBuf;

use crate::application::config::{Device, RunConfig};
use crate::data::similarity::SsimScorer;
use crate::domain::error::FrontierError;
use crate::domain::traits::{ImageClassifier, ImageGenerator, SimilarityScorer};
use crate::engine::frontier::{FrontierSearch, SearchStats};
use crate::infra::{
    archive::FrontierArchive,
    checkpoint::{load_module, CheckpointManager},
    report::{run_id, ReportLogger, RunReport},
};
use crate::ml::{
    classifier::BurnClassifier,
    generator::BurnGenerator,
    Backend, CpuBackend, CpuDevice, GpuBackend, GpuDevice,
};

/// What a finished run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id:      String,
    pub pair_files:  Vec<PathBuf>,
    pub stats:       SearchStats,
    pub archive_dir: PathBuf,
    pub report_path: PathBuf,
}

pub struct SearchUseCase {
    config: RunConfig,
}

impl SearchUseCase {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Load both models on the configured device and run the search
    pub fn execute(&self) -> Result<RunSummary> {
        self.config.validate()?;
        self.config.validate_weights()?;

        match self.config.device {
            Device::Cpu => self.execute_on::<CpuBackend>(CpuDevice::default()),
            Device::Gpu => self.execute_on::<GpuBackend>(GpuDevice::default()),
        }
    }

    fn execute_on<B: Backend>(&self, device: B::Device) -> Result<RunSummary> {
        tracing::info!("Loading models for preset {} on {:?}", self.config.preset.as_str(), device);

        let generator_model = load_module(
            self.config.generator_config().init::<B>(&device),
            &self.config.generator.pretrained_weight,
            &device,
        )?;
        let classifier_model = load_module(
            self.config.classifier_config().init::<B>(&device),
            &self.config.classifier.model,
            &device,
        )?;

        let generator = BurnGenerator::new(
            generator_model,
            device.clone(),
            self.config.generator_settings(),
        )?;
        let classifier = BurnClassifier::new(
            classifier_model,
            device,
            self.config.classifier.input_size,
            self.config.classifier.input_channels,
        );
        let scorer = SsimScorer::new();

        self.run_with_adapters(&generator, &classifier, &scorer)
    }

    /// Run the search with already-built adapters and persist the results
    pub fn run_with_adapters(
        &self,
        generator:  &dyn ImageGenerator,
        classifier: &dyn ImageClassifier,
        scorer:     &dyn SimilarityScorer,
    ) -> Result<RunSummary> {
        let cfg = &self.config;
        cfg.validate()?;
        let plan = cfg.search_plan()?;

        let layers = generator.num_layers();
        if let Some(spec) = plan.catalog.iter().find(|s| s.max_layer().is_some_and(|l| l >= layers)) {
            return Err(FrontierError::config(format!(
                "style-mix spec {spec} needs more than the generator's {layers} style layers"
            ))
            .into());
        }

        let started = Utc::now();
        let archive = FrontierArchive::new(&cfg.output.frontier_pairs);
        let run_id  = archive.start_run(&run_id(started))?;
        let report  = ReportLogger::new(&cfg.output.results_path, &cfg.output.report_name)?;

        tracing::info!(
            "Run {}: {} style-mix specs, up to {} pairs, {} seeds per spec",
            run_id,
            plan.catalog.len(),
            plan.search_limit,
            plan.seed_limit
        );
        let outcome = FrontierSearch::new(generator, classifier, scorer).search(&plan);

        let pair_files = archive.persist(&outcome.pairs, &run_id)?;
        CheckpointManager::new(archive.run_dir(&run_id)).save_config(cfg)?;
        report.log(&RunReport {
            run_id:         run_id.clone(),
            timestamp:      started,
            preset:         cfg.preset.as_str().to_string(),
            catalog_len:    plan.catalog.len(),
            search_limit:   plan.search_limit,
            seed_limit:     plan.seed_limit,
            ssim_threshold: plan.policy.ssim_threshold,
            l2_range:       plan.policy.l2_range,
            stats:          outcome.stats.clone(),
        })?;

        Ok(RunSummary {
            run_id: run_id.clone(),
            pair_files,
            stats:       outcome.stats,
            archive_dir: archive.run_dir(&run_id),
            report_path: report.csv_path().to_path_buf(),
        })
    }
}
