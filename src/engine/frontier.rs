// ============================================================
// Layer 4 — Frontier Search Engine
// ============================================================
// The core loop:
//
//   for spec in catalog (catalog order)
//       for up to seed_limit seed pairs (generation order)
//           image A = generate(s0)
//           image B = generate(s0 mixed with s1 at spec)
//           verdict    = classify(A), classify(B)
//           similarity = score(A, B)
//           keep the candidate if the acceptance policy passes
//           stop once search_limit pairs are kept
//
// Adapter failures skip the candidate (logged, counted) and the
// loop carries on. An optional wall-clock budget is checked
// between candidates, never during an adapter call.

use serde::Serialize;
use std::time::{Duration, Instant};

use crate::domain::candidate::{
    Candidate, FrontierPair, Similarity, StyleMixSpec, Truncation, Verdict,
};
use crate::domain::error::{FrontierError, Stage};
use crate::domain::traits::{ImageClassifier, ImageGenerator, SimilarityScorer};
use crate::engine::acceptance::AcceptancePolicy;
use crate::engine::seeds::{SeedSampler, SeedStrategy};

// ─── SearchPlan ───────────────────────────────────────────────────────────────
/// Everything one search needs besides the adapters.
#[derive(Debug, Clone)]
pub struct SearchPlan {
    /// Style-mix layer sets, most interesting first
    pub catalog:       Vec<StyleMixSpec>,
    /// Maximum number of accepted pairs across the whole catalog
    pub search_limit:  usize,
    /// Maximum number of seed pairs tried per spec
    pub seed_limit:    usize,
    pub policy:        AcceptancePolicy,
    pub truncation:    Truncation,
    pub base_seed:     u64,
    pub random_seed:   u64,
    pub seed_strategy: SeedStrategy,
    /// Wall-clock budget, checked between candidates
    pub deadline:      Option<Duration>,
}

// ─── Outcome ──────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    LimitReached,
    #[default]
    CatalogExhausted,
    DeadlineExpired,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::LimitReached     => "limit_reached",
            StopReason::CatalogExhausted => "catalog_exhausted",
            StopReason::DeadlineExpired  => "deadline_expired",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchStats {
    /// Candidates that made it through all three adapters
    pub evaluated:        usize,
    pub accepted:         usize,
    pub rejected:         usize,
    /// Candidates skipped because an adapter failed
    pub adapter_failures: usize,
    /// Seed pairs tried, one entry per catalog spec
    pub seeds_tried:      Vec<usize>,
    pub stop_reason:      StopReason,
    pub elapsed_secs:     f64,
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub pairs: Vec<FrontierPair>,
    pub stats: SearchStats,
}

// ─── FrontierSearch ───────────────────────────────────────────────────────────
pub struct FrontierSearch<'a> {
    generator:  &'a dyn ImageGenerator,
    classifier: &'a dyn ImageClassifier,
    scorer:     &'a dyn SimilarityScorer,
}

impl<'a> FrontierSearch<'a> {
    pub fn new(
        generator:  &'a dyn ImageGenerator,
        classifier: &'a dyn ImageClassifier,
        scorer:     &'a dyn SimilarityScorer,
    ) -> Self {
        Self { generator, classifier, scorer }
    }

    /// Run the search described by `plan`.
    /// Never fails: an empty result is a valid outcome.
    pub fn search(&self, plan: &SearchPlan) -> SearchOutcome {
        let started   = Instant::now();
        let mut pairs = Vec::new();
        let mut stats = SearchStats {
            seeds_tried: vec![0; plan.catalog.len()],
            ..SearchStats::default()
        };

        if plan.search_limit == 0 {
            stats.stop_reason = StopReason::LimitReached;
            return SearchOutcome { pairs, stats };
        }

        stats.stop_reason = StopReason::CatalogExhausted;

        'catalog: for (spec_index, spec) in plan.catalog.iter().enumerate() {
            tracing::info!(
                "Style-mix spec {}/{}: layers {}",
                spec_index + 1,
                plan.catalog.len(),
                spec
            );
            let sampler = SeedSampler::for_spec(
                plan.seed_strategy,
                plan.base_seed,
                plan.random_seed,
                spec_index,
            );

            for seeds in sampler.take(plan.seed_limit) {
                if let Some(budget) = plan.deadline {
                    if started.elapsed() >= budget {
                        tracing::info!("Wall-clock budget of {:?} spent, stopping", budget);
                        stats.stop_reason = StopReason::DeadlineExpired;
                        break 'catalog;
                    }
                }

                stats.seeds_tried[spec_index] += 1;
                let candidate = Candidate::new(seeds, spec.clone(), plan.truncation);

                let (verdict, similarity) = match self.evaluate(&candidate) {
                    Ok(result) => result,
                    Err(e) => {
                        tracing::warn!("Skipping seeds {} at {}: {}", seeds, spec, e);
                        stats.adapter_failures += 1;
                        continue;
                    }
                };
                stats.evaluated += 1;

                match plan.policy.rejection(&similarity, &verdict) {
                    Some(reason) => {
                        tracing::debug!(
                            "Rejected seeds {} at {}: {} (ssim={:.4}, l2={:.4}, labels {}/{})",
                            seeds, spec, reason, similarity.ssim, similarity.l2,
                            verdict.label_a, verdict.label_b
                        );
                        stats.rejected += 1;
                    }
                    None => {
                        tracing::info!(
                            "Frontier pair #{}: seeds {} at {} (ssim={:.4}, l2={:.4}, labels {}→{})",
                            pairs.len() + 1, seeds, spec, similarity.ssim, similarity.l2,
                            verdict.label_a, verdict.label_b
                        );
                        pairs.push(FrontierPair::new(candidate, verdict, similarity));
                        stats.accepted += 1;

                        if pairs.len() >= plan.search_limit {
                            stats.stop_reason = StopReason::LimitReached;
                            break 'catalog;
                        }
                    }
                }
            }
        }

        stats.elapsed_secs = started.elapsed().as_secs_f64();
        tracing::info!(
            "Search finished ({}): {} accepted, {} rejected, {} skipped",
            stats.stop_reason.as_str(),
            stats.accepted,
            stats.rejected,
            stats.adapter_failures
        );
        SearchOutcome { pairs, stats }
    }

    /// Generate, classify and score both images of a candidate
    fn evaluate(&self, candidate: &Candidate) -> Result<(Verdict, Similarity), FrontierError> {
        let image_a = self
            .generator
            .generate(&candidate.base_request())
            .map_err(|e| FrontierError::adapter(Stage::Generate, e))?;
        let image_b = self
            .generator
            .generate(&candidate.mixed_request())
            .map_err(|e| FrontierError::adapter(Stage::Generate, e))?;

        let pred_a = self
            .classifier
            .predict(&image_a)
            .map_err(|e| FrontierError::adapter(Stage::Classify, e))?;
        let pred_b = self
            .classifier
            .predict(&image_b)
            .map_err(|e| FrontierError::adapter(Stage::Classify, e))?;

        let classes = self.classifier.num_classes();
        for pred in [&pred_a, &pred_b] {
            if pred.confidences.len() != classes || pred.label >= classes {
                return Err(FrontierError::adapter(
                    Stage::Classify,
                    format!(
                        "label {} with {} confidences from a {}-class classifier",
                        pred.label,
                        pred.confidences.len(),
                        classes
                    ),
                ));
            }
        }

        let similarity = self
            .scorer
            .score(&image_a, &image_b)
            .map_err(|e| FrontierError::adapter(Stage::Score, e))?;

        Ok((Verdict::from_predictions(pred_a, pred_b), similarity))
    }
}
