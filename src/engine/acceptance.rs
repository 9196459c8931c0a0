// ============================================================
// Layer 4 — Acceptance Policy
// ============================================================
// A candidate becomes a frontier pair iff
//
//   ssim >= ssim_threshold  AND  l2 <= l2_range  AND  label_a != label_b
//
// Thresholds come from the run configuration; the predicate
// itself holds no constants.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::candidate::{Similarity, Verdict};
use crate::domain::error::FrontierError;

/// Why a candidate was turned down. Checked in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    TooDissimilar,
    TooDistant,
    SameLabel,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rejection::TooDissimilar => "ssim below threshold",
            Rejection::TooDistant    => "l2 above range",
            Rejection::SameLabel     => "same label",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcceptancePolicy {
    pub(crate) ssim_threshold: f64,
    pub(crate) l2_range:       f64,
}

impl AcceptancePolicy {
    /// Build a policy, rejecting thresholds no similarity could meet sensibly.
    pub fn new(ssim_threshold: f64, l2_range: f64) -> Result<Self, FrontierError> {
        if !ssim_threshold.is_finite() || !(0.0..=1.0).contains(&ssim_threshold) {
            return Err(FrontierError::config(format!(
                "ssim_threshold must be within [0, 1], got {ssim_threshold}"
            )));
        }
        if !l2_range.is_finite() || l2_range < 0.0 {
            return Err(FrontierError::config(format!(
                "l2_range must be a non-negative number, got {l2_range}"
            )));
        }
        Ok(Self { ssim_threshold, l2_range })
    }

    /// The first failing condition, or None when the candidate is accepted
    pub fn rejection(&self, similarity: &Similarity, verdict: &Verdict) -> Option<Rejection> {
        self.check(similarity.ssim, similarity.l2, verdict.is_split())
    }

    /// Predicate over raw values. NaN scores never pass.
    pub fn check(&self, ssim: f64, l2: f64, split: bool) -> Option<Rejection> {
        if !(ssim >= self.ssim_threshold) {
            return Some(Rejection::TooDissimilar);
        }
        if !(l2 <= self.l2_range) {
            return Some(Rejection::TooDistant);
        }
        if !split {
            return Some(Rejection::SameLabel);
        }
        None
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn policy() -> AcceptancePolicy {
        AcceptancePolicy::new(0.95, 0.2).unwrap()
    }

    #[test]
    fn test_accepts_boundary_values() {
        // Both comparisons are inclusive
        assert_eq!(policy().check(0.95, 0.2, true), None);
    }

    #[test]
    fn test_rejection_order() {
        let p = policy();
        assert_eq!(p.check(0.5, 0.9, false), Some(Rejection::TooDissimilar));
        assert_eq!(p.check(0.97, 0.9, false), Some(Rejection::TooDistant));
        assert_eq!(p.check(0.97, 0.1, false), Some(Rejection::SameLabel));
    }

    #[test]
    fn test_nan_is_rejected() {
        assert_eq!(policy().check(f64::NAN, 0.0, true), Some(Rejection::TooDissimilar));
        assert_eq!(policy().check(1.0, f64::NAN, true), Some(Rejection::TooDistant));
    }

    #[test]
    fn test_invalid_thresholds() {
        assert!(AcceptancePolicy::new(1.5, 0.2).is_err());
        assert!(AcceptancePolicy::new(0.9, -0.1).is_err());
        assert!(AcceptancePolicy::new(f64::NAN, 0.2).is_err());
        assert!(AcceptancePolicy::new(0.0, 0.0).is_ok());
    }

    proptest! {
        #[test]
        fn prop_accepted_values_satisfy_every_condition(
            threshold in 0.0f64..=1.0,
            range     in 0.0f64..1.0,
            ssim      in 0.0f64..=1.0,
            l2        in 0.0f64..2.0,
            label_a   in 0usize..10,
            label_b   in 0usize..10,
        ) {
            let p = AcceptancePolicy::new(threshold, range).unwrap();
            if p.check(ssim, l2, label_a != label_b).is_none() {
                prop_assert!(ssim >= threshold);
                prop_assert!(l2 <= range);
                prop_assert!(label_a != label_b);
            }
        }

        #[test]
        fn prop_same_label_never_accepted(
            ssim in 0.0f64..=1.0,
            l2   in 0.0f64..1.0,
        ) {
            let p = AcceptancePolicy::new(0.0, 1.0).unwrap();
            prop_assert_eq!(p.check(ssim, l2, false), Some(Rejection::SameLabel));
        }
    }
}
