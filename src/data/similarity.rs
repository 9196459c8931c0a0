// ============================================================
// Layer 5 — Similarity Scorer
// ============================================================
// Structural similarity (SSIM) and L2 distance between the two
// images of a candidate.
//
// SSIM (Wang et al. 2004), per window:
//
//         (2·μa·μb + C1) · (2·σab + C2)
//   s = ─────────────────────────────────
//       (μa² + μb² + C1) · (σa² + σb² + C2)
//
//   C1 = (K1·L)², C2 = (K2·L)², L = data range (1.0)
//
// Window statistics use an 11x11 Gaussian (σ = 1.5). The score is
// the mean over all valid window positions and channels, clamped
// to [0, 1]. Images smaller than the window use a window the size
// of their shorter side.
//
// L2 is the root-mean-square pixel difference so it lives on the
// same [0, 1] scale as the pixels.

use anyhow::Result;

use crate::domain::candidate::Similarity;
use crate::domain::error::FrontierError;
use crate::domain::image::Image;
use crate::domain::traits::SimilarityScorer;

#[derive(Debug, Clone, Copy)]
pub struct SsimScorer {
    window:     usize,
    sigma:      f64,
    k1:         f64,
    k2:         f64,
    data_range: f64,
}

impl Default for SsimScorer {
    fn default() -> Self {
        Self { window: 11, sigma: 1.5, k1: 0.01, k2: 0.03, data_range: 1.0 }
    }
}

impl SsimScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mean SSIM over channels, clamped to [0, 1]
    pub fn ssim(&self, a: &Image, b: &Image) -> Result<f64, FrontierError> {
        check_shapes(a, b)?;
        if a.width() == 0 || a.height() == 0 || a.channels() == 0 {
            return Err(FrontierError::Shape(format!("cannot score empty image {}", a.shape_label())));
        }

        let win     = self.window.min(a.width()).min(a.height()).max(1);
        let kernel  = gaussian_kernel(win, self.sigma);
        let c1      = (self.k1 * self.data_range).powi(2);
        let c2      = (self.k2 * self.data_range).powi(2);

        let mut total = 0.0f64;
        let mut count = 0usize;

        for c in 0..a.channels() {
            for y in 0..=(a.height() - win) {
                for x in 0..=(a.width() - win) {
                    let (mut mu_a, mut mu_b) = (0.0f64, 0.0f64);
                    for (ky, row) in kernel.iter().enumerate() {
                        for (kx, &w) in row.iter().enumerate() {
                            mu_a += w * a.get(c, y + ky, x + kx) as f64;
                            mu_b += w * b.get(c, y + ky, x + kx) as f64;
                        }
                    }

                    let (mut var_a, mut var_b, mut cov) = (0.0f64, 0.0f64, 0.0f64);
                    for (ky, row) in kernel.iter().enumerate() {
                        for (kx, &w) in row.iter().enumerate() {
                            let da = a.get(c, y + ky, x + kx) as f64 - mu_a;
                            let db = b.get(c, y + ky, x + kx) as f64 - mu_b;
                            var_a += w * da * da;
                            var_b += w * db * db;
                            cov   += w * da * db;
                        }
                    }

                    let num = (2.0 * mu_a * mu_b + c1) * (2.0 * cov + c2);
                    let den = (mu_a * mu_a + mu_b * mu_b + c1) * (var_a + var_b + c2);
                    total += num / den;
                    count += 1;
                }
            }
        }

        Ok((total / count as f64).clamp(0.0, 1.0))
    }
}

/// Root-mean-square distance between two equal-shaped images
pub fn l2_distance(a: &Image, b: &Image) -> Result<f64, FrontierError> {
    check_shapes(a, b)?;
    let n = a.pixels().len();
    if n == 0 {
        return Err(FrontierError::Shape("empty image".to_string()));
    }
    let sum_sq: f64 = a
        .pixels()
        .iter()
        .zip(b.pixels())
        .map(|(&p, &q)| {
            let d = p as f64 - q as f64;
            d * d
        })
        .sum();
    Ok((sum_sq / n as f64).sqrt())
}

impl SimilarityScorer for SsimScorer {
    fn score(&self, a: &Image, b: &Image) -> Result<Similarity> {
        let ssim = self.ssim(a, b)?;
        let l2   = l2_distance(a, b)?;
        Ok(Similarity { ssim, l2 })
    }
}

fn check_shapes(a: &Image, b: &Image) -> Result<(), FrontierError> {
    if !a.same_shape(b) {
        return Err(FrontierError::Shape(format!(
            "cannot compare {} with {}",
            a.shape_label(),
            b.shape_label()
        )));
    }
    Ok(())
}

/// Normalised 2-D Gaussian window
fn gaussian_kernel(size: usize, sigma: f64) -> Vec<Vec<f64>> {
    let centre = (size as f64 - 1.0) / 2.0;
    let g: Vec<f64> = (0..size)
        .map(|i| {
            let d = i as f64 - centre;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = g.iter().sum();
    let g: Vec<f64> = g.iter().map(|v| v / sum).collect();
    g.iter().map(|&gy| g.iter().map(|&gx| gy * gx).collect()).collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: usize, height: usize) -> Image {
        let pixels = (0..width * height)
            .map(|i| (i % width) as f32 / width as f32)
            .collect();
        Image::new(width, height, 1, pixels).unwrap()
    }

    #[test]
    fn test_identical_images() {
        let img = gradient(32, 32);
        let s   = SsimScorer::new().score(&img, &img).unwrap();
        assert!((s.ssim - 1.0).abs() < 1e-9);
        assert_eq!(s.l2, 0.0);
    }

    #[test]
    fn test_black_vs_white() {
        let black = Image::filled(16, 16, 0.0);
        let white = Image::filled(16, 16, 1.0);
        let s     = SsimScorer::new().score(&black, &white).unwrap();
        assert!(s.ssim < 0.01);
        assert!((s.l2 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_small_perturbation_stays_similar() {
        let a = gradient(32, 32);
        let mut pixels = a.pixels().to_vec();
        pixels[100] += 0.05;
        let b = Image::new(32, 32, 1, pixels).unwrap();

        let s = SsimScorer::new().score(&a, &b).unwrap();
        assert!(s.ssim > 0.95);
        assert!(s.l2 < 0.01);
    }

    #[test]
    fn test_empty_image_is_shape_error() {
        let empty = Image::new(0, 5, 1, Vec::new()).unwrap();
        let err   = SsimScorer::new().score(&empty, &empty).unwrap_err();
        assert!(matches!(err.downcast_ref::<FrontierError>(), Some(FrontierError::Shape(_))));

        let flat = Image::new(5, 0, 1, Vec::new()).unwrap();
        assert!(SsimScorer::new().ssim(&flat, &flat).is_err());
    }

    #[test]
    fn test_image_smaller_than_window() {
        let a = gradient(4, 4);
        let s = SsimScorer::new().ssim(&a, &a).unwrap();
        assert!((s - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_shape_mismatch_is_error() {
        let a = Image::filled(8, 8, 0.0);
        let b = Image::new(8, 8, 3, vec![0.0; 192]).unwrap();
        assert!(SsimScorer::new().score(&a, &b).is_err());
    }

    #[test]
    fn test_kernel_is_normalised() {
        let k: f64 = gaussian_kernel(11, 1.5).iter().flatten().sum();
        assert!((k - 1.0).abs() < 1e-12);
    }
}
