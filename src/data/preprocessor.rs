// ============================================================
// Layer 5 — Image Preprocessor
// ============================================================
// Adapts generator output to what the classifier was trained on.
//
// The generator renders at its own resolution (32x32 for both
// checkpoints) while the F-MNIST classifier expects 28x28, and
// the SVHN classifier was trained on grayscale digits.
//
// Steps (applied in order):
//   1. Channel conversion
//        3 → 1 : luma with weights (0.2989, 0.5870, 0.1140)
//        1 → 3 : replicate the single plane
//   2. Bilinear resize to target_size x target_size
//      (half-pixel centres, edges clamped)
//   3. Clamp every pixel into [0, 1]

use crate::domain::error::FrontierError;
use crate::domain::image::Image;

const LUMA_WEIGHTS: [f32; 3] = [0.2989, 0.5870, 0.1140];

#[derive(Debug, Clone, Copy)]
pub struct Preprocessor {
    target_size:     usize,
    target_channels: usize,
}

impl Preprocessor {
    pub fn new(target_size: usize, target_channels: usize) -> Self {
        Self { target_size, target_channels }
    }

    /// Convert, resize and clamp an image for the classifier
    pub fn prepare(&self, image: &Image) -> Result<Image, FrontierError> {
        let converted = match (image.channels(), self.target_channels) {
            (a, b) if a == b => image.clone(),
            (3, 1) => to_grayscale(image)?,
            (1, 3) => replicate_channels(image, 3)?,
            (a, b) => {
                return Err(FrontierError::Shape(format!(
                    "cannot convert {a}-channel image to {b} channels"
                )))
            }
        };

        let resized = if converted.width() == self.target_size
            && converted.height() == self.target_size
        {
            converted
        } else {
            resize_bilinear(&converted, self.target_size, self.target_size)?
        };

        let width    = resized.width();
        let height   = resized.height();
        let channels = resized.channels();
        let pixels: Vec<f32> = resized
            .into_pixels()
            .into_iter()
            .map(|p| if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) })
            .collect();
        Image::new(width, height, channels, pixels)
    }
}

/// Weighted sum of the RGB planes
pub fn to_grayscale(image: &Image) -> Result<Image, FrontierError> {
    if image.channels() != 3 {
        return Err(FrontierError::Shape(format!(
            "grayscale conversion needs 3 channels, got {}",
            image.shape_label()
        )));
    }
    let (r, g, b) = (image.plane(0), image.plane(1), image.plane(2));
    let gray: Vec<f32> = r
        .iter()
        .zip(g)
        .zip(b)
        .map(|((r, g), b)| r * LUMA_WEIGHTS[0] + g * LUMA_WEIGHTS[1] + b * LUMA_WEIGHTS[2])
        .collect();
    Image::new(image.width(), image.height(), 1, gray)
}

fn replicate_channels(image: &Image, channels: usize) -> Result<Image, FrontierError> {
    let plane = image.plane(0);
    let pixels: Vec<f32> = (0..channels).flat_map(|_| plane.iter().copied()).collect();
    Image::new(image.width(), image.height(), channels, pixels)
}

/// Bilinear resize of every channel plane
pub fn resize_bilinear(image: &Image, width: usize, height: usize) -> Result<Image, FrontierError> {
    if width == 0 || height == 0 || image.width() == 0 || image.height() == 0 {
        return Err(FrontierError::Shape(format!(
            "cannot resize {} to {}x{}",
            image.shape_label(),
            height,
            width
        )));
    }

    let scale_x = image.width() as f32 / width as f32;
    let scale_y = image.height() as f32 / height as f32;
    let max_x   = (image.width() - 1) as f32;
    let max_y   = (image.height() - 1) as f32;

    let mut out = Vec::with_capacity(width * height * image.channels());
    for c in 0..image.channels() {
        for y in 0..height {
            let sy = ((y as f32 + 0.5) * scale_y - 0.5).clamp(0.0, max_y);
            let y0 = sy.floor() as usize;
            let y1 = (y0 + 1).min(image.height() - 1);
            let fy = sy - y0 as f32;

            for x in 0..width {
                let sx = ((x as f32 + 0.5) * scale_x - 0.5).clamp(0.0, max_x);
                let x0 = sx.floor() as usize;
                let x1 = (x0 + 1).min(image.width() - 1);
                let fx = sx - x0 as f32;

                let top    = image.get(c, y0, x0) * (1.0 - fx) + image.get(c, y0, x1) * fx;
                let bottom = image.get(c, y1, x0) * (1.0 - fx) + image.get(c, y1, x1) * fx;
                out.push(top * (1.0 - fy) + bottom * fy);
            }
        }
    }
    Image::new(width, height, image.channels(), out)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grayscale_weights() {
        // One pure-green pixel
        let img  = Image::new(1, 1, 3, vec![0.0, 1.0, 0.0]).unwrap();
        let gray = to_grayscale(&img).unwrap();
        assert_eq!(gray.channels(), 1);
        assert!((gray.pixels()[0] - 0.5870).abs() < 1e-6);
    }

    #[test]
    fn test_resize_constant_image_stays_constant() {
        let img = Image::filled(32, 32, 0.25);
        let out = resize_bilinear(&img, 28, 28).unwrap();
        assert_eq!((out.width(), out.height()), (28, 28));
        assert!(out.pixels().iter().all(|&p| (p - 0.25).abs() < 1e-6));
    }

    #[test]
    fn test_resize_identity_size() {
        let pixels: Vec<f32> = (0..16).map(|i| i as f32 / 16.0).collect();
        let img = Image::new(4, 4, 1, pixels.clone()).unwrap();
        let out = resize_bilinear(&img, 4, 4).unwrap();
        for (a, b) in out.pixels().iter().zip(&pixels) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_prepare_for_fmnist_classifier() {
        let img = Image::new(32, 32, 3, vec![2.0; 32 * 32 * 3]).unwrap();
        let out = Preprocessor::new(28, 1).prepare(&img).unwrap();
        assert_eq!(out.shape_label(), "1x28x28");
        // Out-of-range values are clamped
        assert!(out.pixels().iter().all(|&p| p <= 1.0));
    }

    #[test]
    fn test_prepare_rejects_unknown_channel_layout() {
        let img = Image::new(4, 4, 2, vec![0.0; 32]).unwrap();
        assert!(Preprocessor::new(4, 1).prepare(&img).is_err());
    }
}
