// ============================================================
// Layer 3 — Image Domain Type
// ============================================================
// A fixed-resolution image buffer exchanged between the
// generator, the classifier and the similarity scorer.
//
// Layout is channel-major (CHW):
//   pixels[c * height * width + y * width + x]
//
// Values are expected in [0, 1]. The generator normalises its
// tanh output into that range before returning an Image.

use serde::{Deserialize, Serialize};

use crate::domain::error::FrontierError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    width:    usize,
    height:   usize,
    channels: usize,
    pixels:   Vec<f32>,
}

impl Image {
    /// Build an image from a CHW pixel buffer.
    /// Fails when the buffer length does not match the shape.
    pub fn new(
        width:    usize,
        height:   usize,
        channels: usize,
        pixels:   Vec<f32>,
    ) -> Result<Self, FrontierError> {
        let expected = width * height * channels;
        if pixels.len() != expected {
            return Err(FrontierError::Shape(format!(
                "{}x{}x{} image needs {} pixels, got {}",
                channels, height, width, expected, pixels.len()
            )));
        }
        Ok(Self { width, height, channels, pixels })
    }

    /// A single-channel image filled with one value
    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self { width, height, channels: 1, pixels: vec![value; width * height] }
    }

    pub fn width(&self) -> usize { self.width }

    pub fn height(&self) -> usize { self.height }

    pub fn channels(&self) -> usize { self.channels }

    pub fn pixels(&self) -> &[f32] { &self.pixels }

    pub fn into_pixels(self) -> Vec<f32> { self.pixels }

    /// Number of pixels in one channel plane
    pub fn plane_len(&self) -> usize { self.width * self.height }

    /// One channel plane as a slice
    pub fn plane(&self, channel: usize) -> &[f32] {
        let n = self.plane_len();
        &self.pixels[channel * n..(channel + 1) * n]
    }

    pub fn get(&self, channel: usize, y: usize, x: usize) -> f32 {
        self.pixels[channel * self.plane_len() + y * self.width + x]
    }

    /// True when both images have identical width, height and channels
    pub fn same_shape(&self, other: &Image) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.channels == other.channels
    }

    /// Shape formatted as CxHxW, used in log lines and errors
    pub fn shape_label(&self) -> String {
        format!("{}x{}x{}", self.channels, self.height, self.width)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_wrong_buffer_length() {
        let err = Image::new(4, 4, 1, vec![0.0; 15]).unwrap_err();
        assert!(err.to_string().contains("needs 16 pixels"));
    }

    #[test]
    fn test_chw_indexing() {
        // 2 channels of 2x2: channel 1 starts at offset 4
        let img = Image::new(2, 2, 2, vec![0.0, 0.1, 0.2, 0.3, 1.0, 1.1, 1.2, 1.3]).unwrap();
        assert_eq!(img.get(0, 1, 0), 0.2);
        assert_eq!(img.get(1, 0, 1), 1.1);
        assert_eq!(img.plane(1), &[1.0, 1.1, 1.2, 1.3]);
    }

    #[test]
    fn test_same_shape() {
        let a = Image::filled(8, 8, 0.0);
        assert!(a.same_shape(&Image::filled(8, 8, 0.5)));
        assert!(!a.same_shape(&Image::new(8, 8, 3, vec![0.0; 192]).unwrap()));
    }
}
