// ============================================================
// Layer 4 — Pixel Transform
// ============================================================
// Pixels are scaled to [0, 1] and then standardised with the
// usual MNIST statistics:
//
//   x = (p / 255 - MEAN) / STD
//
// The same transform is used for training and validation.

/// Mean intensity of the MNIST training set after scaling to [0, 1]
pub const MEAN: f32 = 0.1307;

/// Standard deviation of the MNIST training set after scaling to [0, 1]
pub const STD: f32 = 0.3081;

/// Normalise a single raw pixel.
pub fn normalize(pixel: u8) -> f32 {
    (pixel as f32 / 255.0 - MEAN) / STD
}

/// Normalise a whole image, appending the result to `out`.
pub fn normalize_into(pixels: &[u8], out: &mut Vec<f32>) {
    out.extend(pixels.iter().map(|&p| normalize(p)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_endpoints() {
        assert!((normalize(0) - (-MEAN / STD)).abs() < 1e-6);
        assert!((normalize(255) - ((1.0 - MEAN) / STD)).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_into_appends() {
        let mut out = vec![42.0];
        normalize_into(&[0, 255], &mut out);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], 42.0);
        assert!(out[1] < 0.0 && out[2] > 2.0);
    }
}
