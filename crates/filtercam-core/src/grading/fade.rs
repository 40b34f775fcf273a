//! Fixed "fade" photo look: washed-out color with lifted blacks.
//!
//! Not parametric. The input is first clamped to `[0, 1]` (the look is
//! defined on display range only), then partially desaturated and squeezed
//! into `[FADE_BLACK, FADE_WHITE]`.
//!
//! ```text
//! c    = clamp(in, 0, 1)
//! s    = luma + (c − luma) × FADE_SATURATION
//! out  = FADE_BLACK + s × (FADE_WHITE − FADE_BLACK)
//! ```

use crate::grading::luma;

/// Chroma retained by the look.
pub const FADE_SATURATION: f32 = 0.72;

/// Linear value pure black is lifted to.
pub const FADE_BLACK: f32 = 0.035;

/// Linear value pure white is rolled down to.
pub const FADE_WHITE: f32 = 0.9;

/// Apply the fade look to one linear RGB pixel.
pub fn apply_fade(rgb: [f32; 3]) -> [f32; 3] {
    // clamp keeps NaN as NaN, so a blown-up input is still detectable.
    let clamped = rgb.map(|c| c.clamp(0.0, 1.0));
    let y = luma(clamped);
    let range = FADE_WHITE - FADE_BLACK;
    clamped.map(|c| FADE_BLACK + (y + (c - y) * FADE_SATURATION) * range)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn chroma_spread(rgb: [f32; 3]) -> f32 {
        let max = rgb[0].max(rgb[1]).max(rgb[2]);
        let min = rgb[0].min(rgb[1]).min(rgb[2]);
        max - min
    }

    #[test]
    fn test_black_is_lifted() {
        let result = apply_fade([0.0; 3]);
        for c in result {
            assert!((c - FADE_BLACK).abs() < EPSILON);
        }
    }

    #[test]
    fn test_white_is_rolled_down() {
        let result = apply_fade([1.0; 3]);
        for c in result {
            assert!((c - FADE_WHITE).abs() < EPSILON);
        }
    }

    #[test]
    fn test_fade_reduces_chroma() {
        let rgb = [0.8, 0.3, 0.1];
        assert!(chroma_spread(apply_fade(rgb)) < chroma_spread(rgb));
    }

    #[test]
    fn test_out_of_range_input_is_clamped() {
        let result = apply_fade([4.0, -2.0, 0.5]);
        for c in result {
            assert!((0.0..=1.0).contains(&c), "{c} out of range");
        }
    }

    #[test]
    fn test_fade_preserves_ordering_of_grays() {
        let mut prev = apply_fade([0.0; 3])[0];
        for i in 1..=10 {
            let cur = apply_fade([i as f32 / 10.0; 3])[0];
            assert!(cur > prev);
            prev = cur;
        }
    }

    #[test]
    fn test_nan_passes_through() {
        assert!(apply_fade([f32::NAN, 0.5, 0.5])[0].is_nan());
    }
}
