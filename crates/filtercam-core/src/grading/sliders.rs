//! Slider-driven adjustments: color controls and highlight/shadow recovery.

use crate::grading::{luma, smoothstep};
use crate::transform::params::{ColorControls, HighlightShadow};

/// Contrast pivot (mid-gray).
const CONTRAST_PIVOT: f32 = 0.5;

/// Luma below which shadow lift is at full strength (minus the knee).
const SHADOW_THRESHOLD: f32 = 0.15;

/// Luma above which highlight recovery is at full strength (plus the knee).
const HIGHLIGHT_THRESHOLD: f32 = 0.55;

/// Half-width of the smooth transition around each threshold.
const KNEE: f32 = 0.12;

/// Apply saturation, contrast and brightness, in that order.
///
/// The three steps are the rows of a single affine color matrix:
///
/// ```text
/// luma = dot(rgb, rec709_weights)
/// s    = luma + (in − luma) × saturation
/// c    = (s − 0.5) × contrast + 0.5
/// out  = c + brightness
/// ```
///
/// `saturation = 1`, `contrast = 1`, `brightness = 0` produce no change.
pub fn apply_color_controls(rgb: [f32; 3], controls: &ColorControls) -> [f32; 3] {
    if *controls == ColorControls::IDENTITY {
        return rgb;
    }

    let ColorControls {
        saturation,
        brightness,
        contrast,
    } = *controls;

    let y = luma(rgb);
    let mut out = [0.0_f32; 3];
    for c in 0..3 {
        let saturated = y + (rgb[c] - y) * saturation;
        let contrasted = (saturated - CONTRAST_PIVOT) * contrast + CONTRAST_PIVOT;
        out[c] = contrasted + brightness;
    }
    out
}

/// Apply highlight and shadow recovery.
///
/// Luma selects the tonal range. Shadows below the shadow threshold are
/// lifted by `shadow_amount`; highlights above the highlight threshold are
/// pushed away from the threshold by `highlight_amount − 1`. Both weights
/// fade in through a smoothstep knee so there is no visible band.
///
/// ```text
/// shadow_weight    = 1 − smoothstep(S − k, S + k, luma)
/// highlight_weight = smoothstep(H − k, H + k, luma)
///
/// lift    = shadow_amount × shadow_weight × (1 − luma) × 0.5
/// recover = (highlight_amount − 1) × highlight_weight × max(luma − (H − k), 0)
///
/// out = in + lift + recover
/// ```
///
/// `highlight_amount = 1`, `shadow_amount = 0` produce no change.
pub fn apply_highlight_shadow(rgb: [f32; 3], amounts: &HighlightShadow) -> [f32; 3] {
    if *amounts == HighlightShadow::IDENTITY {
        return rgb;
    }

    let y = luma(rgb);

    let shadow_weight = 1.0 - smoothstep(SHADOW_THRESHOLD - KNEE, SHADOW_THRESHOLD + KNEE, y);
    let highlight_weight =
        smoothstep(HIGHLIGHT_THRESHOLD - KNEE, HIGHLIGHT_THRESHOLD + KNEE, y);

    let lift = amounts.shadow_amount * shadow_weight * (1.0 - y.clamp(0.0, 1.0)) * 0.5;
    let excess = (y - (HIGHLIGHT_THRESHOLD - KNEE)).max(0.0);
    let recover = (amounts.highlight_amount - 1.0) * highlight_weight * excess;

    let delta = lift + recover;
    [rgb[0] + delta, rgb[1] + delta, rgb[2] + delta]
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn controls(saturation: f32, brightness: f32, contrast: f32) -> ColorControls {
        ColorControls {
            saturation,
            brightness,
            contrast,
        }
    }

    fn amounts(highlight_amount: f32, shadow_amount: f32) -> HighlightShadow {
        HighlightShadow {
            highlight_amount,
            shadow_amount,
        }
    }

    #[test]
    fn test_color_controls_identity_is_exact() {
        let rgb = [0.3, 0.5, 0.7];
        assert_eq!(apply_color_controls(rgb, &ColorControls::IDENTITY), rgb);
    }

    #[test]
    fn test_saturation_zero_produces_grayscale() {
        let result = apply_color_controls([0.8, 0.4, 0.2], &controls(0.0, 0.0, 1.0));
        assert!((result[0] - result[1]).abs() < EPSILON);
        assert!((result[1] - result[2]).abs() < EPSILON);
    }

    #[test]
    fn test_saturation_preserves_luma() {
        let rgb = [0.8, 0.4, 0.2];
        let result = apply_color_controls(rgb, &controls(1.6, 0.0, 1.0));
        assert!((luma(result) - luma(rgb)).abs() < EPSILON);
    }

    #[test]
    fn test_contrast_at_pivot_is_identity() {
        let rgb = [CONTRAST_PIVOT; 3];
        let result = apply_color_controls(rgb, &controls(1.0, 0.0, 2.0));
        for c in 0..3 {
            assert!((result[c] - CONTRAST_PIVOT).abs() < EPSILON);
        }
    }

    #[test]
    fn test_contrast_increases_spread() {
        let result = apply_color_controls([0.8; 3], &controls(1.0, 0.0, 2.0));
        for c in result {
            assert!(c > 0.8, "contrast should push values above the pivot higher");
        }
        let result = apply_color_controls([0.2; 3], &controls(1.0, 0.0, 2.0));
        for c in result {
            assert!(c < 0.2, "contrast should push values below the pivot lower");
        }
    }

    #[test]
    fn test_brightness_is_added_last() {
        // Contrast 0 flattens to the pivot; brightness must still apply.
        let result = apply_color_controls([0.9, 0.1, 0.4], &controls(1.0, 0.25, 0.0));
        for c in result {
            assert!((c - 0.75).abs() < EPSILON, "{c}");
        }
    }

    #[test]
    fn test_highlight_shadow_identity_is_exact() {
        let rgb = [0.3, 0.5, 0.7];
        assert_eq!(apply_highlight_shadow(rgb, &HighlightShadow::IDENTITY), rgb);
    }

    #[test]
    fn test_shadow_lift_raises_dark_pixels() {
        let rgb = [0.02, 0.02, 0.02];
        let result = apply_highlight_shadow(rgb, &amounts(1.0, 0.5));
        assert!(result[0] > rgb[0]);
    }

    #[test]
    fn test_negative_shadow_lowers_dark_pixels() {
        let rgb = [0.05, 0.05, 0.05];
        let result = apply_highlight_shadow(rgb, &amounts(1.0, -0.5));
        assert!(result[0] < rgb[0]);
    }

    #[test]
    fn test_highlight_below_one_compresses_bright_pixels() {
        let rgb = [0.95, 0.95, 0.95];
        let result = apply_highlight_shadow(rgb, &amounts(0.5, 0.0));
        assert!(result[0] < rgb[0]);
    }

    #[test]
    fn test_highlight_above_one_expands_bright_pixels() {
        let rgb = [0.95, 0.95, 0.95];
        let result = apply_highlight_shadow(rgb, &amounts(1.5, 0.0));
        assert!(result[0] > rgb[0]);
    }

    #[test]
    fn test_midtones_between_thresholds_are_untouched() {
        let rgb = [0.33, 0.33, 0.33];
        let result = apply_highlight_shadow(rgb, &amounts(0.4, 0.6));
        assert_eq!(result, rgb);
    }

    #[test]
    fn test_shadow_transition_is_smooth() {
        // No step larger than a small bound across the knee.
        let a = amounts(1.0, 1.0);
        let mut prev = apply_highlight_shadow([0.0; 3], &a)[0];
        for i in 1..=100 {
            let v = i as f32 / 200.0;
            let cur = apply_highlight_shadow([v; 3], &a)[0];
            assert!((cur - prev).abs() < 0.02, "jump at {v}: {prev} -> {cur}");
            prev = cur;
        }
    }
}
