//! Per-pixel filter stages: color controls, highlight/shadow, vignette and
//! the fixed fade look.

pub mod fade;
pub mod sliders;
pub mod vignette;

/// Rec. 709 luminance weights.
pub(crate) const LUMA_REC709: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Rec. 709 luminance of a linear RGB pixel.
#[inline]
pub(crate) fn luma(rgb: [f32; 3]) -> f32 {
    rgb[0] * LUMA_REC709[0] + rgb[1] * LUMA_REC709[1] + rgb[2] * LUMA_REC709[2]
}

/// Smoothstep: 3t² − 2t³ over `[edge0, edge1]`.
#[inline]
pub(crate) fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
