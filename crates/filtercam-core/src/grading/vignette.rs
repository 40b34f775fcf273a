//! Radial vignette.
//!
//! Distance is measured from the image center and normalized so the corners
//! sit at 1.0 regardless of aspect ratio.
//!
//! ```text
//! d       = |p − center| / |corner − center|
//! falloff = smoothstep(0, radius, d)
//! shade   = max(0, 1 − intensity × falloff)
//! out     = in × shade
//! ```
//!
//! The center pixel has `d = 0` and is left alone; the corners receive the
//! largest falloff. Negative intensity brightens instead.

use crate::grading::smoothstep;
use crate::transform::params::Vignette;

/// Smallest radius used, so a zero radius becomes a hard edge rather than a
/// division by zero.
const MIN_RADIUS: f32 = 1e-3;

/// Vignette geometry for one frame size and parameter set.
#[derive(Debug, Clone, Copy)]
pub struct VignetteField {
    center_x: f32,
    center_y: f32,
    inv_half_diagonal: f32,
    intensity: f32,
    radius: f32,
}

impl VignetteField {
    pub fn new(width: u32, height: u32, params: &Vignette) -> Self {
        let center_x = width as f32 * 0.5;
        let center_y = height as f32 * 0.5;
        let half_diagonal = (center_x * center_x + center_y * center_y).sqrt();

        // Written as a comparison so a NaN radius stays NaN and is caught
        // downstream instead of being silently replaced.
        let radius = if params.radius < MIN_RADIUS {
            MIN_RADIUS
        } else {
            params.radius
        };

        Self {
            center_x,
            center_y,
            inv_half_diagonal: if half_diagonal > 0.0 {
                1.0 / half_diagonal
            } else {
                0.0
            },
            intensity: params.intensity,
            radius,
        }
    }

    /// True when every pixel's shade is exactly 1.
    pub fn is_identity(&self) -> bool {
        self.intensity == 0.0
    }

    /// Multiplier for the pixel at column `x`, row `y`.
    pub fn shade(&self, x: u32, y: u32) -> f32 {
        let dx = x as f32 + 0.5 - self.center_x;
        let dy = y as f32 + 0.5 - self.center_y;
        let d = (dx * dx + dy * dy).sqrt() * self.inv_half_diagonal;

        let falloff = smoothstep(0.0, self.radius, d);
        let shade = 1.0 - self.intensity * falloff;
        if shade < 0.0 { 0.0 } else { shade }
    }
}

/// Darken one pixel by its shade factor.
#[inline]
pub fn apply_vignette(rgb: [f32; 3], shade: f32) -> [f32; 3] {
    [rgb[0] * shade, rgb[1] * shade, rgb[2] * shade]
}
