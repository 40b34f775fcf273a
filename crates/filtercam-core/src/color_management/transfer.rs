//! sRGB transfer function used to move camera frames in and out of the
//! linear working space.
//!
//! Camera frames arrive display-encoded. Every filter stage runs on linear
//! light, so the pipeline decodes on the way in and re-encodes on the way out.

use std::sync::LazyLock;

// ---------------------------------------------------------------------------
// sRGB (IEC 61966-2-1)
// ---------------------------------------------------------------------------
//
// to_linear:   V <= 0.04045 → V / 12.92
//              V >  0.04045 → ((V + 0.055) / 1.055) ^ 2.4
//
// from_linear: L <= 0.0031308 → L × 12.92
//              L >  0.0031308 → 1.055 × L^(1/2.4) − 0.055

/// Convert an sRGB-encoded value in `[0, 1]` to linear light.
#[inline]
pub fn srgb_to_linear(encoded: f32) -> f32 {
    if encoded <= 0.04045 {
        encoded / 12.92
    } else {
        ((encoded + 0.055) / 1.055).powf(2.4)
    }
}

/// Convert linear light to an sRGB-encoded value. Does not clamp.
#[inline]
pub fn linear_to_srgb(linear: f32) -> f32 {
    if linear <= 0.0031308 {
        linear * 12.92
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    }
}

/// Linear values for every 8-bit sRGB code value.
static SRGB_DECODE_U8: LazyLock<[f32; 256]> = LazyLock::new(|| {
    let mut table = [0.0_f32; 256];
    for (code, slot) in table.iter_mut().enumerate() {
        *slot = srgb_to_linear(code as f32 / 255.0);
    }
    table
});

/// Decode an 8-bit sRGB code value to linear light.
#[inline]
pub fn srgb_u8_to_linear(code: u8) -> f32 {
    SRGB_DECODE_U8[code as usize]
}

/// Encode a linear value to an 8-bit sRGB code value, clamping to `[0, 1]`.
#[inline]
pub fn linear_to_srgb_u8(linear: f32) -> u8 {
    let encoded = linear_to_srgb(linear.clamp(0.0, 1.0));
    (encoded * 255.0 + 0.5).clamp(0.0, 255.0) as u8
}
