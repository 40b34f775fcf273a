//! White balance remap from a neutral point (temperature, tint).
//!
//! The neutral describes the illuminant the frame is assumed to be lit by.
//! Its chromaticity is found on the Planckian locus (blue-yellow axis) and
//! offset perpendicular to it for tint (green-magenta axis), then a Bradford
//! chromatic adaptation maps that white onto the target neutral. The whole
//! remap collapses into one 3×3 matrix in linear sRGB, built once per frame.
//!
//! # Reference
//! - Kang et al. (2002), cubic spline approximation of the Planckian locus
//! - Lindbloom, Bruce J.: Bradford chromatic adaptation

use glam::{Mat3, Vec3};

use crate::transform::params::Neutral;

/// The neutral every frame is adapted towards.
pub const TARGET_NEUTRAL: Neutral = Neutral {
    temperature: 6500.0,
    tint: 0.0,
};

/// Lowest correlated color temperature the locus approximation covers.
pub const MIN_CCT: f32 = 1667.0;
/// Highest correlated color temperature the locus approximation covers.
pub const MAX_CCT: f32 = 25000.0;

/// Distance from the locus (Δuv) per unit of tint.
const TINT_DUV_PER_UNIT: f64 = 0.0002;

/// Half-width of the finite difference used for the locus tangent, in kelvin.
const TANGENT_STEP_K: f64 = 10.0;

// Bradford cone response matrix
const M: [[f64; 3]; 3] = [
    [0.8951, 0.2664, -0.1614],
    [-0.7502, 1.7135, 0.0367],
    [0.0389, -0.0685, 1.0296],
];
const M_INV: [[f64; 3]; 3] = [
    [0.9869929055, -0.1470542564, 0.1599626517],
    [0.4323052697, 0.5183602715, 0.0492912282],
    [-0.0085286646, 0.0400428217, 0.9684866958],
];

// Linear sRGB (Rec. 709 primaries, D65) <-> CIE XYZ
const RGB_TO_XYZ: [[f64; 3]; 3] = [
    [0.4124564, 0.3575761, 0.1804375],
    [0.2126729, 0.7151522, 0.0721750],
    [0.0193339, 0.1191920, 0.9503041],
];
const XYZ_TO_RGB: [[f64; 3]; 3] = [
    [3.2404542, -1.5371385, -0.4985314],
    [-0.9692660, 1.8760108, 0.0415560],
    [0.0556434, -0.2040259, 1.0572252],
];

/// Per-frame white balance transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhiteBalance {
    matrix: Mat3,
}

impl WhiteBalance {
    /// Build the transform that adapts `neutral` onto [`TARGET_NEUTRAL`].
    pub fn from_neutral(neutral: Neutral) -> Self {
        Self::between(neutral, TARGET_NEUTRAL)
    }

    /// Build the transform that adapts `source` white onto `target` white.
    ///
    /// Identical neutrals produce the exact identity matrix.
    pub fn between(source: Neutral, target: Neutral) -> Self {
        if source == target {
            return Self {
                matrix: Mat3::IDENTITY,
            };
        }

        let src_xyz = xy_to_xyz(neutral_xy(source));
        let dst_xyz = xy_to_xyz(neutral_xy(target));

        let src_cone = mat3_vec3(M, src_xyz);
        let dst_cone = mat3_vec3(M, dst_xyz);
        let scale = [
            dst_cone[0] / src_cone[0],
            dst_cone[1] / src_cone[1],
            dst_cone[2] / src_cone[2],
        ];

        let adapt = compose_bradford(M_INV, scale, M);
        let rows = mat3_mul(XYZ_TO_RGB, mat3_mul(adapt, RGB_TO_XYZ));

        Self {
            matrix: rows_to_mat3(rows),
        }
    }

    /// True when this transform leaves every pixel unchanged.
    pub fn is_identity(&self) -> bool {
        self.matrix == Mat3::IDENTITY
    }

    /// The linear-sRGB matrix applied to each pixel.
    pub fn matrix(&self) -> Mat3 {
        self.matrix
    }

    /// Apply the transform to one linear RGB pixel.
    #[inline]
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        (self.matrix * Vec3::from_array(rgb)).to_array()
    }
}

/// Chromaticity (CIE xy) of a neutral point.
///
/// Temperature is clamped to [`MIN_CCT`]..=[`MAX_CCT`]. Tint offsets the
/// locus point along its normal in CIE 1960 uv; positive tint is greener.
pub fn neutral_xy(neutral: Neutral) -> [f64; 2] {
    let cct = (neutral.temperature as f64).clamp(MIN_CCT as f64, MAX_CCT as f64);
    let uv = xy_to_uv(planckian_xy(cct));

    if neutral.tint == 0.0 {
        return uv_to_xy(uv);
    }

    let lo = xy_to_uv(planckian_xy((cct - TANGENT_STEP_K).max(MIN_CCT as f64)));
    let hi = xy_to_uv(planckian_xy((cct + TANGENT_STEP_K).min(MAX_CCT as f64)));
    let tangent = [hi[0] - lo[0], hi[1] - lo[1]];
    let len = (tangent[0] * tangent[0] + tangent[1] * tangent[1]).sqrt();

    let mut normal = [-tangent[1] / len, tangent[0] / len];
    if normal[1] < 0.0 {
        normal = [-normal[0], -normal[1]];
    }

    let duv = neutral.tint as f64 * TINT_DUV_PER_UNIT;
    uv_to_xy([uv[0] + normal[0] * duv, uv[1] + normal[1] * duv])
}

/// Planckian locus chromaticity for a correlated color temperature.
///
/// Valid for 1667 K..=25000 K.
pub fn planckian_xy(cct: f64) -> [f64; 2] {
    let t = cct;
    let t2 = t * t;
    let t3 = t2 * t;

    let x = if t <= 4000.0 {
        -0.2661239e9 / t3 - 0.2343589e6 / t2 + 0.8776956e3 / t + 0.179910
    } else {
        -3.0258469e9 / t3 + 2.1070379e6 / t2 + 0.2226347e3 / t + 0.240390
    };

    let x2 = x * x;
    let x3 = x2 * x;
    let y = if t <= 2222.0 {
        -1.1063814 * x3 - 1.34811020 * x2 + 2.18555832 * x - 0.20219683
    } else if t <= 4000.0 {
        -0.9549476 * x3 - 1.37418593 * x2 + 2.09137015 * x - 0.16748867
    } else {
        3.0817580 * x3 - 5.87338670 * x2 + 3.75112997 * x - 0.37001483
    };

    [x, y]
}

fn xy_to_uv(xy: [f64; 2]) -> [f64; 2] {
    let d = -2.0 * xy[0] + 12.0 * xy[1] + 3.0;
    [4.0 * xy[0] / d, 6.0 * xy[1] / d]
}

fn uv_to_xy(uv: [f64; 2]) -> [f64; 2] {
    let d = 2.0 * uv[0] - 8.0 * uv[1] + 4.0;
    [3.0 * uv[0] / d, 2.0 * uv[1] / d]
}

/// xy to XYZ with Y = 1.
fn xy_to_xyz(xy: [f64; 2]) -> [f64; 3] {
    [xy[0] / xy[1], 1.0, (1.0 - xy[0] - xy[1]) / xy[1]]
}

fn mat3_vec3(m: [[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

fn mat3_mul(a: [[f64; 3]; 3], b: [[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let mut out = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
        }
    }
    out
}

/// Compute M_INV * diag(s) * M in a single pass.
fn compose_bradford(
    m_inv: [[f64; 3]; 3],
    s: [f64; 3],
    m: [[f64; 3]; 3],
) -> [[f64; 3]; 3] {
    let sm = [
        [s[0] * m[0][0], s[0] * m[0][1], s[0] * m[0][2]],
        [s[1] * m[1][0], s[1] * m[1][1], s[1] * m[1][2]],
        [s[2] * m[2][0], s[2] * m[2][1], s[2] * m[2][2]],
    ];
    mat3_mul(m_inv, sm)
}

/// Row-major f64 rows into a column-major glam matrix.
fn rows_to_mat3(rows: [[f64; 3]; 3]) -> Mat3 {
    let as_f32 = rows.map(|row| row.map(|v| v as f32));
    // from_cols_array_2d reads each inner array as a column.
    Mat3::from_cols_array_2d(&as_f32).transpose()
}
