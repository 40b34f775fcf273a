//! Frame representation at the capture/display boundary, and the linear
//! working image the filter stages run on.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::color_management::transfer::{linear_to_srgb_u8, srgb_u8_to_linear};
use crate::error::PipelineError;

/// Interleaved 8-bit pixel layouts a capture source may deliver.
///
/// All RGB layouts carry sRGB-encoded values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// R G B A, 4 bytes per pixel. Pipeline output is always this format.
    Rgba8,
    /// B G R A, 4 bytes per pixel. Native layout of most mobile camera stacks.
    Bgra8,
    /// R G B, 3 bytes per pixel.
    Rgb8,
    /// Packed 4:2:2 (Y0 U Y1 V), 2 bytes per pixel, BT.601 full range.
    Yuyv,
}

impl PixelFormat {
    /// Average bytes per pixel.
    pub const fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Rgba8 | Self::Bgra8 => 4,
            Self::Rgb8 => 3,
            Self::Yuyv => 2,
        }
    }

    /// FourCC-style label for logs.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Rgba8 => "RGBA",
            Self::Bgra8 => "BGRA",
            Self::Rgb8 => "RGB",
            Self::Yuyv => "YUYV",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An immutable captured or filtered frame.
///
/// `data` is shared, so cloning a frame never copies pixels. A frame is
/// produced once and handed on; nothing in the pipeline mutates it.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Bytes per row, including any padding.
    pub stride: u32,
    pub format: PixelFormat,
    /// Monotonic counter assigned by the capture source.
    pub sequence: u64,
    pub data: Arc<[u8]>,
}

impl Frame {
    /// Create a frame with tightly packed rows.
    pub fn new(width: u32, height: u32, format: PixelFormat, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            width,
            height,
            stride: width.saturating_mul(format.bytes_per_pixel() as u32),
            format,
            sequence: 0,
            data: data.into(),
        }
    }

    /// Set the sequence number.
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    /// Set an explicit row stride.
    pub fn with_stride(mut self, stride: u32) -> Self {
        self.stride = stride;
        self
    }

    /// A frame where every pixel is the same RGBA value.
    pub fn uniform_rgba(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let data: Vec<u8> = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self::new(width, height, PixelFormat::Rgba8, data)
    }

    /// Wrap an `image` buffer as an RGBA frame.
    pub fn from_rgba_image(img: &image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self::new(width, height, PixelFormat::Rgba8, img.as_raw().as_slice())
    }

    /// Copy an RGBA frame into an `image` buffer.
    ///
    /// Returns `None` for other formats or for frames that fail validation.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        if self.format != PixelFormat::Rgba8 || self.validate().is_err() {
            return None;
        }
        let row_bytes = self.width as usize * 4;
        let mut packed = Vec::with_capacity(row_bytes * self.height as usize);
        for row in self.rows() {
            packed.extend_from_slice(&row[..row_bytes]);
        }
        image::RgbaImage::from_raw(self.width, self.height, packed)
    }

    /// RGBA value at (`x`, `y`) of an RGBA frame.
    pub fn rgba_at(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if self.format != PixelFormat::Rgba8 || x >= self.width || y >= self.height {
            return None;
        }
        let offset = y as usize * self.stride as usize + x as usize * 4;
        let px = self.data.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Check dimensions, stride and buffer length against the format.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.width == 0 || self.height == 0 {
            return Err(PipelineError::EmptyFrame {
                width: self.width,
                height: self.height,
            });
        }

        let malformed = |reason: String| PipelineError::MalformedFrame {
            format: self.format,
            reason,
        };

        if self.format == PixelFormat::Yuyv && self.width % 2 != 0 {
            return Err(malformed(format!("odd width {} for 4:2:2 data", self.width)));
        }

        let row_bytes = (self.width as usize)
            .checked_mul(self.format.bytes_per_pixel())
            .ok_or_else(|| malformed("row size overflows".to_string()))?;
        if (self.stride as usize) < row_bytes {
            return Err(malformed(format!(
                "stride {} shorter than row of {row_bytes} bytes",
                self.stride
            )));
        }

        let required = (self.stride as usize)
            .checked_mul(self.height as usize - 1)
            .and_then(|n| n.checked_add(row_bytes))
            .ok_or_else(|| malformed("buffer size overflows".to_string()))?;
        if self.data.len() < required {
            return Err(malformed(format!(
                "buffer holds {} bytes, need {required}",
                self.data.len()
            )));
        }

        Ok(())
    }

    /// Pixel rows without stride padding. Assumes a validated frame.
    fn rows(&self) -> impl Iterator<Item = &[u8]> {
        let row_bytes = self.width as usize * self.format.bytes_per_pixel();
        let stride = self.stride as usize;
        (0..self.height as usize).map(move |y| &self.data[y * stride..y * stride + row_bytes])
    }
}

/// Working image for the filter stages. Always RGBA f32, linear light.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Pixel data in RGBA f32 linear format, row-major.
    pub pixels: Vec<[f32; 4]>,
}

impl FilterImage {
    /// Validate `frame` and convert it to linear RGBA.
    pub fn decode(frame: &Frame) -> Result<Self, PipelineError> {
        frame.validate()?;

        let mut pixels = Vec::with_capacity(frame.width as usize * frame.height as usize);
        for row in frame.rows() {
            match frame.format {
                PixelFormat::Rgba8 => {
                    for &[r, g, b, a] in bytemuck::cast_slice::<u8, [u8; 4]>(row) {
                        pixels.push(linear_rgba(r, g, b, a));
                    }
                }
                PixelFormat::Bgra8 => {
                    for &[b, g, r, a] in bytemuck::cast_slice::<u8, [u8; 4]>(row) {
                        pixels.push(linear_rgba(r, g, b, a));
                    }
                }
                PixelFormat::Rgb8 => {
                    for &[r, g, b] in bytemuck::cast_slice::<u8, [u8; 3]>(row) {
                        pixels.push(linear_rgba(r, g, b, u8::MAX));
                    }
                }
                PixelFormat::Yuyv => {
                    for &[y0, u, y1, v] in bytemuck::cast_slice::<u8, [u8; 4]>(row) {
                        for luma in [y0, y1] {
                            let [r, g, b] = yuv_to_rgb(luma, u, v);
                            pixels.push(linear_rgba(r, g, b, u8::MAX));
                        }
                    }
                }
            }
        }

        Ok(Self {
            width: frame.width,
            height: frame.height,
            pixels,
        })
    }

    /// Encode back to an sRGB RGBA frame, clamping to display range.
    pub fn encode(&self, sequence: u64) -> Frame {
        let mut data = Vec::with_capacity(self.pixels.len() * 4);
        for px in &self.pixels {
            data.extend_from_slice(&[
                linear_to_srgb_u8(px[0]),
                linear_to_srgb_u8(px[1]),
                linear_to_srgb_u8(px[2]),
                (px[3].clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
            ]);
        }
        Frame::new(self.width, self.height, PixelFormat::Rgba8, data).with_sequence(sequence)
    }

    /// Check that the image is non-empty and holds exactly one pixel per
    /// position.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.width == 0 || self.height == 0 {
            return Err(PipelineError::EmptyFrame {
                width: self.width,
                height: self.height,
            });
        }
        let expected = self.width as usize * self.height as usize;
        if self.pixels.len() != expected {
            return Err(PipelineError::MalformedFrame {
                format: PixelFormat::Rgba8,
                reason: format!(
                    "{} pixels for a {}x{} image, need {expected}",
                    self.pixels.len(),
                    self.width,
                    self.height
                ),
            });
        }
        Ok(())
    }

    /// True when every sample is finite.
    pub fn is_finite(&self) -> bool {
        self.pixels
            .iter()
            .all(|px| px.iter().all(|c| c.is_finite()))
    }
}

fn linear_rgba(r: u8, g: u8, b: u8, a: u8) -> [f32; 4] {
    [
        srgb_u8_to_linear(r),
        srgb_u8_to_linear(g),
        srgb_u8_to_linear(b),
        a as f32 / 255.0,
    ]
}

/// YUV to RGB conversion (BT.601, full range), to 8-bit sRGB codes.
fn yuv_to_rgb(y: u8, u: u8, v: u8) -> [u8; 3] {
    let y = y as f32;
    let u = u as f32 - 128.0;
    let v = v as f32 - 128.0;
    let to_u8 = |c: f32| (c + 0.5).clamp(0.0, 255.0) as u8;
    [
        to_u8(y + 1.402 * v),
        to_u8(y - 0.344 * u - 0.714 * v),
        to_u8(y + 1.772 * u),
    ]
}
