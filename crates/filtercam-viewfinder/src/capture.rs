//! Capture side of the viewfinder: the source trait, device selection and
//! format negotiation.

use std::fmt;

use filtercam_core::{Frame, PixelFormat};

use crate::error::ViewfinderError;

/// Session preset width.
pub const DEFAULT_CAPTURE_WIDTH: u32 = 1280;
/// Session preset height.
pub const DEFAULT_CAPTURE_HEIGHT: u32 = 720;
/// Frame rate the viewfinder asks the device for.
pub const DEFAULT_TARGET_FPS: u32 = 240;

/// A producer of camera frames.
///
/// Lives on the capture worker thread for the whole session.
pub trait CaptureSource: Send {
    /// Block until the next frame is available. `None` ends the stream.
    fn next_frame(&mut self) -> Option<Frame>;

    /// Formats the source can be switched to, most preferred first. Sources
    /// list their current mode first so negotiation keeps it when it fits.
    fn supported_formats(&self) -> Vec<CaptureFormat> {
        Vec::new()
    }

    /// Switch to `format`, which came from [`supported_formats`](Self::supported_formats).
    fn configure(&mut self, _format: CaptureFormat) {}
}

impl<S: CaptureSource + ?Sized> CaptureSource for Box<S> {
    fn next_frame(&mut self) -> Option<Frame> {
        (**self).next_frame()
    }

    fn supported_formats(&self) -> Vec<CaptureFormat> {
        (**self).supported_formats()
    }

    fn configure(&mut self, format: CaptureFormat) {
        (**self).configure(format);
    }
}

/// One capture mode offered by a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureFormat {
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
    /// Highest frame rate the device supports in this mode.
    pub max_fps: u32,
}

impl fmt::Display for CaptureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} {} @ {} fps",
            self.width, self.height, self.pixel_format, self.max_fps
        )
    }
}

/// What the viewfinder asks the capture device for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConfig {
    pub width: u32,
    pub height: u32,
    pub target_fps: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_CAPTURE_WIDTH,
            height: DEFAULT_CAPTURE_HEIGHT,
            target_fps: DEFAULT_TARGET_FPS,
        }
    }
}

/// Pick the first format matching the preset size that can reach the target
/// frame rate. The source's own ordering decides between qualifying formats.
pub fn negotiate_format(
    formats: &[CaptureFormat],
    config: &CaptureConfig,
) -> Result<CaptureFormat, ViewfinderError> {
    formats
        .iter()
        .find(|f| {
            f.width == config.width && f.height == config.height && f.max_fps >= config.target_fps
        })
        .copied()
        .ok_or(ViewfinderError::ConfigurationFailure {
            width: config.width,
            height: config.height,
            target_fps: config.target_fps,
        })
}

/// Which way a camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraPosition {
    Back,
    Front,
    External,
}

/// A camera the platform reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureDevice {
    pub id: String,
    pub position: CameraPosition,
}

/// Prefer the rear camera, otherwise take the first device listed.
pub fn select_device(devices: &[CaptureDevice]) -> Result<&CaptureDevice, ViewfinderError> {
    devices
        .iter()
        .find(|d| d.position == CameraPosition::Back)
        .or_else(|| devices.first())
        .ok_or(ViewfinderError::DeviceUnavailable)
}
