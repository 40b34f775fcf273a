//! Image loading and saving for the demo application.

use std::path::Path;

use filtercam_core::{Frame, PixelFormat};

/// Load an image from disk as an RGBA frame.
///
/// Supports PNG and JPEG via the `image` crate. Pixel values stay
/// sRGB-encoded; the pipeline linearizes them itself.
pub fn load_frame(path: &Path) -> Result<Frame, ImageLoadError> {
    let img = image::open(path).map_err(ImageLoadError::Decode)?;
    Ok(Frame::from_rgba_image(&img.to_rgba8()))
}

/// Write an RGBA frame to disk. The format follows the file extension.
pub fn save_frame(frame: &Frame, path: &Path) -> Result<(), ImageLoadError> {
    let img = frame
        .to_rgba_image()
        .ok_or(ImageLoadError::UnsupportedFrame(frame.format))?;
    img.save(path).map_err(ImageLoadError::Encode)
}

/// Errors that can occur during image loading and saving.
#[derive(Debug, thiserror::Error)]
pub enum ImageLoadError {
    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),
    #[error("failed to encode image: {0}")]
    Encode(image::ImageError),
    #[error("cannot save a {0} frame")]
    UnsupportedFrame(PixelFormat),
}
