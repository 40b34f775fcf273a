//! FilterCam Core: the per-frame image filter.
//!
//! Pixel formats, the linear working image, the five filter stages and the
//! shared parameter store they read from. No capture or display code lives
//! here; see `filtercam-viewfinder` for that.

pub mod color_management;
pub mod error;
pub mod frame;
pub mod grading;
pub mod transform;

// Re-exports for convenience.
pub use error::PipelineError;
pub use frame::{FilterImage, Frame, PixelFormat};
pub use transform::params::{
    ColorControls, FilterParameter, FilterParameters, FilterSettings, HighlightShadow, Neutral,
    ParameterSource, Vignette,
};
pub use transform::pipeline::{FilterPipeline, FilterStage};
