//! FilterCam Viewfinder: runs the filter pipeline against a live capture
//! source.
//!
//! A capture worker feeds a latest-frame-wins slot, a processing worker
//! filters whatever is newest with the shared [`FilterParameters`], and the
//! UI context presents the results through a [`DisplaySink`].
//!
//! [`FilterParameters`]: filtercam_core::FilterParameters

pub mod capture;
pub mod display;
pub mod error;
pub mod frame_slot;
pub mod synthetic;
pub mod viewfinder;

// Re-exports for downstream crates.
pub use capture::{
    CameraPosition, CaptureConfig, CaptureDevice, CaptureFormat, CaptureSource, negotiate_format,
    select_device,
};
pub use display::{DisplaySink, LatestFrameSink};
pub use error::ViewfinderError;
pub use frame_slot::FrameSlot;
pub use synthetic::{StillFrameSource, TestPatternSource};
pub use viewfinder::{StatsSnapshot, StopHandle, Viewfinder, ViewfinderConfig, ViewfinderStats};
