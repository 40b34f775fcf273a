//! FilterCam Demo: headless viewfinder session.
//!
//! Feeds a test pattern (or a still image) through the live filter at the
//! configured frame rate, presents frames on the main thread the way a UI
//! event loop would, and writes the last displayed frame to a PNG.

mod config;
mod image_loader;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use filtercam_core::{FilterParameters, FilterSettings};
use filtercam_viewfinder::{
    CameraPosition, CaptureConfig, CaptureDevice, CaptureSource, LatestFrameSink,
    StillFrameSource, TestPatternSource, Viewfinder, ViewfinderConfig, ViewfinderError,
    select_device,
};

use config::AppConfig;
use image_loader::{ImageLoadError, load_frame, save_frame};

/// Device id of the still image given by `FILTERCAM_INPUT`.
const STILL_DEVICE_ID: &str = "still-image";
/// Device id of the generated test pattern.
const TEST_PATTERN_DEVICE_ID: &str = "test-pattern";

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error(transparent)]
    Viewfinder(#[from] ViewfinderError),
    #[error(transparent)]
    Image(#[from] ImageLoadError),
    #[error("failed to read settings from {}: {source}", .path.display())]
    SettingsIo {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid settings in {}: {source}", .path.display())]
    SettingsParse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

fn main() -> ExitCode {
    // Set RUST_LOG to control log level, e.g. RUST_LOG=filtercam_viewfinder=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    match run(AppConfig::default()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: AppConfig) -> Result<(), DemoError> {
    tracing::info!(?config, "starting FilterCam demo");

    let settings = match &config.settings {
        Some(path) => load_settings(path)?,
        None => FilterSettings::default(),
    };
    if let Ok(json) = settings.to_json() {
        tracing::debug!("filter settings:\n{json}");
    }
    let params = Arc::new(FilterParameters::new(settings));

    let devices = available_devices(&config);
    let device = select_device(&devices)?;
    tracing::info!("using capture device {} ({:?})", device.id, device.position);
    let (source, width, height) = open_source(device, &config)?;

    let mut viewfinder = Viewfinder::start(
        source,
        Arc::clone(&params),
        ViewfinderConfig {
            capture: CaptureConfig {
                width,
                height,
                target_fps: config.fps,
            },
            ..ViewfinderConfig::default()
        },
    )?;

    // Stand-in for the UI event loop: present whatever is ready, then idle
    // for half a frame.
    let idle = match config.fps {
        0 => Duration::from_millis(1),
        fps => Duration::from_secs_f64(0.5 / fps as f64),
    };
    let mut sink = LatestFrameSink::new();
    while viewfinder.is_running() {
        viewfinder.pump_display(&mut sink);
        std::thread::sleep(idle);
    }
    viewfinder.pump_display(&mut sink);

    let stats = viewfinder.stop();
    tracing::info!(
        "session done: {} captured, {} presented, {} failed",
        stats.captured,
        stats.presented,
        stats.failed
    );

    match sink.latest() {
        Some(frame) => {
            save_frame(frame, &config.output)?;
            tracing::info!("wrote frame {} to {}", frame.sequence, config.output.display());
        }
        None => tracing::warn!("no frame was displayed; nothing written"),
    }
    Ok(())
}

/// Capture devices this configuration can open. A still image stands in for
/// the rear camera; the test pattern needs a non-zero size.
fn available_devices(config: &AppConfig) -> Vec<CaptureDevice> {
    let mut devices = Vec::new();
    if config.input.is_some() {
        devices.push(CaptureDevice {
            id: STILL_DEVICE_ID.to_string(),
            position: CameraPosition::Back,
        });
    }
    if config.width > 0 && config.height > 0 {
        devices.push(CaptureDevice {
            id: TEST_PATTERN_DEVICE_ID.to_string(),
            position: CameraPosition::External,
        });
    }
    devices
}

/// Open `device` as a paced, frame-limited source. Returns the source and
/// the size it captures at.
fn open_source(
    device: &CaptureDevice,
    config: &AppConfig,
) -> Result<(Box<dyn CaptureSource>, u32, u32), DemoError> {
    match (device.id.as_str(), &config.input) {
        (STILL_DEVICE_ID, Some(path)) => {
            let frame = load_frame(path)?;
            tracing::info!("loaded {} ({}x{})", path.display(), frame.width, frame.height);
            let (w, h) = (frame.width, frame.height);
            let source: Box<dyn CaptureSource> = Box::new(
                StillFrameSource::new(frame)
                    .with_frame_rate(config.fps)
                    .with_frame_limit(config.frames),
            );
            Ok((source, w, h))
        }
        (TEST_PATTERN_DEVICE_ID, _) => {
            let source: Box<dyn CaptureSource> = Box::new(
                TestPatternSource::new(config.width, config.height)
                    .with_frame_rate(config.fps)
                    .with_frame_limit(config.frames),
            );
            Ok((source, config.width, config.height))
        }
        _ => Err(ViewfinderError::DeviceUnavailable.into()),
    }
}

fn load_settings(path: &Path) -> Result<FilterSettings, DemoError> {
    let json = std::fs::read_to_string(path).map_err(|source| DemoError::SettingsIo {
        path: path.to_path_buf(),
        source,
    })?;
    let settings = FilterSettings::from_json(&json).map_err(|source| DemoError::SettingsParse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("loaded filter settings from {}", path.display());
    Ok(settings)
}
