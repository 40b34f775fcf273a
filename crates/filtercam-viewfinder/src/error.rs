use std::io;

/// Errors from setting up a viewfinder session.
///
/// Per-frame failures never surface here; they are counted and logged by the
/// processing worker.
#[derive(Debug, thiserror::Error)]
pub enum ViewfinderError {
    #[error("no capture device available")]
    DeviceUnavailable,

    #[error("no {width}x{height} capture format reaches {target_fps} fps")]
    ConfigurationFailure {
        width: u32,
        height: u32,
        target_fps: u32,
    },

    #[error("failed to spawn {worker} worker: {source}")]
    WorkerSpawn {
        worker: &'static str,
        #[source]
        source: io::Error,
    },
}
