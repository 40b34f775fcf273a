//! Viewfinder session: capture worker, processing worker and the display
//! hand-off back to the UI context.
//!
//! ```text
//! CaptureSource ──▶ FrameSlot (depth 1) ──▶ FilterPipeline ──▶ mpsc (bounded) ──▶ DisplaySink
//!  capture thread      latest wins           processing thread    try_send         UI context
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use filtercam_core::{FilterParameters, FilterPipeline, Frame};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::capture::{CaptureConfig, CaptureSource, negotiate_format};
use crate::display::DisplaySink;
use crate::error::ViewfinderError;
use crate::frame_slot::FrameSlot;

/// Filtered frames allowed to wait for the UI before new ones are dropped.
pub const DEFAULT_DISPLAY_CAPACITY: usize = 2;

/// Frames slower than this are always logged.
const SLOW_FRAME_THRESHOLD: Duration = Duration::from_millis(50);

/// How often to emit per-frame diagnostic log messages (every Nth drop).
const LOG_EVERY_N_DROPS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewfinderConfig {
    pub capture: CaptureConfig,
    pub display_capacity: usize,
}

impl Default for ViewfinderConfig {
    fn default() -> Self {
        Self {
            capture: CaptureConfig::default(),
            display_capacity: DEFAULT_DISPLAY_CAPACITY,
        }
    }
}

/// Frame counters, updated by the workers and the display pump.
#[derive(Debug, Default)]
pub struct ViewfinderStats {
    captured: AtomicU64,
    superseded: AtomicU64,
    filtered: AtomicU64,
    failed: AtomicU64,
    display_dropped: AtomicU64,
    presented: AtomicU64,
}

/// Point-in-time copy of [`ViewfinderStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Frames delivered by the capture source.
    pub captured: u64,
    /// Frames replaced in the slot before processing picked them up.
    pub superseded: u64,
    /// Frames the pipeline produced output for.
    pub filtered: u64,
    /// Frames the pipeline rejected.
    pub failed: u64,
    /// Filtered frames dropped because the display queue was full.
    pub display_dropped: u64,
    /// Frames handed to a [`DisplaySink`].
    pub presented: u64,
}

impl ViewfinderStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            captured: self.captured.load(Ordering::Relaxed),
            superseded: self.superseded.load(Ordering::Relaxed),
            filtered: self.filtered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            display_dropped: self.display_dropped.load(Ordering::Relaxed),
            presented: self.presented.load(Ordering::Relaxed),
        }
    }

    fn bump(counter: &AtomicU64) -> u64 {
        counter.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Ends a running session from any thread.
///
/// Signalling stops capture and filtering; a [`Viewfinder::run_display`]
/// blocked on another thread returns once the frames already queued for
/// display are presented.
#[derive(Debug, Clone)]
pub struct StopHandle {
    stop_flag: Arc<AtomicBool>,
    slot: Arc<FrameSlot>,
}

impl StopHandle {
    pub fn signal(&self) {
        self.stop_flag.store(true, Ordering::Release);
        self.slot.close();
    }

    pub fn is_signalled(&self) -> bool {
        self.stop_flag.load(Ordering::Acquire)
    }
}

/// A running viewfinder.
///
/// Owns the two worker threads. The UI context drives display by calling
/// [`pump_display`](Self::pump_display) from its event loop or by handing
/// its thread to [`run_display`](Self::run_display).
pub struct Viewfinder {
    params: Arc<FilterParameters>,
    slot: Arc<FrameSlot>,
    stop_flag: Arc<AtomicBool>,
    stats: Arc<ViewfinderStats>,
    display_rx: mpsc::Receiver<Frame>,
    capture_thread: Option<JoinHandle<()>>,
    processing_thread: Option<JoinHandle<()>>,
}

impl Viewfinder {
    /// Configure `source` and start capturing and filtering.
    ///
    /// A format negotiation failure is logged and the source keeps its
    /// current configuration.
    pub fn start<S>(
        mut source: S,
        params: Arc<FilterParameters>,
        config: ViewfinderConfig,
    ) -> Result<Self, ViewfinderError>
    where
        S: CaptureSource + 'static,
    {
        match negotiate_format(&source.supported_formats(), &config.capture) {
            Ok(format) => {
                tracing::info!("capture format: {format}");
                source.configure(format);
            }
            Err(e) => {
                tracing::warn!("{e}; keeping current capture configuration");
            }
        }

        let slot = Arc::new(FrameSlot::new());
        let stop_flag = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(ViewfinderStats::default());
        let (display_tx, display_rx) = mpsc::channel(config.display_capacity.max(1));

        let capture_thread = {
            let slot = Arc::clone(&slot);
            let stop_flag = Arc::clone(&stop_flag);
            let stats = Arc::clone(&stats);
            thread::Builder::new()
                .name("filtercam-capture".into())
                .spawn(move || capture_loop(source, &slot, &stop_flag, &stats))
                .map_err(|source| ViewfinderError::WorkerSpawn {
                    worker: "capture",
                    source,
                })?
        };

        let processing_thread = {
            let slot = Arc::clone(&slot);
            let params = Arc::clone(&params);
            let stop_flag = Arc::clone(&stop_flag);
            let stats = Arc::clone(&stats);
            thread::Builder::new()
                .name("filtercam-processing".into())
                .spawn(move || processing_loop(&slot, &params, display_tx, &stop_flag, &stats))
        };
        let processing_thread = match processing_thread {
            Ok(handle) => handle,
            Err(source) => {
                stop_flag.store(true, Ordering::Release);
                slot.close();
                return Err(ViewfinderError::WorkerSpawn {
                    worker: "processing",
                    source,
                });
            }
        };

        tracing::info!("viewfinder started");
        Ok(Self {
            params,
            slot,
            stop_flag,
            stats,
            display_rx,
            capture_thread: Some(capture_thread),
            processing_thread: Some(processing_thread),
        })
    }

    /// A handle that stops this session without owning it.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            stop_flag: Arc::clone(&self.stop_flag),
            slot: Arc::clone(&self.slot),
        }
    }

    /// The live parameters the processing worker reads.
    pub fn params(&self) -> &Arc<FilterParameters> {
        &self.params
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// False once the processing worker has exited.
    pub fn is_running(&self) -> bool {
        self.processing_thread
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Present every frame that is ready, without waiting. Returns how many
    /// were presented.
    pub fn pump_display(&mut self, sink: &mut impl DisplaySink) -> usize {
        let mut presented = 0;
        while let Ok(frame) = self.display_rx.try_recv() {
            self.present(sink, frame);
            presented += 1;
        }
        presented
    }

    /// Present frames as they arrive until the stream ends or a
    /// [`StopHandle`] is signalled. Returns how many were presented.
    ///
    /// Blocks the calling thread; must not be called from inside an async
    /// runtime.
    pub fn run_display(&mut self, sink: &mut impl DisplaySink) -> usize {
        let mut presented = 0;
        while let Some(frame) = self.display_rx.blocking_recv() {
            self.present(sink, frame);
            presented += 1;
        }
        presented
    }

    fn present(&self, sink: &mut impl DisplaySink, frame: Frame) {
        ViewfinderStats::bump(&self.stats.presented);
        sink.present(frame);
    }

    /// Stop both workers and wait for them. Frames not yet presented are
    /// discarded.
    ///
    /// Returns once the capture source has handed back its current frame.
    pub fn stop(mut self) -> StatsSnapshot {
        self.signal_stop();
        for handle in [self.capture_thread.take(), self.processing_thread.take()]
            .into_iter()
            .flatten()
        {
            if handle.join().is_err() {
                tracing::error!("viewfinder worker panicked");
            }
        }
        let stats = self.stats.snapshot();
        tracing::info!(?stats, "viewfinder stopped");
        stats
    }

    fn signal_stop(&mut self) {
        self.stop_handle().signal();
        self.display_rx.close();
    }
}

impl Drop for Viewfinder {
    /// Signals the workers without joining; they exit after their current
    /// frame.
    fn drop(&mut self) {
        self.signal_stop();
    }
}

fn capture_loop(
    mut source: impl CaptureSource,
    slot: &FrameSlot,
    stop_flag: &AtomicBool,
    stats: &ViewfinderStats,
) {
    tracing::debug!("capture worker started");
    while !stop_flag.load(Ordering::Acquire) {
        let Some(frame) = source.next_frame() else {
            tracing::info!("capture source ended");
            break;
        };
        ViewfinderStats::bump(&stats.captured);
        if slot.push(frame) {
            ViewfinderStats::bump(&stats.superseded);
        }
    }
    slot.close();
    tracing::debug!("capture worker stopped");
}

fn processing_loop(
    slot: &FrameSlot,
    params: &FilterParameters,
    display_tx: mpsc::Sender<Frame>,
    stop_flag: &AtomicBool,
    stats: &ViewfinderStats,
) {
    tracing::debug!("processing worker started");
    let pipeline = FilterPipeline::new();
    let mut perf = PerfLog::new();

    while let Some(frame) = slot.take_blocking() {
        if stop_flag.load(Ordering::Acquire) {
            break;
        }

        let started = Instant::now();
        let sequence = frame.sequence;
        match pipeline.filter(&frame, params) {
            Ok(filtered) => {
                ViewfinderStats::bump(&stats.filtered);
                match display_tx.try_send(filtered) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        let dropped = ViewfinderStats::bump(&stats.display_dropped);
                        if dropped % LOG_EVERY_N_DROPS == 1 {
                            tracing::debug!(sequence, dropped, "display queue full, frame dropped");
                        }
                    }
                    Err(TrySendError::Closed(_)) => {
                        tracing::debug!("display closed");
                        break;
                    }
                }
            }
            Err(e) => {
                ViewfinderStats::bump(&stats.failed);
                tracing::debug!(sequence, error = %e, "frame dropped");
            }
        }

        perf.record(started.elapsed(), stats);
    }

    tracing::debug!("processing worker stopped");
}

/// Rate-limited throughput logging for the processing worker.
struct PerfLog {
    last_log_at: Instant,
    frames_since_log: u64,
}

impl PerfLog {
    fn new() -> Self {
        Self {
            last_log_at: Instant::now(),
            frames_since_log: 0,
        }
    }

    fn record(&mut self, frame_time: Duration, stats: &ViewfinderStats) {
        self.frames_since_log += 1;
        let since_log = self.last_log_at.elapsed();

        if frame_time >= SLOW_FRAME_THRESHOLD || since_log.as_secs_f32() >= 1.0 {
            let fps = self.frames_since_log as f64 / since_log.as_secs_f64().max(1e-3);
            let s = stats.snapshot();
            tracing::info!(
                "filter: {:.2}ms, {fps:.1} fps (captured {}, superseded {}, failed {}, display dropped {})",
                frame_time.as_secs_f64() * 1000.0,
                s.captured,
                s.superseded,
                s.failed,
                s.display_dropped,
            );
            self.last_log_at = Instant::now();
            self.frames_since_log = 0;
        }
    }
}
