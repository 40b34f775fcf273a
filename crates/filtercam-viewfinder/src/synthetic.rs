//! Software capture sources for running the viewfinder without a camera.

use std::thread;
use std::time::{Duration, Instant};

use filtercam_core::{Frame, PixelFormat};

use crate::capture::{CaptureFormat, CaptureSource};

/// Reported as the ceiling for sources that are not paced.
const UNPACED_MAX_FPS: u32 = 1000;

/// Sleeps between frames to hold a frame rate, and counts down an optional
/// frame limit.
#[derive(Debug)]
struct Pacer {
    interval: Option<Duration>,
    next_deadline: Option<Instant>,
    remaining: Option<u64>,
}

impl Pacer {
    fn new() -> Self {
        Self {
            interval: None,
            next_deadline: None,
            remaining: None,
        }
    }

    fn set_frame_rate(&mut self, fps: u32) {
        self.interval = (fps > 0).then(|| Duration::from_secs_f64(1.0 / fps as f64));
        self.next_deadline = None;
    }

    fn max_fps(&self) -> u32 {
        match self.interval {
            Some(interval) => (1.0 / interval.as_secs_f64()).round() as u32,
            None => UNPACED_MAX_FPS,
        }
    }

    /// Wait for the next frame time. Returns `false` once the limit is spent.
    fn tick(&mut self) -> bool {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return false;
            }
            *remaining -= 1;
        }

        if let Some(interval) = self.interval {
            let now = Instant::now();
            let deadline = *self.next_deadline.get_or_insert(now);
            if deadline > now {
                thread::sleep(deadline - now);
            }
            // Resync instead of bursting after a stall.
            let next = deadline + interval;
            self.next_deadline = Some(if next < now { now + interval } else { next });
        }
        true
    }
}

/// A moving color gradient in any supported pixel format.
#[derive(Debug)]
pub struct TestPatternSource {
    width: u32,
    height: u32,
    format: PixelFormat,
    sequence: u64,
    pacer: Pacer,
}

impl TestPatternSource {
    /// An unpaced RGBA pattern with no frame limit.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            format: PixelFormat::Rgba8,
            sequence: 0,
            pacer: Pacer::new(),
        }
    }

    pub fn with_format(mut self, format: PixelFormat) -> Self {
        self.format = format;
        self
    }

    /// Deliver at most `fps` frames per second. Zero removes pacing.
    pub fn with_frame_rate(mut self, fps: u32) -> Self {
        self.pacer.set_frame_rate(fps);
        self
    }

    /// End the stream after `frames` frames.
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.pacer.remaining = Some(frames);
        self
    }

    fn render(&self) -> Frame {
        let (w, h) = (self.width as usize, self.height as usize);
        let phase = (self.sequence % 256) as usize;
        let mut data = Vec::with_capacity(w * h * self.format.bytes_per_pixel());

        for y in 0..h {
            let g = (y * 255 / h.max(2).saturating_sub(1)).min(255) as u8;
            let mut x = 0;
            while x < w {
                let rgb_at = |x: usize| -> [u8; 3] {
                    let r = ((x * 255 / w.max(1) + phase) % 256) as u8;
                    let b = (255 - phase) as u8;
                    [r, g, b]
                };
                match self.format {
                    PixelFormat::Rgba8 => {
                        let [r, g, b] = rgb_at(x);
                        data.extend_from_slice(&[r, g, b, 255]);
                        x += 1;
                    }
                    PixelFormat::Bgra8 => {
                        let [r, g, b] = rgb_at(x);
                        data.extend_from_slice(&[b, g, r, 255]);
                        x += 1;
                    }
                    PixelFormat::Rgb8 => {
                        data.extend_from_slice(&rgb_at(x));
                        x += 1;
                    }
                    PixelFormat::Yuyv => {
                        // Chroma from the left pixel of each pair.
                        let left = rgb_at(x);
                        let right = rgb_at((x + 1).min(w - 1));
                        let [y0, u, v] = rgb_to_yuv(left);
                        let [y1, _, _] = rgb_to_yuv(right);
                        data.extend_from_slice(&[y0, u, y1, v]);
                        x += 2;
                    }
                }
            }
        }

        Frame::new(self.width, self.height, self.format, data).with_sequence(self.sequence)
    }
}

impl CaptureSource for TestPatternSource {
    fn next_frame(&mut self) -> Option<Frame> {
        if !self.pacer.tick() {
            return None;
        }
        self.sequence += 1;
        Some(self.render())
    }

    fn supported_formats(&self) -> Vec<CaptureFormat> {
        let max_fps = self.pacer.max_fps();
        let others = [
            PixelFormat::Bgra8,
            PixelFormat::Rgba8,
            PixelFormat::Rgb8,
            PixelFormat::Yuyv,
        ]
        .into_iter()
        .filter(|f| *f != self.format);
        std::iter::once(self.format)
            .chain(others)
            .filter(|f| *f != PixelFormat::Yuyv || self.width % 2 == 0)
            .map(|pixel_format| CaptureFormat {
                width: self.width,
                height: self.height,
                pixel_format,
                max_fps,
            })
            .collect()
    }

    fn configure(&mut self, format: CaptureFormat) {
        self.width = format.width;
        self.height = format.height;
        self.format = format.pixel_format;
    }
}

/// Repeats one frame, e.g. a still loaded from disk, with fresh sequence
/// numbers.
#[derive(Debug)]
pub struct StillFrameSource {
    frame: Frame,
    sequence: u64,
    pacer: Pacer,
}

impl StillFrameSource {
    pub fn new(frame: Frame) -> Self {
        Self {
            frame,
            sequence: 0,
            pacer: Pacer::new(),
        }
    }

    /// Deliver at most `fps` frames per second. Zero removes pacing.
    pub fn with_frame_rate(mut self, fps: u32) -> Self {
        self.pacer.set_frame_rate(fps);
        self
    }

    /// End the stream after `frames` frames.
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.pacer.remaining = Some(frames);
        self
    }
}

impl CaptureSource for StillFrameSource {
    fn next_frame(&mut self) -> Option<Frame> {
        if !self.pacer.tick() {
            return None;
        }
        self.sequence += 1;
        Some(self.frame.clone().with_sequence(self.sequence))
    }

    fn supported_formats(&self) -> Vec<CaptureFormat> {
        vec![CaptureFormat {
            width: self.frame.width,
            height: self.frame.height,
            pixel_format: self.frame.format,
            max_fps: self.pacer.max_fps(),
        }]
    }
}

/// RGB to YUV (BT.601, full range).
fn rgb_to_yuv([r, g, b]: [u8; 3]) -> [u8; 3] {
    let (r, g, b) = (r as f32, g as f32, b as f32);
    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let u = (b - y) * 0.564 + 128.0;
    let v = (r - y) * 0.713 + 128.0;
    let to_u8 = |c: f32| (c + 0.5).clamp(0.0, 255.0) as u8;
    [to_u8(y), to_u8(u), to_u8(v)]
}
