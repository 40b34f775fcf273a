//! Depth-one mailbox between the capture and processing workers.
//!
//! Holds at most one frame. A new frame replaces an unconsumed one, so the
//! processing worker always starts on the newest capture and never works
//! through a backlog.

use filtercam_core::Frame;
use parking_lot::{Condvar, Mutex};

#[derive(Debug, Default)]
pub struct FrameSlot {
    state: Mutex<SlotState>,
    cv: Condvar,
}

#[derive(Debug, Default)]
struct SlotState {
    latest: Option<Frame>,
    closed: bool,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Post a frame. Returns `true` when it superseded one nobody took.
    ///
    /// Frames posted after [`close`](Self::close) are dropped.
    pub fn push(&self, frame: Frame) -> bool {
        let mut guard = self.state.lock();
        if guard.closed {
            return false;
        }
        let superseded = guard.latest.replace(frame).is_some();
        self.cv.notify_one();
        superseded
    }

    /// Wait for a frame. Returns `None` once the slot is closed and empty.
    pub fn take_blocking(&self) -> Option<Frame> {
        let mut guard = self.state.lock();
        loop {
            if let Some(frame) = guard.latest.take() {
                return Some(frame);
            }
            if guard.closed {
                return None;
            }
            self.cv.wait(&mut guard);
        }
    }

    /// Take the pending frame, if any, without waiting.
    pub fn try_take(&self) -> Option<Frame> {
        self.state.lock().latest.take()
    }

    /// Stop accepting frames. A frame already pending can still be taken.
    pub fn close(&self) {
        self.state.lock().closed = true;
        self.cv.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn frame(sequence: u64) -> Frame {
        Frame::uniform_rgba(2, 2, [0, 0, 0, 255]).with_sequence(sequence)
    }

    #[test]
    fn test_latest_frame_wins() {
        let slot = FrameSlot::new();
        assert!(!slot.push(frame(1)));
        assert!(slot.push(frame(2)));
        assert!(slot.push(frame(3)));
        assert_eq!(slot.try_take().map(|f| f.sequence), Some(3));
        assert!(slot.try_take().is_none());
    }

    #[test]
    fn test_close_drains_pending_frame_then_ends() {
        let slot = FrameSlot::new();
        slot.push(frame(7));
        slot.close();
        assert!(slot.is_closed());
        assert_eq!(slot.take_blocking().map(|f| f.sequence), Some(7));
        assert!(slot.take_blocking().is_none());
    }

    #[test]
    fn test_push_after_close_is_dropped() {
        let slot = FrameSlot::new();
        slot.close();
        assert!(!slot.push(frame(1)));
        assert!(slot.try_take().is_none());
    }

    #[test]
    fn test_take_blocking_wakes_on_push() {
        let slot = Arc::new(FrameSlot::new());
        let consumer = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || slot.take_blocking().map(|f| f.sequence))
        };
        thread::sleep(Duration::from_millis(20));
        slot.push(frame(42));
        assert_eq!(consumer.join().expect("consumer thread"), Some(42));
    }

    #[test]
    fn test_take_blocking_wakes_on_close() {
        let slot = Arc::new(FrameSlot::new());
        let consumer = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || slot.take_blocking().is_none())
        };
        thread::sleep(Duration::from_millis(20));
        slot.close();
        assert!(consumer.join().expect("consumer thread"));
    }
}
