//! Display side of the viewfinder.

use filtercam_core::Frame;

/// Receives filtered frames on the UI-owning context.
///
/// Not `Send`: a sink is expected to hold UI handles that must stay on the
/// thread that created them.
pub trait DisplaySink {
    fn present(&mut self, frame: Frame);
}

impl<F: FnMut(Frame)> DisplaySink for F {
    fn present(&mut self, frame: Frame) {
        self(frame)
    }
}

/// Keeps the most recent frame and a count of everything presented.
#[derive(Debug, Default)]
pub struct LatestFrameSink {
    latest: Option<Frame>,
    presented: u64,
}

impl LatestFrameSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<&Frame> {
        self.latest.as_ref()
    }

    pub fn into_latest(self) -> Option<Frame> {
        self.latest
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl DisplaySink for LatestFrameSink {
    fn present(&mut self, frame: Frame) {
        self.presented += 1;
        self.latest = Some(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_sink_keeps_last_frame() {
        let mut sink = LatestFrameSink::new();
        assert!(sink.latest().is_none());
        for seq in 1..=3 {
            sink.present(Frame::uniform_rgba(1, 1, [0, 0, 0, 255]).with_sequence(seq));
        }
        assert_eq!(sink.presented(), 3);
        assert_eq!(sink.latest().map(|f| f.sequence), Some(3));
    }

    #[test]
    fn test_closure_is_a_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = |frame: Frame| seen.push(frame.sequence);
            sink.present(Frame::uniform_rgba(1, 1, [0; 4]).with_sequence(9));
        }
        assert_eq!(seen, vec![9]);
    }
}
