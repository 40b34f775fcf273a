use crate::frame::PixelFormat;
use crate::transform::pipeline::FilterStage;

/// Reasons a pipeline invocation produced no frame.
///
/// None of these are retried. The caller drops the frame and the next one
/// starts from scratch.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error("frame is empty ({width}x{height})")]
    EmptyFrame { width: u32, height: u32 },
    #[error("malformed {format} frame: {reason}")]
    MalformedFrame { format: PixelFormat, reason: String },
    #[error("{stage} stage produced no output")]
    StageProductionFailure { stage: FilterStage },
}
