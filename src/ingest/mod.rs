//! Frame ingestion sources.
//!
//! Sources produce `RawFrame` instances for the frame loop. Real webcam
//! capture lives behind the same trait as the synthetic stub, so the
//! scan kernel never knows where pixels came from.

mod webcam;

pub use webcam::{WebcamConfig, WebcamSource, WebcamStats};

use anyhow::Result;

/// One captured frame.
#[derive(Clone, Debug)]
pub struct RawFrame {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Monotonic capture counter, starting at 1.
    pub frame_index: u64,
}

/// Source of frames for the scan loop.
pub trait FrameSource {
    /// Connect to the device or stream.
    fn connect(&mut self) -> Result<()>;

    /// Capture the next frame.
    fn next_frame(&mut self) -> Result<RawFrame>;

    /// Check if the source is healthy.
    fn is_healthy(&self) -> bool;
}
