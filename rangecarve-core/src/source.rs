// rangecarve_core/src/source.rs
use std::collections::VecDeque;

use crate::error::Result;

/// Sequential supplier of raw link-layer frames.
pub trait FrameSource {
    /// Total number of frames, when known up front. Informational only.
    fn frame_count(&mut self) -> Result<Option<u64>>;

    /// `Ok(None)` marks the end of data; any `Err` is fatal to the run.
    fn next_frame(&mut self) -> Result<Option<Vec<u8>>>;
}

/// Frames held in memory, handed out in insertion order.
#[derive(Clone, Debug, Default)]
pub struct MemFrameSource {
    frames: VecDeque<Vec<u8>>,
}

impl MemFrameSource {
    pub fn new(frames: impl IntoIterator<Item = Vec<u8>>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }
}

impl FrameSource for MemFrameSource {
    fn frame_count(&mut self) -> Result<Option<u64>> {
        Ok(Some(self.frames.len() as u64))
    }

    fn next_frame(&mut self) -> Result<Option<Vec<u8>>> {
        Ok(self.frames.pop_front())
    }
}
