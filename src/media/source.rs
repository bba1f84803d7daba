use std::collections::VecDeque;
use std::io::Read;

use crate::foundation::core::Canvas;
use crate::foundation::error::{ReplayError, ReplayResult};
use crate::foundation::math::premultiply_rgba8_in_place;
use crate::render::frame::FrameRGBA;

/// Pull-based stream of decoded frames.
///
/// `Ok(None)` means the stream is exhausted; it is not an error. Once a source returned `None` it
/// keeps returning `None`.
pub trait FrameSource: Send {
    /// Read the next frame.
    fn read_frame(&mut self) -> ReplayResult<Option<FrameRGBA>>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn read_frame(&mut self) -> ReplayResult<Option<FrameRGBA>> {
        (**self).read_frame()
    }
}

/// Frames held in memory, yielded front to back.
#[derive(Debug, Default)]
pub struct InMemorySource {
    frames: VecDeque<FrameRGBA>,
    read: u64,
}

impl InMemorySource {
    /// Source yielding `frames` in order.
    pub fn new(frames: Vec<FrameRGBA>) -> Self {
        Self {
            frames: frames.into(),
            read: 0,
        }
    }

    /// `count` copies of `frame`.
    pub fn repeat(frame: &FrameRGBA, count: usize) -> Self {
        Self::new(vec![frame.clone(); count])
    }

    /// Frames handed out so far.
    pub fn frames_read(&self) -> u64 {
        self.read
    }

    /// Frames not yet read.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for InMemorySource {
    fn read_frame(&mut self) -> ReplayResult<Option<FrameRGBA>> {
        let next = self.frames.pop_front();
        if next.is_some() {
            self.read += 1;
        }
        Ok(next)
    }
}

/// Reads tightly packed straight-alpha RGBA8 frames of a fixed size from a byte stream.
///
/// A clean end of stream yields `None`. A truncated trailing frame is dropped with a warning.
#[derive(Debug)]
pub struct RawRgbaReader<R> {
    reader: R,
    canvas: Canvas,
    done: bool,
}

impl<R: Read> RawRgbaReader<R> {
    /// Wrap `reader` producing frames of `canvas` size.
    pub fn new(reader: R, canvas: Canvas) -> Self {
        Self {
            reader,
            canvas,
            done: false,
        }
    }

    /// Frame size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn fill(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let mut filled = 0usize;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

impl<R: Read + Send> FrameSource for RawRgbaReader<R> {
    fn read_frame(&mut self) -> ReplayResult<Option<FrameRGBA>> {
        if self.done {
            return Ok(None);
        }
        let mut buf = vec![0u8; self.canvas.rgba_len()];
        let n = self
            .fill(&mut buf)
            .map_err(|e| ReplayError::source(format!("failed to read raw frame: {e}")))?;
        if n < buf.len() {
            self.done = true;
            if n > 0 {
                tracing::warn!(
                    got = n,
                    expected = buf.len(),
                    "dropping truncated trailing frame"
                );
            }
            return Ok(None);
        }
        premultiply_rgba8_in_place(&mut buf);
        FrameRGBA::from_rgba8(self.canvas.width, self.canvas.height, buf).map(Some)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/source.rs"]
mod tests;
