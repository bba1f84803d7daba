//! Three-to-one merge: slides on the left, camera above chat on the right.

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, Fps, FrameIndex, Rgb8};
use crate::foundation::error::{ReplayError, ReplayResult};
use crate::media::source::FrameSource;
use crate::render::frame::FrameRGBA;

/// Input sizes of a merge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergeLayout {
    /// Slides stream (left column).
    pub slides: Canvas,
    /// Camera stream (top of the right column).
    pub camera: Canvas,
    /// Chat stream (bottom of the right column).
    pub chat: Canvas,
}

impl MergeLayout {
    /// `slides.width + camera.width` by `slides.height`.
    pub fn output(&self) -> ReplayResult<Canvas> {
        Canvas::new(
            self.slides.width.saturating_add(self.camera.width),
            self.slides.height,
        )
    }

    /// Compose one output frame. Parts that do not fit are cropped; uncovered area stays black.
    pub fn compose(
        &self,
        slides: &FrameRGBA,
        camera: &FrameRGBA,
        chat: &FrameRGBA,
    ) -> ReplayResult<FrameRGBA> {
        let out_canvas = self.output()?;
        let mut out = FrameRGBA::solid(out_canvas, Rgb8::BLACK);
        let right_x = self.slides.width;
        let right_w = self.camera.width;
        blit(&mut out, slides, 0, 0, self.slides.width, out_canvas.height);
        blit(&mut out, camera, right_x, 0, right_w, out_canvas.height);
        if camera.height < out_canvas.height {
            let rest = out_canvas.height - camera.height;
            blit(&mut out, chat, right_x, camera.height, right_w, rest);
        }
        Ok(out)
    }
}

/// Copy `src` into `dst` at `(x0, y0)`, clipped to a `max_w × max_h` region and to `dst`.
fn blit(dst: &mut FrameRGBA, src: &FrameRGBA, x0: u32, y0: u32, max_w: u32, max_h: u32) {
    let w = src.width.min(max_w).min(dst.width.saturating_sub(x0)) as usize;
    let h = src.height.min(max_h).min(dst.height.saturating_sub(y0)) as usize;
    if w == 0 || h == 0 {
        return;
    }
    let dst_stride = dst.width as usize * 4;
    let src_stride = src.width as usize * 4;
    for row in 0..h {
        let d = (y0 as usize + row) * dst_stride + x0 as usize * 4;
        let s = row * src_stride;
        dst.data[d..d + w * 4].copy_from_slice(&src.data[s..s + w * 4]);
    }
}

/// One merge input and the last frame it produced.
struct Track<'a> {
    name: &'static str,
    source: &'a mut dyn FrameSource,
    last: FrameRGBA,
    exhausted: bool,
}

impl<'a> Track<'a> {
    fn new(name: &'static str, source: &'a mut dyn FrameSource, canvas: Canvas) -> Self {
        Self {
            name,
            source,
            last: FrameRGBA::solid(canvas, Rgb8::BLACK),
            exhausted: false,
        }
    }

    fn advance(&mut self) -> ReplayResult<bool> {
        if self.exhausted {
            return Ok(false);
        }
        match self.source.read_frame()? {
            Some(frame) => {
                self.last = frame;
                Ok(true)
            }
            None => {
                tracing::debug!(track = self.name, "merge input exhausted, holding last frame");
                self.exhausted = true;
                Ok(false)
            }
        }
    }
}

/// Counters reported at the end of a merge.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct MergeStats {
    /// Frames pushed to the sink.
    pub frames_written: u64,
    /// Input frames that were held because their stream had ended.
    pub frames_held: u64,
}

/// Merges three streams frame by frame for a fixed number of frames.
#[derive(Clone, Copy, Debug)]
pub struct StackedMerger {
    layout: MergeLayout,
    fps: Fps,
    total_frames: u64,
}

impl StackedMerger {
    /// Merger producing `total_frames` frames.
    pub fn new(layout: MergeLayout, fps: Fps, total_frames: u64) -> ReplayResult<Self> {
        layout.output()?;
        Ok(Self {
            layout,
            fps,
            total_frames,
        })
    }

    /// Output frame size.
    pub fn output_canvas(&self) -> ReplayResult<Canvas> {
        self.layout.output()
    }

    /// Read one frame from every input per tick and push the composed frame.
    #[tracing::instrument(skip_all, fields(total_frames = self.total_frames))]
    pub fn run(
        &self,
        slides: &mut dyn FrameSource,
        camera: &mut dyn FrameSource,
        chat: &mut dyn FrameSource,
        sink: &mut dyn FrameSink,
    ) -> ReplayResult<MergeStats> {
        let mut tracks = [
            Track::new("slides", slides, self.layout.slides),
            Track::new("camera", camera, self.layout.camera),
            Track::new("chat", chat, self.layout.chat),
        ];
        let mut stats = MergeStats::default();
        sink.begin(SinkConfig::new(self.output_canvas()?, self.fps))?;
        for idx in 0..self.total_frames {
            for track in tracks.iter_mut() {
                if !track.advance()? {
                    stats.frames_held += 1;
                }
            }
            let [s, c, ch] = &tracks;
            let frame = self.layout.compose(&s.last, &c.last, &ch.last)?;
            sink.push_frame(FrameIndex(idx), &frame)?;
            stats.frames_written += 1;
        }
        sink.end()?;
        if tracks.iter().all(|t| t.exhausted) && stats.frames_written > 0 {
            tracing::warn!("every merge input ended before the requested length");
        }
        tracing::info!(
            frames_written = stats.frames_written,
            duration_secs = self.fps.frames_to_secs(stats.frames_written),
            held = stats.frames_held,
            "merge done"
        );
        Ok(stats)
    }
}

/// Longest of the given durations, in frames at `fps`.
pub fn merged_total_frames(durations_secs: &[f64], fps: Fps) -> ReplayResult<u64> {
    let max = durations_secs
        .iter()
        .copied()
        .filter(|d| d.is_finite())
        .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |a| a.max(d))))
        .ok_or_else(|| ReplayError::validation("merge needs at least one input duration"))?;
    Ok(crate::foundation::core::total_frames(max, fps))
}

#[cfg(test)]
#[path = "../tests/unit/merge.rs"]
mod tests;
