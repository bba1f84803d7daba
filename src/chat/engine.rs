use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::chat::layout::ChatLayout;
use crate::chat::message::ChatMessage;
use crate::chat::palette::SenderPalette;
use crate::chat::window::ChatWindow;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{
    Canvas, Fps, FrameIndex, ReplayState, Rgb8, frame_index, total_frames,
};
use crate::foundation::error::{ReplayError, ReplayResult};
use crate::record::ChatRecord;
use crate::render::frame::FrameRGBA;
use crate::render::surface::{CharGridMetrics, DrawSurface};

/// Chat rendering options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatRenderOpts {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels; also the look-ahead height budget.
    pub height: u32,
    /// Output frame rate.
    pub fps: Fps,
    /// Maximum number of messages on screen.
    pub capacity: usize,
    /// Left margin of every line.
    pub x_offset: f64,
    /// Gap above every message and below every line.
    pub y_offset: f64,
    /// Font size in pixels; also the per-character advance when no font is loaded.
    pub font_size_px: f32,
    /// Height of one text line.
    pub line_height_px: f64,
    /// Canvas color.
    pub background: Rgb8,
    /// Text color for senders without an assigned color.
    pub fallback_color: Rgb8,
    /// TrueType/OpenType font for message text.
    pub font_path: Option<PathBuf>,
    /// Session length; defaults to the last message's timestamp.
    pub duration_secs: Option<f64>,
}

impl Default for ChatRenderOpts {
    fn default() -> Self {
        Self {
            width: 320,
            height: 300,
            fps: Fps { num: 10, den: 1 },
            capacity: 10,
            x_offset: 10.0,
            y_offset: 5.0,
            font_size_px: 16.0,
            line_height_px: 18.0,
            background: Rgb8::new(244, 244, 244),
            fallback_color: Rgb8::new(10, 10, 10),
            font_path: None,
            duration_secs: None,
        }
    }
}

impl ChatRenderOpts {
    /// Output canvas.
    pub fn canvas(&self) -> ReplayResult<Canvas> {
        Canvas::new(self.width, self.height)
    }

    /// Fixed-advance metrics matching the configured font size.
    pub fn fallback_metrics(&self) -> CharGridMetrics {
        CharGridMetrics::new(f64::from(self.font_size_px), self.line_height_px)
    }
}

/// Counters reported at the end of a chat replay.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ChatStats {
    /// Session length in frames.
    pub frames_total: u64,
    /// Frames pushed to the sink.
    pub frames_written: u64,
    /// Messages appended to the window.
    pub messages_admitted: u64,
    /// Messages removed by capacity or look-ahead eviction.
    pub messages_evicted: u64,
    /// Records dropped because they could not be parsed.
    pub messages_discarded: u64,
    /// Distinct senders.
    pub senders: u64,
}

/// Synthesizes chat overlay frames on a blank canvas.
pub struct ChatReplayEngine {
    opts: ChatRenderOpts,
    layout: ChatLayout,
    window: ChatWindow,
    background: FrameRGBA,
    state: ReplayState,
    stats: ChatStats,
}

impl ChatReplayEngine {
    /// Validate `opts` and create an idle engine.
    pub fn new(opts: ChatRenderOpts) -> ReplayResult<Self> {
        let canvas = opts.canvas()?;
        if let Some(d) = opts.duration_secs
            && (!d.is_finite() || d < 0.0)
        {
            return Err(ReplayError::validation(format!(
                "chat duration must be finite and >= 0, got {d}"
            )));
        }
        let window = ChatWindow::new(opts.capacity)?;
        Ok(Self {
            layout: ChatLayout {
                canvas,
                x_offset: opts.x_offset,
                y_offset: opts.y_offset,
            },
            window,
            background: FrameRGBA::solid(canvas, opts.background),
            opts,
            state: ReplayState::Idle,
            stats: ChatStats::default(),
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ReplayState {
        self.state
    }

    /// Messages on screen.
    pub fn window(&self) -> &ChatWindow {
        &self.window
    }

    /// Render `records` and push every frame into `sink`.
    #[tracing::instrument(skip_all, fields(fps = self.opts.fps.as_f64(), capacity = self.opts.capacity))]
    pub fn run(
        &mut self,
        records: &[ChatRecord],
        surface: &mut dyn DrawSurface,
        sink: &mut dyn FrameSink,
    ) -> ReplayResult<ChatStats> {
        if self.state != ReplayState::Idle {
            return Err(ReplayError::validation("chat replay engine can only run once"));
        }
        let messages = self.parse_all(records);
        let palette = SenderPalette::build(&messages, self.opts.fallback_color);
        let total = match self.opts.duration_secs {
            Some(d) => total_frames(d, self.opts.fps),
            None => messages
                .last()
                .map_or(0, |m| frame_index(m.timestamp, self.opts.fps).0),
        };
        self.stats.frames_total = total;
        self.stats.senders = palette.len() as u64;
        tracing::info!(
            messages = messages.len(),
            senders = palette.len(),
            total_frames = total,
            "chat replay start"
        );

        sink.begin(SinkConfig::new(self.layout.canvas, self.opts.fps))?;
        self.state = ReplayState::Streaming;

        let mut next = 0u64;
        for msg in messages {
            let target = frame_index(msg.timestamp, self.opts.fps);
            self.foresee(surface);
            while next < target.0 {
                self.emit(next, &palette, surface, sink)?;
                next += 1;
            }
            if self.window.admit(msg).is_some() {
                self.stats.messages_evicted += 1;
            }
            self.stats.messages_admitted += 1;
            self.foresee(surface);
            self.emit(next, &palette, surface, sink)?;
            next += 1;
        }

        self.state = ReplayState::Draining;
        while next < total {
            self.foresee(surface);
            self.emit(next, &palette, surface, sink)?;
            next += 1;
        }

        sink.end()?;
        self.state = ReplayState::Closed;
        self.stats.frames_written = next;
        tracing::info!(
            frames_written = next,
            admitted = self.stats.messages_admitted,
            evicted = self.stats.messages_evicted,
            "chat replay done"
        );
        Ok(self.stats.clone())
    }

    /// Valid messages in timestamp order; equal timestamps keep transcript order.
    fn parse_all(&mut self, records: &[ChatRecord]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(records.len());
        for rec in records {
            match ChatMessage::from_record(rec) {
                Ok(m) => messages.push(m),
                Err(err) => {
                    self.stats.messages_discarded += 1;
                    tracing::warn!(sender = %rec.sender_id, %err, "discarding chat record");
                }
            }
        }
        messages.sort_by_key(|m| m.timestamp);
        messages
    }

    fn foresee(&mut self, surface: &mut dyn DrawSurface) {
        let layout = self.layout;
        let evicted = self
            .window
            .foresee_and_evict(layout.budget(), |m| layout.message_height(&mut *surface, m));
        self.stats.messages_evicted += evicted as u64;
    }

    fn emit(
        &self,
        idx: u64,
        palette: &SenderPalette,
        surface: &mut dyn DrawSurface,
        sink: &mut dyn FrameSink,
    ) -> ReplayResult<()> {
        let frame = self
            .layout
            .render_window(&self.window, palette, &self.background, surface)?;
        sink.push_frame(FrameIndex(idx), &frame)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/chat/engine.rs"]
mod tests;
