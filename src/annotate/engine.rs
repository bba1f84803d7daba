use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::annotate::command::{Command, CommandParser};
use crate::annotate::page::PageAnnotationState;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, Fps, FrameIndex, ReplayState, frame_index};
use crate::foundation::error::{ReplayError, ReplayResult};
use crate::media::source::FrameSource;
use crate::record::AnnotationRecord;
use crate::render::frame::FrameRGBA;
use crate::render::surface::DrawSurface;

/// Text settings for annotation rendering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotateOpts {
    /// Font size in pixels; also the per-character advance when no font is loaded.
    pub font_size_px: f32,
    /// Vertical advance between wrapped text lines.
    pub line_height_px: f64,
    /// TrueType/OpenType font for text annotations.
    pub font_path: Option<PathBuf>,
}

impl Default for AnnotateOpts {
    fn default() -> Self {
        Self {
            font_size_px: 16.0,
            line_height_px: 18.0,
            font_path: None,
        }
    }
}

/// Counters reported at the end of a replay.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReplayStats {
    /// Requested session length in frames.
    pub frames_total: u64,
    /// Frames pushed to the sink.
    pub frames_written: u64,
    /// Frames that had at least one annotation painted on them.
    pub frames_composited: u64,
    /// Draw/remove commands applied to a page.
    pub commands_applied: u64,
    /// Records dropped by the parser.
    pub commands_discarded: u64,
    /// Distinct pages referenced.
    pub pages: u64,
}

/// Replays annotation commands over a source video, one output frame per source frame.
pub struct AnnotationReplayEngine {
    fps: Fps,
    total_frames: u64,
    canvas: Canvas,
    parser: CommandParser,
    pages: HashMap<String, PageAnnotationState>,
    state: ReplayState,
    stats: ReplayStats,
}

impl AnnotationReplayEngine {
    /// Engine producing `total_frames` frames of `canvas` size at `fps`.
    pub fn new(canvas: Canvas, fps: Fps, total_frames: u64) -> Self {
        Self {
            fps,
            total_frames,
            canvas,
            parser: CommandParser::new(),
            pages: HashMap::new(),
            state: ReplayState::Idle,
            stats: ReplayStats {
                frames_total: total_frames,
                ..ReplayStats::default()
            },
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ReplayState {
        self.state
    }

    /// Annotation state of `page_id`, if the page was referenced.
    pub fn page(&self, page_id: &str) -> Option<&PageAnnotationState> {
        self.pages.get(page_id)
    }

    /// Replay `records` (in the given order) over `source`, pushing every frame into `sink`.
    ///
    /// Source exhaustion ends the run early without error. Sink failures abort the run.
    #[tracing::instrument(skip_all, fields(fps = self.fps.as_f64(), total_frames = self.total_frames))]
    pub fn run(
        &mut self,
        records: &[AnnotationRecord],
        source: &mut dyn FrameSource,
        surface: &mut dyn DrawSurface,
        sink: &mut dyn FrameSink,
    ) -> ReplayResult<ReplayStats> {
        if self.state != ReplayState::Idle {
            return Err(ReplayError::validation(
                "annotation replay engine can only run once",
            ));
        }
        let commands = self.parse_all(records);
        tracing::info!(
            commands = commands.len(),
            discarded = self.stats.commands_discarded,
            "annotation replay start"
        );

        sink.begin(SinkConfig::new(self.canvas, self.fps))?;
        self.state = ReplayState::Streaming;

        let mut cursor = FrameCursor::default();
        let mut last_page: Option<String> = None;
        let exhausted = 'stream: {
            for cmd in commands {
                let target = frame_index(cmd.timestamp, self.fps);
                self.touch_page(&cmd.page_id);
                while cursor.next < target.0 {
                    let Some(frame) = source.read_frame()? else {
                        break 'stream true;
                    };
                    self.emit(&mut cursor, &frame, &cmd.page_id, surface, sink)?;
                }

                if let Some(page) = self.pages.get_mut(&cmd.page_id) {
                    page.apply(cmd.event);
                    self.stats.commands_applied += 1;
                }
                let Some(frame) = source.read_frame()? else {
                    break 'stream true;
                };
                self.emit(&mut cursor, &frame, &cmd.page_id, surface, sink)?;
                last_page = Some(cmd.page_id);
            }

            self.state = ReplayState::Draining;
            while cursor.next < self.total_frames {
                let Some(frame) = source.read_frame()? else {
                    break 'stream true;
                };
                match last_page.as_deref() {
                    Some(page_id) => self.emit(&mut cursor, &frame, page_id, surface, sink)?,
                    None => cursor.passthrough(&frame, sink)?,
                }
            }
            false
        };

        if exhausted {
            tracing::warn!(
                frames_written = cursor.next,
                total_frames = self.total_frames,
                "source exhausted before the session ended"
            );
        }

        sink.end()?;
        self.state = ReplayState::Closed;
        self.stats.frames_written = cursor.next;
        self.stats.pages = self.pages.len() as u64;
        tracing::info!(
            frames_written = self.stats.frames_written,
            duration_secs = self.fps.frames_to_secs(self.stats.frames_written),
            frames_composited = self.stats.frames_composited,
            applied = self.stats.commands_applied,
            "annotation replay done"
        );
        Ok(self.stats.clone())
    }

    fn parse_all(&mut self, records: &[AnnotationRecord]) -> Vec<Command> {
        let mut out = Vec::with_capacity(records.len());
        for rec in records {
            match self.parser.parse_command(rec) {
                Ok(cmd) => out.push(cmd),
                Err(reason) => {
                    self.stats.commands_discarded += 1;
                    tracing::debug!(id = %rec.id, kind = %rec.kind, %reason, "discarding annotation record");
                }
            }
        }
        out
    }

    fn touch_page(&mut self, page_id: &str) {
        if !self.pages.contains_key(page_id) {
            tracing::debug!(page_id, "new page");
            self.pages
                .insert(page_id.to_owned(), PageAnnotationState::new(page_id));
        }
    }

    fn emit(
        &mut self,
        cursor: &mut FrameCursor,
        frame: &FrameRGBA,
        page_id: &str,
        surface: &mut dyn DrawSurface,
        sink: &mut dyn FrameSink,
    ) -> ReplayResult<()> {
        match self.pages.get(page_id) {
            Some(page) if !page.is_empty() => {
                let out = page.render(frame, surface)?;
                sink.push_frame(FrameIndex(cursor.next), &out)?;
                self.stats.frames_composited += 1;
                cursor.next += 1;
                Ok(())
            }
            _ => cursor.passthrough(frame, sink),
        }
    }
}

/// Index of the next output frame.
#[derive(Default)]
struct FrameCursor {
    next: u64,
}

impl FrameCursor {
    fn passthrough(&mut self, frame: &FrameRGBA, sink: &mut dyn FrameSink) -> ReplayResult<()> {
        sink.push_frame(FrameIndex(self.next), frame)?;
        self.next += 1;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/annotate/engine.rs"]
mod tests;
