//! replaycast turns recorded classroom sessions into video.
//!
//! A session is a sparse list of timestamped events: whiteboard annotations drawn over a screen
//! capture, and chat messages. Replaying it produces one dense, deterministic frame stream:
//!
//! - [`AnnotationReplayEngine`] walks annotation commands over a source video and paints the
//!   visible annotations of the active page onto every frame.
//! - [`ChatReplayEngine`] renders a bounded chat window onto a blank canvas, evicting old
//!   messages ahead of time so new ones are always fully visible.
//! - [`StackedMerger`] combines slides, camera and chat videos side by side.
//!
//! Frames flow from a [`FrameSource`] into a [`FrameSink`]; decoding and MP4 encoding go through
//! the system `ffmpeg`.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Whiteboard annotation parsing, page state and replay.
pub mod annotate;
/// Parallel processing of many sessions.
pub mod batch;
/// Chat window, layout and replay.
pub mod chat;
/// Frame sinks (MP4, PNG sequence, in-memory).
pub mod encode;
/// Frame sources and video probing.
pub mod media;
/// Three-to-one video merge.
pub mod merge;
/// Raw session records and JSON loading.
pub mod record;
/// Frames, drawing surfaces and text.
pub mod render;
/// File-based jobs and batch manifests.
pub mod session;

pub use crate::foundation::core::{
    Canvas, Fps, FrameIndex, Point, Rect, ReplayState, Rgb8, Timestamp, frame_index,
    frame_index_secs, total_frames,
};
pub use crate::foundation::error::{ReplayError, ReplayResult};

pub use crate::annotate::{AnnotateOpts, AnnotationReplayEngine, CommandParser, ReplayStats};
pub use crate::chat::{ChatRenderOpts, ChatReplayEngine, ChatStats};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::png::PngSequenceSink;
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::media::ffmpeg::{FfmpegSource, VideoInfo, probe_video};
pub use crate::media::source::{FrameSource, InMemorySource};
pub use crate::merge::{MergeLayout, StackedMerger};
pub use crate::render::cpu::CpuSurface;
pub use crate::render::frame::FrameRGBA;
pub use crate::render::surface::{CharGridMetrics, DrawSurface, RecordingSurface, TextMeasure};
pub use crate::session::{BatchManifest, Job, JobReport, OutputTarget};
