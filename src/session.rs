//! Job wiring: records and videos on disk in, encoded output on disk out.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::annotate::command::CommandParser;
use crate::annotate::engine::{AnnotateOpts, AnnotationReplayEngine, ReplayStats};
use crate::chat::engine::{ChatRenderOpts, ChatReplayEngine, ChatStats};
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::png::PngSequenceSink;
use crate::encode::sink::FrameSink;
use crate::foundation::core::{Canvas, Fps, Timestamp};
use crate::foundation::error::ReplayResult;
use crate::media::ffmpeg::{FfmpegSource, FfmpegSourceOpts, VideoInfo, probe_video};
use crate::merge::{MergeLayout, MergeStats, StackedMerger, merged_total_frames};
use crate::record::{RawSeconds, load_annotation_records, load_chat_records, load_json};
use crate::render::cpu::CpuSurface;
use crate::render::surface::CharGridMetrics;
use crate::render::text::{default_font_candidates, resolve_font};

/// Where frames go.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum OutputTarget {
    /// H.264 MP4 through `ffmpeg`.
    Mp4(FfmpegSinkOpts),
    /// Numbered PNG files in a directory.
    Png {
        /// Output directory.
        dir: PathBuf,
    },
}

impl OutputTarget {
    /// MP4 output at `path`.
    pub fn mp4(path: impl Into<PathBuf>) -> Self {
        Self::Mp4(FfmpegSinkOpts::new(path))
    }

    /// PNG sequence output in `dir`.
    pub fn png(dir: impl Into<PathBuf>) -> Self {
        Self::Png { dir: dir.into() }
    }

    fn open(&self) -> Box<dyn FrameSink> {
        match self {
            Self::Mp4(opts) => Box::new(FfmpegSink::new(opts.clone())),
            Self::Png { dir } => Box::new(PngSequenceSink::new(dir)),
        }
    }

    /// Mux the audio of `path` into MP4 output unless another audio source is already set.
    fn with_audio(&self, path: &Path) -> Self {
        match self {
            Self::Mp4(opts) if opts.audio_path.is_none() => {
                Self::Mp4(opts.clone().with_audio(path))
            }
            _ => self.clone(),
        }
    }

    /// Rescale MP4 output to `size` unless the frames already have that size.
    fn with_resize(&self, size: Option<Canvas>, native: Canvas) -> Self {
        match (self, size) {
            (Self::Mp4(opts), Some(size)) if size != native => Self::Mp4(opts.clone().with_resize(size)),
            _ => self.clone(),
        }
    }
}

/// Annotate a source video with a whiteboard recording.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnotateJob {
    /// JSON array of annotation records.
    pub records: PathBuf,
    /// Source video.
    pub video: PathBuf,
    /// Output target.
    pub output: OutputTarget,
    /// Text settings.
    #[serde(default)]
    pub opts: AnnotateOpts,
    /// Rescale the output (MP4 only).
    #[serde(default)]
    pub resize: Option<Canvas>,
}

/// Render a chat transcript.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatJob {
    /// JSON array of chat records.
    pub records: PathBuf,
    /// Output target.
    pub output: OutputTarget,
    /// Rendering options.
    #[serde(default)]
    pub opts: ChatRenderOpts,
}

/// Merge slides, camera and chat videos into one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MergeJob {
    /// Slides video (left column).
    pub slides: PathBuf,
    /// Camera video (top right); its audio becomes the audio of MP4 output.
    pub camera: PathBuf,
    /// Chat video (bottom right).
    pub chat: PathBuf,
    /// Output target.
    pub output: OutputTarget,
    /// Output frame rate; every input is resampled to it.
    #[serde(default = "default_merge_fps")]
    pub fps: Fps,
}

fn default_merge_fps() -> Fps {
    Fps { num: 10, den: 1 }
}

/// One unit of work in a batch manifest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Job {
    /// See [`AnnotateJob`].
    Annotate(AnnotateJob),
    /// See [`ChatJob`].
    Chat(ChatJob),
    /// See [`MergeJob`].
    Merge(MergeJob),
}

/// Outcome of one job.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobReport {
    /// Annotation replay counters.
    Annotate(ReplayStats),
    /// Chat replay counters.
    Chat(ChatStats),
    /// Merge counters.
    Merge(MergeStats),
}

impl Job {
    /// Short label for logs.
    pub fn label(&self) -> String {
        match self {
            Self::Annotate(j) => format!("annotate {}", j.records.display()),
            Self::Chat(j) => format!("chat {}", j.records.display()),
            Self::Merge(j) => format!("merge {}", j.slides.display()),
        }
    }

    /// Run the job with fresh state.
    pub fn run(&self) -> ReplayResult<JobReport> {
        match self {
            Self::Annotate(j) => run_annotate(j).map(JobReport::Annotate),
            Self::Chat(j) => run_chat(j).map(JobReport::Chat),
            Self::Merge(j) => run_merge(j).map(JobReport::Merge),
        }
    }
}

/// A list of jobs loaded from JSON.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchManifest {
    /// Jobs in output order.
    pub jobs: Vec<Job>,
    /// Worker threads; `None` uses rayon defaults.
    #[serde(default)]
    pub threads: Option<usize>,
}

impl BatchManifest {
    /// Load a manifest from a JSON file.
    pub fn from_path(path: &Path) -> ReplayResult<Self> {
        load_json(path)
    }
}

/// CPU surface for a job.
///
/// Uses `font_path` when given, otherwise the first default font found on the system. When
/// `text_required` is set and no font can be loaded, the job fails instead of silently dropping
/// its text.
pub fn build_surface(
    font_path: Option<&Path>,
    size_px: f32,
    line_height_px: f64,
    text_required: bool,
) -> ReplayResult<CpuSurface> {
    let font = resolve_font(font_path, &default_font_candidates(), size_px, text_required)?;
    if font.is_none() {
        tracing::debug!("no font loaded; text measured with fixed-advance metrics");
    }
    Ok(CpuSurface::new(
        font,
        CharGridMetrics::new(f64::from(size_px), line_height_px),
    ))
}

/// Annotate `job.video` and write the result.
pub fn run_annotate(job: &AnnotateJob) -> ReplayResult<ReplayStats> {
    let records = load_annotation_records(&job.records)?;
    let parser = CommandParser::new();
    let mut surface = build_surface(
        job.opts.font_path.as_deref(),
        job.opts.font_size_px,
        job.opts.line_height_px,
        records.iter().any(|r| parser.carries_text(r)),
    )?;
    let info: VideoInfo = probe_video(&job.video)?;
    let span = record_span_secs(records.iter().map(|r| &r.timestamp));
    if span.is_some_and(|secs| secs > info.duration_secs) {
        tracing::warn!(
            span_secs = span,
            video_secs = info.duration_secs,
            "annotation commands run past the end of the video"
        );
    }
    let canvas = info.canvas()?;
    let mut source = FfmpegSource::spawn(&FfmpegSourceOpts::new(&job.video), canvas)?;
    let mut sink = job.output.with_resize(job.resize, canvas).open();
    let mut engine = AnnotationReplayEngine::new(canvas, info.fps, info.total_frames());
    engine.run(&records, &mut source, &mut surface, &mut sink)
}

/// Render `job.records` as a chat overlay.
pub fn run_chat(job: &ChatJob) -> ReplayResult<ChatStats> {
    let records = load_chat_records(&job.records)?;
    let mut surface = build_surface(
        job.opts.font_path.as_deref(),
        job.opts.font_size_px,
        job.opts.line_height_px,
        !records.is_empty(),
    )?;
    tracing::debug!(
        span_secs = record_span_secs(records.iter().map(|r| &r.timestamp)),
        "chat transcript loaded"
    );
    let mut sink = job.output.open();
    let mut engine = ChatReplayEngine::new(job.opts.clone())?;
    engine.run(&records, &mut surface, &mut sink)
}

/// Seconds between the first and last valid record timestamps, in either order.
///
/// Transcripts are stored in file order, which some recorders write slightly out of time order.
fn record_span_secs<'a>(stamps: impl IntoIterator<Item = &'a RawSeconds>) -> Option<f64> {
    let mut valid = stamps
        .into_iter()
        .filter_map(|raw| raw.to_secs().and_then(Timestamp::new).ok());
    let first = valid.next()?;
    let last = valid.last().unwrap_or(first);
    Some(Timestamp::span_abs(first, last))
}

/// Merge the three inputs of `job`.
pub fn run_merge(job: &MergeJob) -> ReplayResult<MergeStats> {
    let slides = probe_video(&job.slides)?;
    let camera = probe_video(&job.camera)?;
    let chat = probe_video(&job.chat)?;
    let layout = MergeLayout {
        slides: slides.canvas()?,
        camera: camera.canvas()?,
        chat: chat.canvas()?,
    };
    let total = merged_total_frames(
        &[slides.duration_secs, camera.duration_secs, chat.duration_secs],
        job.fps,
    )?;
    let open = |path: &Path, canvas: Canvas| {
        let mut opts = FfmpegSourceOpts::new(path);
        opts.fps = Some(job.fps);
        FfmpegSource::spawn(&opts, canvas)
    };
    let mut slides_src = open(&job.slides, layout.slides)?;
    let mut camera_src = open(&job.camera, layout.camera)?;
    let mut chat_src = open(&job.chat, layout.chat)?;
    let mut sink = job.output.with_audio(&job.camera).open();
    StackedMerger::new(layout, job.fps, total)?.run(
        &mut slides_src,
        &mut camera_src,
        &mut chat_src,
        &mut sink,
    )
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
