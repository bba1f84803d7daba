use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::foundation::core::{Canvas, Fps, total_frames};
use crate::foundation::error::{ReplayError, ReplayResult};
use crate::media::source::{FrameSource, RawRgbaReader};
use crate::render::frame::FrameRGBA;

/// Basic metadata about a source video file.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Average frame rate.
    pub fps: Fps,
    /// Duration in seconds.
    pub duration_secs: f64,
}

impl VideoInfo {
    /// Frame dimensions.
    pub fn canvas(&self) -> ReplayResult<Canvas> {
        Canvas::new(self.width, self.height)
    }

    /// `floor(duration × fps)`.
    pub fn total_frames(&self) -> u64 {
        total_frames(self.duration_secs, self.fps)
    }
}

/// Probe source video metadata through `ffprobe`.
pub fn probe_video(source_path: &Path) -> ReplayResult<VideoInfo> {
    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| ReplayError::source(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(ReplayError::source(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    parse_probe_json(&out.stdout)
}

/// Extract [`VideoInfo`] from `ffprobe -print_format json` output.
pub(crate) fn parse_probe_json(json: &[u8]) -> ReplayResult<VideoInfo> {
    #[derive(Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        avg_frame_rate: Option<String>,
        r_frame_rate: Option<String>,
        duration: Option<String>,
    }
    #[derive(Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(Deserialize)]
    struct ProbeOut {
        #[serde(default)]
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| ReplayError::serde(format!("ffprobe json parse failed: {e}")))?;
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| ReplayError::source("no video stream found"))?;
    let width = video
        .width
        .ok_or_else(|| ReplayError::source("missing video width from ffprobe"))?;
    let height = video
        .height
        .ok_or_else(|| ReplayError::source("missing video height from ffprobe"))?;

    let fps = [video.avg_frame_rate.as_deref(), video.r_frame_rate.as_deref()]
        .into_iter()
        .flatten()
        .find_map(parse_frame_rate)
        .ok_or_else(|| ReplayError::source("missing video frame rate from ffprobe"))?;

    let duration_secs = video
        .duration
        .as_deref()
        .or(parsed.format.as_ref().and_then(|f| f.duration.as_deref()))
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| ReplayError::source("missing duration from ffprobe"))?;

    Ok(VideoInfo {
        width,
        height,
        fps,
        duration_secs,
    })
}

/// Parse an ffprobe rate such as `"30000/1001"` or `"25"`. `"0/0"` yields `None`.
pub(crate) fn parse_frame_rate(raw: &str) -> Option<Fps> {
    let raw = raw.trim();
    match raw.split_once('/') {
        Some((n, d)) => {
            let num = n.trim().parse::<u32>().ok()?;
            let den = d.trim().parse::<u32>().ok()?;
            Fps::new(num, den).ok()
        }
        None => Fps::from_f64(raw.parse::<f64>().ok()?).ok(),
    }
}

/// Options for [`FfmpegSource`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FfmpegSourceOpts {
    /// Input video path.
    pub path: PathBuf,
    /// Resample the decoded stream to this rate.
    #[serde(default)]
    pub fps: Option<Fps>,
}

impl FfmpegSourceOpts {
    /// Decode `path` at its native rate.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fps: None,
        }
    }

    pub(crate) fn ffmpeg_args(&self) -> Vec<String> {
        let mut args: Vec<String> = ["-v", "error", "-nostdin", "-i"]
            .map(str::to_owned)
            .to_vec();
        args.push(self.path.to_string_lossy().into_owned());
        if let Some(fps) = self.fps {
            args.push("-r".to_owned());
            args.push(format!("{}/{}", fps.num, fps.den));
        }
        args.extend(["-an", "-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1"].map(str::to_owned));
        args
    }
}

/// Streams decoded frames out of a system `ffmpeg` process.
pub struct FfmpegSource {
    child: Option<Child>,
    reader: RawRgbaReader<ChildStdout>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    frames_read: u64,
}

impl FfmpegSource {
    /// Spawn `ffmpeg` decoding `opts.path` into frames of `canvas` size.
    pub fn spawn(opts: &FfmpegSourceOpts, canvas: Canvas) -> ReplayResult<Self> {
        if !crate::encode::ffmpeg::is_ffmpeg_on_path() {
            return Err(ReplayError::source(
                "ffmpeg is required for video decoding, but was not found on PATH",
            ));
        }
        let args = opts.ffmpeg_args();
        tracing::debug!(input = %opts.path.display(), ?args, "spawning ffmpeg decoder");
        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ReplayError::source(format!("failed to spawn ffmpeg: {e}")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ReplayError::source("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReplayError::source("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });
        Ok(Self {
            child: Some(child),
            reader: RawRgbaReader::new(stdout, canvas),
            stderr_drain: Some(stderr_drain),
            frames_read: 0,
        })
    }

    /// Probe `path` and open it at its native size and rate.
    pub fn open(path: &Path) -> ReplayResult<(Self, VideoInfo)> {
        let info = probe_video(path)?;
        let src = Self::spawn(&FfmpegSourceOpts::new(path), info.canvas()?)?;
        Ok((src, info))
    }

    fn reap(&mut self) -> ReplayResult<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child
            .wait()
            .map_err(|e| ReplayError::source(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ReplayError::source("ffmpeg stderr drain thread panicked"))?
                .unwrap_or_default(),
            None => Vec::new(),
        };
        if !status.success() {
            return Err(ReplayError::source(format!(
                "ffmpeg decoder exited with status {status} after {} frame(s): {}",
                self.frames_read,
                String::from_utf8_lossy(&stderr).trim()
            )));
        }
        Ok(())
    }
}

impl FrameSource for FfmpegSource {
    fn read_frame(&mut self) -> ReplayResult<Option<FrameRGBA>> {
        match self.reader.read_frame()? {
            Some(frame) => {
                self.frames_read += 1;
                Ok(Some(frame))
            }
            None => {
                self.reap()?;
                Ok(None)
            }
        }
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/ffmpeg.rs"]
mod tests;
