use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{ReplayError, ReplayResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::frame::FrameRGBA;

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    #[serde(default = "default_overwrite")]
    pub overwrite: bool,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    #[serde(default = "default_bg")]
    pub bg_rgba: [u8; 4],
    /// Rescale the encoded video to this size.
    #[serde(default)]
    pub resize: Option<Canvas>,
    /// Media file whose first audio stream is muxed into the output. The video length is kept, so
    /// the audio should not outlast it.
    #[serde(default)]
    pub audio_path: Option<PathBuf>,
}

fn default_overwrite() -> bool {
    true
}

fn default_bg() -> [u8; 4] {
    [0, 0, 0, 255]
}

impl FfmpegSinkOpts {
    /// Create options for outputting an MP4 to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: default_overwrite(),
            bg_rgba: default_bg(),
            resize: None,
            audio_path: None,
        }
    }

    /// Rescale the encoded output to `size`.
    pub fn with_resize(mut self, size: Canvas) -> Self {
        self.resize = Some(size);
        self
    }

    /// Take the audio track from `path`.
    pub fn with_audio(mut self, path: impl Into<PathBuf>) -> Self {
        self.audio_path = Some(path.into());
        self
    }

    /// Full `ffmpeg` argument list for frames described by `cfg`.
    pub(crate) fn ffmpeg_args(&self, cfg: &SinkConfig) -> ReplayResult<Vec<String>> {
        validate_even(cfg.width, cfg.height, "ffmpeg sink width/height")?;
        let mut args: Vec<String> = Vec::new();
        args.push(if self.overwrite { "-y" } else { "-n" }.to_owned());

        // Input: raw RGBA8 frames, alpha already flattened in push_frame.
        args.extend(
            [
                "-loglevel",
                "error",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "-s",
            ]
            .map(str::to_owned),
        );
        args.push(format!("{}x{}", cfg.width, cfg.height));
        // For rawvideo input, `-r` before `-i` sets the input framerate.
        args.push("-r".to_owned());
        args.push(format!("{}/{}", cfg.fps.num, cfg.fps.den));
        args.extend(["-i", "pipe:0"].map(str::to_owned));
        match &self.audio_path {
            Some(audio) => {
                args.push("-i".to_owned());
                args.push(audio.to_string_lossy().into_owned());
                // An audio file without an audio stream maps nothing.
                args.extend(["-map", "0:v:0", "-map", "1:a:0?", "-c:a", "aac"].map(str::to_owned));
            }
            None => args.push("-an".to_owned()),
        }

        if let Some(size) = self.resize {
            validate_even(size.width, size.height, "resize width/height")?;
            args.push("-vf".to_owned());
            args.push(format!("scale={}:{}", size.width, size.height));
        }

        args.extend(
            [
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "-movflags",
                "+faststart",
            ]
            .map(str::to_owned),
        );
        args.push(self.out_path.to_string_lossy().into_owned());
        Ok(args)
    }
}

fn validate_even(width: u32, height: u32, what: &str) -> ReplayResult<()> {
    if width == 0 || height == 0 {
        return Err(ReplayError::validation(format!("{what} must be non-zero")));
    }
    if !width.is_multiple_of(2) || !height.is_multiple_of(2) {
        return Err(ReplayError::validation(format!(
            "{what} must be even (required for yuv420p mp4 output), got {width}x{height}"
        )));
    }
    Ok(())
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to stdin.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReplayResult<()> {
        let args = self.opts.ffmpeg_args(&cfg)?;

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(ReplayError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(ReplayError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        tracing::debug!(out = %self.opts.out_path.display(), ?args, "spawning ffmpeg encoder");
        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ReplayError::encode(format!(
                    "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReplayError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReplayError::encode("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.scratch = vec![0u8; Canvas { width: cfg.width, height: cfg.height }.rgba_len()];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReplayResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReplayError::encode("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(ReplayError::encode(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(ReplayError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }

        flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, &frame.data, self.opts.bg_rgba)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ReplayError::encode("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            ReplayError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> ReplayResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ReplayError::encode("ffmpeg sink not started"))?;

        let status = child
            .wait()
            .map_err(|e| ReplayError::encode(format!("failed to wait for ffmpeg to finish: {e}")))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ReplayError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| ReplayError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(ReplayError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        self.cfg = None;
        Ok(())
    }
}

pub(crate) fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> ReplayResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(ReplayError::validation(
            "flatten_premul_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = u16::from(bg_rgba[0]);
    let bg_g = u16::from(bg_rgba[1]);
    let bg_b = u16::from(bg_rgba[2]);

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        d[0] = (u16::from(s[0]) + mul_div255_u16(bg_r, inv)).min(255) as u8;
        d[1] = (u16::from(s[1]) + mul_div255_u16(bg_g, inv)).min(255) as u8;
        d[2] = (u16::from(s[2]) + mul_div255_u16(bg_b, inv)).min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReplayResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    tool_on_path("ffmpeg")
}

pub(crate) fn tool_on_path(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
