use crate::foundation::error::{ReplayError, ReplayResult};

pub use kurbo::{Point, Rect};

/// Slack added before flooring `secs × fps` so decimal timestamps such as `2.3` land on frame 23
/// at 10 fps instead of 22 after binary rounding.
const FLOOR_EPSILON: f64 = 1e-9;

/// Absolute 0-based frame index in output timeline space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> ReplayResult<Self> {
        if den == 0 {
            return Err(ReplayError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(ReplayError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Whole-number frame rate.
    pub fn whole(num: u32) -> ReplayResult<Self> {
        Self::new(num, 1)
    }

    /// Approximate a floating-point rate (as reported by `ffprobe`) with a millesimal rational.
    pub fn from_f64(fps: f64) -> ReplayResult<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(ReplayError::validation("fps must be finite and > 0"));
        }
        if fps.fract() == 0.0 && fps <= f64::from(u32::MAX) {
            return Self::new(fps as u32, 1);
        }
        let num = (fps * 1000.0).round();
        if num > f64::from(u32::MAX) {
            return Err(ReplayError::validation("fps is too large"));
        }
        Self::new(num as u32, 1000)
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Convert frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    /// Convert seconds to frame count using floor semantics.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        let frames = secs * f64::from(self.num) / f64::from(self.den);
        (frames + FLOOR_EPSILON).floor().max(0.0) as u64
    }
}

/// A point on the session clock, in seconds. Always finite and non-negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct Timestamp(f64);

impl Timestamp {
    /// Session start.
    pub const ZERO: Self = Self(0.0);

    /// Create a validated timestamp.
    pub fn new(secs: f64) -> ReplayResult<Self> {
        if !secs.is_finite() {
            return Err(ReplayError::validation("timestamp must be finite"));
        }
        if secs < 0.0 {
            return Err(ReplayError::validation(format!(
                "timestamp must be >= 0, got {secs}"
            )));
        }
        Ok(Self(secs))
    }

    /// Parse a decimal seconds string such as `"12.345"`.
    pub fn parse(s: &str) -> ReplayResult<Self> {
        let secs = s
            .trim()
            .parse::<f64>()
            .map_err(|e| ReplayError::validation(format!("invalid timestamp '{s}': {e}")))?;
        Self::new(secs)
    }

    /// Seconds since session start.
    pub fn secs(self) -> f64 {
        self.0
    }

    /// Length of the span between two boundary timestamps, regardless of their order.
    ///
    /// Legacy recordings occasionally store a stop time slightly before its start time.
    pub fn span_abs(start: Self, stop: Self) -> f64 {
        (stop.0 - start.0).abs()
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Map a timestamp to the first output frame at which it is visible (floor semantics).
pub fn frame_index(ts: Timestamp, fps: Fps) -> FrameIndex {
    FrameIndex(fps.secs_to_frames_floor(ts.secs()))
}

/// Raw-seconds variant of [`frame_index`].
///
/// # Panics
///
/// Panics when `secs` is negative or not finite; callers must validate boundary data first.
pub fn frame_index_secs(secs: f64, fps: Fps) -> FrameIndex {
    assert!(
        secs.is_finite() && secs >= 0.0,
        "frame_index_secs requires a finite non-negative timestamp, got {secs}"
    );
    FrameIndex(fps.secs_to_frames_floor(secs))
}

/// Total frame count for a session of `duration_secs` (floor semantics).
pub fn total_frames(duration_secs: f64, fps: Fps) -> u64 {
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return 0;
    }
    fps.secs_to_frames_floor(duration_secs)
}

/// Lifecycle of a replay run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub enum ReplayState {
    /// Constructed, nothing consumed yet.
    #[default]
    Idle,
    /// Consuming events and filling the gaps between them.
    Streaming,
    /// All events applied; filling up to the session total.
    Draining,
    /// Sink finalized.
    Closed,
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated non-empty canvas.
    pub fn new(width: u32, height: u32) -> ReplayResult<Self> {
        if width == 0 || height == 0 {
            return Err(ReplayError::validation("canvas width/height must be non-zero"));
        }
        Ok(Self { width, height })
    }

    /// Byte length of one tightly packed RGBA8 frame.
    pub fn rgba_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }
}

/// Opaque 8-bit RGB color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Black.
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Build a color from channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from a packed `0xRRGGBB` value (upper byte ignored).
    pub const fn from_packed(v: u32) -> Self {
        Self {
            r: ((v >> 16) & 0xff) as u8,
            g: ((v >> 8) & 0xff) as u8,
            b: (v & 0xff) as u8,
        }
    }

    /// Opaque RGBA8 bytes.
    pub const fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
