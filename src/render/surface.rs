use crate::foundation::core::{Point, Rect, Rgb8};
use crate::foundation::error::{ReplayError, ReplayResult};
use crate::render::frame::FrameRGBA;

/// Result of wrapping a block of text to a maximum width.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WrappedText {
    /// Wrapped lines, top to bottom.
    pub lines: Vec<String>,
    /// Vertical advance of one line in pixels.
    pub line_height: f64,
}

impl WrappedText {
    /// Total height of all lines, without inter-line spacing.
    pub fn height(&self) -> f64 {
        self.lines.len() as f64 * self.line_height
    }
}

/// Text measurement used for layout decisions (word wrap and line advance).
///
/// Measurement must be the same one the renderer uses, otherwise chat look-ahead eviction would
/// reason about a different layout than the one that ends up on screen.
pub trait TextMeasure {
    /// Wrap `text` so that no line exceeds `max_width` pixels.
    fn wrap(&mut self, text: &str, max_width: f64) -> WrappedText;
}

/// A 2D drawing surface with the handful of primitives replays need.
///
/// A surface paints onto a *copy* of the base frame given to [`DrawSurface::begin`] and hands the
/// result back from [`DrawSurface::finish`]. No state leaks between `begin`/`finish` pairs.
pub trait DrawSurface: TextMeasure {
    /// Start a new frame on top of `base`.
    fn begin(&mut self, base: &FrameRGBA) -> ReplayResult<()>;
    /// Stroke straight segments between consecutive points.
    fn stroke_polyline(&mut self, points: &[Point], width: f64, color: Rgb8);
    /// Stroke the outline of `rect`.
    fn stroke_rect(&mut self, rect: Rect, width: f64, color: Rgb8);
    /// Draw one already-wrapped line of text with its top-left corner at `origin`.
    fn fill_text_line(&mut self, origin: Point, line: &str, color: Rgb8);
    /// Finish the frame and return the composited pixels.
    fn finish(&mut self) -> ReplayResult<FrameRGBA>;
}

/// Fixed-advance text measurement: every character is `advance` pixels wide.
///
/// This mirrors how the legacy renderer sized its wrap width (`span / font_size` characters) and
/// is fully deterministic, which makes it the measurement of choice for tests and for rendering
/// without a font file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharGridMetrics {
    /// Horizontal advance per character in pixels.
    pub advance: f64,
    /// Vertical advance per line in pixels.
    pub line_height: f64,
}

impl CharGridMetrics {
    /// Metrics for a font of `size_px` with the given line height.
    pub fn new(size_px: f64, line_height: f64) -> Self {
        Self {
            advance: size_px,
            line_height,
        }
    }

    /// Characters that fit in `max_width` (at least one).
    pub fn max_chars(&self, max_width: f64) -> usize {
        if self.advance.is_nan() || self.advance <= 0.0 || !max_width.is_finite() {
            return 1;
        }
        ((max_width / self.advance).floor() as usize).max(1)
    }
}

impl TextMeasure for CharGridMetrics {
    fn wrap(&mut self, text: &str, max_width: f64) -> WrappedText {
        WrappedText {
            lines: wrap_words(text, self.max_chars(max_width)),
            line_height: self.line_height,
        }
    }
}

/// Greedy whitespace word wrap to `max_chars` characters per line.
///
/// Whitespace runs collapse to single spaces. Words longer than a line start on a fresh line and
/// are split into `max_chars` pieces.
pub fn wrap_words(text: &str, max_chars: usize) -> Vec<String> {
    let max = max_chars.max(1);
    let mut lines = Vec::new();
    let mut cur = String::new();
    let mut cur_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if cur_len > 0 && cur_len + 1 + word_len <= max {
            cur.push(' ');
            cur.push_str(word);
            cur_len += 1 + word_len;
            continue;
        }
        if cur_len > 0 {
            lines.push(std::mem::take(&mut cur));
            cur_len = 0;
        }
        if word_len <= max {
            cur.push_str(word);
            cur_len = word_len;
            continue;
        }
        let chars: Vec<char> = word.chars().collect();
        let mut pieces = chars.chunks(max).peekable();
        while let Some(piece) = pieces.next() {
            if pieces.peek().is_some() {
                lines.push(piece.iter().collect());
            } else {
                cur = piece.iter().collect();
                cur_len = piece.len();
            }
        }
    }
    if cur_len > 0 {
        lines.push(cur);
    }
    lines
}

/// One primitive captured by a [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    /// A polyline stroke.
    Polyline {
        /// Stroked points.
        points: Vec<Point>,
        /// Stroke width.
        width: f64,
        /// Stroke color.
        color: Rgb8,
    },
    /// A rectangle outline.
    Rect {
        /// Outline rectangle.
        rect: Rect,
        /// Stroke width.
        width: f64,
        /// Stroke color.
        color: Rgb8,
    },
    /// A line of text.
    Text {
        /// Top-left corner.
        origin: Point,
        /// Line contents.
        line: String,
        /// Fill color.
        color: Rgb8,
    },
}

impl DrawCall {
    fn anchor(&self) -> Option<(Point, Rgb8)> {
        match self {
            Self::Polyline { points, color, .. } => points.first().map(|p| (*p, *color)),
            Self::Rect { rect, color, .. } => Some((rect.origin(), *color)),
            Self::Text { origin, color, .. } => Some((*origin, *color)),
        }
    }
}

/// Surface that records primitives instead of rasterizing them.
///
/// The returned frame is the base frame with the anchor pixel of every primitive set to the
/// primitive's color, so composited and passthrough frames stay distinguishable. Intended for
/// tests and dry runs.
#[derive(Debug)]
pub struct RecordingSurface {
    metrics: CharGridMetrics,
    frame: Option<FrameRGBA>,
    current: Vec<DrawCall>,
    /// Primitives of every finished frame, in order.
    pub frames: Vec<Vec<DrawCall>>,
}

impl RecordingSurface {
    /// Create a recording surface measuring text with `metrics`.
    pub fn new(metrics: CharGridMetrics) -> Self {
        Self {
            metrics,
            frame: None,
            current: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Primitives of the most recently finished frame.
    pub fn last_calls(&self) -> &[DrawCall] {
        self.frames.last().map(Vec::as_slice).unwrap_or(&[])
    }
}

impl TextMeasure for RecordingSurface {
    fn wrap(&mut self, text: &str, max_width: f64) -> WrappedText {
        self.metrics.wrap(text, max_width)
    }
}

impl DrawSurface for RecordingSurface {
    fn begin(&mut self, base: &FrameRGBA) -> ReplayResult<()> {
        self.frame = Some(base.clone());
        self.current.clear();
        Ok(())
    }

    fn stroke_polyline(&mut self, points: &[Point], width: f64, color: Rgb8) {
        self.current.push(DrawCall::Polyline {
            points: points.to_vec(),
            width,
            color,
        });
    }

    fn stroke_rect(&mut self, rect: Rect, width: f64, color: Rgb8) {
        self.current.push(DrawCall::Rect { rect, width, color });
    }

    fn fill_text_line(&mut self, origin: Point, line: &str, color: Rgb8) {
        self.current.push(DrawCall::Text {
            origin,
            line: line.to_owned(),
            color,
        });
    }

    fn finish(&mut self) -> ReplayResult<FrameRGBA> {
        let mut frame = self
            .frame
            .take()
            .ok_or_else(|| ReplayError::render("recording surface finished without begin"))?;
        for call in &self.current {
            let Some((p, color)) = call.anchor() else {
                continue;
            };
            if p.x < 0.0 || p.y < 0.0 {
                continue;
            }
            let (x, y) = (p.x as u32, p.y as u32);
            if x < frame.width && y < frame.height {
                let i = ((y as usize) * (frame.width as usize) + (x as usize)) * 4;
                frame.data[i..i + 4].copy_from_slice(&color.to_rgba());
            }
        }
        self.frames.push(std::mem::take(&mut self.current));
        Ok(frame)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
