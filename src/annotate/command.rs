use std::sync::LazyLock;

use regex::Regex;

use crate::foundation::core::{Rgb8, Timestamp};
use crate::record::AnnotationRecord;

/// Shape of a drawn annotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawKind {
    /// Multi-point freehand stroke.
    FreeLine,
    /// Text box spanned by two points.
    Text,
    /// Rectangle outline spanned by two points.
    Rectangle,
    /// Straight line (two or more points).
    Line,
    /// Anything the renderer does not know how to paint.
    Unknown,
}

impl DrawKind {
    /// Minimum number of points a drawable of this kind needs.
    pub fn min_points(self) -> usize {
        match self {
            Self::FreeLine | Self::Line => 1,
            Self::Text | Self::Rectangle => 2,
            Self::Unknown => 0,
        }
    }
}

/// Vendor kind code of a removal command.
const KIND_REMOVE: &str = "3";

fn kind_from_code(code: &str) -> Option<DrawKind> {
    match code.trim() {
        "2" => Some(DrawKind::FreeLine),
        "4" => Some(DrawKind::Text),
        "6" => Some(DrawKind::Rectangle),
        "8" => Some(DrawKind::Line),
        _ => None,
    }
}

/// A visible annotation. Identity is the `id`; two objects with the same id are the same object.
#[derive(Clone, Debug)]
pub struct DrawObject {
    /// Unique id within the session.
    pub id: String,
    /// Shape kind.
    pub kind: DrawKind,
    /// Stroke/text color.
    pub color: Rgb8,
    /// Stroke width in pixels.
    pub stroke_width: f64,
    /// Points in canvas pixel coordinates.
    pub points: Vec<(i32, i32)>,
    /// Text payload for [`DrawKind::Text`].
    pub text: Option<String>,
    /// When the object was drawn.
    pub created_at: Timestamp,
}

impl PartialEq for DrawObject {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DrawObject {}

/// Retracts a previously drawn object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoveDirective {
    /// Id of the removal command itself.
    pub id: String,
    /// Id of the [`DrawObject`] to retract.
    pub target_id: String,
}

/// A typed annotation event applied to one page.
#[derive(Clone, Debug, PartialEq)]
pub enum AnnotationEvent {
    /// Make an object visible.
    Draw(DrawObject),
    /// Retract an object.
    Remove(RemoveDirective),
}

impl AnnotationEvent {
    /// Id of the command that produced this event.
    pub fn id(&self) -> &str {
        match self {
            Self::Draw(d) => &d.id,
            Self::Remove(r) => &r.id,
        }
    }
}

/// Why a record was dropped instead of becoming an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiscardReason {
    /// Kind code outside the supported set (including the vendor "unknown" code).
    UnsupportedKind(String),
    /// The point list contains text that is not a coordinate pair.
    MalformedPoints(String),
    /// Fewer points than the kind needs.
    TooFewPoints {
        /// Points required.
        needed: usize,
        /// Points found.
        found: usize,
    },
    /// The color field could not be read.
    MalformedColor(String),
    /// The stroke width could not be read.
    MalformedStrokeWidth(String),
    /// The timestamp is missing, negative or not a number.
    MalformedTimestamp(String),
}

impl std::fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedKind(k) => write!(f, "unsupported kind '{k}'"),
            Self::MalformedPoints(p) => write!(f, "malformed point list '{p}'"),
            Self::TooFewPoints { needed, found } => {
                write!(f, "needs {needed} point(s), found {found}")
            }
            Self::MalformedColor(c) => write!(f, "malformed color '{c}'"),
            Self::MalformedStrokeWidth(w) => write!(f, "malformed stroke width '{w}'"),
            Self::MalformedTimestamp(t) => write!(f, "malformed timestamp: {t}"),
        }
    }
}

/// Outcome of parsing one record.
#[derive(Clone, Debug, PartialEq)]
pub enum Parsed {
    /// A draw or remove event.
    Event(AnnotationEvent),
    /// The record is dropped; replay continues.
    Discard(DiscardReason),
}

/// A parsed event together with the routing data the replay engine needs.
#[derive(Clone, Debug, PartialEq)]
pub struct Command {
    /// Page the event applies to.
    pub page_id: String,
    /// When the event becomes visible.
    pub timestamp: Timestamp,
    /// The event.
    pub event: AnnotationEvent,
}

static POINT_PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(\s*(-?\d+(?:\.\d*)?)\s*,\s*(-?\d+(?:\.\d*)?)\s*\)")
        .expect("point pair regex is valid")
});

/// Decodes raw annotation records into typed events.
///
/// Parsing never fails: anything the replay cannot use comes back as [`Parsed::Discard`].
#[derive(Clone, Copy, Debug, Default)]
pub struct CommandParser;

impl CommandParser {
    /// Create a parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse one record into an event or a discard.
    pub fn parse(&self, rec: &AnnotationRecord) -> Parsed {
        match self.parse_inner(rec) {
            Ok(ev) => Parsed::Event(ev),
            Err(reason) => Parsed::Discard(reason),
        }
    }

    /// Parse one record into a routed [`Command`], or the reason it was dropped.
    pub fn parse_command(&self, rec: &AnnotationRecord) -> Result<Command, DiscardReason> {
        let timestamp = record_timestamp(rec)?;
        let event = self.parse_inner(rec)?;
        Ok(Command {
            page_id: rec.page_id.clone(),
            timestamp,
            event,
        })
    }

    /// `true` when `rec` would draw a non-empty text annotation.
    pub fn carries_text(&self, rec: &AnnotationRecord) -> bool {
        matches!(
            self.parse_inner(rec),
            Ok(AnnotationEvent::Draw(DrawObject { kind: DrawKind::Text, text: Some(ref t), .. }))
                if !t.trim().is_empty()
        )
    }

    fn parse_inner(&self, rec: &AnnotationRecord) -> Result<AnnotationEvent, DiscardReason> {
        let unsupported = || DiscardReason::UnsupportedKind(rec.kind.clone());
        let is_remove_kind = rec.kind.trim() == KIND_REMOVE;
        let kind = kind_from_code(&rec.kind);
        if kind.is_none() && !is_remove_kind {
            return Err(unsupported());
        }
        if !rec.removed.trim().is_empty() {
            return Ok(AnnotationEvent::Remove(RemoveDirective {
                id: rec.id.clone(),
                target_id: rec.removed.trim().to_owned(),
            }));
        }
        // A remove command without a target retracts nothing.
        let kind = kind.ok_or_else(unsupported)?;
        let points = parse_points(&rec.points)?;
        if points.len() < kind.min_points() {
            return Err(DiscardReason::TooFewPoints {
                needed: kind.min_points(),
                found: points.len(),
            });
        }
        let color = parse_color(&rec.color)?;
        let stroke_width = parse_stroke_width(&rec.line_size)?;
        let created_at = record_timestamp(rec)?;
        let text = (kind == DrawKind::Text).then(|| rec.text.clone());

        Ok(AnnotationEvent::Draw(DrawObject {
            id: rec.id.clone(),
            kind,
            color,
            stroke_width,
            points,
            text,
            created_at,
        }))
    }
}

fn record_timestamp(rec: &AnnotationRecord) -> Result<Timestamp, DiscardReason> {
    rec.timestamp
        .to_secs()
        .and_then(Timestamp::new)
        .map_err(|e| DiscardReason::MalformedTimestamp(e.to_string()))
}

/// Extract `(x, y)` pairs from a free-form point list, truncating decimals toward zero.
///
/// Pairs may be separated by commas, semicolons or whitespace. Anything else between pairs makes
/// the whole list malformed.
pub fn parse_points(raw: &str) -> Result<Vec<(i32, i32)>, DiscardReason> {
    let malformed = || DiscardReason::MalformedPoints(raw.to_owned());
    let mut out = Vec::new();
    let mut last_end = 0usize;
    for caps in POINT_PAIR_RE.captures_iter(raw) {
        let (Some(whole), Some(x), Some(y)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            return Err(malformed());
        };
        if !is_separator_run(&raw[last_end..whole.start()]) {
            return Err(malformed());
        }
        last_end = whole.end();
        out.push((
            coord(x.as_str()).ok_or_else(malformed)?,
            coord(y.as_str()).ok_or_else(malformed)?,
        ));
    }
    if !is_separator_run(&raw[last_end..]) {
        return Err(malformed());
    }
    Ok(out)
}

fn is_separator_run(s: &str) -> bool {
    s.chars().all(|c| c == ',' || c == ';' || c.is_whitespace())
}

fn coord(s: &str) -> Option<i32> {
    let v = s.parse::<f64>().ok()?;
    if !v.is_finite() || v < f64::from(i32::MIN) || v > f64::from(i32::MAX) {
        return None;
    }
    Some(v.trunc() as i32)
}

/// Parse the first entry of a color list: packed decimal `0xRRGGBB`, `0x…` hex or `#rrggbb`.
///
/// An empty field means black.
pub fn parse_color(raw: &str) -> Result<Rgb8, DiscardReason> {
    let first = raw.split(',').next().unwrap_or_default().trim();
    if first.is_empty() {
        return Ok(Rgb8::BLACK);
    }
    let packed = if let Some(hex) = first.strip_prefix('#') {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(hex) = first
        .strip_prefix("0x")
        .or_else(|| first.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16).ok()
    } else {
        first.parse::<u32>().ok()
    };
    packed
        .map(Rgb8::from_packed)
        .ok_or_else(|| DiscardReason::MalformedColor(raw.to_owned()))
}

/// Parse a stroke width; empty means 1.
pub fn parse_stroke_width(raw: &str) -> Result<f64, DiscardReason> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(1.0);
    }
    match s.parse::<f64>() {
        Ok(w) if w.is_finite() && w >= 0.0 => Ok(w),
        _ => Err(DiscardReason::MalformedStrokeWidth(raw.to_owned())),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/annotate/command.rs"]
mod tests;
