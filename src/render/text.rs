use std::path::{Path, PathBuf};

use crate::foundation::core::Rgb8;
use crate::foundation::error::{ReplayError, ReplayResult};
use crate::render::surface::{TextMeasure, WrappedText};

/// Environment variable naming a font file used when none is configured.
pub const DEFAULT_FONT_ENV: &str = "REPLAYCAST_FONT";

/// Well-known locations of common sans-serif fonts, probed in order.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/local/share/fonts/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Font files to try when no font was configured: `$REPLAYCAST_FONT` first, then system fonts.
pub fn default_font_candidates() -> Vec<PathBuf> {
    std::env::var_os(DEFAULT_FONT_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .into_iter()
        .chain(SYSTEM_FONT_CANDIDATES.iter().map(PathBuf::from))
        .collect()
}

/// Load `explicit` if given, otherwise the first loadable font among `candidates`.
///
/// A configured font that fails to load is an error. Candidates that fail are skipped. When
/// nothing loads and `required` is set, the run cannot paint text and this is a validation error.
pub fn resolve_font(
    explicit: Option<&Path>,
    candidates: &[PathBuf],
    size_px: f32,
    required: bool,
) -> ReplayResult<Option<FontFace>> {
    if let Some(path) = explicit {
        return FontFace::from_path(path, size_px).map(Some);
    }
    for path in candidates.iter().filter(|p| p.is_file()) {
        match FontFace::from_path(path, size_px) {
            Ok(font) => {
                tracing::debug!(font = %path.display(), family = font.family_name(), "using default font");
                return Ok(Some(font));
            }
            Err(err) => tracing::debug!(font = %path.display(), %err, "skipping font candidate"),
        }
    }
    if required {
        return Err(ReplayError::validation(format!(
            "no font found for text rendering; pass --font <file> or set {DEFAULT_FONT_ENV}"
        )));
    }
    Ok(None)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    /// Red channel.
    pub(crate) r: u8,
    /// Green channel.
    pub(crate) g: u8,
    /// Blue channel.
    pub(crate) b: u8,
    /// Alpha channel.
    pub(crate) a: u8,
}

impl From<Rgb8> for TextBrushRgba8 {
    fn from(c: Rgb8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: 255,
        }
    }
}

/// A font loaded from raw bytes plus the Parley contexts needed to shape text with it.
///
/// The font is registered once; every layout afterwards reuses the registered family.
pub struct FontFace {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
    size_px: f32,
    pub(crate) font: vello_cpu::peniko::FontData,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("family_name", &self.family_name)
            .field("size_px", &self.size_px)
            .finish_non_exhaustive()
    }
}

impl FontFace {
    /// Load a font from TTF/OTF bytes at a fixed pixel size.
    pub fn from_bytes(font_bytes: Vec<u8>, size_px: f32) -> ReplayResult<Self> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ReplayError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            ReplayError::validation("no font families registered from font bytes")
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| ReplayError::validation("registered font family has no name"))?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0);
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            size_px,
            font,
        })
    }

    /// Read a font file from disk.
    pub fn from_path(path: &Path, size_px: f32) -> ReplayResult<Self> {
        use anyhow::Context as _;
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read font '{}'", path.display()))?;
        Self::from_bytes(bytes, size_px)
    }

    /// Family name reported by the font.
    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Font size in pixels.
    pub fn size_px(&self) -> f32 {
        self.size_px
    }

    /// Shape and lay out plain text, optionally breaking lines at `max_width_px`.
    pub(crate) fn layout(
        &mut self,
        text: &str,
        brush: TextBrushRgba8,
        max_width_px: Option<f32>,
    ) -> parley::Layout<TextBrushRgba8> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(self.size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        if let Some(w) = max_width_px {
            layout.break_all_lines(Some(w));
            layout.align(
                Some(w),
                parley::Alignment::Start,
                parley::AlignmentOptions::default(),
            );
        } else {
            layout.break_all_lines(None);
        }
        layout
    }
}

impl TextMeasure for FontFace {
    fn wrap(&mut self, text: &str, max_width: f64) -> WrappedText {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            return WrappedText {
                lines: Vec::new(),
                line_height: f64::from(self.size_px),
            };
        }
        let layout = self.layout(
            &collapsed,
            TextBrushRgba8::default(),
            Some(max_width.max(1.0) as f32),
        );

        let mut line_height = 0.0f64;
        let mut lines = Vec::new();
        for line in layout.lines() {
            line_height = line_height.max(f64::from(line.metrics().line_height));
            let range = line.text_range();
            let s = collapsed.get(range).unwrap_or_default().trim();
            if !s.is_empty() {
                lines.push(s.to_owned());
            }
        }
        if line_height <= 0.0 {
            line_height = f64::from(self.size_px);
        }
        WrappedText { lines, line_height }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
