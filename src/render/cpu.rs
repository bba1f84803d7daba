use std::sync::Arc;

use crate::foundation::core::{Canvas, Point, Rect, Rgb8};
use crate::foundation::error::{ReplayError, ReplayResult};
use crate::render::frame::FrameRGBA;
use crate::render::surface::{CharGridMetrics, DrawSurface, TextMeasure, WrappedText};
use crate::render::text::{FontFace, TextBrushRgba8};

/// CPU drawing surface powered by `vello_cpu` for strokes and glyph runs.
///
/// Text is shaped with the configured [`FontFace`]. Without a font, wrapping falls back to
/// [`CharGridMetrics`] and text lines are not painted (a warning is logged once).
#[derive(Debug)]
pub struct CpuSurface {
    ctx: Option<vello_cpu::RenderContext>,
    canvas: Option<Canvas>,
    font: Option<FontFace>,
    fallback_metrics: CharGridMetrics,
    warned_no_font: bool,
}

impl CpuSurface {
    /// Create a surface. `fallback_metrics` drives wrapping when `font` is `None`.
    pub fn new(font: Option<FontFace>, fallback_metrics: CharGridMetrics) -> Self {
        Self {
            ctx: None,
            canvas: None,
            font,
            fallback_metrics,
            warned_no_font: false,
        }
    }

    fn ctx_mut(&mut self) -> Option<&mut vello_cpu::RenderContext> {
        self.ctx.as_mut()
    }
}

impl TextMeasure for CpuSurface {
    fn wrap(&mut self, text: &str, max_width: f64) -> WrappedText {
        match self.font.as_mut() {
            Some(font) => font.wrap(text, max_width),
            None => self.fallback_metrics.wrap(text, max_width),
        }
    }
}

impl DrawSurface for CpuSurface {
    fn begin(&mut self, base: &FrameRGBA) -> ReplayResult<()> {
        let (w, h) = dims_u16(base.width, base.height)?;
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();

        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap_from_premul_bytes(
                &base.data,
                base.width,
                base.height,
            )?)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(base.width),
            f64::from(base.height),
        ));

        self.canvas = Some(base.canvas());
        self.ctx = Some(ctx);
        Ok(())
    }

    fn stroke_polyline(&mut self, points: &[Point], width: f64, color: Rgb8) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        if rest.is_empty() {
            return;
        }
        let mut path = vello_cpu::kurbo::BezPath::new();
        path.move_to(point_to_cpu(*first));
        for p in rest {
            path.line_to(point_to_cpu(*p));
        }
        let Some(ctx) = self.ctx_mut() else {
            return;
        };
        ctx.set_paint(color_to_cpu(color));
        ctx.set_stroke(stroke(width));
        ctx.stroke_path(&path);
    }

    fn stroke_rect(&mut self, rect: Rect, width: f64, color: Rgb8) {
        let Some(ctx) = self.ctx_mut() else {
            return;
        };
        let r = rect.abs();
        ctx.set_paint(color_to_cpu(color));
        ctx.set_stroke(stroke(width));
        ctx.stroke_rect(&vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1));
    }

    fn fill_text_line(&mut self, origin: Point, line: &str, color: Rgb8) {
        let Some(font) = self.font.as_mut() else {
            if !self.warned_no_font {
                tracing::warn!("no font configured; text lines are not painted");
                self.warned_no_font = true;
            }
            return;
        };
        let Some(ctx) = self.ctx.as_mut() else {
            return;
        };
        let layout = font.layout(line, TextBrushRgba8::from(color), None);
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((origin.x, origin.y)));
        for layout_line in layout.lines() {
            for item in layout_line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    }

    fn finish(&mut self) -> ReplayResult<FrameRGBA> {
        let canvas = self
            .canvas
            .take()
            .ok_or_else(|| ReplayError::render("cpu surface finished without begin"))?;
        let ctx = self
            .ctx
            .as_mut()
            .ok_or_else(|| ReplayError::render("cpu surface has no render context"))?;
        let (w, h) = dims_u16(canvas.width, canvas.height)?;
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        FrameRGBA::from_rgba8(
            canvas.width,
            canvas.height,
            pixmap.data_as_u8_slice().to_vec(),
        )
    }
}

fn dims_u16(width: u32, height: u32) -> ReplayResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ReplayError::render("frame width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ReplayError::render("frame height exceeds u16"))?;
    Ok((w, h))
}

fn stroke(width: f64) -> vello_cpu::kurbo::Stroke {
    vello_cpu::kurbo::Stroke::new(if width > 0.0 { width } else { 1.0 })
}

fn color_to_cpu(c: Rgb8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, 255)
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> ReplayResult<vello_cpu::Pixmap> {
    let (w, h) = dims_u16(width, height)?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(ReplayError::render("pixmap byte len mismatch"));
    }
    let mut may_have_opacities = false;
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        may_have_opacities |= px[3] != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
