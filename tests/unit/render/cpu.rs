use super::*;

fn close(a: [u8; 4], b: [u8; 4]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x.abs_diff(*y) <= 3)
}

fn surface() -> CpuSurface {
    CpuSurface::new(None, CharGridMetrics::new(8.0, 10.0))
}

#[test]
fn begin_finish_preserves_base_pixels() {
    let canvas = Canvas::new(16, 16).unwrap();
    let base = FrameRGBA::solid(canvas, Rgb8::new(40, 80, 120));
    let mut s = surface();
    s.begin(&base).unwrap();
    let out = s.finish().unwrap();
    assert_eq!(out.width, 16);
    assert_eq!(out.height, 16);
    assert!(close(out.pixel(7, 7).unwrap(), [40, 80, 120, 255]));
}

#[test]
fn thick_rect_stroke_covers_edge_pixels_only() {
    let canvas = Canvas::new(32, 32).unwrap();
    let base = FrameRGBA::solid(canvas, Rgb8::new(255, 255, 255));
    let mut s = surface();
    s.begin(&base).unwrap();
    s.stroke_rect(Rect::new(4.0, 4.0, 28.0, 28.0), 4.0, Rgb8::new(255, 0, 0));
    let out = s.finish().unwrap();

    assert!(close(out.pixel(4, 16).unwrap(), [255, 0, 0, 255]));
    assert!(close(out.pixel(16, 16).unwrap(), [255, 255, 255, 255]));
}

#[test]
fn polyline_with_single_point_draws_nothing() {
    let canvas = Canvas::new(8, 8).unwrap();
    let base = FrameRGBA::solid(canvas, Rgb8::new(0, 0, 0));
    let mut s = surface();
    s.begin(&base).unwrap();
    s.stroke_polyline(&[Point::new(4.0, 4.0)], 6.0, Rgb8::new(255, 255, 255));
    let out = s.finish().unwrap();
    assert!(close(out.pixel(4, 4).unwrap(), [0, 0, 0, 255]));
}

#[test]
fn finish_without_begin_is_an_error() {
    let mut s = surface();
    assert!(s.finish().is_err());
}

#[test]
fn wrap_without_font_uses_fallback_metrics() {
    let mut s = surface();
    let w = s.wrap("abc def", 32.0);
    assert_eq!(w.lines, vec!["abc", "def"]);
    assert_eq!(w.line_height, 10.0);
}

#[test]
fn text_line_paints_glyphs_with_a_font() {
    let candidates = crate::render::text::default_font_candidates();
    let Some(font) = crate::render::text::resolve_font(None, &candidates, 16.0, false).unwrap()
    else {
        return;
    };
    let canvas = Canvas::new(96, 32).unwrap();
    let base = FrameRGBA::solid(canvas, Rgb8::new(244, 244, 244));
    let mut s = CpuSurface::new(Some(font), CharGridMetrics::new(16.0, 18.0));
    s.begin(&base).unwrap();
    s.fill_text_line(Point::new(4.0, 4.0), "[Ann] hi", Rgb8::new(10, 10, 10));
    let out = s.finish().unwrap();
    assert_ne!(out, base);
}
