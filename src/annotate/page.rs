use indexmap::IndexMap;

use crate::annotate::command::{AnnotationEvent, DrawKind, DrawObject};
use crate::foundation::core::{Point, Rect};
use crate::foundation::error::ReplayResult;
use crate::render::frame::FrameRGBA;
use crate::render::surface::DrawSurface;

/// Visible annotations of one page, in paint order.
#[derive(Clone, Debug, Default)]
pub struct PageAnnotationState {
    page_id: String,
    active: IndexMap<String, DrawObject>,
}

impl PageAnnotationState {
    /// Empty state for `page_id`.
    pub fn new(page_id: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            active: IndexMap::new(),
        }
    }

    /// Page this state belongs to.
    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    /// `true` when nothing is visible on the page.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Number of visible objects.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// `true` when an object with `id` is visible.
    pub fn contains(&self, id: &str) -> bool {
        self.active.contains_key(id)
    }

    /// Visible objects, bottom-most first.
    pub fn active(&self) -> impl Iterator<Item = &DrawObject> {
        self.active.values()
    }

    /// Apply a draw or remove event.
    ///
    /// Redrawing an existing id moves it to the top. Removing an absent id does nothing.
    pub fn apply(&mut self, event: AnnotationEvent) {
        match event {
            AnnotationEvent::Draw(obj) => {
                self.active.shift_remove(&obj.id);
                self.active.insert(obj.id.clone(), obj);
            }
            AnnotationEvent::Remove(rm) => {
                self.active.shift_remove(&rm.target_id);
            }
        }
    }

    /// Paint every visible object onto a copy of `base`.
    pub fn render(
        &self,
        base: &FrameRGBA,
        surface: &mut dyn DrawSurface,
    ) -> ReplayResult<FrameRGBA> {
        if self.active.is_empty() {
            return Ok(base.clone());
        }
        surface.begin(base)?;
        for obj in self.active.values() {
            paint_object(obj, surface);
        }
        surface.finish()
    }
}

fn to_point((x, y): (i32, i32)) -> Point {
    Point::new(f64::from(x), f64::from(y))
}

fn paint_object(obj: &DrawObject, surface: &mut dyn DrawSurface) {
    match obj.kind {
        DrawKind::FreeLine | DrawKind::Line => {
            let points: Vec<Point> = obj.points.iter().copied().map(to_point).collect();
            surface.stroke_polyline(&points, obj.stroke_width, obj.color);
        }
        DrawKind::Rectangle => {
            let [a, b, ..] = obj.points.as_slice() else {
                return;
            };
            surface.stroke_rect(
                Rect::from_points(to_point(*a), to_point(*b)),
                obj.stroke_width,
                obj.color,
            );
        }
        DrawKind::Text => {
            let [a, b, ..] = obj.points.as_slice() else {
                return;
            };
            let Some(text) = obj.text.as_deref() else {
                return;
            };
            let span = f64::from(b.0) - f64::from(a.0);
            let wrapped = surface.wrap(text, span);
            let origin = to_point(*a);
            for (i, line) in wrapped.lines.iter().enumerate() {
                let y = origin.y + i as f64 * wrapped.line_height;
                surface.fill_text_line(Point::new(origin.x, y), line, obj.color);
            }
        }
        DrawKind::Unknown => {}
    }
}

#[cfg(test)]
#[path = "../../tests/unit/annotate/page.rs"]
mod tests;
