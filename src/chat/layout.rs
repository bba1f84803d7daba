use crate::chat::message::ChatMessage;
use crate::chat::palette::SenderPalette;
use crate::chat::window::ChatWindow;
use crate::foundation::core::{Canvas, Point};
use crate::foundation::error::ReplayResult;
use crate::render::frame::FrameRGBA;
use crate::render::surface::{DrawSurface, TextMeasure, WrappedText};

/// Vertical stacking of chat messages.
///
/// Every message starts `y_offset` below the previous one and each wrapped line advances
/// `line_height + y_offset`. Lines wrap to `canvas.width - x_offset` and are drawn at `x_offset`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChatLayout {
    /// Output canvas.
    pub canvas: Canvas,
    /// Left margin of every line.
    pub x_offset: f64,
    /// Gap above every message and below every line.
    pub y_offset: f64,
}

impl ChatLayout {
    /// Maximum line width in pixels.
    pub fn wrap_width(&self) -> f64 {
        (f64::from(self.canvas.width) - self.x_offset).max(0.0)
    }

    /// Height budget for look-ahead eviction.
    pub fn budget(&self) -> f64 {
        f64::from(self.canvas.height)
    }

    fn wrap<M: TextMeasure + ?Sized>(&self, measure: &mut M, msg: &ChatMessage) -> WrappedText {
        measure.wrap(&msg.display_line(), self.wrap_width())
    }

    fn height_of(&self, wrapped: &WrappedText) -> f64 {
        self.y_offset + wrapped.lines.len() as f64 * (wrapped.line_height + self.y_offset)
    }

    /// Vertical space `msg` takes, including its leading gap.
    pub fn message_height<M: TextMeasure + ?Sized>(&self, measure: &mut M, msg: &ChatMessage) -> f64 {
        let wrapped = self.wrap(measure, msg);
        self.height_of(&wrapped)
    }

    /// Paint the window's messages top to bottom onto a copy of `base`.
    pub fn render_window(
        &self,
        window: &ChatWindow,
        palette: &SenderPalette,
        base: &FrameRGBA,
        surface: &mut dyn DrawSurface,
    ) -> ReplayResult<FrameRGBA> {
        if window.is_empty() {
            return Ok(base.clone());
        }
        surface.begin(base)?;
        let mut y = 0.0;
        for msg in window.messages() {
            let wrapped = self.wrap(&mut *surface, msg);
            let color = palette.color(&msg.sender_id);
            let mut line_y = y + self.y_offset;
            for line in &wrapped.lines {
                surface.fill_text_line(Point::new(self.x_offset, line_y), line, color);
                line_y += wrapped.line_height + self.y_offset;
            }
            y += self.height_of(&wrapped);
        }
        surface.finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/chat/layout.rs"]
mod tests;
