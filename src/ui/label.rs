//! Text label

use macroquad::color::Color;
use macroquad::math::Vec2;

use crate::entity::{Capabilities, Capability, Entity};
use crate::render::{FontId, Renderer, TextStyle};

/// Multi-line text with its top-left corner at (x, y).
///
/// The text is split into lines lazily; changing the text, font or color
/// only invalidates that layout when the new value actually differs.
pub struct Label {
    pub x: f32,
    pub y: f32,
    text: String,
    style: TextStyle,
    lines: Vec<String>,
    dirty: bool,
}

impl Label {
    pub fn new(x: f32, y: f32, text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            x,
            y,
            text: text.into(),
            style,
            lines: Vec::new(),
            dirty: true,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.text {
            self.text = text;
            self.dirty = true;
        }
    }

    pub fn font(&self) -> Option<FontId> {
        self.style.font
    }

    pub fn set_font(&mut self, font: Option<FontId>) {
        if font != self.style.font {
            self.style.font = font;
            self.dirty = true;
        }
    }

    pub fn color(&self) -> Color {
        self.style.color
    }

    pub fn set_color(&mut self, color: Color) {
        if color != self.style.color {
            self.style.color = color;
            self.dirty = true;
        }
    }

    /// Whether the line layout will be rebuilt on the next draw
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn relayout(&mut self) {
        self.lines = self.text.lines().map(str::to_owned).collect();
        self.dirty = false;
    }
}

impl Entity for Label {
    fn capabilities(&self) -> Capabilities {
        Capabilities::of(&[Capability::Draw])
    }

    fn draw(&mut self, renderer: &mut dyn Renderer, origin: Vec2) {
        if self.dirty {
            self.relayout();
        }
        let x = self.x + origin.x;
        let mut y = self.y + origin.y;
        let skip = renderer.line_skip(&self.style);
        for line in &self.lines {
            renderer.draw_text(line, x, y, &self.style);
            y += skip;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::testing::{DrawCall, RecordingRenderer};
    use macroquad::color::{BLACK, RED};
    use macroquad::math::vec2;

    fn texts(renderer: &RecordingRenderer) -> Vec<(String, f32, f32)> {
        renderer
            .calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Text { text, x, y, .. } => Some((text.clone(), *x, *y)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_lines_advance_by_line_skip() {
        let style = TextStyle {
            size: 20,
            ..TextStyle::default()
        };
        let mut label = Label::new(10.0, 10.0, "Hello\nWorld", style);
        let mut renderer = RecordingRenderer::new();
        label.draw(&mut renderer, vec2(1.0, 2.0));

        // 20 * 1.2 = 24 between baselines
        assert_eq!(
            texts(&renderer),
            vec![("Hello".to_string(), 11.0, 12.0), ("World".to_string(), 11.0, 36.0)]
        );
    }

    #[test]
    fn test_setters_mark_dirty_only_on_change() {
        let mut label = Label::new(0.0, 0.0, "Angle:   0", TextStyle::default());
        let mut renderer = RecordingRenderer::new();
        label.draw(&mut renderer, Vec2::ZERO);
        assert!(!label.is_dirty());

        label.set_text("Angle:   0");
        label.set_color(BLACK);
        label.set_font(None);
        assert!(!label.is_dirty());

        label.set_color(RED);
        assert!(label.is_dirty());
        label.draw(&mut renderer, Vec2::ZERO);

        label.set_text("Angle:  90");
        assert!(label.is_dirty());
        label.draw(&mut renderer, Vec2::ZERO);
        assert_eq!(texts(&renderer).last().map(|t| t.0.as_str()), Some("Angle:  90"));
    }

    #[test]
    fn test_empty_text_draws_nothing() {
        let mut label = Label::new(0.0, 0.0, "", TextStyle::default());
        let mut renderer = RecordingRenderer::new();
        label.draw(&mut renderer, Vec2::ZERO);
        assert!(renderer.calls.is_empty());
    }
}
