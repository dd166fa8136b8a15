//! Plain colored rectangle

use macroquad::color::Color;
use macroquad::math::Vec2;

use super::Rect;
use crate::entity::{Capabilities, Capability, Entity};
use crate::render::Renderer;

/// A filled rectangle. `rect` is public so callbacks can move it around.
pub struct ColorRect {
    pub color: Color,
    pub rect: Rect,
}

impl ColorRect {
    pub fn new(color: Color, rect: Rect) -> Self {
        Self { color, rect }
    }
}

impl Entity for ColorRect {
    fn capabilities(&self) -> Capabilities {
        Capabilities::of(&[Capability::Draw])
    }

    fn draw(&mut self, renderer: &mut dyn Renderer, origin: Vec2) {
        renderer.fill_rect(self.color, self.rect.moved_by(origin));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::testing::{DrawCall, RecordingRenderer};
    use macroquad::color::RED;
    use macroquad::math::vec2;

    #[test]
    fn test_draws_at_origin_offset() {
        let mut rect = ColorRect::new(RED, Rect::new(300.0, 0.0, 200.0, 10.0));
        let mut renderer = RecordingRenderer::new();
        rect.draw(&mut renderer, vec2(5.0, 7.0));
        assert_eq!(renderer.calls, vec![DrawCall::FillRect(RED, Rect::new(305.0, 7.0, 200.0, 10.0))]);
    }
}
