//! Rectangle type for widget geometry

use macroquad::math::Vec2;

/// A rectangle defined by position and size
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Create a rect of the given size centered on a point
    pub fn from_center(center: Vec2, w: f32, h: f32) -> Self {
        Self::new(center.x - w * 0.5, center.y - h * 0.5, w, h)
    }

    /// Right edge
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Bottom edge
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }

    /// Check if point is inside
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Same size, shifted by an offset
    pub fn moved_by(&self, offset: Vec2) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.w, self.h)
    }

    /// Same size, top-left corner at the given point
    pub fn moved_to(&self, x: f32, y: f32) -> Self {
        Self::new(x, y, self.w, self.h)
    }

    /// Shift in place
    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }
}

impl From<Rect> for macroquad::math::Rect {
    fn from(r: Rect) -> Self {
        macroquad::math::Rect::new(r.x, r.y, r.w, r.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains() {
        let r = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert!(r.contains(50.0, 40.0));
        assert!(!r.contains(5.0, 40.0));
        assert!(!r.contains(50.0, 100.0));
        // right and bottom edges are exclusive
        assert!(!r.contains(110.0, 40.0));
        assert!(!r.contains(50.0, 70.0));
    }

    #[test]
    fn test_from_center() {
        let r = Rect::from_center(Vec2::new(150.0, 150.0), 10.0, 10.0);
        assert_eq!(r, Rect::new(145.0, 145.0, 10.0, 10.0));
        assert_eq!(r.center(), Vec2::new(150.0, 150.0));
    }

    #[test]
    fn test_moves() {
        let mut r = Rect::new(300.0, 0.0, 200.0, 10.0);
        assert_eq!(r.moved_by(Vec2::new(5.0, 7.0)), Rect::new(305.0, 7.0, 200.0, 10.0));
        assert_eq!(r.moved_to(1.0, 2.0), Rect::new(1.0, 2.0, 200.0, 10.0));
        r.move_by(0.0, -5.0);
        assert_eq!(r.y, -5.0);
    }
}
