//! Circular motion scroller
//!
//! Click the scroller to activate it; from then on every mouse move reports
//! the angle of the cursor around the scroller's center. Clicking again
//! deactivates it and reports `None` once.

use macroquad::color::Color;
use macroquad::math::Vec2;

use super::Rect;
use crate::entity::{Capabilities, Capability, Context, Entity};
use crate::event::{MouseButtonEvent, MouseMotionEvent};
use crate::render::Renderer;

/// Side of the dead zone around the center, in pixels
const CENTER_SIZE: f32 = 10.0;

pub const AREA_INACTIVE_COLOR: Color = Color::new(1.0, 150.0 / 255.0, 150.0 / 255.0, 1.0);
pub const AREA_ACTIVE_COLOR: Color = Color::new(150.0 / 255.0, 1.0, 150.0 / 255.0, 1.0);
pub const CENTER_COLOR: Color = Color::new(0.0, 0.0, 0.0, 1.0);

/// Receives the new angle in degrees, or `None` on deactivation
pub type AngleCallback = Box<dyn FnMut(Option<f32>)>;

pub struct CircleScroller {
    rect: Rect,
    center: Rect,
    activated: bool,
    on_angle: AngleCallback,
}

impl CircleScroller {
    pub fn new(rect: Rect, on_angle: impl FnMut(Option<f32>) + 'static) -> Self {
        Self {
            rect,
            center: Rect::from_center(rect.center(), CENTER_SIZE, CENTER_SIZE),
            activated: false,
            on_angle: Box::new(on_angle),
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    /// Angle of (x, y) around the center in degrees, in `[0, 360)`.
    ///
    /// 0 points right and angles grow counter-clockwise as seen on screen
    /// (where y grows downward). The center itself maps to 0.
    pub fn angle(&self, x: f32, y: f32) -> f32 {
        let c = self.rect.center();
        // flip y so that up is positive
        let (rx, ry) = (x - c.x, c.y - y);
        if rx == 0.0 && ry == 0.0 {
            return 0.0;
        }
        let degrees = ry.atan2(rx).to_degrees();
        if degrees < 0.0 {
            degrees + 360.0
        } else {
            degrees
        }
    }
}

impl Entity for CircleScroller {
    fn capabilities(&self) -> Capabilities {
        Capabilities::of(&[Capability::MousePressed, Capability::MouseMoved, Capability::Draw])
    }

    fn mouse_pressed(&mut self, _cx: &Context<'_>, event: &MouseButtonEvent) {
        if !self.rect.contains(event.pos.x, event.pos.y) {
            return;
        }
        self.activated = !self.activated;
        if !self.activated {
            (self.on_angle)(None);
        }
    }

    fn mouse_moved(&mut self, _cx: &Context<'_>, event: &MouseMotionEvent) {
        if !self.activated || self.center.contains(event.pos.x, event.pos.y) {
            return;
        }
        let angle = self.angle(event.pos.x, event.pos.y);
        (self.on_angle)(Some(angle));
    }

    fn draw(&mut self, renderer: &mut dyn Renderer, origin: Vec2) {
        let area = if self.activated {
            AREA_ACTIVE_COLOR
        } else {
            AREA_INACTIVE_COLOR
        };
        renderer.fill_rect(area, self.rect.moved_by(origin));
        renderer.fill_rect(CENTER_COLOR, self.center.moved_by(origin));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityRef;
    use crate::event::{Event, MouseButton};
    use crate::group::EntityGroup;
    use crate::render::testing::{DrawCall, RecordingRenderer};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn scroller_in_group() -> (EntityGroup, Rc<RefCell<CircleScroller>>, Rc<RefCell<Vec<Option<f32>>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let scroller = Rc::new(RefCell::new(CircleScroller::new(
            Rect::new(50.0, 50.0, 200.0, 200.0),
            move |angle| sink.borrow_mut().push(angle),
        )));
        let group = EntityGroup::new();
        group.add_default(EntityRef::from_shared(&scroller)).unwrap();
        (group, scroller, seen)
    }

    fn click(group: &EntityGroup, x: f32, y: f32) {
        group.handle(&Event::MouseButtonDown {
            x,
            y,
            button: MouseButton::Left,
        });
    }

    fn move_to(group: &EntityGroup, x: f32, y: f32) {
        group.handle(&Event::MouseMotion {
            x,
            y,
            xrel: 0.0,
            yrel: 0.0,
        });
    }

    #[test]
    fn test_angle_directions() {
        let s = CircleScroller::new(Rect::new(0.0, 0.0, 100.0, 100.0), |_| {});
        assert_eq!(s.angle(50.0, 50.0), 0.0);
        assert_eq!(s.angle(90.0, 50.0), 0.0);
        assert!((s.angle(50.0, 10.0) - 90.0).abs() < 1e-4);
        assert!((s.angle(10.0, 50.0) - 180.0).abs() < 1e-4);
        assert!((s.angle(50.0, 90.0) - 270.0).abs() < 1e-4);
        assert!((s.angle(90.0, 10.0) - 45.0).abs() < 1e-4);
    }

    #[test]
    fn test_press_toggles_and_deactivation_reports_none_once() {
        let (group, scroller, seen) = scroller_in_group();

        click(&group, 10.0, 10.0);
        assert!(!scroller.borrow().is_activated());

        click(&group, 60.0, 60.0);
        assert!(scroller.borrow().is_activated());
        assert!(seen.borrow().is_empty());

        click(&group, 60.0, 60.0);
        assert!(!scroller.borrow().is_activated());
        assert_eq!(*seen.borrow(), vec![None]);
    }

    #[test]
    fn test_moves_report_angle_only_while_active() {
        let (group, _scroller, seen) = scroller_in_group();

        move_to(&group, 250.0, 150.0);
        assert!(seen.borrow().is_empty());

        click(&group, 60.0, 60.0);
        move_to(&group, 200.0, 150.0);
        // inside the center dead zone
        move_to(&group, 152.0, 148.0);
        move_to(&group, 150.0, 100.0);
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(seen.borrow()[0], Some(0.0));
        assert!((seen.borrow()[1].unwrap_or_default() - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_draw_colors_follow_state() {
        let (group, scroller, _seen) = scroller_in_group();
        let mut renderer = RecordingRenderer::new();
        group.draw(&mut renderer);
        click(&group, 60.0, 60.0);
        scroller.borrow_mut().draw(&mut renderer, Vec2::ZERO);

        assert_eq!(
            renderer.calls,
            vec![
                DrawCall::FillRect(AREA_INACTIVE_COLOR, Rect::new(50.0, 50.0, 200.0, 200.0)),
                DrawCall::FillRect(CENTER_COLOR, Rect::new(145.0, 145.0, 10.0, 10.0)),
                DrawCall::FillRect(AREA_ACTIVE_COLOR, Rect::new(50.0, 50.0, 200.0, 200.0)),
                DrawCall::FillRect(CENTER_COLOR, Rect::new(145.0, 145.0, 10.0, 10.0)),
            ]
        );
    }
}
