//! Input events
//!
//! [`Event`] is what the host loop feeds into
//! [`EntityGroup::handle`](crate::group::EntityGroup::handle). The payload
//! structs are what entities receive; mouse payloads carry both the raw
//! screen position and the position local to the receiving group.

use std::path::PathBuf;

use macroquad::math::Vec2;

pub use macroquad::input::{KeyCode, MouseButton};
pub use macroquad::miniquad::KeyMods;

/// A raw event from the windowing layer, in screen coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The user asked to close the window
    Quit,
    KeyDown {
        key: KeyCode,
        mods: KeyMods,
        repeat: bool,
    },
    KeyUp {
        key: KeyCode,
        mods: KeyMods,
    },
    MouseButtonDown {
        x: f32,
        y: f32,
        button: MouseButton,
    },
    MouseButtonUp {
        x: f32,
        y: f32,
        button: MouseButton,
    },
    MouseMotion {
        x: f32,
        y: f32,
        xrel: f32,
        yrel: f32,
    },
    MouseWheel {
        x: f32,
        y: f32,
        direction: ScrollDirection,
    },
    TextInput(String),
    /// A file or directory was dropped on the window
    FileDropped(PathBuf),
}

/// Whether the platform reports natural ("flipped") scrolling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScrollDirection {
    #[default]
    Normal,
    Flipped,
}

/// A key went down, came back up, or auto-repeated
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyEvent {
    pub key: KeyCode,
    pub mods: KeyMods,
    pub repeat: bool,
}

/// A mouse button was pressed or released
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseButtonEvent {
    /// Position on screen
    pub screen: Vec2,
    /// Position relative to the receiving group's origin
    pub pos: Vec2,
    pub button: MouseButton,
    pub is_touch: bool,
}

/// The cursor moved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseMotionEvent {
    pub screen: Vec2,
    pub pos: Vec2,
    /// Movement since the previous motion event
    pub delta: Vec2,
}

/// The scroll wheel moved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseWheelEvent {
    pub delta: Vec2,
    pub direction: ScrollDirection,
}

impl MouseButtonEvent {
    /// The same event as seen from a group whose origin is `origin`
    pub fn relative_to(&self, origin: Vec2) -> Self {
        Self {
            pos: self.pos - origin,
            ..*self
        }
    }
}

impl MouseMotionEvent {
    /// The same event as seen from a group whose origin is `origin`.
    /// Deltas do not depend on the origin and pass through unchanged.
    pub fn relative_to(&self, origin: Vec2) -> Self {
        Self {
            pos: self.pos - origin,
            ..*self
        }
    }
}
