//! Input pump
//!
//! Collects macroquad's raw input callbacks into [`Event`]s for
//! [`EntityGroup::handle`](crate::group::EntityGroup::handle).
//!
//! macroquad hands out raw input through its subscriber API: each
//! subscriber gets every miniquad callback replayed to its own
//! `EventHandler` once per frame. File drops are not part of that stream;
//! [`InputPump::poll`] picks them up from `get_dropped_files` instead.
//! Window close requests are polled by the main loop.

use std::path::PathBuf;

use macroquad::input::get_dropped_files;
use macroquad::input::utils::{register_input_subscriber, repeat_all_miniquad_input};
use macroquad::math::{vec2, Vec2};
use macroquad::miniquad::EventHandler;

use crate::event::{Event, KeyCode, KeyMods, MouseButton, ScrollDirection};

pub struct InputPump {
    subscriber: Option<usize>,
    last_mouse: Option<Vec2>,
    scroll_direction: ScrollDirection,
    pending: Vec<Event>,
}

impl InputPump {
    /// Register with macroquad's input subscriber list.
    ///
    /// Needs a running macroquad context.
    pub fn subscribe() -> Self {
        Self {
            subscriber: Some(register_input_subscriber()),
            ..Self::detached()
        }
    }

    /// A pump fed by hand, not connected to macroquad
    pub fn detached() -> Self {
        Self {
            subscriber: None,
            last_mouse: None,
            scroll_direction: ScrollDirection::Normal,
            pending: Vec::new(),
        }
    }

    /// Reported on every wheel event
    pub fn set_scroll_direction(&mut self, direction: ScrollDirection) {
        self.scroll_direction = direction;
    }

    /// Replay this frame's raw input and file drops (when subscribed) and
    /// take every event collected since the last call, oldest first
    pub fn poll(&mut self) -> Vec<Event> {
        if let Some(subscriber) = self.subscriber {
            repeat_all_miniquad_input(self, subscriber);
            self.push_dropped(get_dropped_files().into_iter().map(|file| file.path));
        }
        std::mem::take(&mut self.pending)
    }

    /// Queue a drop event per path. Drops without a path (browser drops
    /// only carry bytes) are skipped. The group tells files and
    /// directories apart when it handles the event.
    pub fn push_dropped(&mut self, paths: impl IntoIterator<Item = Option<PathBuf>>) {
        for path in paths {
            match path {
                Some(path) => self.pending.push(Event::FileDropped(path)),
                None => log::debug!("ignoring dropped file without a path"),
            }
        }
    }

    /// Queue an event that did not come through the subscriber stream
    pub fn push(&mut self, event: Event) {
        self.pending.push(event);
    }
}

impl EventHandler for InputPump {
    fn update(&mut self) {}

    fn draw(&mut self) {}

    fn mouse_motion_event(&mut self, x: f32, y: f32) {
        let pos = vec2(x, y);
        // No previous position on the first motion, so no movement either
        let delta = self.last_mouse.map_or(Vec2::ZERO, |last| pos - last);
        self.last_mouse = Some(pos);
        self.pending.push(Event::MouseMotion {
            x,
            y,
            xrel: delta.x,
            yrel: delta.y,
        });
    }

    fn mouse_wheel_event(&mut self, x: f32, y: f32) {
        self.pending.push(Event::MouseWheel {
            x,
            y,
            direction: self.scroll_direction,
        });
    }

    fn mouse_button_down_event(&mut self, button: MouseButton, x: f32, y: f32) {
        self.pending.push(Event::MouseButtonDown { x, y, button });
    }

    fn mouse_button_up_event(&mut self, button: MouseButton, x: f32, y: f32) {
        self.pending.push(Event::MouseButtonUp { x, y, button });
    }

    fn char_event(&mut self, character: char, _keymods: KeyMods, _repeat: bool) {
        // Backspace, enter and friends arrive as key events
        if character.is_control() {
            return;
        }
        self.pending.push(Event::TextInput(character.to_string()));
    }

    fn key_down_event(&mut self, keycode: KeyCode, keymods: KeyMods, repeat: bool) {
        self.pending.push(Event::KeyDown {
            key: keycode,
            mods: keymods,
            repeat,
        });
    }

    fn key_up_event(&mut self, keycode: KeyCode, keymods: KeyMods) {
        self.pending.push(Event::KeyUp {
            key: keycode,
            mods: keymods,
        });
    }

    fn quit_requested_event(&mut self) {
        self.pending.push(Event::Quit);
    }
}
