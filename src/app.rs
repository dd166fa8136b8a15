//! Main loop
//!
//! [`run_simple_main_loop`] is the whole host: it builds the renderer and
//! root group, lets a setup function populate them, then pumps input,
//! updates and draws until a quit request goes unvetoed.

use macroquad::input::{is_quit_requested, prevent_quit};
use macroquad::time::get_time;
use macroquad::window::next_frame;

use crate::config::AppConfig;
use crate::error::Result;
use crate::event::Event;
use crate::group::{EntityGroup, Handled};
use crate::input::InputPump;
use crate::render::{MacroquadRenderer, Renderer};

/// Set up `env_logger` with the configured filter. `RUST_LOG` wins when set.
/// Calling it twice keeps the first logger.
pub fn init_logging(config: &AppConfig) {
    let env = env_logger::Env::default().default_filter_or(config.log_filter.as_str());
    if let Err(e) = env_logger::Builder::from_env(env).try_init() {
        log::debug!("logger already initialized: {}", e);
    }
}

/// Feed a frame's worth of events to `group`. Returns `true` once a quit
/// request went through without a veto; later events are dropped.
pub fn dispatch_events(group: &EntityGroup, events: impl IntoIterator<Item = Event>) -> bool {
    for event in events {
        match group.handle(&event) {
            Handled::QuitAccepted => return true,
            Handled::QuitAborted => log::info!("quit request vetoed"),
            Handled::Dispatched => {}
        }
    }
    false
}

/// Run a group until the window is closed.
///
/// `setup` gets the renderer (for loading textures and fonts) and the empty
/// root group. Once it returns, message wiring is validated and every entity
/// is initialized. Any error from setup, validation or an update ends the
/// loop and is returned.
pub async fn run_simple_main_loop<F>(config: AppConfig, setup: F) -> Result<()>
where
    F: FnOnce(&mut dyn Renderer, &EntityGroup) -> Result<()>,
{
    // Window close requests go through the group's Quit listeners first
    prevent_quit();

    let mut renderer = MacroquadRenderer::new();
    let group = EntityGroup::new();
    setup(&mut renderer, &group)?;
    group.validate_message_connections(&[])?;
    group.init(None);
    log::info!("'{}' started with {} entities", config.title, group.len());

    let mut input = InputPump::subscribe();
    #[cfg(not(target_arch = "wasm32"))]
    let mut limiter = crate::limiter::FramerateLimiter::new(config.max_fps);
    let mut last_frame = get_time();

    loop {
        let mut events = input.poll();
        if is_quit_requested() {
            events.push(Event::Quit);
        }
        if dispatch_events(&group, events) {
            log::info!("shutting down");
            return Ok(());
        }

        let now = get_time();
        let delta_time = (now - last_frame) as f32;
        last_frame = now;
        group.update(delta_time)?;

        renderer.clear(config.clear_color());
        group.draw(&mut renderer);

        next_frame().await;

        #[cfg(not(target_arch = "wasm32"))]
        {
            limiter.tick();
            if config.frame_sleep_ms > 0 {
                std::thread::sleep(std::time::Duration::from_millis(config.frame_sleep_ms));
            }
        }
    }
}
