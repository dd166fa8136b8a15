//! Dalgi demo
//!
//! A label, a red bar and a circle scroller: click the scroller, then circle
//! the mouse around its center to move the bar up and down.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::sync::OnceLock;

use dalgi::manifest::ManifestError;
use dalgi::render::TextStyle;
use dalgi::ui::{CircleScroller, ColorRect, Label, Rect};
use dalgi::{run_simple_main_loop, AppConfig, EntityRef};
use macroquad::color::RED;
use macroquad::window::Conf;

/// Optional settings file next to the working directory
const CONFIG_PATH: &str = "dalgi.toml";

/// Pixels the bar moves per reported angle
const SPEED: f32 = 5.0;

/// An angle jump bigger than this is a wrap around 0/360
const WRAP_LIMIT: f32 = 320.0;

/// The settings file, read once. `window_conf` runs before the logger
/// exists, so reporting what was read waits for `main`.
static CONFIG_FILE: OnceLock<Result<Option<AppConfig>, ManifestError>> = OnceLock::new();

fn config_file() -> &'static Result<Option<AppConfig>, ManifestError> {
    CONFIG_FILE.get_or_init(|| AppConfig::try_load(Path::new(CONFIG_PATH)))
}

fn window_conf() -> Conf {
    AppConfig::or_default(config_file()).window_conf()
}

#[macroquad::main(window_conf)]
async fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    let config = AppConfig::or_default(config_file());
    dalgi::app::init_logging(&config);
    AppConfig::log_load(Path::new(CONFIG_PATH), config_file());

    let result = run_simple_main_loop(config, |_renderer, group| {
        let bar = Rc::new(RefCell::new(ColorRect::new(RED, Rect::new(300.0, 0.0, 200.0, 10.0))));
        let label = Rc::new(RefCell::new(Label::new(10.0, 10.0, "Hello World", TextStyle::default())));

        let mut previous: Option<f32> = None;
        let scroller = {
            let bar = bar.clone();
            let label = label.clone();
            CircleScroller::new(Rect::new(50.0, 50.0, 200.0, 200.0), move |angle| {
                let Some(angle) = angle else {
                    previous = None;
                    return;
                };
                let Some(last) = previous.replace(angle) else {
                    return;
                };

                label.borrow_mut().set_text(format!("Angle: {:>3}", angle.round() as i32));
                let mut diff = last - angle;
                if diff > WRAP_LIMIT {
                    diff -= 360.0;
                } else if diff < -WRAP_LIMIT {
                    diff += 360.0;
                }
                let dy = if diff > 0.0 { SPEED } else { -SPEED };
                bar.borrow_mut().rect.move_by(0.0, dy);
            })
        };

        group.add_default(EntityRef::new(scroller))?;
        group.add_default(EntityRef::from_shared(&label))?;
        group.add_default(EntityRef::from_shared(&bar))?;
        Ok(())
    })
    .await;

    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
